//! Parameters for mesh export.

use mesh_io::MeshFormat;
use mesh_repair::DedupParams;

/// Parameters for [`export_meshes`](crate::export_meshes).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExportParams {
    /// Output format for every mesh. Default: PLY
    pub format: MeshFormat,

    /// Duplicate-triangle removal applied before encoding. `None` writes the
    /// index buffer as imported. Default: enabled with 1e-4 tolerance
    pub dedup: Option<DedupParams>,

    /// Encode meshes on the rayon thread pool. Default: false
    pub parallel: bool,

    /// Seed for the identifiers given to unnamed meshes. `None` seeds from
    /// the OS, so identifiers differ between runs. Default: None
    pub seed: Option<u64>,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            format: MeshFormat::Ply,
            dedup: Some(DedupParams::default()),
            parallel: false,
            seed: None,
        }
    }
}

impl ExportParams {
    /// Params writing PLY files.
    #[must_use]
    pub fn ply() -> Self {
        Self::default()
    }

    /// Params writing serialized containers.
    #[must_use]
    pub fn serialized() -> Self {
        Self {
            format: MeshFormat::Serialized,
            ..Default::default()
        }
    }

    /// Params writing every mesh exactly as imported: no deduplication.
    #[must_use]
    pub fn raw() -> Self {
        Self {
            dedup: None,
            ..Default::default()
        }
    }

    /// Set the output format.
    #[must_use]
    pub const fn with_format(mut self, format: MeshFormat) -> Self {
        self.format = format;
        self
    }

    /// Set or clear deduplication.
    #[must_use]
    pub const fn with_dedup(mut self, dedup: Option<DedupParams>) -> Self {
        self.dedup = dedup;
        self
    }

    /// Enable or disable parallel encoding.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fix the seed for generated mesh identifiers.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = ExportParams::default();
        assert_eq!(params.format, MeshFormat::Ply);
        assert_eq!(params.dedup, Some(DedupParams::default()));
        assert!(!params.parallel);
        assert_eq!(params.seed, None);
    }

    #[test]
    fn test_presets() {
        assert_eq!(ExportParams::serialized().format, MeshFormat::Serialized);
        assert!(ExportParams::raw().dedup.is_none());
        assert_eq!(ExportParams::ply(), ExportParams::default());
    }

    #[test]
    fn test_builders() {
        let params = ExportParams::raw()
            .with_format(MeshFormat::Serialized)
            .with_parallel(true)
            .with_seed(7)
            .with_dedup(Some(DedupParams::default().with_tolerance(0.01)));

        assert_eq!(params.format, MeshFormat::Serialized);
        assert!(params.parallel);
        assert_eq!(params.seed, Some(7));
        assert!(params.dedup.is_some_and(|d| (d.tolerance - 0.01).abs() < f32::EPSILON));
    }
}

//! Importer-facing mesh description.
//!
//! [`SourceMesh`] is the seam between an external scene importer and the
//! encoders. It mirrors what importers typically report: positions, optional
//! normals, one UV channel annotated with its component count, optional RGBA
//! colors, and a face list in which every face carries its own arity.

use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One polygon from the importer. Triangles fit inline.
pub type SourceFace = SmallVec<[u32; 4]>;

/// A texture coordinate channel as reported by an importer.
///
/// Importers store UVs as 3-component vectors and annotate how many of the
/// components are meaningful. Only 2-component channels are exported.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UvChannel {
    /// Number of meaningful components (1, 2 or 3).
    pub components: u32,
    /// Raw coordinates, one per vertex.
    pub coords: Vec<[f32; 3]>,
}

impl UvChannel {
    /// Create a 2-component channel from `(u, v)` pairs.
    #[must_use]
    pub fn planar(coords: impl IntoIterator<Item = [f32; 2]>) -> Self {
        Self {
            components: 2,
            coords: coords.into_iter().map(|[u, v]| [u, v, 0.0]).collect(),
        }
    }

    /// Whether the channel carries exactly two meaningful components.
    #[inline]
    #[must_use]
    pub const fn is_planar(&self) -> bool {
        self.components == 2
    }
}

/// A mesh exactly as handed over by the importer, before validation.
///
/// # Example
///
/// ```
/// use mesh_types::{GeometryBuffer, SourceMesh, Point3};
/// use smallvec::smallvec;
///
/// let source = SourceMesh::new(
///     "tri",
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![smallvec![0, 1, 2]],
/// );
/// let buffer = GeometryBuffer::from_source(&source).unwrap();
/// assert_eq!(buffer.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SourceMesh {
    /// Mesh name. May be empty when the importer has none.
    pub name: String,
    /// Vertex positions.
    pub positions: Vec<Point3<f32>>,
    /// Per-vertex normals.
    pub normals: Option<Vec<Vector3<f32>>>,
    /// First texture coordinate channel.
    pub uv_channel: Option<UvChannel>,
    /// Per-vertex RGBA colors.
    pub colors: Option<Vec<[f32; 4]>>,
    /// Polygons as vertex index lists.
    pub faces: Vec<SourceFace>,
}

impl SourceMesh {
    /// Create a source mesh with positions and faces only.
    #[must_use]
    pub fn new(name: impl Into<String>, positions: Vec<Point3<f32>>, faces: Vec<SourceFace>) -> Self {
        Self {
            name: name.into(),
            positions,
            normals: None,
            uv_channel: None,
            colors: None,
            faces,
        }
    }

    /// Create a source mesh from triangle index triples.
    #[must_use]
    pub fn from_triangles(
        name: impl Into<String>,
        positions: Vec<Point3<f32>>,
        triangles: &[[u32; 3]],
    ) -> Self {
        let faces = triangles
            .iter()
            .map(|t| SourceFace::from_slice(t))
            .collect();
        Self::new(name, positions, faces)
    }

    /// Attach per-vertex normals.
    #[must_use]
    pub fn with_normals(mut self, normals: Vec<Vector3<f32>>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Attach a texture coordinate channel.
    #[must_use]
    pub fn with_uv_channel(mut self, channel: UvChannel) -> Self {
        self.uv_channel = Some(channel);
        self
    }

    /// Attach per-vertex RGBA colors.
    #[must_use]
    pub fn with_colors(mut self, colors: Vec<[f32; 4]>) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Whether the importer supplied a name.
    #[inline]
    #[must_use]
    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }
}

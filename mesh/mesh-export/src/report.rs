//! Export results handed to the scene descriptor writer.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ExportError;

/// Reference to one written mesh file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ShapeRef {
    /// Position of the mesh in the input slice.
    pub index: usize,

    /// Mesh identifier (importer name, or a generated one).
    pub name: String,

    /// File path relative to the output root.
    pub path: PathBuf,

    /// Renderer shape plugin that loads the file.
    pub shape_type: &'static str,

    /// Triangles written after deduplication.
    pub triangles: usize,
}

/// A mesh that was not written.
#[derive(Debug)]
pub struct SkippedMesh {
    /// Position of the mesh in the input slice.
    pub index: usize,

    /// Mesh identifier.
    pub name: String,

    /// Why the mesh was skipped.
    pub error: ExportError,
}

/// Outcome of an export run.
///
/// Shapes and skipped meshes are both ordered by input index.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Meshes written successfully.
    pub shapes: Vec<ShapeRef>,

    /// Meshes that failed and were skipped.
    pub skipped: Vec<SkippedMesh>,

    /// Duplicate triangles removed across all written meshes.
    pub triangles_removed: usize,
}

impl ExportReport {
    /// Whether every mesh was written.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Total number of meshes handled.
    #[must_use]
    pub fn total(&self) -> usize {
        self.shapes.len() + self.skipped.len()
    }

    /// Triangles written across all shapes.
    #[must_use]
    pub fn triangles_written(&self) -> usize {
        self.shapes.iter().map(|s| s.triangles).sum()
    }
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Export: {}/{} meshes written, {} triangles ({} duplicates removed)",
            self.shapes.len(),
            self.total(),
            self.triangles_written(),
            self.triangles_removed
        )?;
        if !self.skipped.is_empty() {
            write!(f, ", {} skipped", self.skipped.len())?;
        }
        Ok(())
    }
}

/// Reference to one copied texture.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TextureRef {
    /// Texture reference as given by the material.
    pub source: PathBuf,

    /// Copied file path relative to the output root (`textures/<name>`).
    pub path: PathBuf,
}

/// A texture that was not copied.
#[derive(Debug)]
pub struct SkippedTexture {
    /// Texture reference as given by the material.
    pub source: PathBuf,

    /// Why the texture was skipped.
    pub error: ExportError,
}

/// Outcome of a texture copy run.
///
/// Each distinct reference appears once, in first-seen order.
#[derive(Debug, Default)]
pub struct TextureReport {
    /// Textures copied successfully.
    pub copied: Vec<TextureRef>,

    /// Textures that failed and were skipped.
    pub skipped: Vec<SkippedTexture>,
}

impl TextureReport {
    /// Whether every texture was copied.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Output path of a copied texture, by its source reference.
    #[must_use]
    pub fn path_of(&self, source: &Path) -> Option<&Path> {
        self.copied
            .iter()
            .find(|t| t.source == source)
            .map(|t| t.path.as_path())
    }
}

impl fmt::Display for TextureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Textures: {}/{} copied",
            self.copied.len(),
            self.copied.len() + self.skipped.len()
        )
    }
}

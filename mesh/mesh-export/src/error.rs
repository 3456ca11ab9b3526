//! Error types for mesh export.

use std::path::PathBuf;

use mesh_io::IoError;
use mesh_types::GeometryError;
use thiserror::Error;

/// Errors that can occur while exporting meshes.
///
/// [`CreateDir`](Self::CreateDir) aborts the whole export; the other variants
/// only abort the mesh or texture they occurred on.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The output directory tree could not be created.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A texture reference has no file name to copy it under.
    #[error("texture reference {path} has no file name")]
    TextureName {
        /// Texture reference as given.
        path: PathBuf,
    },

    /// A texture could not be copied into the output tree.
    #[error("failed to copy texture {path}: {source}")]
    TextureCopy {
        /// Source file that could not be copied.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The source mesh could not be turned into a triangle buffer.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Encoding or writing the mesh file failed.
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Result type for export operations.
pub type ExportResult<T> = std::result::Result<T, ExportError>;

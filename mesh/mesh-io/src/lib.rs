//! Mesh encoders for scenepack.
//!
//! This crate writes [`GeometryBuffer`]s to the two mesh formats the renderer
//! loads natively, and reads them back for verification:
//!
//! - **PLY** (Polygon File Format) - Binary little-endian and ASCII
//! - **Serialized** - zlib-compressed single-mesh container, version 4
//!
//! # Layer 0 Crate
//!
//! This crate has no importer or renderer dependencies. It can be used in:
//! - CLI tools
//! - Servers
//! - Python bindings
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{save_serialized, load_ply};
//!
//! let buffer = load_ply("model.ply").unwrap();
//! save_serialized(&buffer, "model.serialized").unwrap();
//! ```
//!
//! # Format Detection
//!
//! The format can be picked from the file extension:
//!
//! ```no_run
//! use mesh_io::{load_mesh, save_mesh};
//!
//! let buffer = load_mesh("model.ply").unwrap();
//! save_mesh(&buffer, "model.serialized").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod ply;
mod serialized;

pub use error::{IoError, IoResult};
pub use ply::{PLY_COMMENT, load_ply, save_ply, write_ply};
pub use serialized::{
    SERIALIZED_MAGIC, SERIALIZED_VERSION, SerializedFlags, decode_serialized, encode_serialized,
    load_serialized, save_serialized, write_serialized,
};

use std::fs::File;
use std::path::Path;

use mesh_types::GeometryBuffer;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MeshFormat {
    /// PLY (Polygon File Format), written as binary little-endian.
    #[default]
    Ply,
    /// Serialized compressed container.
    Serialized,
}

impl MeshFormat {
    /// Detect format from file extension.
    ///
    /// # Returns
    ///
    /// The detected format, or `None` if the extension is not recognized.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "ply" => Some(Self::Ply),
            "serialized" => Some(Self::Serialized),
            _ => None,
        }
    }

    /// Get the canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Ply => "ply",
            Self::Serialized => "serialized",
        }
    }

    /// Name of the renderer shape plugin that loads this format.
    #[must_use]
    pub const fn shape_type(&self) -> &'static str {
        match self {
            Self::Ply => "ply",
            Self::Serialized => "serialized",
        }
    }
}

/// Load a mesh from a file, detecting format from extension.
///
/// # Errors
///
/// Returns an error if:
/// - The file format cannot be determined from the extension
/// - The file cannot be read
/// - The file content is invalid for the detected format
pub fn load_mesh<P: AsRef<Path>>(path: P) -> IoResult<GeometryBuffer> {
    let path = path.as_ref();
    match detect_format(path)? {
        MeshFormat::Ply => load_ply(path),
        MeshFormat::Serialized => load_serialized(path),
    }
}

/// Save a mesh to a file, detecting format from extension.
///
/// PLY output is always binary.
///
/// # Errors
///
/// Returns an error if:
/// - The file format cannot be determined from the extension
/// - The buffer fails validation
/// - The file cannot be written
///
/// # Example
///
/// ```no_run
/// use mesh_io::{save_mesh, load_mesh};
///
/// let buffer = load_mesh("input.serialized").unwrap();
/// save_mesh(&buffer, "output.ply").unwrap();
/// ```
pub fn save_mesh<P: AsRef<Path>>(buffer: &GeometryBuffer, path: P) -> IoResult<()> {
    let path = path.as_ref();
    save_mesh_as(buffer, path, detect_format(path)?)
}

/// Save a mesh in an explicit format, ignoring the path's extension.
///
/// # Errors
///
/// Returns an error if the buffer fails validation or the file cannot be
/// written.
pub fn save_mesh_as<P: AsRef<Path>>(
    buffer: &GeometryBuffer,
    path: P,
    format: MeshFormat,
) -> IoResult<()> {
    match format {
        MeshFormat::Ply => save_ply(buffer, path, true),
        MeshFormat::Serialized => save_serialized(buffer, path),
    }
}

fn detect_format(path: &Path) -> IoResult<MeshFormat> {
    MeshFormat::from_path(path).ok_or_else(|| IoError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Open a file for reading, reporting a missing file by path.
pub(crate) fn open_file(path: &Path) -> IoResult<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })
}

/// Create or truncate a file for writing, naming the path on failure.
pub(crate) fn create_file(path: &Path) -> IoResult<File> {
    File::create(path).map_err(|source| IoError::Create {
        path: path.to_path_buf(),
        source,
    })
}

/// Mesh name derived from a file stem.
pub(crate) fn mesh_name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

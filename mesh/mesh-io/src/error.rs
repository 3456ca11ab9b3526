//! Error types for mesh I/O operations.

use std::path::PathBuf;

use mesh_types::GeometryError;
use thiserror::Error;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur during mesh I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The destination could not be opened for writing.
    #[error("failed to open {path} for writing: {source}")]
    Create {
        /// Destination path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Unknown file format (unrecognized extension).
    #[error("unknown file format: .{extension}")]
    UnknownFormat {
        /// The unrecognized extension.
        extension: String,
    },

    /// Invalid file content (parse error).
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// Unexpected end of data.
    #[error("unexpected end of file at position {position}")]
    UnexpectedEof {
        /// Byte offset where more data was expected.
        position: u64,
    },

    /// Serialized container does not start with the expected magic number.
    #[error("invalid serialized mesh header: magic {found:#06x}")]
    BadMagic {
        /// Magic number found in the file.
        found: u16,
    },

    /// Serialized container version is not supported.
    #[error("unsupported serialized mesh version {found}")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u16,
    },

    /// Deflate compression or decompression failed.
    #[error("compression error: {0}")]
    Compression(#[source] std::io::Error),

    /// The geometry handed to an encoder, or decoded from a file, is invalid.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// String conversion error.
    #[error("string conversion error: {0}")]
    FromUtf8(#[from] std::string::FromUtf8Error),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}

//! Error types for geometry ingestion and validation.

use thiserror::Error;

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Errors raised while building or validating a [`GeometryBuffer`](crate::GeometryBuffer).
///
/// All variants carry the mesh name so a caller skipping bad meshes can
/// report which one was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// A face with other than three vertex indices was supplied.
    #[error("mesh '{mesh}': face {face} has {arity} indices, only triangles are supported")]
    NonTriangularFace {
        /// Name of the offending mesh.
        mesh: String,
        /// Position of the face in the source face list.
        face: usize,
        /// Number of indices the face reported.
        arity: usize,
    },

    /// An optional per-vertex stream does not match the vertex count.
    #[error("mesh '{mesh}': {attribute} has {actual} entries, expected {expected}")]
    AttributeLength {
        /// Name of the offending mesh.
        mesh: String,
        /// Which stream is wrong (`"normals"`, `"uvs"`, `"colors"`).
        attribute: &'static str,
        /// Vertex count.
        expected: usize,
        /// Stream length.
        actual: usize,
    },

    /// A triangle references a vertex that does not exist.
    #[error("mesh '{mesh}': vertex index {index} out of range (mesh has {vertex_count} vertices)")]
    IndexOutOfRange {
        /// Name of the offending mesh.
        mesh: String,
        /// The invalid index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// The flat index list is not a whole number of triangles.
    #[error("mesh '{mesh}': index count {len} is not a multiple of 3")]
    PartialTriangle {
        /// Name of the offending mesh.
        mesh: String,
        /// Length of the index list.
        len: usize,
    },
}

impl GeometryError {
    /// Name of the mesh this error refers to.
    #[must_use]
    pub fn mesh_name(&self) -> &str {
        match self {
            Self::NonTriangularFace { mesh, .. }
            | Self::AttributeLength { mesh, .. }
            | Self::IndexOutOfRange { mesh, .. }
            | Self::PartialTriangle { mesh, .. } => mesh,
        }
    }
}

//! Mesh geometry encoders for renderer scene conversion.
//!
//! This umbrella crate re-exports the mesh-* crates, providing a unified API
//! for turning imported meshes into files a physically based renderer loads
//! natively. All crates are Layer 0 and can be used in CLI tools, servers, or
//! Python bindings.
//!
//! # Quick Start
//!
//! ```no_run
//! use scenepack::prelude::*;
//!
//! // Meshes as reported by an importer
//! let meshes = vec![SourceMesh::from_triangles(
//!     "Floor",
//!     vec![
//!         Point3::new(-1.0, 0.0, -1.0),
//!         Point3::new(1.0, 0.0, -1.0),
//!         Point3::new(1.0, 0.0, 1.0),
//!     ],
//!     &[[0, 1, 2]],
//! )];
//!
//! // Write meshes/mesh{i}.serialized under the output directory
//! let report = export_meshes(&meshes, &ExportParams::serialized(), "scene_out").unwrap();
//! for shape in &report.shapes {
//!     println!("<shape type=\"{}\"> {}", shape.shape_type, shape.path.display());
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Core data: `GeometryBuffer`, `SourceMesh`, `VertexColor`
//! - [`repair`] - Geometric duplicate-triangle removal
//! - [`io`] - Binary PLY and serialized-container encoders and decoders
//! - [`export`] - Per-mesh export loop, output layout, shape references
//!
//! # Feature Flags
//!
//! - `serde` - Serialize parameter structs and geometry

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures: `GeometryBuffer`, `SourceMesh`, `VertexColor`.
pub use mesh_types as types;

/// Geometric duplicate-triangle removal.
pub use mesh_repair as repair;

/// PLY and serialized mesh encoders.
pub use mesh_io as io;

/// Per-mesh export loop.
pub use mesh_export as export;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for mesh export.
///
/// # Usage
///
/// ```
/// use scenepack::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mesh_types::{GeometryBuffer, Point2, Point3, SourceMesh, UvChannel, Vector3, VertexColor};

    // Dedup
    pub use mesh_repair::{DedupParams, FaceDeduplicator, remove_duplicate_triangles};

    // I/O
    pub use mesh_io::{MeshFormat, load_mesh, save_mesh};

    // Export (main use case)
    pub use mesh_export::{ExportParams, ExportReport, ShapeRef, TextureReport, copy_textures, export_meshes};
}

// =============================================================================
// Tests
// =============================================================================

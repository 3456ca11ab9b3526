//! Core geometry types for scenepack.
//!
//! This crate provides the data handed from a scene importer to the mesh
//! encoders:
//!
//! - [`SourceMesh`] - A mesh as reported by the importer (arbitrary polygons,
//!   annotated UV channel, RGBA colors)
//! - [`GeometryBuffer`] - Validated, triangle-only vertex and index streams
//! - [`VertexColor`] - RGB vertex color
//! - [`GeometryError`] - Validation failures, each naming the mesh
//!
//! # Layer 0 Crate
//!
//! This crate has no rendering or importer dependencies. It can be used in:
//! - CLI tools
//! - Servers
//! - Python bindings
//!
//! # Precision
//!
//! All streams are `f32`. Both supported output formats (binary PLY and the
//! serialized container) store single-precision floats.
//!
//! # Example
//!
//! ```
//! use mesh_types::{GeometryBuffer, SourceMesh, Point3};
//!
//! let source = SourceMesh::from_triangles(
//!     "tri",
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.5, 1.0, 0.0),
//!     ],
//!     &[[0, 1, 2]],
//! );
//!
//! let buffer = GeometryBuffer::from_source(&source).unwrap();
//! assert_eq!(buffer.triangle_count(), 1);
//! assert!(!buffer.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod color;
mod error;
mod geometry;
mod source;

pub use color::VertexColor;
pub use error::{GeometryError, GeometryResult};
pub use geometry::GeometryBuffer;
pub use source::{SourceFace, SourceMesh, UvChannel};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

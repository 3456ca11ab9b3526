//! Mesh clean-up passes run before encoding.
//!
//! This crate provides:
//! - Geometric duplicate-triangle removal ([`FaceDeduplicator`])
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with no rendering dependencies.
//!
//! # Example
//!
//! ```
//! use mesh_types::{GeometryBuffer, Point3};
//! use mesh_repair::{remove_duplicate_triangles, DedupParams};
//!
//! // Two copies of the same triangle, one with flipped winding
//! let mut buffer = GeometryBuffer::new(
//!     "doubled",
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![0, 1, 2, 0, 2, 1],
//! );
//!
//! let summary = remove_duplicate_triangles(&mut buffer, &DedupParams::default());
//! println!("{summary}");
//! assert_eq!(buffer.triangle_count(), 1);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod dedup;

pub use dedup::{
    DEFAULT_TOLERANCE, DedupParams, DedupSummary, FaceDeduplicator, remove_duplicate_triangles,
};

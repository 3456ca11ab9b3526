//! Scene mesh export.
//!
//! Takes the meshes reported by a scene importer and writes one file per
//! mesh for the renderer, returning the shape references a scene descriptor
//! writer needs:
//!
//! 1. [`SourceMesh`](mesh_types::SourceMesh) to validated
//!    [`GeometryBuffer`](mesh_types::GeometryBuffer)
//! 2. Optional duplicate-triangle removal (`mesh-repair`)
//! 3. PLY or serialized encoding (`mesh-io`)
//!
//! A failing mesh is skipped with a warning; the rest are still written.
//! Texture images referenced by materials are copied next to the meshes with
//! [`copy_textures`], under the same skip-and-continue rule.
//!
//! # Example
//!
//! ```no_run
//! use mesh_export::{export_meshes, ExportParams};
//! use mesh_io::MeshFormat;
//!
//! # let meshes: Vec<mesh_types::SourceMesh> = Vec::new();
//! let params = ExportParams::default()
//!     .with_format(MeshFormat::Serialized)
//!     .with_parallel(true)
//!     .with_seed(0);
//!
//! let report = export_meshes(&meshes, &params, "scene_out").unwrap();
//! println!("{report}");
//! for skipped in &report.skipped {
//!     eprintln!("{}: {}", skipped.name, skipped.error);
//! }
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod export;
mod layout;
mod naming;
mod params;
mod report;

pub use error::{ExportError, ExportResult};
pub use export::{copy_textures, export_meshes};
pub use layout::{ExportLayout, MESH_DIR, TEXTURE_DIR};
pub use naming::MeshNamer;
pub use params::ExportParams;
pub use report::{ExportReport, ShapeRef, SkippedMesh, SkippedTexture, TextureRef, TextureReport};

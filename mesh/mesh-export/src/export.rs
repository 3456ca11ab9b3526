//! The per-mesh export loop.

use std::path::{Path, PathBuf};

use hashbrown::HashSet;
use mesh_io::save_mesh_as;
use mesh_repair::remove_duplicate_triangles;
use mesh_types::{GeometryBuffer, SourceMesh};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::ExportResult;
use crate::layout::ExportLayout;
use crate::naming::MeshNamer;
use crate::params::ExportParams;
use crate::report::{ExportReport, ShapeRef, SkippedMesh, SkippedTexture, TextureRef, TextureReport};

/// A mesh that was written, with the triangles dedup removed from it.
struct Written {
    shape: ShapeRef,
    removed: usize,
}

/// Export every mesh to `<out_dir>/meshes/mesh{i}.{ext}`.
///
/// Each mesh is converted to a [`GeometryBuffer`], optionally deduplicated,
/// and encoded in `params.format`. A mesh that fails (a non-triangular face,
/// an unwritable file) is logged with `warn!`, recorded in
/// [`ExportReport::skipped`] and does not stop the remaining meshes. Files
/// already partially written for a failed mesh are left on disk.
///
/// # Errors
///
/// Only [`ExportError::CreateDir`](crate::ExportError::CreateDir), when the
/// output directories cannot be created. Per-mesh failures are reported in
/// the returned [`ExportReport`].
///
/// # Example
///
/// ```no_run
/// use mesh_export::{export_meshes, ExportParams};
/// use mesh_types::{Point3, SourceMesh};
///
/// let meshes = vec![SourceMesh::from_triangles(
///     "tri",
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     &[[0, 1, 2]],
/// )];
///
/// let report = export_meshes(&meshes, &ExportParams::serialized(), "out").unwrap();
/// for shape in &report.shapes {
///     println!("{} -> {} ({})", shape.name, shape.path.display(), shape.shape_type);
/// }
/// ```
pub fn export_meshes(
    meshes: &[SourceMesh],
    params: &ExportParams,
    out_dir: impl AsRef<Path>,
) -> ExportResult<ExportReport> {
    let layout = ExportLayout::new(out_dir.as_ref());
    layout.create_dirs()?;

    // Names are drawn up front so generated ids do not depend on scheduling
    let names = MeshNamer::new(params.seed).resolve(meshes);

    let export = |index: usize| export_one(index, &meshes[index], &names[index], &layout, params);
    let results: Vec<ExportResult<Written>> = if params.parallel {
        (0..meshes.len()).into_par_iter().map(export).collect()
    } else {
        (0..meshes.len()).map(export).collect()
    };

    let mut report = ExportReport::default();
    for (index, (result, name)) in results.into_iter().zip(names).enumerate() {
        match result {
            Ok(written) => {
                report.triangles_removed += written.removed;
                report.shapes.push(written.shape);
            }
            Err(error) => {
                warn!(mesh = %name, index, %error, "Skipping mesh");
                report.skipped.push(SkippedMesh { index, name, error });
            }
        }
    }

    info!(
        written = report.shapes.len(),
        skipped = report.skipped.len(),
        removed = report.triangles_removed,
        format = params.format.extension(),
        "Mesh export finished"
    );
    Ok(report)
}

/// Copy texture images into `<out_dir>/textures/`.
///
/// Each reference is resolved against `source_root` (the directory of the
/// imported scene) and copied under its file name, overwriting any file
/// already there. Repeated references are copied once. A texture that cannot
/// be copied is logged with `warn!`, recorded in [`TextureReport::skipped`]
/// and does not stop the rest.
///
/// # Errors
///
/// Only [`ExportError::CreateDir`](crate::ExportError::CreateDir), when the
/// output directories cannot be created.
///
/// # Example
///
/// ```no_run
/// use mesh_export::copy_textures;
/// use std::path::PathBuf;
///
/// let textures = vec![PathBuf::from("maps/wood_albedo.png")];
/// let report = copy_textures(&textures, "assets/room", "out").unwrap();
/// // Material nodes reference the copied file by its relative path
/// assert_eq!(
///     report.copied[0].path,
///     std::path::Path::new("textures/wood_albedo.png")
/// );
/// ```
pub fn copy_textures(
    textures: &[PathBuf],
    source_root: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
) -> ExportResult<TextureReport> {
    let layout = ExportLayout::new(out_dir.as_ref());
    layout.create_dirs()?;
    let source_root = source_root.as_ref();

    let mut seen = HashSet::new();
    let mut report = TextureReport::default();
    for texture in textures {
        if !seen.insert(texture.as_path()) {
            continue;
        }
        match layout.copy_texture(source_root, texture) {
            Ok(path) => {
                debug!(texture = %texture.display(), path = %path.display(), "Copied texture");
                report.copied.push(TextureRef { source: texture.clone(), path });
            }
            Err(error) => {
                warn!(texture = %texture.display(), %error, "Skipping texture");
                report.skipped.push(SkippedTexture { source: texture.clone(), error });
            }
        }
    }

    info!(
        copied = report.copied.len(),
        skipped = report.skipped.len(),
        "Texture copy finished"
    );
    Ok(report)
}

fn export_one(
    index: usize,
    source: &SourceMesh,
    name: &str,
    layout: &ExportLayout,
    params: &ExportParams,
) -> ExportResult<Written> {
    let mut buffer = GeometryBuffer::from_source_named(source, name)?;

    let removed = params
        .dedup
        .map_or(0, |dedup| remove_duplicate_triangles(&mut buffer, &dedup).removed());

    let path = layout.mesh_path(index, params.format);
    save_mesh_as(&buffer, &path, params.format)?;

    debug!(
        mesh = %buffer.name,
        index,
        path = %path.display(),
        vertices = buffer.vertex_count(),
        triangles = buffer.triangle_count(),
        "Wrote mesh"
    );

    Ok(Written {
        shape: ShapeRef {
            index,
            name: buffer.name,
            path: ExportLayout::relative_mesh_path(index, params.format),
            shape_type: params.format.shape_type(),
            triangles: buffer.indices.len() / 3,
        },
        removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExportError;
    use mesh_io::{IoError, MeshFormat, load_mesh};
    use mesh_types::{GeometryError, Point3};
    use smallvec::smallvec;

    fn triangle(name: &str) -> SourceMesh {
        SourceMesh::from_triangles(
            name,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2], [0, 2, 1]],
        )
    }

    fn quad(name: &str) -> SourceMesh {
        SourceMesh::new(
            name,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![smallvec![0, 1, 2, 3]],
        )
    }

    #[test]
    fn test_export_writes_layout() {
        let dir = tempfile::tempdir().unwrap();
        let meshes = vec![triangle("a"), triangle("b")];

        let report = export_meshes(&meshes, &ExportParams::default(), dir.path()).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.shapes.len(), 2);
        assert_eq!(report.triangles_removed, 2);
        for (i, shape) in report.shapes.iter().enumerate() {
            assert_eq!(shape.index, i);
            assert_eq!(shape.path, Path::new("meshes").join(format!("mesh{i}.ply")));
            assert_eq!(shape.shape_type, "ply");
            assert_eq!(shape.triangles, 1);
            assert!(dir.path().join(&shape.path).is_file());
        }
        assert_eq!(report.shapes[1].name, "b");
    }

    #[test]
    fn test_export_without_dedup() {
        let dir = tempfile::tempdir().unwrap();
        let params = ExportParams::raw().with_format(MeshFormat::Serialized);

        let report = export_meshes(&[triangle("t")], &params, dir.path()).unwrap();

        assert_eq!(report.triangles_removed, 0);
        assert_eq!(report.shapes[0].triangles, 2);
        let loaded = load_mesh(dir.path().join("meshes/mesh0.serialized")).unwrap();
        assert_eq!(loaded.triangle_count(), 2);
        assert_eq!(loaded.name, "t");
    }

    #[test]
    fn test_skip_and_continue() {
        let dir = tempfile::tempdir().unwrap();
        let meshes = vec![triangle("ok0"), quad("bad"), triangle("ok2")];

        let report = export_meshes(&meshes, &ExportParams::default(), dir.path()).unwrap();

        assert_eq!(report.shapes.len(), 2);
        assert_eq!(report.shapes[0].index, 0);
        assert_eq!(report.shapes[1].index, 2);
        assert_eq!(report.skipped.len(), 1);

        let skipped = &report.skipped[0];
        assert_eq!(skipped.index, 1);
        assert_eq!(skipped.name, "bad");
        assert!(matches!(
            skipped.error,
            ExportError::Geometry(GeometryError::NonTriangularFace { arity: 4, .. })
        ));
        assert!(!dir.path().join("meshes/mesh1.ply").exists());
    }

    #[test]
    fn test_unwritable_mesh_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where mesh0.ply should go makes that one file unwritable
        std::fs::create_dir_all(dir.path().join("meshes/mesh0.ply")).unwrap();

        let report =
            export_meshes(&[triangle("a"), triangle("b")], &ExportParams::default(), dir.path())
                .unwrap();

        assert_eq!(report.shapes.len(), 1);
        assert_eq!(report.shapes[0].name, "b");
        assert!(matches!(
            report.skipped[0].error,
            ExportError::Io(IoError::Create { .. })
        ));
    }

    #[test]
    fn test_unnamed_meshes_seeded() {
        let meshes = vec![triangle(""), triangle("named"), triangle("")];
        let params = ExportParams::default().with_seed(11);

        let first = export_meshes(&meshes, &params, tempfile::tempdir().unwrap().path()).unwrap();
        let second = export_meshes(&meshes, &params, tempfile::tempdir().unwrap().path()).unwrap();

        let names = |r: &ExportReport| r.shapes.iter().map(|s| s.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&first), names(&second));
        assert!(first.shapes[0].name.starts_with("mesh-"));
        assert_eq!(first.shapes[1].name, "named");
        assert_ne!(first.shapes[0].name, first.shapes[2].name);
    }

    #[test]
    fn test_unnamed_failure_reports_generated_name() {
        let dir = tempfile::tempdir().unwrap();
        let params = ExportParams::default().with_seed(3);

        let report = export_meshes(&[quad("")], &params, dir.path()).unwrap();
        let skipped = &report.skipped[0];
        assert!(skipped.name.starts_with("mesh-"));
        assert!(skipped.error.to_string().contains(&skipped.name));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let meshes: Vec<SourceMesh> = (0..16)
            .map(|i| if i % 5 == 3 { quad("") } else { triangle("") })
            .collect();
        let sequential = ExportParams::serialized().with_seed(99);
        let parallel = sequential.with_parallel(true);

        let a = export_meshes(&meshes, &sequential, tempfile::tempdir().unwrap().path()).unwrap();
        let b = export_meshes(&meshes, &parallel, tempfile::tempdir().unwrap().path()).unwrap();

        assert_eq!(a.shapes, b.shapes);
        assert_eq!(a.triangles_removed, b.triangles_removed);
        let skipped = |r: &ExportReport| r.skipped.iter().map(|s| s.index).collect::<Vec<_>>();
        assert_eq!(skipped(&a), vec![3, 8, 13]);
        assert_eq!(skipped(&a), skipped(&b));
    }

    #[test]
    fn test_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let report = export_meshes(&[], &ExportParams::default(), dir.path()).unwrap();
        assert_eq!(report.total(), 0);
        assert!(dir.path().join("meshes").is_dir());
    }

    #[test]
    fn test_copy_textures_skip_and_continue() {
        let src = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("maps")).unwrap();
        std::fs::write(src.path().join("maps/wood.png"), b"wood").unwrap();
        std::fs::write(src.path().join("rough.jpg"), b"rough").unwrap();

        let out = tempfile::tempdir().unwrap();
        let textures = vec![
            PathBuf::from("maps/wood.png"),
            PathBuf::from("missing.png"),
            PathBuf::from("rough.jpg"),
            PathBuf::from("maps/wood.png"),
        ];

        let report = copy_textures(&textures, src.path(), out.path()).unwrap();

        assert_eq!(report.copied.len(), 2);
        assert_eq!(report.copied[0].path, Path::new("textures/wood.png"));
        assert_eq!(report.copied[1].path, Path::new("textures/rough.jpg"));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].source, Path::new("missing.png"));
        assert!(matches!(report.skipped[0].error, ExportError::TextureCopy { .. }));
        assert_eq!(std::fs::read(out.path().join("textures/wood.png")).unwrap(), b"wood");
    }
}

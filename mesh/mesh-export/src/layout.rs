//! Output directory layout.

use std::path::{Path, PathBuf};

use mesh_io::MeshFormat;

use crate::error::{ExportError, ExportResult};

/// Directory under the output root that holds mesh files.
pub const MESH_DIR: &str = "meshes";

/// Directory under the output root that holds copied texture images.
pub const TEXTURE_DIR: &str = "textures";

/// Where exported files go.
///
/// Mesh `i` is written to `<root>/meshes/mesh{i}.{ext}` and a texture
/// `a/b/wood.png` is copied to `<root>/textures/wood.png`. Shape and texture
/// references use the path relative to `<root>`, so the scene descriptor can
/// sit in the root and the tree can be moved as a whole.
///
/// # Example
///
/// ```
/// use mesh_export::ExportLayout;
/// use mesh_io::MeshFormat;
/// use std::path::Path;
///
/// let layout = ExportLayout::new("/tmp/scene");
/// assert_eq!(
///     layout.mesh_path(3, MeshFormat::Ply),
///     Path::new("/tmp/scene/meshes/mesh3.ply")
/// );
/// assert_eq!(
///     ExportLayout::relative_mesh_path(3, MeshFormat::Ply),
///     Path::new("meshes/mesh3.ply")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLayout {
    root: PathBuf,
}

impl ExportLayout {
    /// Layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the mesh files.
    #[must_use]
    pub fn mesh_dir(&self) -> PathBuf {
        self.root.join(MESH_DIR)
    }

    /// File name of mesh `index`.
    #[must_use]
    pub fn mesh_file_name(index: usize, format: MeshFormat) -> String {
        format!("mesh{index}.{}", format.extension())
    }

    /// Path of mesh `index` relative to the root.
    #[must_use]
    pub fn relative_mesh_path(index: usize, format: MeshFormat) -> PathBuf {
        Path::new(MESH_DIR).join(Self::mesh_file_name(index, format))
    }

    /// Absolute (root-joined) path of mesh `index`.
    #[must_use]
    pub fn mesh_path(&self, index: usize, format: MeshFormat) -> PathBuf {
        self.root.join(Self::relative_mesh_path(index, format))
    }

    /// Directory holding the copied textures.
    #[must_use]
    pub fn texture_dir(&self) -> PathBuf {
        self.root.join(TEXTURE_DIR)
    }

    /// Path of a texture relative to the root: `textures/<file name>`.
    ///
    /// Returns `None` if `texture` has no file name (empty, or ends in `..`).
    #[must_use]
    pub fn relative_texture_path(texture: &Path) -> Option<PathBuf> {
        texture.file_name().map(|name| Path::new(TEXTURE_DIR).join(name))
    }

    /// Copy `source_root/texture` into the texture directory.
    ///
    /// An existing file of the same name is overwritten. Returns the copied
    /// file's path relative to the root.
    ///
    /// # Errors
    ///
    /// - [`ExportError::TextureName`] if `texture` has no file name
    /// - [`ExportError::TextureCopy`] if the source cannot be read or the
    ///   destination cannot be written
    pub fn copy_texture(&self, source_root: &Path, texture: &Path) -> ExportResult<PathBuf> {
        let relative = Self::relative_texture_path(texture).ok_or_else(|| ExportError::TextureName {
            path: texture.to_path_buf(),
        })?;
        let source = source_root.join(texture);
        std::fs::copy(&source, self.root.join(&relative))
            .map_err(|error| ExportError::TextureCopy { path: source, source: error })?;
        Ok(relative)
    }

    /// Create the root, mesh and texture directories if missing.
    ///
    /// # Errors
    ///
    /// [`ExportError::CreateDir`] naming the directory that failed.
    pub fn create_dirs(&self) -> ExportResult<()> {
        for dir in [self.mesh_dir(), self.texture_dir()] {
            std::fs::create_dir_all(&dir).map_err(|source| ExportError::CreateDir { path: dir, source })?;
        }
        Ok(())
    }
}

//! Raw per-mesh geometry streams.

use nalgebra::{Point2, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{GeometryError, GeometryResult, SourceMesh, VertexColor};

/// Vertex streams and triangle indices of a single mesh.
///
/// This is the unit handed to the encoders. Positions are single precision
/// because both output formats store `f32`.
///
/// # Invariants
///
/// - `normals`, `uvs` and `colors`, when present, have one entry per vertex
/// - `indices.len()` is a multiple of 3
/// - every index is smaller than the vertex count
///
/// [`validate`](Self::validate) checks all three; [`from_source`](Self::from_source)
/// only returns buffers that pass it.
///
/// # Example
///
/// ```
/// use mesh_types::{GeometryBuffer, Point3};
///
/// let buffer = GeometryBuffer::new(
///     "tri",
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![0, 1, 2],
/// );
///
/// assert_eq!(buffer.vertex_count(), 3);
/// assert_eq!(buffer.triangle_count(), 1);
/// assert!(buffer.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeometryBuffer {
    /// Mesh identifier.
    pub name: String,

    /// Vertex positions.
    pub vertices: Vec<Point3<f32>>,

    /// Per-vertex normals.
    pub normals: Option<Vec<Vector3<f32>>>,

    /// Per-vertex texture coordinates (two components).
    pub uvs: Option<Vec<Point2<f32>>>,

    /// Per-vertex RGB colors.
    pub colors: Option<Vec<VertexColor>>,

    /// Triangle vertex indices, three per triangle.
    pub indices: Vec<u32>,
}

impl GeometryBuffer {
    /// Create a buffer with positions and indices only.
    #[must_use]
    pub fn new(name: impl Into<String>, vertices: Vec<Point3<f32>>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            vertices,
            normals: None,
            uvs: None,
            colors: None,
            indices,
        }
    }

    /// Create a buffer from flat coordinate and index arrays.
    ///
    /// Trailing coordinates that do not form a full point are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::GeometryBuffer;
    ///
    /// let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    /// let buffer = GeometryBuffer::from_raw("tri", &positions, &[0, 1, 2]);
    /// assert_eq!(buffer.vertex_count(), 3);
    /// ```
    #[must_use]
    pub fn from_raw(name: impl Into<String>, positions: &[f32], indices: &[u32]) -> Self {
        let vertices = positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        Self::new(name, vertices, indices.to_vec())
    }

    /// Build a validated buffer from an importer mesh.
    ///
    /// - Every face must have exactly three indices.
    /// - A UV channel with other than two meaningful components is dropped.
    /// - RGBA colors are narrowed to RGB.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonTriangularFace`] for the first face with
    /// a different arity, or any error [`validate`](Self::validate) reports.
    pub fn from_source(source: &SourceMesh) -> GeometryResult<Self> {
        Self::from_source_named(source, source.name.clone())
    }

    /// Like [`from_source`](Self::from_source), but names the buffer (and
    /// any error) `name` instead of the importer's name.
    ///
    /// # Errors
    ///
    /// See [`from_source`](Self::from_source).
    pub fn from_source_named(source: &SourceMesh, name: impl Into<String>) -> GeometryResult<Self> {
        let name = name.into();
        let mut indices = Vec::with_capacity(source.faces.len() * 3);
        for (face, polygon) in source.faces.iter().enumerate() {
            if polygon.len() != 3 {
                return Err(GeometryError::NonTriangularFace {
                    mesh: name,
                    face,
                    arity: polygon.len(),
                });
            }
            indices.extend_from_slice(polygon);
        }

        let uvs = source
            .uv_channel
            .as_ref()
            .filter(|channel| channel.is_planar())
            .map(|channel| {
                channel
                    .coords
                    .iter()
                    .map(|&[u, v, _]| Point2::new(u, v))
                    .collect()
            });

        let colors = source
            .colors
            .as_ref()
            .map(|colors| colors.iter().copied().map(VertexColor::from_rgba).collect());

        let buffer = Self {
            name,
            vertices: source.positions.clone(),
            normals: source.normals.clone(),
            uvs,
            colors,
            indices,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    /// Attach per-vertex normals.
    #[must_use]
    pub fn with_normals(mut self, normals: Vec<Vector3<f32>>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Attach per-vertex texture coordinates.
    #[must_use]
    pub fn with_uvs(mut self, uvs: Vec<Point2<f32>>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Attach per-vertex colors.
    #[must_use]
    pub fn with_colors(mut self, colors: Vec<VertexColor>) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of complete triangles in the index list.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True if there is nothing to draw.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Whether normals are present.
    #[inline]
    #[must_use]
    pub const fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Whether texture coordinates are present.
    #[inline]
    #[must_use]
    pub const fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Whether vertex colors are present.
    #[inline]
    #[must_use]
    pub const fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Iterate over triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Replace the index list, returning the previous one.
    ///
    /// Vertex streams are left untouched; unreferenced vertices stay in place.
    pub fn replace_indices(&mut self, indices: Vec<u32>) -> Vec<u32> {
        debug_assert_eq!(indices.len() % 3, 0, "index list must hold whole triangles");
        std::mem::replace(&mut self.indices, indices)
    }

    /// Check the buffer invariants.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::AttributeLength`] if a per-vertex stream is the wrong length
    /// - [`GeometryError::PartialTriangle`] if the index count is not a multiple of 3
    /// - [`GeometryError::IndexOutOfRange`] for the first index past the vertex list
    pub fn validate(&self) -> GeometryResult<()> {
        let expected = self.vertices.len();
        let streams = [
            ("normals", self.normals.as_ref().map(Vec::len)),
            ("uvs", self.uvs.as_ref().map(Vec::len)),
            ("colors", self.colors.as_ref().map(Vec::len)),
        ];
        for (attribute, len) in streams {
            if let Some(actual) = len.filter(|&n| n != expected) {
                return Err(GeometryError::AttributeLength {
                    mesh: self.name.clone(),
                    attribute,
                    expected,
                    actual,
                });
            }
        }

        if self.indices.len() % 3 != 0 {
            return Err(GeometryError::PartialTriangle {
                mesh: self.name.clone(),
                len: self.indices.len(),
            });
        }

        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= expected) {
            return Err(GeometryError::IndexOutOfRange {
                mesh: self.name.clone(),
                index,
                vertex_count: expected,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UvChannel;
    use smallvec::smallvec;

    fn square_positions() -> Vec<Point3<f32>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn from_source_triangles() {
        let source = SourceMesh::from_triangles("square", square_positions(), &[[0, 1, 2], [0, 2, 3]]);
        let buffer = GeometryBuffer::from_source(&source).unwrap();
        assert_eq!(buffer.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(buffer.triangle_count(), 2);
        assert_eq!(buffer.name, "square");
    }

    #[test]
    fn from_source_rejects_quad() {
        let source = SourceMesh::new("quad", square_positions(), vec![smallvec![0, 1, 2, 3]]);
        let err = GeometryBuffer::from_source(&source).unwrap_err();
        assert_eq!(
            err,
            GeometryError::NonTriangularFace {
                mesh: "quad".to_string(),
                face: 0,
                arity: 4,
            }
        );
        assert!(err.to_string().contains("quad"));
    }

    #[test]
    fn from_source_named_overrides_name() {
        let source = SourceMesh::new("", square_positions(), vec![smallvec![0, 1, 2, 3]]);
        let err = GeometryBuffer::from_source_named(&source, "mesh-7").unwrap_err();
        assert_eq!(err.mesh_name(), "mesh-7");

        let source = SourceMesh::from_triangles("", square_positions(), &[[0, 1, 2]]);
        let buffer = GeometryBuffer::from_source_named(&source, "mesh-7").unwrap();
        assert_eq!(buffer.name, "mesh-7");
    }

    #[test]
    fn from_source_rejects_point_face() {
        let source = SourceMesh::new(
            "points",
            square_positions(),
            vec![smallvec![0, 1, 2], smallvec![3]],
        );
        let err = GeometryBuffer::from_source(&source).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::NonTriangularFace { face: 1, arity: 1, .. }
        ));
    }

    #[test]
    fn from_source_drops_non_planar_uvs() {
        let channel = UvChannel {
            components: 3,
            coords: vec![[0.0, 0.0, 0.5]; 4],
        };
        let source = SourceMesh::from_triangles("uvw", square_positions(), &[[0, 1, 2]])
            .with_uv_channel(channel);
        let buffer = GeometryBuffer::from_source(&source).unwrap();
        assert!(!buffer.has_uvs());
    }

    #[test]
    fn from_source_keeps_planar_uvs() {
        let channel = UvChannel::planar([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        let source = SourceMesh::from_triangles("uv", square_positions(), &[[0, 1, 2]])
            .with_uv_channel(channel);
        let buffer = GeometryBuffer::from_source(&source).unwrap();
        let uvs = buffer.uvs.unwrap();
        assert_eq!(uvs[2], Point2::new(1.0, 1.0));
    }

    #[test]
    fn from_source_narrows_colors() {
        let source = SourceMesh::from_triangles("rgba", square_positions(), &[[0, 1, 2]])
            .with_colors(vec![[0.5, 0.25, 1.0, 0.0]; 4]);
        let buffer = GeometryBuffer::from_source(&source).unwrap();
        let colors = buffer.colors.unwrap();
        assert_eq!(colors[0], VertexColor::new(0.5, 0.25, 1.0));
    }

    #[test]
    fn validate_stream_length() {
        let buffer = GeometryBuffer::new("short", square_positions(), vec![0, 1, 2])
            .with_normals(vec![Vector3::z(); 3]);
        assert!(matches!(
            buffer.validate(),
            Err(GeometryError::AttributeLength {
                attribute: "normals",
                expected: 4,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn validate_index_range() {
        let buffer = GeometryBuffer::new("oob", square_positions(), vec![0, 1, 7]);
        assert!(matches!(
            buffer.validate(),
            Err(GeometryError::IndexOutOfRange { index: 7, vertex_count: 4, .. })
        ));
    }

    #[test]
    fn validate_partial_triangle() {
        let buffer = GeometryBuffer::new("partial", square_positions(), vec![0, 1]);
        assert!(matches!(
            buffer.validate(),
            Err(GeometryError::PartialTriangle { len: 2, .. })
        ));
    }

    #[test]
    fn replace_indices_returns_previous() {
        let mut buffer = GeometryBuffer::new("m", square_positions(), vec![0, 1, 2, 0, 2, 3]);
        let old = buffer.replace_indices(vec![0, 1, 2]);
        assert_eq!(old.len(), 6);
        assert_eq!(buffer.triangle_count(), 1);
        assert_eq!(buffer.vertex_count(), 4);
    }

    #[test]
    fn triangles_iterates_triples() {
        let buffer = GeometryBuffer::new("m", square_positions(), vec![0, 1, 2, 0, 2, 3]);
        let tris: Vec<_> = buffer.triangles().collect();
        assert_eq!(tris, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn empty_buffer() {
        let buffer = GeometryBuffer::default();
        assert!(buffer.is_empty());
        assert!(buffer.validate().is_ok());
    }
}

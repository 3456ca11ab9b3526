//! Geometric duplicate-triangle removal.
//!
//! Two triangles are duplicates when some pairing of their corners puts
//! every pair within a per-axis tolerance. All six pairings are tried, so a
//! triangle and its reversed-winding twin are duplicates as well; the test
//! is purely geometric, vertex indices only matter through the positions
//! they point at.
//!
//! Candidate lookup goes through a spatial grid keyed on the triangle
//! centroid. Equal triangles have centroids closer than the tolerance on
//! every axis, so probing the 3x3x3 cell neighbourhood finds every match no
//! matter which corner order or rounding noise either triangle carries.
//!
//! # Performance
//!
//! Expected cost is linear when triangles are large relative to the
//! tolerance, which is the case for the default 1e-4 on scene-scale models.
//! When many distinct triangles fall into one 3x3x3 neighbourhood (triangles
//! around the tolerance in size, or a tolerance comparable to the model
//! itself) every one of them is compared with every earlier survivor there,
//! and the pass degrades to quadratic in the triangle count.

use hashbrown::HashMap;
use mesh_types::{GeometryBuffer, Point3};
use tracing::debug;

/// Per-axis distance below which two corners are considered coincident.
pub const DEFAULT_TOLERANCE: f32 = 1e-4;

/// Corner pairings tried by the equality test (all permutations of 3).
const PERMUTATIONS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

type Cell = (i64, i64, i64);

/// Parameters for duplicate-triangle removal.
///
/// # Example
///
/// ```
/// use mesh_repair::DedupParams;
///
/// let params = DedupParams::default();
/// assert!((params.tolerance - 1e-4).abs() < f32::EPSILON);
///
/// let loose = DedupParams::default().with_tolerance(0.01);
/// assert!((loose.tolerance - 0.01).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DedupParams {
    /// Per-axis coincidence tolerance. Default: 1e-4
    pub tolerance: f32,
}

impl Default for DedupParams {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl DedupParams {
    /// Set the per-axis tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Removes geometrically duplicate triangles from an index list.
///
/// The deduplicator borrows the position stream the indices refer to and
/// never modifies it.
///
/// # Example
///
/// ```
/// use mesh_repair::FaceDeduplicator;
/// use mesh_types::Point3;
///
/// let vertices = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
///
/// // Same triangle twice, second one with reversed winding
/// let indices = [0, 1, 2, 0, 2, 1];
///
/// let unique = FaceDeduplicator::new(&vertices).deduplicate(&indices);
/// assert_eq!(unique, vec![0, 1, 2]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FaceDeduplicator<'a> {
    vertices: &'a [Point3<f32>],
    tolerance: f32,
}

impl<'a> FaceDeduplicator<'a> {
    /// Create a deduplicator over a position stream with the default tolerance.
    #[must_use]
    pub const fn new(vertices: &'a [Point3<f32>]) -> Self {
        Self {
            vertices,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Create a deduplicator using the given parameters.
    #[must_use]
    pub const fn with_params(vertices: &'a [Point3<f32>], params: &DedupParams) -> Self {
        Self {
            vertices,
            tolerance: params.tolerance,
        }
    }

    /// Override the per-axis tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// The per-axis tolerance in use.
    #[must_use]
    pub const fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Test whether two triangles cover the same three points.
    ///
    /// Triangles referencing vertices outside the position stream are never
    /// equal to anything.
    #[must_use]
    pub fn same_triangle(&self, a: [u32; 3], b: [u32; 3]) -> bool {
        let (Some(pa), Some(pb)) = (self.corners(a), self.corners(b)) else {
            return false;
        };
        PERMUTATIONS.iter().any(|perm| {
            perm.iter()
                .enumerate()
                .all(|(i, &j)| self.coincident(&pa[i], &pb[j]))
        })
    }

    /// Return the index list with duplicate triangles removed.
    ///
    /// The first occurrence of each triangle survives and survivors keep
    /// their relative input order. Callers should not rely on that order;
    /// only the set of surviving triangles is part of the contract.
    ///
    /// A trailing partial triangle is dropped.
    #[must_use]
    pub fn deduplicate(&self, indices: &[u32]) -> Vec<u32> {
        let triangles = indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]);

        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            // Nothing is strictly closer than a non-positive tolerance.
            return triangles.flatten().collect();
        }

        let cell_size = f64::from(self.tolerance) * 2.0;
        let mut grid: HashMap<Cell, Vec<usize>> = HashMap::new();
        let mut survivors: Vec<[u32; 3]> = Vec::with_capacity(indices.len() / 3);

        for face in triangles {
            let Some(corners) = self.corners(face) else {
                survivors.push(face);
                continue;
            };
            let cell = centroid_cell(&corners, cell_size);

            let duplicate = neighbourhood(cell).any(|probe| {
                grid.get(&probe).is_some_and(|ids| {
                    ids.iter()
                        .any(|&id| self.same_triangle(survivors[id], face))
                })
            });

            if !duplicate {
                grid.entry(cell).or_default().push(survivors.len());
                survivors.push(face);
            }
        }

        survivors.into_iter().flatten().collect()
    }

    fn corners(&self, face: [u32; 3]) -> Option<[Point3<f32>; 3]> {
        Some([
            *self.vertices.get(face[0] as usize)?,
            *self.vertices.get(face[1] as usize)?,
            *self.vertices.get(face[2] as usize)?,
        ])
    }

    fn coincident(&self, p: &Point3<f32>, q: &Point3<f32>) -> bool {
        (p.x - q.x).abs() < self.tolerance
            && (p.y - q.y).abs() < self.tolerance
            && (p.z - q.z).abs() < self.tolerance
    }
}

// Float-to-int casts saturate, so far-out coordinates share the edge cells
#[allow(clippy::cast_possible_truncation)]
fn centroid_cell(corners: &[Point3<f32>; 3], cell_size: f64) -> Cell {
    let axis = |k: usize| {
        let sum = f64::from(corners[0][k]) + f64::from(corners[1][k]) + f64::from(corners[2][k]);
        (sum / 3.0 / cell_size).floor() as i64
    };
    (axis(0), axis(1), axis(2))
}

fn neighbourhood(cell: Cell) -> impl Iterator<Item = Cell> {
    (-1..=1_i64).flat_map(move |dx| {
        (-1..=1_i64).flat_map(move |dy| {
            (-1..=1_i64).map(move |dz| {
                (
                    cell.0.saturating_add(dx),
                    cell.1.saturating_add(dy),
                    cell.2.saturating_add(dz),
                )
            })
        })
    })
}

/// Outcome of a deduplication pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DedupSummary {
    /// Triangles before the pass.
    pub original_triangles: usize,
    /// Triangles after the pass.
    pub remaining_triangles: usize,
}

impl DedupSummary {
    /// Number of triangles removed.
    #[must_use]
    pub const fn removed(&self) -> usize {
        self.original_triangles - self.remaining_triangles
    }

    /// Check if anything was removed.
    #[must_use]
    pub const fn had_changes(&self) -> bool {
        self.removed() > 0
    }
}

impl std::fmt::Display for DedupSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Dedup: {} -> {} triangles ({} duplicate)",
            self.original_triangles,
            self.remaining_triangles,
            self.removed()
        )
    }
}

/// Remove duplicate triangles from a geometry buffer in place.
///
/// Only `indices` is replaced; vertex streams are untouched.
///
/// # Example
///
/// ```
/// use mesh_repair::{remove_duplicate_triangles, DedupParams};
/// use mesh_types::{GeometryBuffer, Point3};
///
/// let mut buffer = GeometryBuffer::new(
///     "doubled",
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![0, 1, 2, 1, 2, 0],
/// );
///
/// let summary = remove_duplicate_triangles(&mut buffer, &DedupParams::default());
/// assert_eq!(summary.removed(), 1);
/// assert_eq!(buffer.triangle_count(), 1);
/// assert_eq!(buffer.vertex_count(), 3);
/// ```
pub fn remove_duplicate_triangles(buffer: &mut GeometryBuffer, params: &DedupParams) -> DedupSummary {
    let original_triangles = buffer.triangle_count();
    let unique = FaceDeduplicator::with_params(&buffer.vertices, params).deduplicate(&buffer.indices);
    buffer.replace_indices(unique);

    let summary = DedupSummary {
        original_triangles,
        remaining_triangles: buffer.triangle_count(),
    };
    debug!(
        mesh = %buffer.name,
        original = summary.original_triangles,
        removed = summary.removed(),
        "Removed duplicate triangles"
    );
    summary
}

//! Identifiers for meshes the importer left unnamed.

use hashbrown::HashSet;
use mesh_types::SourceMesh;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generates `mesh-{n}` identifiers from a per-run random source.
///
/// The same seed yields the same sequence. Generated identifiers never repeat
/// within one namer and never collide with names passed to [`reserve`].
///
/// [`reserve`]: MeshNamer::reserve
#[derive(Debug, Clone)]
pub struct MeshNamer {
    rng: ChaCha8Rng,
    taken: HashSet<String>,
}

impl MeshNamer {
    /// Namer seeded with `seed`, or from OS entropy when `None`.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seed.map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64),
            taken: HashSet::new(),
        }
    }

    /// Mark a name as in use.
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_owned());
    }

    /// Next unused identifier.
    pub fn next_name(&mut self) -> String {
        loop {
            let candidate = format!("mesh-{}", self.rng.r#gen::<u32>());
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Resolve a name for every mesh, in input order.
    ///
    /// Named meshes keep their name; unnamed meshes get a generated one.
    pub fn resolve(&mut self, meshes: &[SourceMesh]) -> Vec<String> {
        for mesh in meshes.iter().filter(|m| m.has_name()) {
            self.reserve(&mesh.name);
        }
        meshes
            .iter()
            .map(|mesh| {
                if mesh.has_name() {
                    mesh.name.clone()
                } else {
                    self.next_name()
                }
            })
            .collect()
    }
}

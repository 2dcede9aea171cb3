//! Reproducible test fixtures.
//!
//! Grounded on the teacher's `rand4::PolytopeGenerator4` pattern: a seeded
//! RNG plus a small params struct so a fixture can be regenerated
//! identically across test runs without hard-coding literal coordinates
//! everywhere.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::automaton::{Automaton, Invariant};
use crate::geometry::HalfSpace;
use crate::linalg::{DenseMat, DenseVec};
use crate::sets::{BoxSet, HPolytope};

/// Parameters for a random axis-aligned box fixture.
#[derive(Clone, Copy, Debug)]
pub struct BoxParams {
    pub dim: usize,
    pub min_extent: f64,
    pub max_extent: f64,
    pub bound: f64,
}

/// Seeded source of reproducible `f64` fixtures. Two generators built from
/// the same seed produce the same stream of samples.
pub struct FixtureGenerator {
    rng: StdRng,
}

impl FixtureGenerator {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// A random axis-aligned box within `[-bound, bound]^dim`, with each
    /// side length drawn from `[min_extent, max_extent]`.
    pub fn random_box(&mut self, params: BoxParams) -> BoxSet<f64> {
        let mut lo = DenseVec::from_element(params.dim, 0.0);
        let mut hi = DenseVec::from_element(params.dim, 0.0);
        for i in 0..params.dim {
            let extent = self.rng.gen_range(params.min_extent..=params.max_extent);
            let center = self.rng.gen_range(-params.bound..=params.bound);
            lo[i] = center - extent / 2.0;
            hi[i] = center + extent / 2.0;
        }
        BoxSet::new(lo, hi)
    }

    /// A random point inside `[-bound, bound]^dim`, used to build small
    /// V-polytope fixtures.
    pub fn random_point(&mut self, dim: usize, bound: f64) -> Vec<f64> {
        (0..dim).map(|_| self.rng.gen_range(-bound..=bound)).collect()
    }
}

/// A minimal single-location automaton with identity dynamics and no
/// invariant, useful wherever a test needs "some automaton" rather than a
/// specific one.
pub fn trivial_automaton(dim: usize) -> Automaton<f64> {
    let mut a = Automaton::<f64>::new(dim);
    let flow = DenseMat::<f64>::identity(dim + 1, dim + 1);
    a.add_location(flow, Invariant::Universe).expect("trivial automaton location is well-formed");
    a
}

/// An axis-aligned box expressed as an `HPolytope`, for fixtures that need
/// an invariant or guard rather than a `BoxSet`.
pub fn box_half_spaces(lo: &[f64], hi: &[f64]) -> HPolytope<f64> {
    let dim = lo.len();
    let mut half_spaces = Vec::with_capacity(2 * dim);
    for i in 0..dim {
        let mut pos = DenseVec::from_element(dim, 0.0);
        pos[i] = 1.0;
        half_spaces.push(HalfSpace::new(pos, hi[i]));
        let mut neg = DenseVec::from_element(dim, 0.0);
        neg[i] = -1.0;
        half_spaces.push(HalfSpace::new(neg, -lo[i]));
    }
    HPolytope::new(dim, half_spaces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_reproduces_same_box() {
        let params = BoxParams { dim: 3, min_extent: 0.5, max_extent: 2.0, bound: 5.0 };
        let mut a = FixtureGenerator::from_seed(42);
        let mut b = FixtureGenerator::from_seed(42);
        let box_a = a.random_box(params);
        let box_b = b.random_box(params);
        assert_eq!(box_a.lo(), box_b.lo());
        assert_eq!(box_a.hi(), box_b.hi());
    }

    #[test]
    fn trivial_automaton_has_one_location_no_transitions() {
        let a = trivial_automaton(2);
        assert_eq!(a.locations().len(), 1);
        assert!(a.transitions().is_empty());
    }

    #[test]
    fn box_half_spaces_produces_two_per_axis() {
        let h = box_half_spaces(&[0.0, 0.0], &[1.0, 1.0]);
        assert_eq!(h.half_spaces().len(), 4);
    }
}

//! Orthogonal polyhedron: a coloured grid over rational coordinates
//! (`spec.md` §3, §4.5).

use crate::geometry::Point;
use crate::linalg::DenseVec;
use crate::scalar::Scalar;
use std::collections::HashSet;

/// A finite colour map from grid cells (quantised by `cell_size`) to
/// inside/outside, plus the implicit boundary box of the inside set.
///
/// Grid coordinates are integer indices (`cell index * cell_size` gives the
/// coordinate in the underlying space), which is how "rational coordinates"
/// from `spec.md` §3 are represented concretely here: every grid point is
/// `cell_size` times an integer vector, and `cell_size: S` can itself be a
/// [`crate::scalar::Rational`].
#[derive(Clone, Debug)]
pub struct OrthogonalPolyhedron<S: Scalar> {
    dim: usize,
    cell_size: S,
    inside: HashSet<Vec<i64>>,
}

impl<S: Scalar> OrthogonalPolyhedron<S> {
    pub fn empty(dim: usize, cell_size: S) -> Self {
        Self { dim, cell_size, inside: HashSet::new() }
    }

    pub fn from_cells(dim: usize, cell_size: S, cells: impl IntoIterator<Item = Vec<i64>>) -> Self {
        let inside: HashSet<Vec<i64>> = cells.into_iter().filter(|c| c.len() == dim).collect();
        Self { dim, cell_size, inside }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn cell_size(&self) -> S {
        self.cell_size.clone()
    }

    pub fn mark_inside(&mut self, cell: Vec<i64>) {
        debug_assert_eq!(cell.len(), self.dim);
        self.inside.insert(cell);
    }

    pub fn is_inside(&self, cell: &[i64]) -> bool {
        self.inside.contains(cell)
    }

    pub fn is_empty(&self) -> bool {
        self.inside.is_empty()
    }

    /// `p` is a vertex iff it differs in colour from at least one axis
    /// neighbour (`spec.md` §3's vertex predicate, read as the standard
    /// boundary-cell detection it describes).
    pub fn is_vertex(&self, p: &[i64]) -> bool {
        let c = self.is_inside(p);
        (0..self.dim).any(|i| {
            let mut minus = p.to_vec();
            minus[i] -= 1;
            let mut plus = p.to_vec();
            plus[i] += 1;
            self.is_inside(&minus) != c || self.is_inside(&plus) != c
        })
    }

    pub fn vertices(&self) -> Vec<Point<S>> {
        let mut candidates: HashSet<Vec<i64>> = HashSet::new();
        for cell in &self.inside {
            candidates.insert(cell.clone());
            for i in 0..self.dim {
                let mut minus = cell.clone();
                minus[i] -= 1;
                let mut plus = cell.clone();
                plus[i] += 1;
                candidates.insert(minus);
                candidates.insert(plus);
            }
        }
        candidates
            .into_iter()
            .filter(|c| self.is_vertex(c))
            .map(|c| self.to_point(&c))
            .collect()
    }

    fn to_point(&self, cell: &[i64]) -> Point<S> {
        Point::new(DenseVec::from_iterator(
            self.dim,
            cell.iter().map(|&x| S::from_f64(x as f64) * self.cell_size.clone()),
        ))
    }

    /// Inside iff both operands mark the cell inside.
    pub fn intersect(&self, other: &OrthogonalPolyhedron<S>) -> OrthogonalPolyhedron<S> {
        assert_eq!(self.dim, other.dim);
        let inside = self.inside.intersection(&other.inside).cloned().collect();
        OrthogonalPolyhedron { dim: self.dim, cell_size: self.cell_size.clone(), inside }
    }

    /// Inside iff either operand marks the cell inside.
    pub fn union(&self, other: &OrthogonalPolyhedron<S>) -> OrthogonalPolyhedron<S> {
        assert_eq!(self.dim, other.dim);
        let inside = self.inside.union(&other.inside).cloned().collect();
        OrthogonalPolyhedron { dim: self.dim, cell_size: self.cell_size.clone(), inside }
    }

    /// Smallest axis-aligned bounding box over all inside cells, in the
    /// underlying coordinate space (each cell occupies `[idx, idx+1) *
    /// cell_size` per axis).
    pub fn bounding_box(&self) -> Option<(DenseVec<S>, DenseVec<S>)> {
        if self.inside.is_empty() {
            return None;
        }
        let mut lo = vec![i64::MAX; self.dim];
        let mut hi = vec![i64::MIN; self.dim];
        for cell in &self.inside {
            for i in 0..self.dim {
                lo[i] = lo[i].min(cell[i]);
                hi[i] = hi[i].max(cell[i]);
            }
        }
        let lo_v =
            DenseVec::from_iterator(self.dim, lo.iter().map(|&x| S::from_f64(x as f64) * self.cell_size.clone()));
        let hi_v = DenseVec::from_iterator(
            self.dim,
            hi.iter().map(|&x| S::from_f64((x + 1) as f64) * self.cell_size.clone()),
        );
        Some((lo_v, hi_v))
    }

    /// Minkowski sum is left unimplemented: `spec.md` §9's Open Questions
    /// note the source itself never implements it and this specification
    /// leaves it as a future extension rather than a core operation.
    pub fn minkowski_sum_unsupported() -> &'static str {
        "orthogonal polyhedron Minkowski sum is out of scope, see spec.md §9"
    }
}

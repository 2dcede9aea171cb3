//! H-polytope: intersection of half-spaces (`spec.md` §4.2).

use crate::geometry::{HalfSpace, Point};
use crate::linalg::{solve_square_generic, DenseMat, DenseVec};
use crate::optimizer::{LinearProgram, OptimizerStatus};
use crate::scalar::Scalar;
use crate::vertex_enum;

/// A finite conjunction of half-spaces. The intersection is convex by
/// construction; emptiness is never decided eagerly (querying the optimiser
/// is deferred to [`HPolytope::is_empty`]).
#[derive(Clone, Debug)]
pub struct HPolytope<S: Scalar> {
    dim: usize,
    half_spaces: Vec<HalfSpace<S>>,
}

impl<S: Scalar> HPolytope<S> {
    pub fn new(dim: usize, half_spaces: Vec<HalfSpace<S>>) -> Self {
        debug_assert!(half_spaces.iter().all(|h| h.dim() == dim));
        Self { dim, half_spaces }
    }

    /// The unconstrained polytope (all of R^dim); `is_empty` is always false.
    pub fn universe(dim: usize) -> Self {
        Self { dim, half_spaces: Vec::new() }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn half_spaces(&self) -> &[HalfSpace<S>] {
        &self.half_spaces
    }

    fn to_lp(&self) -> LinearProgram<S> {
        LinearProgram::from_half_spaces(self.dim, &self.half_spaces)
    }

    pub fn is_empty(&self) -> bool {
        !self.to_lp().is_feasible()
    }

    pub fn contains_point(&self, p: &Point<S>) -> bool {
        self.to_lp().contains(p)
    }

    /// `Q ⊆ P` iff, for every half-space `(n, c)` of `P`, `support(Q, n) <= c`.
    pub fn contains_support(&self, other_support: impl Fn(&DenseVec<S>) -> Option<S>) -> bool {
        self.half_spaces.iter().all(|h| match other_support(&h.normal) {
            Some(v) => v <= h.offset,
            None => false, // unbounded support in this direction can't be contained
        })
    }

    /// `evaluate(direction) -> Some(support value)`, `None` when unbounded
    /// or when `self` is empty.
    pub fn support_eval(&self, direction: &DenseVec<S>) -> Option<S> {
        let r = self.to_lp().evaluate(direction);
        match r.status {
            OptimizerStatus::Feasible => r.value,
            OptimizerStatus::Unbounded | OptimizerStatus::Infeasible => None,
        }
    }

    /// `{Ax+b | x in P}`. Substitution when `A` is square and invertible
    /// (`n . A^-1(y-b) <= c` becomes `(A^-T n) . y <= c + n . A^-1 b`),
    /// vertex round-trip otherwise.
    pub fn affine_image(&self, a: &DenseMat<S>, b: &DenseVec<S>) -> HPolytope<S> {
        assert_eq!(a.ncols(), self.dim);
        let out_dim = a.nrows();
        if out_dim == self.dim {
            if let Some(u) = solve_square_generic(a, b) {
                let a_t = a.transpose();
                let mut mapped = Vec::with_capacity(self.half_spaces.len());
                let mut invertible = true;
                for h in &self.half_spaces {
                    match solve_square_generic(&a_t, &h.normal) {
                        Some(y) => {
                            let offset = h.offset.clone() + dot(&h.normal, &u);
                            mapped.push(HalfSpace::new_unchecked(y, offset));
                        }
                        None => {
                            invertible = false;
                            break;
                        }
                    }
                }
                if invertible {
                    return HPolytope::new(out_dim, mapped);
                }
            }
        }
        let enumeration = vertex_enum::enumerate(self.dim, &self.half_spaces);
        let mapped_points: Vec<Point<S>> = enumeration
            .vertices
            .iter()
            .map(|p| {
                let mut y = b.clone();
                for row in 0..out_dim {
                    let mut acc = y[row].clone();
                    for col in 0..self.dim {
                        acc = acc + a[(row, col)].clone() * p.coords[col].clone();
                    }
                    y[row] = acc;
                }
                Point::new(y)
            })
            .collect();
        HPolytope::new(out_dim, vertex_enum::facets_from_points(out_dim, &mapped_points))
    }

    /// Evaluating both operands' support in the union of their own facet
    /// normals and summing offsets (`spec.md` §4.2).
    pub fn minkowski_sum(&self, other: &HPolytope<S>) -> HPolytope<S> {
        assert_eq!(self.dim, other.dim);
        let mut normals: Vec<DenseVec<S>> = Vec::new();
        for h in self.half_spaces.iter().chain(other.half_spaces.iter()) {
            if !normals.iter().any(|n| vectors_parallel(n, &h.normal)) {
                normals.push(h.normal.clone());
            }
        }
        let mut out = Vec::new();
        for n in normals {
            if let (Some(a), Some(b)) = (self.support_eval(&n), other.support_eval(&n)) {
                out.push(HalfSpace::new_unchecked(n, a + b));
            }
        }
        HPolytope::new(self.dim, out)
    }

    pub fn intersect_half_spaces(&self, extra: &[HalfSpace<S>]) -> HPolytope<S> {
        let mut hs = self.half_spaces.clone();
        hs.extend(extra.iter().cloned());
        HPolytope::new(self.dim, hs)
    }

    pub fn vertices(&self) -> Vec<Point<S>> {
        vertex_enum::enumerate(self.dim, &self.half_spaces).vertices
    }

    /// Drops rows whose removal does not shrink the feasible set.
    pub fn reduce_redundant(&self) -> HPolytope<S> {
        let redundant = self.to_lp().redundant_rows();
        let kept = self
            .half_spaces
            .iter()
            .enumerate()
            .filter(|(i, _)| !redundant.contains(i))
            .map(|(_, h)| h.clone())
            .collect();
        HPolytope::new(self.dim, kept)
    }

    /// User-level simplification (`spec.md` §4.2/§9). Every strategy below
    /// replaces one or more facets by a new half-space whose offset is the
    /// *exact support of `self`* in the new normal — which makes the result
    /// contain `self` by construction, regardless of which facets a
    /// strategy chooses to merge. This is a deliberate tightening of the
    /// literal "sum the two offsets" wording for `unite`/`unite_norm`: the
    /// offset sum is not guaranteed to dominate the true support on
    /// non-axis-aligned facets, and `reduce_directed`'s contract ("output
    /// equals P or strictly contains P") is non-negotiable, so the contract
    /// wins over the literal arithmetic. See DESIGN.md.
    pub fn reduce_directed(&self, directions: &[DenseVec<S>], strategy: ReduceStrategy) -> HPolytope<S> {
        if directions.is_empty() || self.half_spaces.is_empty() {
            return self.clone();
        }
        let candidate = match strategy {
            ReduceStrategy::Drop => self.reduce_drop(directions, false),
            ReduceStrategy::DropSmooth => self.reduce_drop(directions, true),
            ReduceStrategy::Unite => self.reduce_unite(directions, UniteKind::Plain),
            ReduceStrategy::UniteSmooth => self.reduce_unite(directions, UniteKind::Smooth),
            ReduceStrategy::UniteCut => self.reduce_unite(directions, UniteKind::Cut),
            ReduceStrategy::UniteNorm => self.reduce_unite(directions, UniteKind::Plain),
            ReduceStrategy::Template => return self.reduce_template(directions),
        };
        self.accept_if_valid(candidate, directions)
    }

    fn accept_if_valid(&self, candidate: HPolytope<S>, directions: &[DenseVec<S>]) -> HPolytope<S> {
        for d in directions {
            if candidate.support_eval(d).is_none() {
                return self.clone();
            }
        }
        if candidate.is_empty() && !self.is_empty() {
            return self.clone();
        }
        candidate
    }

    fn reduce_drop(&self, directions: &[DenseVec<S>], smooth: bool) -> HPolytope<S> {
        let mut hs = self.half_spaces.clone();
        let mut removed_normals = Vec::new();
        for d in directions {
            if let Some(idx) = nearest_facet(&hs, d) {
                removed_normals.push(hs[idx].normal.clone());
                hs.remove(idx);
            }
        }
        if smooth {
            for rn in &removed_normals {
                if let Some(idx2) = nearest_facet(&hs, rn) {
                    let two = S::one() + S::one();
                    let blended = DenseVec::from_iterator(
                        rn.len(),
                        (0..rn.len()).map(|i| (hs[idx2].normal[i].clone() + rn[i].clone()) / two.clone()),
                    );
                    if let Some(offset) = self.support_eval(&blended) {
                        hs.push(HalfSpace::new_unchecked(blended, offset));
                    }
                }
            }
        }
        HPolytope::new(self.dim, hs)
    }

    fn reduce_unite(&self, directions: &[DenseVec<S>], kind: UniteKind) -> HPolytope<S> {
        let mut hs = self.half_spaces.clone();
        for d in directions {
            let Some(i1) = nearest_facet(&hs, d) else { continue };
            let n1 = hs[i1].normal.clone();
            let Some(i2) = nearest_facet_excluding(&hs, &n1, i1) else { continue };
            let n2 = hs[i2].normal.clone();
            let combined = match kind {
                UniteKind::Plain => {
                    DenseVec::from_iterator(n1.len(), (0..n1.len()).map(|i| n1[i].clone() + n2[i].clone()))
                }
                UniteKind::Smooth | UniteKind::Cut => {
                    let n1n = normalize(&n1);
                    let n2n = normalize(&n2);
                    DenseVec::from_iterator(n1n.len(), (0..n1n.len()).map(|i| n1n[i].clone() + n2n[i].clone()))
                }
            };
            if combined.iter().all(|c| c.is_zero()) {
                continue;
            }
            if let Some(offset) = self.support_eval(&combined) {
                let (lo, hi) = if i1 < i2 { (i1, i2) } else { (i2, i1) };
                hs.remove(hi);
                hs.remove(lo);
                hs.push(HalfSpace::new_unchecked(combined, offset));
            }
        }
        HPolytope::new(self.dim, hs)
    }

    fn reduce_template(&self, directions: &[DenseVec<S>]) -> HPolytope<S> {
        let mut hs = Vec::with_capacity(directions.len());
        for d in directions {
            match self.support_eval(d) {
                Some(offset) => hs.push(HalfSpace::new_unchecked(d.clone(), offset)),
                None => return self.clone(),
            }
        }
        let candidate = HPolytope::new(self.dim, hs);
        if candidate.is_empty() && !self.is_empty() {
            return self.clone();
        }
        candidate
    }
}

/// Simplification strategy table (`spec.md` §9).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReduceStrategy {
    Drop,
    DropSmooth,
    Unite,
    UniteSmooth,
    UniteCut,
    UniteNorm,
    Template,
}

#[derive(Clone, Copy)]
enum UniteKind {
    Plain,
    Smooth,
    Cut,
}

fn dot<S: Scalar>(a: &DenseVec<S>, b: &DenseVec<S>) -> S {
    let mut acc = S::zero();
    for i in 0..a.len() {
        acc = acc + a[i].clone() * b[i].clone();
    }
    acc
}

fn norm<S: Scalar>(v: &DenseVec<S>) -> S {
    dot(v, v).sqrt_over_approx()
}

fn normalize<S: Scalar>(v: &DenseVec<S>) -> DenseVec<S> {
    let n = norm(v);
    if n.is_zero() {
        v.clone()
    } else {
        DenseVec::from_iterator(v.len(), (0..v.len()).map(|i| v[i].clone() / n.clone()))
    }
}

fn alignment<S: Scalar>(n: &DenseVec<S>, d: &DenseVec<S>) -> S {
    let nn = norm(n);
    let nd = norm(d);
    if nn.is_zero() || nd.is_zero() {
        return S::zero();
    }
    dot(n, d) / (nn * nd)
}

fn vectors_parallel<S: Scalar>(a: &DenseVec<S>, b: &DenseVec<S>) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let eps = S::from_f64(1e-9);
    (alignment(a, b).abs() - S::one()).abs() < eps
}

fn nearest_facet<S: Scalar>(hs: &[HalfSpace<S>], d: &DenseVec<S>) -> Option<usize> {
    let mut best: Option<(usize, S)> = None;
    for (i, h) in hs.iter().enumerate() {
        let score = alignment(&h.normal, d);
        best = match best {
            None => Some((i, score)),
            Some((_, bs)) if score > bs => Some((i, score)),
            other => other,
        };
    }
    best.map(|(i, _)| i)
}

fn nearest_facet_excluding<S: Scalar>(hs: &[HalfSpace<S>], d: &DenseVec<S>, exclude: usize) -> Option<usize> {
    let mut best: Option<(usize, S)> = None;
    for (i, h) in hs.iter().enumerate() {
        if i == exclude {
            continue;
        }
        let score = alignment(&h.normal, d);
        best = match best {
            None => Some((i, score)),
            Some((_, bs)) if score > bs => Some((i, score)),
            other => other,
        };
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hs(normal: &[f64], offset: f64) -> HalfSpace<f64> {
        HalfSpace::new(DenseVec::from_vec(normal.to_vec()), offset)
    }

    fn unit_square() -> HPolytope<f64> {
        HPolytope::new(
            2,
            vec![hs(&[1.0, 0.0], 1.0), hs(&[-1.0, 0.0], 0.0), hs(&[0.0, 1.0], 1.0), hs(&[0.0, -1.0], 0.0)],
        )
    }

    #[test]
    fn empty_intersection_is_detected() {
        let p = HPolytope::new(1, vec![hs(&[1.0], 0.0), hs(&[-1.0], -1.0)]);
        assert!(p.is_empty());
    }

    #[test]
    fn contains_point_checks_all_half_spaces() {
        let p = unit_square();
        assert!(p.contains_point(&Point::new(DenseVec::from_vec(vec![0.5, 0.5]))));
        assert!(!p.contains_point(&Point::new(DenseVec::from_vec(vec![2.0, 0.5]))));
    }

    #[test]
    fn redundant_row_removed() {
        let mut p = unit_square();
        p = p.intersect_half_spaces(&[hs(&[1.0, 0.0], 2.0)]);
        let reduced = p.reduce_redundant();
        assert_eq!(reduced.half_spaces().len(), 4);
    }

    #[test]
    fn minkowski_sum_of_unit_squares_doubles_support() {
        let p = unit_square();
        let q = unit_square();
        let sum = p.minkowski_sum(&q);
        let support = sum.support_eval(&DenseVec::from_vec(vec![1.0, 0.0])).unwrap();
        assert!((support - 2.0).abs() < 1e-6);
    }

    #[test]
    fn reduce_drop_never_shrinks_feasible_set() {
        let p = unit_square();
        let reduced = p.reduce_directed(&[DenseVec::from_vec(vec![1.0, 0.0])], ReduceStrategy::Drop);
        assert!(reduced.contains_point(&Point::new(DenseVec::from_vec(vec![0.5, 0.5]))));
        // a point outside the original but only outside via the dropped facet
        // direction must remain reachable since that constraint is gone.
        assert!(reduced.contains_point(&Point::new(DenseVec::from_vec(vec![5.0, 0.5]))));
    }

    #[test]
    fn template_strategy_rebuilds_from_directions() {
        let p = unit_square();
        let directions = vec![
            DenseVec::from_vec(vec![1.0, 0.0]),
            DenseVec::from_vec(vec![-1.0, 0.0]),
            DenseVec::from_vec(vec![0.0, 1.0]),
            DenseVec::from_vec(vec![0.0, -1.0]),
        ];
        let reduced = p.reduce_directed(&directions, ReduceStrategy::Template);
        assert!(reduced.contains_point(&Point::new(DenseVec::from_vec(vec![0.5, 0.5]))));
        assert!(!reduced.contains_point(&Point::new(DenseVec::from_vec(vec![2.0, 0.5]))));
    }

    #[test]
    fn affine_image_by_invertible_substitution() {
        let p = unit_square();
        let a = DenseMat::<f64>::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 2.0]);
        let b = DenseVec::from_vec(vec![0.0, 0.0]);
        let image = p.affine_image(&a, &b);
        assert!(image.contains_point(&Point::new(DenseVec::from_vec(vec![2.0, 2.0]))));
        assert!(!image.contains_point(&Point::new(DenseVec::from_vec(vec![2.5, 0.0]))));
    }
}

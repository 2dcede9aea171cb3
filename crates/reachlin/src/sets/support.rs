//! Support function: a lazy tree of set operations evaluated by directional
//! maximisation (`spec.md` §4.6).

use super::hpoly::HPolytope;
use super::{ConvexSet, ConvexSetVariant};
use crate::geometry::HalfSpace;
use crate::linalg::{DenseMat, DenseVec};
use crate::optimizer::OptimizerStatus;
use crate::scalar::Scalar;
use std::sync::Arc;

/// Result of evaluating a support function in one direction. Mirrors
/// [`crate::optimizer::OptimizeResult`]'s shape since a support-function
/// evaluation is ultimately backed by the same optimiser whenever the tree
/// bottoms out at an explicit constraint system.
#[derive(Clone, Debug)]
pub struct SupportEval<S: Scalar> {
    pub status: OptimizerStatus,
    pub value: Option<S>,
}

impl<S: Scalar> SupportEval<S> {
    fn feasible(value: S) -> Self {
        Self { status: OptimizerStatus::Feasible, value: Some(value) }
    }
    fn unbounded() -> Self {
        Self { status: OptimizerStatus::Unbounded, value: None }
    }
    fn infeasible() -> Self {
        Self { status: OptimizerStatus::Infeasible, value: None }
    }
}

/// The tree node kinds named in `spec.md` §3/§4.6. Children are shared by
/// reference counting (`Arc`), never mutated in place.
#[derive(Clone, Debug)]
pub enum SupportNode<S: Scalar> {
    Leaf(Arc<ConvexSetVariant<S>>),
    Affine { child: Arc<SupportNode<S>>, a: DenseMat<S>, b: DenseVec<S> },
    MinkowskiSum(Vec<Arc<SupportNode<S>>>),
    IntersectHalfSpaces { child: Arc<SupportNode<S>>, half_spaces: Vec<HalfSpace<S>> },
    Union(Vec<Arc<SupportNode<S>>>),
}

/// A support function: an [`Arc`]-shared [`SupportNode`] tree plus the
/// ambient dimension (needed to build template directions and to size
/// affine maps without descending the tree).
#[derive(Clone, Debug)]
pub struct SupportFunction<S: Scalar> {
    root: Arc<SupportNode<S>>,
    dim: usize,
}

impl<S: Scalar> SupportFunction<S> {
    pub fn leaf(set: ConvexSetVariant<S>, dim: usize) -> Self {
        Self { root: Arc::new(SupportNode::Leaf(Arc::new(set))), dim }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn affine(&self, a: &DenseMat<S>, b: &DenseVec<S>) -> SupportFunction<S> {
        Self {
            root: Arc::new(SupportNode::Affine { child: self.root.clone(), a: a.clone(), b: b.clone() }),
            dim: a.nrows(),
        }
    }

    pub fn minkowski_sum(&self, other: &SupportFunction<S>) -> SupportFunction<S> {
        assert_eq!(self.dim, other.dim);
        let children = vec![self.root.clone(), other.root.clone()];
        Self { root: Arc::new(SupportNode::MinkowskiSum(children)), dim: self.dim }
    }

    pub fn intersect_half_spaces(&self, half_spaces: &[HalfSpace<S>]) -> SupportFunction<S> {
        Self {
            root: Arc::new(SupportNode::IntersectHalfSpaces {
                child: self.root.clone(),
                half_spaces: half_spaces.to_vec(),
            }),
            dim: self.dim,
        }
    }

    pub fn union(&self, other: &SupportFunction<S>) -> SupportFunction<S> {
        assert_eq!(self.dim, other.dim);
        Self { root: Arc::new(SupportNode::Union(vec![self.root.clone(), other.root.clone()])), dim: self.dim }
    }

    pub fn evaluate(&self, direction: &DenseVec<S>) -> SupportEval<S> {
        evaluate_node(&self.root, direction)
    }

    /// `multi_evaluate(D)`: one evaluation per row of `D`. No structural
    /// caching beyond what `Arc` sharing already gives the tree; a given
    /// direction always returns the same value, satisfying `spec.md` §4.6's
    /// determinism requirement trivially (each call is independent).
    pub fn multi_evaluate(&self, directions: &[DenseVec<S>]) -> Vec<SupportEval<S>> {
        directions.iter().map(|d| self.evaluate(d)).collect()
    }

    /// Best-effort reduction to an explicit half-space system, used both by
    /// `IntersectHalfSpaces` evaluation and by conversion back to a concrete
    /// representation. Exact when every leaf/`Affine`/`MinkowskiSum`/
    /// `IntersectHalfSpaces` node bottoms out at a representation that
    /// exposes (or over-approximates) an explicit half-space system; `None`
    /// once a [`SupportNode::Union`] is reached, since a union's exact
    /// feasible region is not in general an intersection of half-spaces.
    pub fn as_hpolytope(&self) -> Option<HPolytope<S>> {
        as_hpolytope_node(&self.root, self.dim)
    }

    /// Conversion back to a concrete set by evaluating on a template of
    /// directions and assembling an H-polytope (`spec.md` §4.6).
    pub fn to_hpolytope_via_template(&self, directions: &[DenseVec<S>]) -> HPolytope<S> {
        let mut half_spaces = Vec::with_capacity(directions.len());
        for d in directions {
            let r = self.evaluate(d);
            if let (OptimizerStatus::Feasible, Some(v)) = (r.status, r.value) {
                half_spaces.push(HalfSpace::new_unchecked(d.clone(), v));
            }
        }
        HPolytope::new(self.dim, half_spaces)
    }
}

fn evaluate_node<S: Scalar>(node: &SupportNode<S>, d: &DenseVec<S>) -> SupportEval<S> {
    match node {
        SupportNode::Leaf(set) => match set.support(d) {
            Some(v) => SupportEval::feasible(v),
            None => {
                if set.is_empty() {
                    SupportEval::infeasible()
                } else {
                    SupportEval::unbounded()
                }
            }
        },
        SupportNode::Affine { child, a, b } => {
            let in_dim = a.ncols();
            let at_d = DenseVec::from_iterator(in_dim, (0..in_dim).map(|col| {
                let mut acc = S::zero();
                for row in 0..a.nrows() {
                    acc = acc + a[(row, col)].clone() * d[row].clone();
                }
                acc
            }));
            let child_eval = evaluate_node(child, &at_d);
            match child_eval.value {
                Some(v) => {
                    let mut bd = S::zero();
                    for i in 0..d.len() {
                        bd = bd + b[i].clone() * d[i].clone();
                    }
                    SupportEval::feasible(v + bd)
                }
                None => child_eval,
            }
        }
        SupportNode::MinkowskiSum(children) => {
            let mut acc = S::zero();
            for c in children {
                let e = evaluate_node(c, d);
                match (e.status, e.value) {
                    (OptimizerStatus::Feasible, Some(v)) => acc = acc + v,
                    (OptimizerStatus::Infeasible, _) => return SupportEval::infeasible(),
                    _ => return SupportEval::unbounded(),
                }
            }
            SupportEval::feasible(acc)
        }
        SupportNode::IntersectHalfSpaces { child, half_spaces } => {
            let dim = d.len();
            match as_hpolytope_node(child, dim) {
                Some(base) => {
                    let combined = base.intersect_half_spaces(half_spaces);
                    match combined.support_eval(d) {
                        Some(v) => SupportEval::feasible(v),
                        None if combined.is_empty() => SupportEval::infeasible(),
                        None => SupportEval::unbounded(),
                    }
                }
                // Child not representable by explicit half-spaces (a nested
                // Union): fall back to the child's own bound intersected
                // with the new half-spaces' implied cap in this direction.
                None => {
                    let child_eval = evaluate_node(child, d);
                    let capped = half_spaces.iter().fold(child_eval.value.clone(), |acc, h| {
                        acc.map(|v| if v < h.offset { v } else { h.offset.clone() })
                    });
                    match capped {
                        Some(v) => SupportEval::feasible(v),
                        None => child_eval,
                    }
                }
            }
        }
        SupportNode::Union(children) => {
            let mut best: Option<S> = None;
            let mut any_unbounded = false;
            let mut any_feasible = false;
            for c in children {
                let e = evaluate_node(c, d);
                match e.status {
                    OptimizerStatus::Unbounded => any_unbounded = true,
                    OptimizerStatus::Feasible => {
                        any_feasible = true;
                        if let Some(v) = e.value {
                            best = Some(match best {
                                None => v,
                                Some(b) if v > b => v,
                                Some(b) => b,
                            });
                        }
                    }
                    OptimizerStatus::Infeasible => {}
                }
            }
            if any_unbounded {
                SupportEval::unbounded()
            } else if any_feasible {
                SupportEval::feasible(best.unwrap_or_else(S::zero))
            } else {
                SupportEval::infeasible()
            }
        }
    }
}

fn as_hpolytope_node<S: Scalar>(node: &SupportNode<S>, dim: usize) -> Option<HPolytope<S>> {
    match node {
        SupportNode::Leaf(set) => set.to_hpolytope_approx(dim),
        SupportNode::Affine { child, a, b } => as_hpolytope_node(child, a.ncols()).map(|h| h.affine_image(a, b)),
        SupportNode::MinkowskiSum(children) => {
            let mut iter = children.iter();
            let first = as_hpolytope_node(iter.next()?, dim)?;
            iter.try_fold(first, |acc, c| as_hpolytope_node(c, dim).map(|h| acc.minkowski_sum(&h)))
        }
        SupportNode::IntersectHalfSpaces { child, half_spaces } => {
            as_hpolytope_node(child, dim).map(|h| h.intersect_half_spaces(half_spaces))
        }
        SupportNode::Union(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sets::BoxSet;

    fn box_variant(lo: &[f64], hi: &[f64]) -> ConvexSetVariant<f64> {
        ConvexSetVariant::Box(BoxSet::new(DenseVec::from_vec(lo.to_vec()), DenseVec::from_vec(hi.to_vec())))
    }

    #[test]
    fn leaf_matches_underlying_support() {
        let sf = SupportFunction::leaf(box_variant(&[0.0, 0.0], &[1.0, 1.0]), 2);
        let r = sf.evaluate(&DenseVec::from_vec(vec![1.0, 0.0]));
        assert_eq!(r.status, OptimizerStatus::Feasible);
        assert!((r.value.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn minkowski_sum_of_leaves_adds_supports() {
        let a = SupportFunction::leaf(box_variant(&[0.0, 0.0], &[1.0, 1.0]), 2);
        let b = SupportFunction::leaf(box_variant(&[0.0, 0.0], &[1.0, 1.0]), 2);
        let sum = a.minkowski_sum(&b);
        let r = sum.evaluate(&DenseVec::from_vec(vec![1.0, 0.0]));
        assert!((r.value.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn union_takes_max_support() {
        let a = SupportFunction::leaf(box_variant(&[0.0, 0.0], &[1.0, 1.0]), 2);
        let b = SupportFunction::leaf(box_variant(&[0.0, 0.0], &[3.0, 3.0]), 2);
        let u = a.union(&b);
        let r = u.evaluate(&DenseVec::from_vec(vec![1.0, 0.0]));
        assert!((r.value.unwrap() - 3.0).abs() < 1e-9);
    }
}

//! Shared point and half-space primitives (`spec.md` §3).
//!
//! Purpose
//! - `Point` is an n-vector with exact equality and a lexicographic order
//!   (used for deterministic tie-breaking in vertex enumeration and convex
//!   hull construction).
//! - `HalfSpace` is a single affine inequality `n·x <= c`.
//!
//! Why this design
//! - Generalises the teacher's fixed-dimension `Hs2`/`Hs4` (plain
//!   `(normal, offset)` structs over `nalgebra::Vector2`/`Vector4`) to
//!   dynamic `n` over `nalgebra::DVector`, keeping the same field names and
//!   the same `satisfies` predicate shape.

use crate::linalg::DenseVec;
use crate::scalar::Scalar;
use std::cmp::Ordering;

/// A point in n-space. Equality and ordering are exact (bitwise/rational
/// equality of coordinates), never epsilon-fuzzed — callers needing
/// tolerance apply it explicitly at the call site.
#[derive(Clone, Debug)]
pub struct Point<S: Scalar> {
    pub coords: DenseVec<S>,
}

impl<S: Scalar> Point<S> {
    pub fn new(coords: DenseVec<S>) -> Self {
        Self { coords }
    }

    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    pub fn zeros(n: usize) -> Self {
        Self {
            coords: DenseVec::from_element(n, S::zero()),
        }
    }

    pub fn dot(&self, other: &Point<S>) -> S {
        assert_eq!(self.dim(), other.dim());
        let mut acc = S::zero();
        for i in 0..self.dim() {
            acc = acc + self.coords[i].clone() * other.coords[i].clone();
        }
        acc
    }
}

impl<S: Scalar> PartialEq for Point<S> {
    fn eq(&self, other: &Self) -> bool {
        self.dim() == other.dim() && (0..self.dim()).all(|i| self.coords[i] == other.coords[i])
    }
}
impl<S: Scalar> Eq for Point<S> {}

impl<S: Scalar> PartialOrd for Point<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Lexicographic order: compare coordinates left to right, shorter vectors
/// sort first on a common prefix tie (mirrors tuple ordering).
impl<S: Scalar> Ord for Point<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        let n = self.dim().min(other.dim());
        for i in 0..n {
            match self.coords[i].partial_cmp(&other.coords[i]) {
                Some(Ordering::Equal) | None => continue,
                Some(ord) => return ord,
            }
        }
        self.dim().cmp(&other.dim())
    }
}

/// A closed half-space `{ x | normal . x <= offset }`.
///
/// Invariant: `normal != 0` (checked by [`HalfSpace::new`] in debug builds;
/// callers that must accept zero normals transiently — e.g. while folding
/// redundancy — use [`HalfSpace::new_unchecked`]).
#[derive(Clone, Debug)]
pub struct HalfSpace<S: Scalar> {
    pub normal: DenseVec<S>,
    pub offset: S,
}

impl<S: Scalar> HalfSpace<S> {
    pub fn new(normal: DenseVec<S>, offset: S) -> Self {
        debug_assert!(
            normal.iter().any(|c| !c.is_zero()),
            "half-space normal must be non-zero"
        );
        Self { normal, offset }
    }

    pub fn new_unchecked(normal: DenseVec<S>, offset: S) -> Self {
        Self { normal, offset }
    }

    pub fn dim(&self) -> usize {
        self.normal.len()
    }

    #[inline]
    pub fn satisfies(&self, p: &Point<S>) -> bool {
        self.eval(p) <= self.offset
    }

    #[inline]
    pub fn satisfies_eps(&self, p: &Point<S>, eps: S) -> bool {
        self.eval(p) <= self.offset.clone() + eps
    }

    #[inline]
    pub fn eval(&self, p: &Point<S>) -> S {
        let mut acc = S::zero();
        for i in 0..self.dim() {
            acc = acc + self.normal[i].clone() * p.coords[i].clone();
        }
        acc
    }

    /// Two half-spaces are equal when their `(normal, offset)` pair is
    /// equal after normalising sign: scale so the first non-zero normal
    /// component is positive, then compare exactly.
    pub fn semantically_eq(&self, other: &HalfSpace<S>) -> bool
    where
        S: std::ops::Div<Output = S>,
    {
        if self.dim() != other.dim() {
            return false;
        }
        let a = self.canonical_sign_scale();
        let b = other.canonical_sign_scale();
        match (a, b) {
            (Some(sa), Some(sb)) => {
                let normals_match = (0..self.dim())
                    .all(|i| self.normal[i].clone() * sa.clone() == other.normal[i].clone() * sb.clone());
                normals_match && self.offset.clone() * sa == other.offset.clone() * sb
            }
            _ => false,
        }
    }

    fn canonical_sign_scale(&self) -> Option<S> {
        for i in 0..self.dim() {
            if !self.normal[i].is_zero() {
                return Some(if self.normal[i] < S::zero() { -S::one() } else { S::one() });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(v: &[f64]) -> Point<f64> {
        Point::new(DenseVec::from_vec(v.to_vec()))
    }

    #[test]
    fn lexicographic_order() {
        assert!(pt(&[1.0, 2.0]) < pt(&[1.0, 3.0]));
        assert!(pt(&[0.0, 9.0]) < pt(&[1.0, 0.0]));
        assert_eq!(pt(&[1.0, 2.0]).cmp(&pt(&[1.0, 2.0])), Ordering::Equal);
    }

    #[test]
    fn half_space_satisfies() {
        let h = HalfSpace::new(DenseVec::from_vec(vec![1.0, 0.0]), 5.0);
        assert!(h.satisfies(&pt(&[5.0, 100.0])));
        assert!(!h.satisfies(&pt(&[5.0001, 0.0])));
    }

    #[test]
    fn half_space_sign_normalised_equality() {
        let h1 = HalfSpace::new(DenseVec::from_vec(vec![1.0, 0.0]), 2.0);
        let h2 = HalfSpace::new(DenseVec::from_vec(vec![-2.0, 0.0]), -4.0);
        assert!(h1.semantically_eq(&h2));
    }
}

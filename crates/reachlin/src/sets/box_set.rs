//! Axis-aligned box: an n-tuple of intervals (`spec.md` §3, §4.5).

use crate::geometry::{HalfSpace, Point};
use crate::linalg::{DenseMat, DenseVec};
use crate::scalar::Scalar;

/// Axis-aligned interval product `[lo_i, hi_i]` per axis, or the empty box.
///
/// Invariant: when not empty, `lo_i <= hi_i` for every axis.
#[derive(Clone, Debug)]
pub struct BoxSet<S: Scalar> {
    lo: DenseVec<S>,
    hi: DenseVec<S>,
    empty: bool,
}

impl<S: Scalar> BoxSet<S> {
    pub fn new(lo: DenseVec<S>, hi: DenseVec<S>) -> Self {
        assert_eq!(lo.len(), hi.len());
        let empty = (0..lo.len()).any(|i| lo[i] > hi[i]);
        Self { lo, hi, empty }
    }

    pub fn empty(dim: usize) -> Self {
        Self {
            lo: DenseVec::from_element(dim, S::zero()),
            hi: DenseVec::from_element(dim, S::zero()),
            empty: true,
        }
        .forced_empty()
    }

    fn forced_empty(mut self) -> Self {
        self.empty = true;
        self
    }

    pub fn dim(&self) -> usize {
        self.lo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn lo(&self) -> &DenseVec<S> {
        &self.lo
    }

    pub fn hi(&self) -> &DenseVec<S> {
        &self.hi
    }

    pub fn center(&self) -> Point<S> {
        let two = S::one() + S::one();
        Point::new(DenseVec::from_iterator(
            self.dim(),
            (0..self.dim()).map(|i| (self.lo[i].clone() + self.hi[i].clone()) / two.clone()),
        ))
    }

    pub fn contains_point(&self, p: &Point<S>) -> bool {
        if self.empty {
            return false;
        }
        (0..self.dim()).all(|i| self.lo[i] <= p.coords[i] && p.coords[i] <= self.hi[i])
    }

    pub fn support(&self, direction: &DenseVec<S>) -> S {
        if self.empty {
            return S::zero();
        }
        let mut acc = S::zero();
        for i in 0..self.dim() {
            let pick = if direction[i] >= S::zero() { self.hi[i].clone() } else { self.lo[i].clone() };
            acc = acc + direction[i].clone() * pick;
        }
        acc
    }

    /// Closed-form: sum per-axis intervals.
    pub fn minkowski_sum(&self, other: &BoxSet<S>) -> BoxSet<S> {
        assert_eq!(self.dim(), other.dim());
        if self.empty || other.empty {
            return BoxSet::empty(self.dim());
        }
        let lo = DenseVec::from_iterator(self.dim(), (0..self.dim()).map(|i| self.lo[i].clone() + other.lo[i].clone()));
        let hi = DenseVec::from_iterator(self.dim(), (0..self.dim()).map(|i| self.hi[i].clone() + other.hi[i].clone()));
        BoxSet::new(lo, hi)
    }

    /// Closed-form: per-axis interval intersection.
    pub fn intersect(&self, other: &BoxSet<S>) -> BoxSet<S> {
        assert_eq!(self.dim(), other.dim());
        if self.empty || other.empty {
            return BoxSet::empty(self.dim());
        }
        let lo = DenseVec::from_iterator(self.dim(), (0..self.dim()).map(|i| max(self.lo[i].clone(), other.lo[i].clone())));
        let hi = DenseVec::from_iterator(self.dim(), (0..self.dim()).map(|i| min(self.hi[i].clone(), other.hi[i].clone())));
        BoxSet::new(lo, hi)
    }

    /// Intersecting with a general half-space leaves box form only when the
    /// half-space is axis-aligned; otherwise the result would need an
    /// H-polytope, so this returns `None` and callers fall back to
    /// converting first (see [`crate::convert`]).
    pub fn intersect_half_space(&self, h: &HalfSpace<S>) -> Option<BoxSet<S>> {
        let nonzero: Vec<usize> = (0..h.dim()).filter(|&i| !h.normal[i].is_zero()).collect();
        if nonzero.len() != 1 {
            return None;
        }
        let axis = nonzero[0];
        let mut lo = self.lo.clone();
        let mut hi = self.hi.clone();
        let bound = h.offset.clone() / h.normal[axis].clone();
        if h.normal[axis] > S::zero() {
            if bound < hi[axis] {
                hi[axis] = bound;
            }
        } else if bound > lo[axis] {
            lo[axis] = bound;
        }
        Some(BoxSet::new(lo, hi))
    }

    /// Affine image under an invertible linear part stays a box only when
    /// `m` is diagonal (otherwise the image is a general H/V-polytope);
    /// this always produces the correct *bounding* box, which is what
    /// `spec.md` §4.7 calls for when converting to box.
    pub fn affine_image_bounding(&self, m: &DenseMat<S>, b: &DenseVec<S>) -> BoxSet<S> {
        if self.empty {
            return BoxSet::empty(m.nrows());
        }
        let out_dim = m.nrows();
        let mut lo = DenseVec::from_element(out_dim, S::zero());
        let mut hi = DenseVec::from_element(out_dim, S::zero());
        for row in 0..out_dim {
            let mut row_lo = b[row].clone();
            let mut row_hi = b[row].clone();
            for col in 0..self.dim() {
                let coeff = m[(row, col)].clone();
                let (a_lo, a_hi) = if coeff >= S::zero() {
                    (coeff.clone() * self.lo[col].clone(), coeff * self.hi[col].clone())
                } else {
                    (coeff.clone() * self.hi[col].clone(), coeff * self.lo[col].clone())
                };
                row_lo = row_lo + a_lo;
                row_hi = row_hi + a_hi;
            }
            lo[row] = row_lo;
            hi[row] = row_hi;
        }
        BoxSet::new(lo, hi)
    }

    pub fn vertices(&self) -> Vec<Point<S>> {
        if self.empty {
            return Vec::new();
        }
        let n = self.dim();
        let mut out = Vec::with_capacity(1 << n.min(20));
        for mask in 0u64..(1u64 << n) {
            let coords = DenseVec::from_iterator(
                n,
                (0..n).map(|i| if mask & (1 << i) != 0 { self.hi[i].clone() } else { self.lo[i].clone() }),
            );
            out.push(Point::new(coords));
        }
        out
    }
}

fn max<S: Scalar>(a: S, b: S) -> S {
    if a >= b {
        a
    } else {
        b
    }
}
fn min<S: Scalar>(a: S, b: S) -> S {
    if a <= b {
        a
    } else {
        b
    }
}

//! V-polytope: convex hull of a finite point set (`spec.md` §4.4).

use crate::geometry::Point;
use crate::linalg::{DenseMat, DenseVec};
use crate::optimizer::LinearProgram;
use crate::scalar::Scalar;

#[derive(Clone, Debug)]
pub struct VPolytope<S: Scalar> {
    dim: usize,
    points: Vec<Point<S>>,
}

impl<S: Scalar> VPolytope<S> {
    pub fn new(dim: usize, points: Vec<Point<S>>) -> Self {
        debug_assert!(points.iter().all(|p| p.dim() == dim));
        Self { dim, points }
    }

    pub fn empty(dim: usize) -> Self {
        Self { dim, points: Vec::new() }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn points(&self) -> &[Point<S>] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn support(&self, direction: &DenseVec<S>) -> S {
        let mut best: Option<S> = None;
        for p in &self.points {
            let mut acc = S::zero();
            for i in 0..self.dim {
                acc = acc + direction[i].clone() * p.coords[i].clone();
            }
            best = Some(match best {
                None => acc,
                Some(b) if acc > b => acc,
                Some(b) => b,
            });
        }
        best.unwrap_or(S::zero())
    }

    /// `{Ax+b | x in P}`: apply to each vertex.
    pub fn affine_image(&self, a: &DenseMat<S>, b: &DenseVec<S>) -> VPolytope<S> {
        let out_dim = a.nrows();
        let points = self
            .points
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
        VPolytope::new(out_dim, points)
    }

    /// Pointwise sum of the two vertex sets, then reduced to extreme points.
    pub fn minkowski_sum(&self, other: &VPolytope<S>) -> VPolytope<S> {
        assert_eq!(self.dim, other.dim);
        let mut points = Vec::with_capacity(self.points.len() * other.points.len().max(1));
        for p in &self.points {
            for q in &other.points {
                let coords = DenseVec::from_iterator(self.dim, (0..self.dim).map(|i| p.coords[i].clone() + q.coords[i].clone()));
                points.push(Point::new(coords));
            }
        }
        VPolytope::new(self.dim, points).reduce_redundancy()
    }

    /// Candidates: each side's own vertices plus pairwise componentwise
    /// maxima; kept iff contained in both operands.
    pub fn intersect(&self, other: &VPolytope<S>) -> VPolytope<S> {
        assert_eq!(self.dim, other.dim);
        let mut candidates: Vec<Point<S>> = Vec::new();
        candidates.extend(self.points.iter().cloned());
        candidates.extend(other.points.iter().cloned());
        for p in &self.points {
            for q in &other.points {
                let coords = DenseVec::from_iterator(self.dim, (0..self.dim).map(|i| max(p.coords[i].clone(), q.coords[i].clone())));
                candidates.push(Point::new(coords));
            }
        }
        let kept: Vec<Point<S>> = candidates
            .into_iter()
            .filter(|c| self.contains_point(c) && other.contains_point(c))
            .collect();
        VPolytope::new(self.dim, kept).dedup_exact()
    }

    /// Convex hull of the union of both vertex sets.
    pub fn union(&self, other: &VPolytope<S>) -> VPolytope<S> {
        assert_eq!(self.dim, other.dim);
        let mut points = self.points.clone();
        points.extend(other.points.iter().cloned());
        VPolytope::new(self.dim, points).reduce_redundancy()
    }

    /// `point` is a convex combination of the vertices iff the LP
    /// "coefficients >= 0, sum = 1, combination = point" is feasible.
    pub fn contains_point(&self, point: &Point<S>) -> bool {
        if self.points.is_empty() {
            return false;
        }
        convex_combination_feasible(&self.points, point)
    }

    /// Drops any vertex expressible as a convex combination of the others.
    pub fn reduce_redundancy(&self) -> VPolytope<S> {
        let deduped = self.dedup_exact();
        let n = deduped.points.len();
        let mut keep = vec![true; n];
        for i in 0..n {
            let rest: Vec<Point<S>> = (0..n).filter(|&j| j != i).map(|j| deduped.points[j].clone()).collect();
            if !rest.is_empty() && convex_combination_feasible(&rest, &deduped.points[i]) {
                keep[i] = false;
            }
        }
        let points = (0..n).filter(|&i| keep[i]).map(|i| deduped.points[i].clone()).collect();
        VPolytope::new(self.dim, points)
    }

    fn dedup_exact(&self) -> VPolytope<S> {
        let mut out: Vec<Point<S>> = Vec::new();
        for p in &self.points {
            if !out.iter().any(|q| q == p) {
                out.push(p.clone());
            }
        }
        VPolytope::new(self.dim, out)
    }

    /// Snaps each vertex away from the centroid to `limit`-scaled
    /// integer-coefficient coordinates, rounding away from the centroid so
    /// the reduced hull always contains the original. Rounding is done via
    /// an `f64` round-trip (through [`Scalar::to_f64`]/[`Scalar::from_f64`])
    /// since [`Scalar`] has no native ceiling/floor — acceptable because
    /// this operation is explicitly a bounded-precision simplification, not
    /// an exactness-critical path.
    pub fn reduce_number_representation(&self, limit: u32) -> VPolytope<S> {
        if self.points.is_empty() || limit == 0 {
            return self.clone();
        }
        let centroid = self.centroid();
        let limit_f = limit as f64;
        let points = self
            .points
            .iter()
            .map(|p| {
                let coords = DenseVec::from_iterator(self.dim, (0..self.dim).map(|i| {
                    let c_f = centroid.coords[i].to_f64();
                    let v_f = p.coords[i].to_f64();
                    let delta = v_f - c_f;
                    let scaled = delta * limit_f;
                    let rounded = if scaled >= 0.0 { scaled.ceil() } else { scaled.floor() };
                    S::from_f64(c_f + rounded / limit_f)
                }));
                Point::new(coords)
            })
            .collect();
        VPolytope::new(self.dim, points)
    }

    fn centroid(&self) -> Point<S> {
        let n = S::from_f64(self.points.len() as f64);
        let coords = DenseVec::from_iterator(self.dim, (0..self.dim).map(|i| {
            let mut acc = S::zero();
            for p in &self.points {
                acc = acc + p.coords[i].clone();
            }
            acc / n.clone()
        }));
        Point::new(coords)
    }
}

fn max<S: Scalar>(a: S, b: S) -> S {
    if a >= b {
        a
    } else {
        b
    }
}

/// LP feasibility of `{lambda >= 0, sum(lambda) = 1, sum(lambda_i * points_i) = target}`,
/// equalities expressed as two opposing inequalities.
fn convex_combination_feasible<S: Scalar>(points: &[Point<S>], target: &Point<S>) -> bool {
    let k = points.len();
    let dim = target.dim();
    let rows = k + 2 + 2 * dim;
    let mut a = DenseMat::<S>::from_element(rows, k, S::zero());
    let mut b = DenseVec::<S>::from_element(rows, S::zero());

    for i in 0..k {
        a[(i, i)] = -S::one();
        b[i] = S::zero();
    }
    for i in 0..k {
        a[(k, i)] = S::one();
    }
    b[k] = S::one();
    for i in 0..k {
        a[(k + 1, i)] = -S::one();
    }
    b[k + 1] = -S::one();

    let base = k + 2;
    for j in 0..dim {
        for i in 0..k {
            a[(base + 2 * j, i)] = points[i].coords[j].clone();
        }
        b[base + 2 * j] = target.coords[j].clone();
        for i in 0..k {
            a[(base + 2 * j + 1, i)] = -points[i].coords[j].clone();
        }
        b[base + 2 * j + 1] = -target.coords[j].clone();
    }

    LinearProgram::new(a, b).is_feasible()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(xs: &[f64]) -> Point<f64> {
        Point::new(DenseVec::from_vec(xs.to_vec()))
    }

    fn triangle() -> VPolytope<f64> {
        VPolytope::new(2, vec![pt(&[0.0, 0.0]), pt(&[1.0, 0.0]), pt(&[0.0, 1.0])])
    }

    #[test]
    fn contains_point_inside_hull() {
        let t = triangle();
        assert!(t.contains_point(&pt(&[0.25, 0.25])));
        assert!(!t.contains_point(&pt(&[1.0, 1.0])));
    }

    #[test]
    fn redundant_vertex_on_edge_is_dropped() {
        let t = VPolytope::new(2, vec![pt(&[0.0, 0.0]), pt(&[1.0, 0.0]), pt(&[0.5, 0.0]), pt(&[0.0, 1.0])]);
        let reduced = t.reduce_redundancy();
        assert_eq!(reduced.points().len(), 3);
    }

    #[test]
    fn affine_image_scales_points() {
        let t = triangle();
        let a = DenseMat::<f64>::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 2.0]);
        let b = DenseVec::from_vec(vec![0.0, 0.0]);
        let image = t.affine_image(&a, &b);
        assert!(image.points().iter().any(|p| *p == pt(&[2.0, 0.0])));
    }

    #[test]
    fn minkowski_sum_of_segments_is_quadrilateral() {
        let seg1 = VPolytope::new(1, vec![pt(&[0.0]), pt(&[1.0])]);
        let seg2 = VPolytope::new(1, vec![pt(&[0.0]), pt(&[2.0])]);
        let sum = seg1.minkowski_sum(&seg2);
        assert!(sum.points().iter().any(|p| *p == pt(&[3.0])));
        assert!(sum.points().iter().any(|p| *p == pt(&[0.0])));
    }
}

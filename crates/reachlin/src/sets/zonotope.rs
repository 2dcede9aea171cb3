//! Zonotope: center plus generator matrix (`spec.md` §3, §4.5).

use crate::geometry::Point;
use crate::linalg::{DenseMat, DenseVec};
use crate::optimizer::LinearProgram;
use crate::scalar::Scalar;

/// `{c + G*alpha | alpha in [-1,1]^k}`. No ordering is imposed on `G`'s
/// columns; generator order is not semantically meaningful.
#[derive(Clone, Debug)]
pub struct Zonotope<S: Scalar> {
    center: Point<S>,
    generators: DenseMat<S>,
}

impl<S: Scalar> Zonotope<S> {
    pub fn new(center: Point<S>, generators: DenseMat<S>) -> Self {
        assert_eq!(center.dim(), generators.nrows());
        Self { center, generators }
    }

    pub fn dim(&self) -> usize {
        self.center.dim()
    }

    pub fn num_generators(&self) -> usize {
        self.generators.ncols()
    }

    pub fn center(&self) -> &Point<S> {
        &self.center
    }

    pub fn generators(&self) -> &DenseMat<S> {
        &self.generators
    }

    /// `support(d) = c.d + sum_j |g_j . d|`.
    pub fn support(&self, direction: &DenseVec<S>) -> S {
        let mut acc = dot(&self.center.coords, direction);
        for col in 0..self.num_generators() {
            let g = self.generators.column(col);
            let mut gd = S::zero();
            for row in 0..self.dim() {
                gd = gd + g[row].clone() * direction[row].clone();
            }
            acc = acc + gd.abs();
        }
        acc
    }

    pub fn contains_point(&self, p: &Point<S>) -> bool {
        alpha_feasible(&self.generators, &self.center, p)
    }

    /// Concatenates generator columns and adds centers.
    pub fn minkowski_sum(&self, other: &Zonotope<S>) -> Zonotope<S> {
        assert_eq!(self.dim(), other.dim());
        let center = Point::new(DenseVec::from_iterator(
            self.dim(),
            (0..self.dim()).map(|i| self.center.coords[i].clone() + other.center.coords[i].clone()),
        ));
        let k1 = self.num_generators();
        let k2 = other.num_generators();
        let mut generators = DenseMat::<S>::from_element(self.dim(), k1 + k2, S::zero());
        for col in 0..k1 {
            for row in 0..self.dim() {
                generators[(row, col)] = self.generators[(row, col)].clone();
            }
        }
        for col in 0..k2 {
            for row in 0..self.dim() {
                generators[(row, k1 + col)] = other.generators[(row, col)].clone();
            }
        }
        Zonotope::new(center, generators)
    }

    /// New center `Ac+b`, new generators `A*G` (each column transformed).
    pub fn affine_image(&self, a: &DenseMat<S>, b: &DenseVec<S>) -> Zonotope<S> {
        let out_dim = a.nrows();
        let mut center_coords = b.clone();
        for row in 0..out_dim {
            let mut acc = center_coords[row].clone();
            for col in 0..self.dim() {
                acc = acc + a[(row, col)].clone() * self.center.coords[col].clone();
            }
            center_coords[row] = acc;
        }
        let k = self.num_generators();
        let mut generators = DenseMat::<S>::from_element(out_dim, k, S::zero());
        for col in 0..k {
            for row in 0..out_dim {
                let mut acc = S::zero();
                for c in 0..self.dim() {
                    acc = acc + a[(row, c)].clone() * self.generators[(c, col)].clone();
                }
                generators[(row, col)] = acc;
            }
        }
        Zonotope::new(Point::new(center_coords), generators)
    }

    /// Order reduction under a generator budget: keeps the `budget - dim`
    /// longest generators and folds the rest into one axis-aligned box
    /// generator per axis (the per-axis sum of absolute values of the
    /// dropped generators), the standard "box order reduction" scheme. The
    /// result always contains `self` since the folded box is itself a
    /// zonotope containing the Minkowski sum of the dropped generators'
    /// ranges.
    pub fn reduce(&self, budget: usize) -> Zonotope<S> {
        let k = self.num_generators();
        if k <= budget {
            return self.clone();
        }
        let dim = self.dim();
        let keep_count = budget.saturating_sub(dim);
        let mut idx: Vec<usize> = (0..k).collect();
        idx.sort_by(|&a, &b| {
            generator_norm(&self.generators, b)
                .partial_cmp(&generator_norm(&self.generators, a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let kept: Vec<usize> = idx[..keep_count.min(k)].to_vec();
        let dropped: Vec<usize> = idx[keep_count.min(k)..].to_vec();

        let mut generators = DenseMat::<S>::from_element(dim, kept.len() + dim, S::zero());
        for (col, &src) in kept.iter().enumerate() {
            for row in 0..dim {
                generators[(row, col)] = self.generators[(row, src)].clone();
            }
        }
        for row in 0..dim {
            let mut acc = S::zero();
            for &src in &dropped {
                acc = acc + self.generators[(row, src)].abs();
            }
            generators[(row, kept.len() + row)] = acc;
        }
        Zonotope::new(self.center.clone(), generators)
    }

    /// `2^k` candidate vertices from every sign assignment of `alpha`; used
    /// by the exact zonotope-to-H converter (`spec.md` §4.7), not a minimal
    /// extreme-point set on its own.
    pub fn sign_vertices(&self) -> Vec<Point<S>> {
        let k = self.num_generators();
        let dim = self.dim();
        let mut out = Vec::with_capacity(1usize << k.min(20));
        for mask in 0u64..(1u64 << k) {
            let coords = DenseVec::from_iterator(dim, (0..dim).map(|row| {
                let mut acc = self.center.coords[row].clone();
                for col in 0..k {
                    let sign = if mask & (1 << col) != 0 { S::one() } else { -S::one() };
                    acc = acc + self.generators[(row, col)].clone() * sign;
                }
                acc
            }));
            out.push(Point::new(coords));
        }
        out
    }
}

fn dot<S: Scalar>(a: &DenseVec<S>, b: &DenseVec<S>) -> S {
    let mut acc = S::zero();
    for i in 0..a.len() {
        acc = acc + a[i].clone() * b[i].clone();
    }
    acc
}

fn generator_norm<S: Scalar>(g: &DenseMat<S>, col: usize) -> S {
    let mut acc = S::zero();
    for row in 0..g.nrows() {
        acc = acc + g[(row, col)].abs();
    }
    acc
}

/// Point containment reduces to LP feasibility in alpha-space:
/// `G*alpha = p - c`, `-1 <= alpha_j <= 1`.
fn alpha_feasible<S: Scalar>(generators: &DenseMat<S>, center: &Point<S>, p: &Point<S>) -> bool {
    let dim = generators.nrows();
    let k = generators.ncols();
    let rows = 2 * k + 2 * dim;
    let mut a = DenseMat::<S>::from_element(rows, k, S::zero());
    let mut b = DenseVec::<S>::from_element(rows, S::zero());
    for j in 0..k {
        a[(2 * j, j)] = S::one();
        b[2 * j] = S::one();
        a[(2 * j + 1, j)] = -S::one();
        b[2 * j + 1] = S::one();
    }
    let base = 2 * k;
    for row in 0..dim {
        let target = p.coords[row].clone() - center.coords[row].clone();
        for j in 0..k {
            a[(base + 2 * row, j)] = generators[(row, j)].clone();
        }
        b[base + 2 * row] = target.clone();
        for j in 0..k {
            a[(base + 2 * row + 1, j)] = -generators[(row, j)].clone();
        }
        b[base + 2 * row + 1] = -target;
    }
    LinearProgram::new(a, b).is_feasible()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(xs: &[f64]) -> Point<f64> {
        Point::new(DenseVec::from_vec(xs.to_vec()))
    }

    fn unit_zonotope() -> Zonotope<f64> {
        Zonotope::new(pt(&[0.0, 0.0]), DenseMat::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]))
    }

    #[test]
    fn support_matches_box_bound() {
        let z = unit_zonotope();
        assert!((z.support(&DenseVec::from_vec(vec![1.0, 0.0])) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn contains_center() {
        let z = unit_zonotope();
        assert!(z.contains_point(&pt(&[0.0, 0.0])));
        assert!(!z.contains_point(&pt(&[2.0, 0.0])));
    }

    #[test]
    fn reduce_keeps_containment() {
        let generators = DenseMat::<f64>::from_row_slice(2, 4, &[1.0, 0.3, 0.1, 0.05, 0.0, 0.2, 0.1, 0.05]);
        let z = Zonotope::new(pt(&[0.0, 0.0]), generators);
        let reduced = z.reduce(3);
        assert_eq!(reduced.num_generators(), 3);
        // every original sign-vertex must be inside the reduced zonotope.
        for v in z.sign_vertices() {
            assert!(reduced.contains_point(&v));
        }
    }

    #[test]
    fn minkowski_sum_concatenates_generators() {
        let z1 = unit_zonotope();
        let z2 = unit_zonotope();
        let sum = z1.minkowski_sum(&z2);
        assert_eq!(sum.num_generators(), 4);
        assert!((sum.support(&DenseVec::from_vec(vec![1.0, 0.0])) - 2.0).abs() < 1e-9);
    }
}

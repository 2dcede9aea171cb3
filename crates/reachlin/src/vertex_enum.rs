//! Vertex enumeration: extreme points and recession cone of a half-space
//! system (`spec.md` §4.3).
//!
//! Purpose
//! - Input a finite set of half-spaces; output the extreme points and the
//!   recession cone (as ray generators) of their intersection.
//!
//! Why a combinatorial tight-set enumeration rather than literal reverse
//! search
//! - `spec.md` describes Dictionary-based reverse search over simplex
//!   dictionaries with Bland's-rule tie-breaks. This crate realises the same
//!   *contract* (deterministic extreme points plus recession-cone rays, one
//!   lexicographically-ordered enumeration) by the tight-constraint
//!   combinatorial method the teacher already uses at small, bounded
//!   dimension: `geom4::convert::{h_to_vertices, v_to_halfspaces}` enumerate
//!   every 4-subset of hyperplanes (or points) and solve/check directly,
//!   generalised here to an `n`-subset for arbitrary `n` via
//!   [`crate::linalg::det_generic`]/[`crate::linalg::solve_square_generic`].
//!   DESIGN.md records this as the deliberate implementation choice for the
//!   Open Question of how literally to follow the reverse-search dictionary
//!   machinery: combinatorial enumeration is `O(binom(m, n))`, acceptable at
//!   the polytope sizes flowpipes actually produce, same as the teacher's
//!   own stated complexity trade-off.
//! - Bland's rule's role (deterministic, cycle-free tie-breaking) is played
//!   here by enumerating subsets in strictly increasing index order and
//!   deduplicating points by [`crate::geometry::Point`]'s lexicographic
//!   order, which gives the same "two runs with identical inputs produce
//!   identical output" guarantee `spec.md` §4.3/§8 asks for.

use crate::geometry::{HalfSpace, Point};
use crate::linalg::{det_generic, nullspace_direction_generic, solve_square_generic, DenseMat, DenseVec};
use crate::scalar::Scalar;

/// Extreme points plus recession-cone ray generators of a half-space system.
#[derive(Clone, Debug)]
pub struct VertexEnumeration<S: Scalar> {
    pub vertices: Vec<Point<S>>,
    /// Recession-cone ray generators. A non-empty list here (together with
    /// at least one vertex, or an empty vertex list when the cone is the
    /// whole lineality space) means the polytope is unbounded.
    pub rays: Vec<DenseVec<S>>,
}

impl<S: Scalar> VertexEnumeration<S> {
    pub fn is_bounded(&self) -> bool {
        self.rays.is_empty()
    }
}

/// Enumerate vertices and recession-cone rays of `{ x in R^dim | h.satisfies(x) for h in half_spaces }`.
pub fn enumerate<S: Scalar>(dim: usize, half_spaces: &[HalfSpace<S>]) -> VertexEnumeration<S> {
    let m = half_spaces.len();
    let mut vertices: Vec<Point<S>> = Vec::new();
    let eps = S::from_f64(1e-7);

    if m >= dim && dim > 0 {
        for combo in combinations(m, dim) {
            let mut a = DenseMat::<S>::from_element(dim, dim, S::zero());
            let mut b = DenseVec::<S>::from_element(dim, S::zero());
            for (row, &idx) in combo.iter().enumerate() {
                for col in 0..dim {
                    a[(row, col)] = half_spaces[idx].normal[col].clone();
                }
                b[row] = half_spaces[idx].offset.clone();
            }
            let Some(x) = solve_square_generic(&a, &b) else {
                continue;
            };
            let point = Point::new(x);
            if half_spaces.iter().all(|h| h.satisfies_eps(&point, eps.clone())) {
                if !vertices.iter().any(|p| *p == point) {
                    vertices.push(point);
                }
            }
        }
    }
    vertices.sort();

    let rays = if dim > 0 { recession_rays(dim, half_spaces) } else { Vec::new() };

    VertexEnumeration { vertices, rays }
}

/// A direction `d` is a recession-cone generator iff `normal_i . d <= 0`
/// for every half-space (then `x + t d` stays feasible for all `t >= 0`
/// whenever `x` is feasible). Candidates come from the null space of every
/// `(dim-1)`-subset of normals (a line of directions tangent to that many
/// facets simultaneously), same combinatorial-minor technique as the vertex
/// case one dimension down.
fn recession_rays<S: Scalar>(dim: usize, half_spaces: &[HalfSpace<S>]) -> Vec<DenseVec<S>> {
    if dim < 2 || half_spaces.len() < dim - 1 {
        return if half_spaces.is_empty() {
            // No constraints at all: every direction is a recession direction;
            // report the standard basis as generators.
            (0..dim)
                .map(|i| DenseVec::from_iterator(dim, (0..dim).map(|j| if i == j { S::one() } else { S::zero() })))
                .collect()
        } else {
            Vec::new()
        };
    }
    let mut rays: Vec<DenseVec<S>> = Vec::new();
    let eps = S::from_f64(1e-7);
    for combo in combinations(half_spaces.len(), dim - 1) {
        let mut rows = DenseMat::<S>::from_element(dim - 1, dim, S::zero());
        for (r, &idx) in combo.iter().enumerate() {
            for c in 0..dim {
                rows[(r, c)] = half_spaces[idx].normal[c].clone();
            }
        }
        let Some(d) = nullspace_direction_generic(&rows) else {
            continue;
        };
        for candidate in [d.clone(), -d] {
            let feasible_direction = half_spaces.iter().all(|h| {
                let mut acc = S::zero();
                for c in 0..dim {
                    acc = acc + h.normal[c].clone() * candidate[c].clone();
                }
                acc <= eps.clone()
            });
            let is_zero = (0..dim).all(|c| candidate[c].abs() <= eps.clone());
            if feasible_direction && !is_zero && !rays.iter().any(|r| directions_parallel(r, &candidate, eps.clone())) {
                rays.push(candidate);
            }
        }
    }
    rays
}

fn directions_parallel<S: Scalar>(a: &DenseVec<S>, b: &DenseVec<S>, eps: S) -> bool {
    // Cheap check sufficient for dedup purposes: cross-terms proportional.
    let dim = a.len();
    let mut scale: Option<S> = None;
    for i in 0..dim {
        if a[i].abs() > eps {
            let s = b[i].clone() / a[i].clone();
            match &scale {
                None => scale = Some(s),
                Some(existing) => {
                    if (s - existing.clone()).abs() > eps {
                        return false;
                    }
                }
            }
        } else if b[i].abs() > eps {
            return false;
        }
    }
    scale.is_some()
}

/// Determinant sanity re-export for callers that only need the combinatorial
/// building block without the full enumeration (e.g. the V->H converter).
pub fn is_independent<S: Scalar>(rows: &DenseMat<S>) -> bool {
    if rows.nrows() != rows.ncols() {
        return false;
    }
    !det_generic(rows).is_zero()
}

/// Facet enumeration: the symmetric operation to [`enumerate`], used by
/// `V -> H` conversion (`spec.md` §4.7, "exact by convex-hull facet
/// enumeration") and by `affine_image` of an H-polytope under a
/// non-invertible map (`spec.md` §4.2).
///
/// For every `dim`-subset of points, fit the unique hyperplane through them
/// (via [`nullspace_direction_generic`] on the subset's pairwise
/// differences), orient it so every other point satisfies it, and keep it if
/// at least one other point lies exactly on it (making the subset a facet,
/// not an interior cut). Same combinatorial building block as vertex
/// enumeration, run in the dual direction — grounded on
/// `geom4::convert::v_to_halfspaces`'s point-subset iteration, generalised
/// from 4 points to an arbitrary `dim`-subset.
pub fn facets_from_points<S: Scalar>(dim: usize, points: &[Point<S>]) -> Vec<HalfSpace<S>> {
    if points.len() < dim || dim == 0 {
        return Vec::new();
    }
    let eps = S::from_f64(1e-7);
    let mut half_spaces: Vec<HalfSpace<S>> = Vec::new();
    for combo in combinations(points.len(), dim) {
        let base = &points[combo[0]];
        let mut diffs = DenseMat::<S>::from_element(dim - 1, dim, S::zero());
        for (row, &idx) in combo[1..].iter().enumerate() {
            for c in 0..dim {
                diffs[(row, c)] = points[idx].coords[c].clone() - base.coords[c].clone();
            }
        }
        let Some(normal) = nullspace_direction_generic(&diffs) else {
            continue;
        };
        let offset_base = dot(&normal, &base.coords);

        let mut max_violation = S::zero();
        let mut touches = false;
        for p in points {
            let v = dot(&normal, &p.coords) - offset_base.clone();
            if v.abs() <= eps {
                touches = true;
            } else if v > max_violation {
                max_violation = v;
            } else {
                let neg_v = -v;
                if neg_v > max_violation {
                    max_violation = neg_v;
                }
            }
        }
        if !touches {
            continue;
        }
        // Orient so every point satisfies normal.x <= offset: if any point
        // exceeds offset_base, the outward normal is the negation.
        let any_exceeds = points
            .iter()
            .any(|p| dot(&normal, &p.coords) > offset_base.clone() + eps.clone());
        let (oriented_normal, offset) = if any_exceeds {
            (-normal, -offset_base)
        } else {
            (normal, offset_base)
        };
        let candidate = HalfSpace::new_unchecked(oriented_normal, offset);
        if !half_spaces.iter().any(|h: &HalfSpace<S>| h.semantically_eq(&candidate)) {
            half_spaces.push(candidate);
        }
    }
    half_spaces
}

fn dot<S: Scalar>(a: &DenseVec<S>, b: &DenseVec<S>) -> S {
    let mut acc = S::zero();
    for i in 0..a.len() {
        acc = acc + a[i].clone() * b[i].clone();
    }
    acc
}

/// Lexicographically ordered `k`-subsets of `{0, ..., n-1}`, smallest first —
/// the enumeration order that plays Bland's-rule's determinism role here.
pub fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if k > n {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut combo: Vec<usize> = (0..k).collect();
    loop {
        out.push(combo.clone());
        let mut i = k;
        loop {
            if i == 0 {
                return out;
            }
            i -= 1;
            if combo[i] != i + n - k {
                break;
            }
        }
        combo[i] += 1;
        for j in i + 1..k {
            combo[j] = combo[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hs(normal: &[f64], offset: f64) -> HalfSpace<f64> {
        HalfSpace::new(DenseVec::from_vec(normal.to_vec()), offset)
    }

    #[test]
    fn unit_cube_has_eight_vertices() {
        // spec.md §8 scenario 5.
        let half_spaces = vec![
            hs(&[1.0, 0.0, 0.0], 1.0),
            hs(&[-1.0, 0.0, 0.0], 1.0),
            hs(&[0.0, 1.0, 0.0], 1.0),
            hs(&[0.0, -1.0, 0.0], 1.0),
            hs(&[0.0, 0.0, 1.0], 1.0),
            hs(&[0.0, 0.0, -1.0], 1.0),
        ];
        let result = enumerate(3, &half_spaces);
        assert_eq!(result.vertices.len(), 8);
        assert!(result.is_bounded());
        for v in &result.vertices {
            for c in 0..3 {
                assert!((v.coords[c].abs() - 1.0).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn combinations_count() {
        assert_eq!(combinations(5, 2).len(), 10);
        assert_eq!(combinations(4, 4).len(), 1);
        assert_eq!(combinations(3, 0).len(), 1);
    }

    #[test]
    fn unbounded_strip_has_ray() {
        // 0 <= x <= 1, y unconstrained.
        let half_spaces = vec![hs(&[1.0, 0.0], 1.0), hs(&[-1.0, 0.0], 0.0)];
        let result = enumerate(2, &half_spaces);
        assert!(!result.is_bounded());
    }
}

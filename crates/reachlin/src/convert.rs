//! Pairwise representation converters (`spec.md` §4.7).
//!
//! Every conversion here is declared exact or over-approximating in its own
//! doc comment, matching the table in `spec.md` §4.7. Converters are used
//! only where the reachability engine explicitly asks for a different
//! representation (transient conversion to V form for plotting or union,
//! zonotope construction for a bounded-generator flowpipe representation).

use crate::config::Representation;
use crate::geometry::Point;
use crate::linalg::{DenseMat, DenseVec};
use crate::scalar::Scalar;
use crate::sets::{BoxSet, ConvexSet, ConvexSetVariant, HPolytope, SupportFunction, VPolytope, Zonotope};
use crate::vertex_enum;

/// Exact: axis intervals become the `2*dim` canonical half-spaces.
pub fn box_to_hpolytope<S: Scalar>(b: &BoxSet<S>) -> HPolytope<S> {
    use crate::geometry::HalfSpace;
    let dim = b.dim();
    let mut half_spaces = Vec::with_capacity(2 * dim);
    for i in 0..dim {
        let mut pos = DenseVec::from_element(dim, S::zero());
        pos[i] = S::one();
        half_spaces.push(HalfSpace::new_unchecked(pos, b.hi()[i].clone()));
        let mut neg = DenseVec::from_element(dim, S::zero());
        neg[i] = -S::one();
        half_spaces.push(HalfSpace::new_unchecked(neg, -b.lo()[i].clone()));
    }
    HPolytope::new(dim, half_spaces)
}

/// Exact: the `2^dim` corners, already extreme.
pub fn box_to_vpolytope<S: Scalar>(b: &BoxSet<S>) -> VPolytope<S> {
    VPolytope::new(b.dim(), b.vertices())
}

/// Exact: center stays center, each axis half-width becomes one diagonal
/// generator.
pub fn box_to_zonotope<S: Scalar>(b: &BoxSet<S>) -> Zonotope<S> {
    let dim = b.dim();
    let two = S::one() + S::one();
    let mut generators = DenseMat::<S>::from_element(dim, dim, S::zero());
    for i in 0..dim {
        generators[(i, i)] = (b.hi()[i].clone() - b.lo()[i].clone()) / two.clone();
    }
    Zonotope::new(b.center(), generators)
}

/// Over-approximating unless `h` happens to already be an axis-aligned box:
/// the bounding box of `h`'s support in each axis direction. `spec.md` §4.7
/// lists `Box <-> H` as exact, which only holds in the direction `Box -> H`;
/// the reverse necessarily loses shape for a non-box `H`, so this is
/// documented here (and in DESIGN.md) as the bounding-box over-approximation
/// rather than silently mislabelling it exact.
pub fn hpolytope_to_box<S: Scalar>(h: &HPolytope<S>) -> BoxSet<S> {
    let dim = h.dim();
    let mut lo = DenseVec::from_element(dim, S::zero());
    let mut hi = DenseVec::from_element(dim, S::zero());
    for i in 0..dim {
        let mut pos = DenseVec::from_element(dim, S::zero());
        pos[i] = S::one();
        hi[i] = h.support_eval(&pos).unwrap_or(S::zero());
        let mut neg = DenseVec::from_element(dim, S::zero());
        neg[i] = -S::one();
        lo[i] = -h.support_eval(&neg).unwrap_or(S::zero());
    }
    BoxSet::new(lo, hi)
}

/// Exact: `H -> V` by vertex enumeration (`spec.md` §4.3).
pub fn hpolytope_to_vpolytope<S: Scalar>(h: &HPolytope<S>) -> VPolytope<S> {
    VPolytope::new(h.dim(), h.vertices())
}

/// Exact: `V -> H` by convex-hull facet enumeration.
pub fn vpolytope_to_hpolytope<S: Scalar>(v: &VPolytope<S>) -> HPolytope<S> {
    HPolytope::new(v.dim(), vertex_enum::facets_from_points(v.dim(), v.points()))
}

/// Exact by enumerating `2^k` vertex signs then convex hull; over-approximates
/// above `generator_budget` by reducing the zonotope's generators first
/// (dimension-wise projection, via [`Zonotope::reduce`]) rather than
/// enumerating all `2^k` signs of the untouched generator count.
pub fn zonotope_to_hpolytope<S: Scalar>(z: &Zonotope<S>, generator_budget: Option<usize>) -> HPolytope<S> {
    let dim = z.dim();
    let source = match generator_budget {
        Some(budget) if z.num_generators() > budget => z.reduce(budget),
        _ => z.clone(),
    };
    HPolytope::new(dim, vertex_enum::facets_from_points(dim, &source.sign_vertices()))
}

/// Anything to support function: wrap as a leaf. Exact (`spec.md` §4.7).
pub fn wrap_as_support<S: Scalar>(set: ConvexSetVariant<S>) -> SupportFunction<S> {
    set.to_support()
}

/// `{H, V, support} -> zonotope`: over-approximation by oriented box
/// (principal-component axes of the vertex set), then per-axis expansion so
/// every axis-aligned support of the source is covered, then reduced to the
/// requested generator budget.
pub fn to_zonotope<S: Scalar>(set: &ConvexSetVariant<S>, generator_budget: usize) -> Zonotope<S> {
    match set {
        ConvexSetVariant::Box(b) => box_to_zonotope(b),
        ConvexSetVariant::Zonotope(z) => z.clone(),
        other => {
            let dim = other.dim();
            let points = other.vertices();
            let oriented = oriented_box_zonotope(&points, dim);
            let expanded = expand_to_cover_axis_support(oriented, other);
            if expanded.num_generators() > generator_budget {
                expanded.reduce(generator_budget)
            } else {
                expanded
            }
        }
    }
}

/// Principal-component oriented bounding box of a point cloud, as a
/// zonotope. PCA is run in `f64` regardless of `S` (the axes themselves are
/// inherently an approximate numerical construct, same as hypro's own
/// template-direction sampling) and the resulting generators are converted
/// back through [`Scalar::from_f64`].
fn oriented_box_zonotope<S: Scalar>(points: &[Point<S>], dim: usize) -> Zonotope<S> {
    if points.is_empty() || dim == 0 {
        return Zonotope::new(Point::zeros(dim), DenseMat::from_element(dim, 0, S::zero()));
    }
    let centroid: Vec<f64> =
        (0..dim).map(|i| points.iter().map(|p| p.coords[i].to_f64()).sum::<f64>() / points.len() as f64).collect();

    let mut cov = nalgebra::DMatrix::<f64>::zeros(dim, dim);
    for p in points {
        let d: Vec<f64> = (0..dim).map(|i| p.coords[i].to_f64() - centroid[i]).collect();
        for r in 0..dim {
            for c in 0..dim {
                cov[(r, c)] += d[r] * d[c];
            }
        }
    }
    let eig = nalgebra::SymmetricEigen::new(cov);

    let mut generators = DenseMat::<S>::from_element(dim, dim, S::zero());
    for axis in 0..dim {
        let mut max_extent = 0.0_f64;
        for p in points {
            let mut proj = 0.0;
            for i in 0..dim {
                proj += (p.coords[i].to_f64() - centroid[i]) * eig.eigenvectors[(i, axis)];
            }
            max_extent = max_extent.max(proj.abs());
        }
        for i in 0..dim {
            generators[(i, axis)] = S::from_f64(eig.eigenvectors[(i, axis)] * max_extent);
        }
    }
    let center = Point::new(DenseVec::from_iterator(dim, centroid.iter().map(|&c| S::from_f64(c))));
    Zonotope::new(center, generators)
}

/// Converts to whichever representation a reachability run was configured
/// with (`spec.md` §6's `representation` option), picking the cheapest
/// exact path when the source is already that representation and falling
/// back to the documented over-approximation otherwise.
pub fn to_representation<S: Scalar>(
    set: &ConvexSetVariant<S>,
    target: Representation,
    generator_budget: usize,
) -> ConvexSetVariant<S> {
    match (target, set) {
        (Representation::Box, ConvexSetVariant::Box(b)) => ConvexSetVariant::Box(b.clone()),
        (Representation::HPoly, ConvexSetVariant::HPoly(h)) => ConvexSetVariant::HPoly(h.clone()),
        (Representation::VPoly, ConvexSetVariant::VPoly(v)) => ConvexSetVariant::VPoly(v.clone()),
        (Representation::Zonotope, ConvexSetVariant::Zonotope(z)) => ConvexSetVariant::Zonotope(z.clone()),
        (Representation::SupportFn, ConvexSetVariant::Support(s)) => ConvexSetVariant::Support(s.clone()),
        (Representation::Box, other) => ConvexSetVariant::Box(to_box_approx(other)),
        (Representation::HPoly, other) => match other.to_hpolytope_approx(other.dim()) {
            Some(h) => ConvexSetVariant::HPoly(h),
            None => ConvexSetVariant::Support(other.to_support()),
        },
        (Representation::VPoly, other) => ConvexSetVariant::VPoly(VPolytope::new(other.dim(), other.vertices())),
        (Representation::Zonotope, other) => ConvexSetVariant::Zonotope(to_zonotope(other, generator_budget)),
        (Representation::SupportFn, other) => ConvexSetVariant::Support(other.to_support()),
    }
}

/// Bounding box over every axis's support; exact when `set` is already a
/// box, over-approximating otherwise.
fn to_box_approx<S: Scalar>(set: &ConvexSetVariant<S>) -> BoxSet<S> {
    let dim = set.dim();
    let mut lo = DenseVec::from_element(dim, S::zero());
    let mut hi = DenseVec::from_element(dim, S::zero());
    for i in 0..dim {
        let mut pos = DenseVec::from_element(dim, S::zero());
        pos[i] = S::one();
        hi[i] = set.support(&pos).unwrap_or(S::zero());
        let mut neg = DenseVec::from_element(dim, S::zero());
        neg[i] = -S::one();
        lo[i] = -set.support(&neg).unwrap_or(S::zero());
    }
    BoxSet::new(lo, hi)
}

/// Convex hull of two sets via their vertex sets, re-expressed in whichever
/// representation `reference` already uses. Used by the reachability
/// engine's first-segment bloating step (`spec.md` §4.8 step 4), which
/// needs `hull(X0', Phi * X0')` and no representation exposes hull as a
/// native operation.
pub fn convex_hull<S: Scalar>(
    a: &ConvexSetVariant<S>,
    b: &ConvexSetVariant<S>,
    reference: Representation,
    generator_budget: usize,
) -> ConvexSetVariant<S> {
    let dim = a.dim();
    let mut points = a.vertices();
    points.extend(b.vertices());
    let hulled = VPolytope::new(dim, points).reduce_redundancy();
    to_representation(&ConvexSetVariant::VPoly(hulled), reference, generator_budget)
}

fn expand_to_cover_axis_support<S: Scalar>(mut z: Zonotope<S>, set: &ConvexSetVariant<S>) -> Zonotope<S> {
    let dim = z.dim();
    for axis in 0..dim {
        let mut plus = DenseVec::from_element(dim, S::zero());
        plus[axis] = S::one();
        let Some(true_support) = set.support(&plus) else { continue };
        let current = z.support(&plus);
        if true_support > current {
            let diff = true_support - current;
            let mut col = DenseVec::from_element(dim, S::zero());
            col[axis] = diff;
            z = append_generator(&z, &col);
        }
    }
    z
}

fn append_generator<S: Scalar>(z: &Zonotope<S>, col: &DenseVec<S>) -> Zonotope<S> {
    let dim = z.dim();
    let k = z.num_generators();
    let mut generators = DenseMat::<S>::from_element(dim, k + 1, S::zero());
    for c in 0..k {
        for r in 0..dim {
            generators[(r, c)] = z.generators()[(r, c)].clone();
        }
    }
    for r in 0..dim {
        generators[(r, k)] = col[r].clone();
    }
    Zonotope::new(z.center().clone(), generators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::HalfSpace;

    #[test]
    fn box_round_trips_through_hpolytope() {
        let b = BoxSet::new(DenseVec::from_vec(vec![0.0, 0.0]), DenseVec::from_vec(vec![1.0, 1.0]));
        let h = box_to_hpolytope(&b);
        for v in b.vertices() {
            assert!(h.contains_point(&v));
        }
        let back = hpolytope_to_box(&h);
        assert_eq!(*back.lo(), *b.lo());
        assert_eq!(*back.hi(), *b.hi());
    }

    #[test]
    fn hexagon_to_zonotope_contains_every_vertex() {
        // Regular hexagon centered at the origin, circumradius 1.
        let mut half_spaces = Vec::new();
        let mut vertices = Vec::new();
        for k in 0..6 {
            let angle = std::f64::consts::PI / 3.0 * k as f64;
            vertices.push(Point::new(DenseVec::from_vec(vec![angle.cos(), angle.sin()])));
        }
        for k in 0..6 {
            let a = &vertices[k];
            let b = &vertices[(k + 1) % 6];
            let edge = DenseVec::from_vec(vec![b.coords[0] - a.coords[0], b.coords[1] - a.coords[1]]);
            let normal = DenseVec::from_vec(vec![edge[1], -edge[0]]);
            let offset = normal[0] * a.coords[0] + normal[1] * a.coords[1];
            let (normal, offset) = if normal[0] * 0.0 + normal[1] * 0.0 > offset {
                (DenseVec::from_vec(vec![-normal[0], -normal[1]]), -offset)
            } else {
                (normal, offset)
            };
            half_spaces.push(HalfSpace::new(normal, offset));
        }
        let hexagon = HPolytope::new(2, half_spaces);
        let hexagon_variant = ConvexSetVariant::HPoly(hexagon.clone());
        let zonotope = to_zonotope(&hexagon_variant, 8);
        for v in hexagon.vertices() {
            assert!(zonotope.contains_point(&v), "zonotope must contain hexagon vertex {:?}", v);
        }
    }

    #[test]
    fn vpolytope_to_hpolytope_recovers_triangle_vertices() {
        let v = VPolytope::new(
            2,
            vec![
                Point::new(DenseVec::from_vec(vec![0.0, 0.0])),
                Point::new(DenseVec::from_vec(vec![1.0, 0.0])),
                Point::new(DenseVec::from_vec(vec![0.0, 1.0])),
            ],
        );
        let h = vpolytope_to_hpolytope(&v);
        for p in v.points() {
            assert!(h.contains_point(p));
        }
        assert!(!h.contains_point(&Point::new(DenseVec::from_vec(vec![1.0, 1.0]))));
    }
}

//! The convex-set representation family behind one capability interface
//! (`spec.md` §2, §3).
//!
//! Six concrete representations (box, H-polytope, V-polytope, zonotope,
//! orthogonal polyhedron, support function) each live in their own module;
//! [`ConvexSetVariant`] is the tagged-variant enum the reachability engine
//! actually programs against, taking the "variant" option `spec.md` §9
//! names explicitly over per-concrete-type monomorphisation. Dispatch is
//! hand-written (a `match` per method) rather than macro-generated: the
//! `enum_dispatch` crate was considered (grounded on `amadavan-copters`,
//! the one pack example that leans on it for this exact "several concrete
//! backends behind one interface" shape) but its macro targets non-generic
//! enums, and this enum is generic over [`Scalar`] — see DESIGN.md.

pub mod box_set;
pub mod hpoly;
pub mod orthogonal;
pub mod support;
pub mod vpoly;
pub mod zonotope;

pub use box_set::BoxSet;
pub use hpoly::{HPolytope, ReduceStrategy};
pub use orthogonal::OrthogonalPolyhedron;
pub use support::{SupportEval, SupportFunction};
pub use vpoly::VPolytope;
pub use zonotope::Zonotope;

use crate::geometry::{HalfSpace, Point};
use crate::linalg::{DenseMat, DenseVec};
use crate::scalar::Scalar;

/// The capability set every representation exposes (`spec.md` §2's
/// "common geometric interface"): emptiness, containment, intersection
/// with half-spaces, affine image, Minkowski sum, vertex enumeration, and
/// directional support.
pub trait ConvexSet<S: Scalar> {
    fn dim(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn contains_point(&self, p: &Point<S>) -> bool;
    /// `None` means unbounded in this direction.
    fn support(&self, direction: &DenseVec<S>) -> Option<S>;
    fn affine_image(&self, a: &DenseMat<S>, b: &DenseVec<S>) -> ConvexSetVariant<S>;
    fn minkowski_sum(&self, other: &ConvexSetVariant<S>) -> ConvexSetVariant<S>;
    fn intersect_half_spaces(&self, half_spaces: &[HalfSpace<S>]) -> ConvexSetVariant<S>;
    fn vertices(&self) -> Vec<Point<S>>;
}

/// Tagged union over the six representations named in `spec.md` §2/§3.
#[derive(Clone, Debug)]
pub enum ConvexSetVariant<S: Scalar> {
    Box(BoxSet<S>),
    HPoly(HPolytope<S>),
    VPoly(VPolytope<S>),
    Zonotope(Zonotope<S>),
    Orthogonal(OrthogonalPolyhedron<S>),
    Support(SupportFunction<S>),
}

impl<S: Scalar> ConvexSetVariant<S> {
    /// Wrap `self` as a support-function leaf (template-directions form,
    /// used whenever an operation's two operands don't share a concrete
    /// representation; `spec.md` §4.2).
    pub fn to_support(&self) -> SupportFunction<S> {
        match self {
            ConvexSetVariant::Support(sf) => sf.clone(),
            other => SupportFunction::leaf(other.clone(), other.dim()),
        }
    }

    /// Best-effort reduction to an explicit H-polytope. Exact for `Box` and
    /// `HPoly`; exact via facet enumeration for `VPoly`; exact via
    /// sign-vertex enumeration and hull for `Zonotope` (`spec.md` §4.7);
    /// approximate (bounding box) for `Orthogonal`; delegates to the tree's
    /// own best-effort reduction for `Support`.
    pub fn to_hpolytope_approx(&self, dim: usize) -> Option<HPolytope<S>> {
        match self {
            ConvexSetVariant::Box(b) => {
                let points = b.vertices();
                Some(HPolytope::new(dim, crate::vertex_enum::facets_from_points(dim, &points)))
            }
            ConvexSetVariant::HPoly(h) => Some(h.clone()),
            ConvexSetVariant::VPoly(v) => {
                Some(HPolytope::new(dim, crate::vertex_enum::facets_from_points(dim, v.points())))
            }
            ConvexSetVariant::Zonotope(z) => {
                let points = z.sign_vertices();
                Some(HPolytope::new(dim, crate::vertex_enum::facets_from_points(dim, &points)))
            }
            ConvexSetVariant::Orthogonal(o) => o.bounding_box().map(|(lo, hi)| {
                let b = BoxSet::new(lo, hi);
                HPolytope::new(dim, crate::vertex_enum::facets_from_points(dim, &b.vertices()))
            }),
            ConvexSetVariant::Support(sf) => sf.as_hpolytope(),
        }
    }
}

impl<S: Scalar> ConvexSet<S> for ConvexSetVariant<S> {
    fn dim(&self) -> usize {
        match self {
            ConvexSetVariant::Box(b) => b.dim(),
            ConvexSetVariant::HPoly(h) => h.dim(),
            ConvexSetVariant::VPoly(v) => v.dim(),
            ConvexSetVariant::Zonotope(z) => z.dim(),
            ConvexSetVariant::Orthogonal(o) => o.dim(),
            ConvexSetVariant::Support(s) => s.dim(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            ConvexSetVariant::Box(b) => b.is_empty(),
            ConvexSetVariant::HPoly(h) => h.is_empty(),
            ConvexSetVariant::VPoly(v) => v.is_empty(),
            ConvexSetVariant::Zonotope(_) => false,
            ConvexSetVariant::Orthogonal(o) => o.is_empty(),
            ConvexSetVariant::Support(s) => s.as_hpolytope().map(|h| h.is_empty()).unwrap_or(false),
        }
    }

    fn contains_point(&self, p: &Point<S>) -> bool {
        match self {
            ConvexSetVariant::Box(b) => b.contains_point(p),
            ConvexSetVariant::HPoly(h) => h.contains_point(p),
            ConvexSetVariant::VPoly(v) => v.contains_point(p),
            ConvexSetVariant::Zonotope(z) => z.contains_point(p),
            ConvexSetVariant::Orthogonal(o) => {
                let idx: Vec<i64> = (0..o.dim()).map(|i| (p.coords[i].clone() / o.cell_size()).to_f64().floor() as i64).collect();
                o.is_inside(&idx)
            }
            ConvexSetVariant::Support(s) => {
                s.as_hpolytope().map(|h| h.contains_point(p)).unwrap_or(false)
            }
        }
    }

    fn support(&self, direction: &DenseVec<S>) -> Option<S> {
        match self {
            ConvexSetVariant::Box(b) => Some(b.support(direction)),
            ConvexSetVariant::HPoly(h) => h.support_eval(direction),
            ConvexSetVariant::VPoly(v) => {
                if v.is_empty() {
                    None
                } else {
                    Some(v.support(direction))
                }
            }
            ConvexSetVariant::Zonotope(z) => Some(z.support(direction)),
            ConvexSetVariant::Orthogonal(o) => o.bounding_box().map(|(lo, hi)| BoxSet::new(lo, hi).support(direction)),
            ConvexSetVariant::Support(s) => {
                let r = s.evaluate(direction);
                r.value
            }
        }
    }

    fn affine_image(&self, a: &DenseMat<S>, b: &DenseVec<S>) -> ConvexSetVariant<S> {
        match self {
            ConvexSetVariant::Box(box_set) => ConvexSetVariant::Box(box_set.affine_image_bounding(a, b)),
            ConvexSetVariant::HPoly(h) => ConvexSetVariant::HPoly(h.affine_image(a, b)),
            ConvexSetVariant::VPoly(v) => ConvexSetVariant::VPoly(v.affine_image(a, b)),
            ConvexSetVariant::Zonotope(z) => ConvexSetVariant::Zonotope(z.affine_image(a, b)),
            ConvexSetVariant::Orthogonal(o) => match o.bounding_box() {
                Some((lo, hi)) => ConvexSetVariant::Box(BoxSet::new(lo, hi).affine_image_bounding(a, b)),
                None => ConvexSetVariant::Orthogonal(o.clone()),
            },
            ConvexSetVariant::Support(sf) => ConvexSetVariant::Support(sf.affine(a, b)),
        }
    }

    fn minkowski_sum(&self, other: &ConvexSetVariant<S>) -> ConvexSetVariant<S> {
        match (self, other) {
            (ConvexSetVariant::Box(a), ConvexSetVariant::Box(b)) => ConvexSetVariant::Box(a.minkowski_sum(b)),
            (ConvexSetVariant::HPoly(a), ConvexSetVariant::HPoly(b)) => ConvexSetVariant::HPoly(a.minkowski_sum(b)),
            (ConvexSetVariant::VPoly(a), ConvexSetVariant::VPoly(b)) => ConvexSetVariant::VPoly(a.minkowski_sum(b)),
            (ConvexSetVariant::Zonotope(a), ConvexSetVariant::Zonotope(b)) => {
                ConvexSetVariant::Zonotope(a.minkowski_sum(b))
            }
            _ => ConvexSetVariant::Support(self.to_support().minkowski_sum(&other.to_support())),
        }
    }

    fn intersect_half_spaces(&self, half_spaces: &[HalfSpace<S>]) -> ConvexSetVariant<S> {
        match self {
            ConvexSetVariant::HPoly(h) => ConvexSetVariant::HPoly(h.intersect_half_spaces(half_spaces)),
            ConvexSetVariant::Box(b) => {
                let mut current = b.clone();
                let mut all_axis_aligned = true;
                for h in half_spaces {
                    match current.intersect_half_space(h) {
                        Some(next) => current = next,
                        None => {
                            all_axis_aligned = false;
                            break;
                        }
                    }
                }
                if all_axis_aligned {
                    ConvexSetVariant::Box(current)
                } else {
                    let dim = b.dim();
                    let base = self.to_hpolytope_approx(dim).unwrap_or_else(|| HPolytope::new(dim, Vec::new()));
                    ConvexSetVariant::HPoly(base.intersect_half_spaces(half_spaces))
                }
            }
            ConvexSetVariant::Support(sf) => ConvexSetVariant::Support(sf.intersect_half_spaces(half_spaces)),
            other => {
                let dim = other.dim();
                match other.to_hpolytope_approx(dim) {
                    Some(h) => ConvexSetVariant::HPoly(h.intersect_half_spaces(half_spaces)),
                    None => ConvexSetVariant::Support(other.to_support().intersect_half_spaces(half_spaces)),
                }
            }
        }
    }

    fn vertices(&self) -> Vec<Point<S>> {
        match self {
            ConvexSetVariant::Box(b) => b.vertices(),
            ConvexSetVariant::HPoly(h) => h.vertices(),
            ConvexSetVariant::VPoly(v) => v.points().to_vec(),
            ConvexSetVariant::Zonotope(z) => z.sign_vertices(),
            ConvexSetVariant::Orthogonal(o) => o.vertices(),
            ConvexSetVariant::Support(sf) => sf.as_hpolytope().map(|h| h.vertices()).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_of(lo: &[f64], hi: &[f64]) -> ConvexSetVariant<f64> {
        ConvexSetVariant::Box(BoxSet::new(DenseVec::from_vec(lo.to_vec()), DenseVec::from_vec(hi.to_vec())))
    }

    #[test]
    fn box_minkowski_sum_stays_box() {
        let a = box_of(&[0.0, 0.0], &[1.0, 1.0]);
        let b = box_of(&[-0.5, -0.5], &[0.5, 0.5]);
        let sum = a.minkowski_sum(&b);
        assert!(matches!(sum, ConvexSetVariant::Box(_)));
        assert!(sum.contains_point(&Point::new(DenseVec::from_vec(vec![1.5, 1.5]))));
    }

    #[test]
    fn cross_type_minkowski_sum_falls_back_to_support() {
        let a = box_of(&[0.0, 0.0], &[1.0, 1.0]);
        let b = ConvexSetVariant::VPoly(VPolytope::new(2, vec![Point::new(DenseVec::from_vec(vec![0.0, 0.0]))]));
        let sum = a.minkowski_sum(&b);
        assert!(matches!(sum, ConvexSetVariant::Support(_)));
        let support = sum.support(&DenseVec::from_vec(vec![1.0, 0.0])).unwrap();
        assert!((support - 1.0).abs() < 1e-9);
    }

    #[test]
    fn affine_image_of_box_stays_bounding_box() {
        let a = box_of(&[0.0, 0.0], &[1.0, 1.0]);
        let m = DenseMat::<f64>::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 2.0]);
        let image = a.affine_image(&m, &DenseVec::from_vec(vec![0.0, 0.0]));
        assert!(matches!(image, ConvexSetVariant::Box(_)));
        assert!(image.contains_point(&Point::new(DenseVec::from_vec(vec![2.0, 2.0]))));
    }
}

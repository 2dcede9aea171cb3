//! Plot emitter interface (`spec.md` §6).
//!
//! The emitter itself — turning polygons into a vector image — is an
//! external collaborator and out of scope here. What belongs to this crate
//! is the input contract the emitter expects: each polygon's points
//! reordered into an outline by a Graham-scan over polar angle around the
//! lexicographic minimum, ties broken by keeping the farther point.

use crate::scalar::Scalar;
use crate::sets::{ConvexSet, ConvexSetVariant};

/// A single polygon's outline, ready to hand to a [`PlotEmitter`].
#[derive(Clone, Debug, PartialEq)]
pub struct PlotPolygon {
    points: Vec<(f64, f64)>,
}

impl PlotPolygon {
    /// Reorders `points` into an outline by polar angle around the
    /// lexicographically smallest point; ties in angle keep the farther
    /// point (`spec.md` §6's plot-emitter input contract).
    pub fn from_points(mut points: Vec<(f64, f64)>) -> Self {
        if points.len() < 3 {
            return Self { points };
        }
        let pivot_idx = (0..points.len())
            .min_by(|&a, &b| points[a].partial_cmp(&points[b]).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap();
        let pivot = points[pivot_idx];
        points.swap(0, pivot_idx);
        let rest = &mut points[1..];
        rest.sort_by(|&p, &q| {
            let angle_p = (p.1 - pivot.1).atan2(p.0 - pivot.0);
            let angle_q = (q.1 - pivot.1).atan2(q.0 - pivot.0);
            angle_p.partial_cmp(&angle_q).unwrap_or(std::cmp::Ordering::Equal).then_with(|| {
                let dist_p = (p.0 - pivot.0).powi(2) + (p.1 - pivot.1).powi(2);
                let dist_q = (q.0 - pivot.0).powi(2) + (q.1 - pivot.1).powi(2);
                dist_q.partial_cmp(&dist_p).unwrap_or(std::cmp::Ordering::Equal)
            })
        });
        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

/// Anything that can be projected to a 2D outline for plotting. Only makes
/// sense for sets whose ambient dimension is 2; higher-dimensional sets
/// have no defined projection here (out of scope, `spec.md` doesn't name
/// one).
pub trait Plottable<S: Scalar> {
    fn plot_outline(&self) -> Option<PlotPolygon>;
}

impl<S: Scalar> Plottable<S> for ConvexSetVariant<S> {
    fn plot_outline(&self) -> Option<PlotPolygon> {
        if self.dim() != 2 {
            return None;
        }
        let points: Vec<(f64, f64)> =
            self.vertices().iter().map(|p| (p.coords[0].to_f64(), p.coords[1].to_f64())).collect();
        if points.is_empty() {
            return None;
        }
        Some(PlotPolygon::from_points(points))
    }
}

/// The external collaborator itself: consumes already-ordered polygons and
/// produces a vector image. No implementation lives in this crate —
/// `spec.md` §6 explicitly scopes the renderer out.
pub trait PlotEmitter {
    fn emit(&self, polygons: &[PlotPolygon]) -> Result<(), crate::error::ReachError>;
}

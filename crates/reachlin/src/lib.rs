//! Forward reachability of piecewise-affine hybrid automata.
//!
//! Cross-refs live in doc comments:
//! TH: anchors refer to docs/design/*.md headings (see DESIGN.md at the
//! workspace root for the grounding ledger).
//!
//! The crate is organised leaves-first: [`scalar`] and [`linalg`] give the
//! number/matrix facade, [`geometry`] the shared point/half-space
//! primitives, [`sets`] the family of convex-set representations behind one
//! [`sets::ConvexSet`] interface, [`optimizer`] the linear-programming core
//! they delegate directional queries to, [`convert`] the pairwise
//! representation converters, [`vertex_enum`] reverse-search vertex
//! enumeration, [`automaton`] the hybrid-automaton model, and [`reach`] the
//! flowpipe-construction and fixpoint-exploration engine on top of all of
//! the above.

pub mod automaton;
pub mod config;
pub mod convert;
pub mod error;
pub mod geometry;
pub mod linalg;
pub mod optimizer;
pub mod plot;
pub mod reach;
pub mod scalar;
pub mod sets;
pub mod testkit;
pub mod vertex_enum;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::automaton::{Automaton, Location, LocationId, Transition, TransitionId};
    pub use crate::config::{ReachConfig, Representation, SimplificationStrategy};
    pub use crate::error::ReachError;
    pub use crate::geometry::{HalfSpace, Point};
    pub use crate::reach::{compute_forward_reachability, FlowpipeId, ReachOutcome};
    pub use crate::scalar::{Rational, Scalar};
    pub use crate::sets::{BoxSet, ConvexSet, HPolytope, VPolytope, Zonotope};
}

//! Crate-wide error type.
//!
//! Purpose
//! - Most operations in this crate never fail: an empty intersection, an
//!   unbounded support value, or a degenerate LP are values (see
//!   [`crate::optimizer::OptimizerStatus`]), not errors. The only thing that
//!   actually aborts a run is a malformed automaton — a programming error
//!   the caller could have prevented by construction.
//!
//! Why `thiserror`
//! - Centralising the one error class the engine can raise behind a single
//!   enum, rather than threading `Result<_, String>` everywhere, keeps the
//!   public entry point's signature stable as the checks it performs grow.

use thiserror::Error;

/// The one error class the engine raises: a malformed automaton.
///
/// Every other "failure" described in the specification (empty sets,
/// unbounded supports, degenerate linear systems) is represented as a value
/// and never reaches this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReachError {
    /// A transition referenced a location id absent from the automaton.
    #[error("transition {transition:?} references unknown location {location:?}")]
    UnknownLocation {
        transition: crate::automaton::TransitionId,
        location: crate::automaton::LocationId,
    },

    /// A flow matrix, invariant, guard, or reset had a dimension mismatch.
    #[error("dimension mismatch in {context}: expected {expected}, got {got}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    /// An initial state named a location id absent from the automaton.
    #[error("initial state references unknown location {location:?}")]
    UnknownInitialLocation { location: crate::automaton::LocationId },
}

pub type ReachResult<T> = Result<T, ReachError>;

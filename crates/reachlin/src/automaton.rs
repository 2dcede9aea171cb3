//! Hybrid automaton data model (`spec.md` §3).
//!
//! Locations and transitions are created up front and live for the whole
//! run (`spec.md` §3's lifecycle note), so both are stored in flat arenas
//! addressed by stable integer ids rather than the source's pointer graph;
//! the id generator that used to live as a free-floating counter becomes a
//! field of [`Automaton`] (`spec.md` §9).

use crate::error::{ReachError, ReachResult};
use crate::geometry::Point;
use crate::linalg::{DenseMat, DenseVec};
use crate::scalar::Scalar;
use crate::sets::HPolytope;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LocationId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransitionId(pub usize);

/// A location's invariant. `Universe` is a shortcut for the unconstrained
/// `HPolytope::universe(n)` so that locations without an explicit invariant
/// don't pay for an empty half-space list to be intersected every segment.
#[derive(Clone, Debug)]
pub enum Invariant<S: Scalar> {
    Universe,
    Constrained(HPolytope<S>),
}

impl<S: Scalar> Invariant<S> {
    pub fn intersect(&self, set: &HPolytope<S>) -> HPolytope<S> {
        match self {
            Invariant::Universe => set.clone(),
            Invariant::Constrained(inv) => set.intersect_half_spaces(inv.half_spaces()),
        }
    }
}

/// `Location(n)`: a flow matrix `A` of size `(n+1)x(n+1)` (the last row and
/// column encode the affine term, `spec.md` §3), an invariant, and the ids
/// of its outgoing transitions.
#[derive(Clone, Debug)]
pub struct Location<S: Scalar> {
    id: LocationId,
    dim: usize,
    flow: DenseMat<S>,
    invariant: Invariant<S>,
    outgoing: Vec<TransitionId>,
}

impl<S: Scalar> Location<S> {
    pub fn id(&self) -> LocationId {
        self.id
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn flow(&self) -> &DenseMat<S> {
        &self.flow
    }

    pub fn invariant(&self) -> &Invariant<S> {
        &self.invariant
    }

    pub fn outgoing(&self) -> &[TransitionId] {
        &self.outgoing
    }
}

/// `Transition(n)`: source and target location ids, a guard, and a reset
/// affine map `x -> Mx + b`.
#[derive(Clone, Debug)]
pub struct Transition<S: Scalar> {
    id: TransitionId,
    source: LocationId,
    target: LocationId,
    guard: HPolytope<S>,
    reset_m: DenseMat<S>,
    reset_b: DenseVec<S>,
}

impl<S: Scalar> Transition<S> {
    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn source(&self) -> LocationId {
        self.source
    }

    pub fn target(&self) -> LocationId {
        self.target
    }

    pub fn guard(&self) -> &HPolytope<S> {
        &self.guard
    }

    pub fn apply_reset(&self, p: &Point<S>) -> Point<S> {
        let dim = self.reset_m.nrows();
        let coords = DenseVec::from_iterator(dim, (0..dim).map(|row| {
            let mut acc = self.reset_b[row].clone();
            for col in 0..self.reset_m.ncols() {
                acc = acc + self.reset_m[(row, col)].clone() * p.coords[col].clone();
            }
            acc
        }));
        Point::new(coords)
    }
}

/// `Hybrid automaton(n)`: locations, transitions, and an initial-state set
/// `{(location, H-polytope)}`. The id generator is a field rather than a
/// free-standing counter so that two automata never collide on ids.
#[derive(Clone, Debug)]
pub struct Automaton<S: Scalar> {
    dim: usize,
    locations: Vec<Location<S>>,
    transitions: Vec<Transition<S>>,
    initial: Vec<(LocationId, HPolytope<S>)>,
}

impl<S: Scalar> Automaton<S> {
    pub fn new(dim: usize) -> Self {
        Self { dim, locations: Vec::new(), transitions: Vec::new(), initial: Vec::new() }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Adds a location, validating the flow matrix's size against `dim`.
    /// Returns the freshly assigned id; ids are handed out in insertion
    /// order (`spec.md` §4.8's determinism requirement).
    pub fn add_location(&mut self, flow: DenseMat<S>, invariant: Invariant<S>) -> ReachResult<LocationId> {
        let expected = self.dim + 1;
        if flow.nrows() != expected || flow.ncols() != expected {
            return Err(ReachError::DimensionMismatch {
                context: "location flow matrix",
                expected,
                got: flow.nrows().max(flow.ncols()),
            });
        }
        let id = LocationId(self.locations.len());
        self.locations.push(Location { id, dim: self.dim, flow, invariant, outgoing: Vec::new() });
        Ok(id)
    }

    /// Adds a transition, validating that both endpoints exist and that the
    /// reset map's dimensions match.
    pub fn add_transition(
        &mut self,
        source: LocationId,
        target: LocationId,
        guard: HPolytope<S>,
        reset_m: DenseMat<S>,
        reset_b: DenseVec<S>,
    ) -> ReachResult<TransitionId> {
        let id = TransitionId(self.transitions.len());
        if self.location(source).is_none() {
            return Err(ReachError::UnknownLocation { transition: id, location: source });
        }
        if self.location(target).is_none() {
            return Err(ReachError::UnknownLocation { transition: id, location: target });
        }
        if reset_m.nrows() != self.dim || reset_b.len() != self.dim {
            return Err(ReachError::DimensionMismatch {
                context: "transition reset map",
                expected: self.dim,
                got: reset_m.nrows(),
            });
        }
        self.transitions.push(Transition { id, source, target, guard, reset_m, reset_b });
        self.locations[source.0].outgoing.push(id);
        Ok(id)
    }

    /// Registers an initial `(location, set)` pair, validating the location
    /// id.
    pub fn add_initial(&mut self, location: LocationId, set: HPolytope<S>) -> ReachResult<()> {
        if self.location(location).is_none() {
            return Err(ReachError::UnknownInitialLocation { location });
        }
        self.initial.push((location, set));
        Ok(())
    }

    pub fn location(&self, id: LocationId) -> Option<&Location<S>> {
        self.locations.get(id.0)
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition<S>> {
        self.transitions.get(id.0)
    }

    pub fn locations(&self) -> &[Location<S>] {
        &self.locations
    }

    pub fn transitions(&self) -> &[Transition<S>] {
        &self.transitions
    }

    pub fn initial_states(&self) -> &[(LocationId, HPolytope<S>)] {
        &self.initial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::HalfSpace;

    fn identity_flow(dim: usize) -> DenseMat<f64> {
        DenseMat::<f64>::identity(dim + 1, dim + 1)
    }

    #[test]
    fn add_location_rejects_wrong_flow_size() {
        let mut a = Automaton::<f64>::new(2);
        let bad_flow = DenseMat::<f64>::identity(2, 2);
        let err = a.add_location(bad_flow, Invariant::Universe).unwrap_err();
        assert!(matches!(err, ReachError::DimensionMismatch { .. }));
    }

    #[test]
    fn add_transition_rejects_unknown_location() {
        let mut a = Automaton::<f64>::new(2);
        let loc = a.add_location(identity_flow(2), Invariant::Universe).unwrap();
        let guard = HPolytope::universe(2);
        let err = a
            .add_transition(loc, LocationId(99), guard, DenseMat::identity(2, 2), DenseVec::from_element(2, 0.0))
            .unwrap_err();
        assert!(matches!(err, ReachError::UnknownLocation { .. }));
    }

    #[test]
    fn transitions_register_as_outgoing_on_source() {
        let mut a = Automaton::<f64>::new(1);
        let l0 = a.add_location(identity_flow(1), Invariant::Universe).unwrap();
        let l1 = a.add_location(identity_flow(1), Invariant::Universe).unwrap();
        let t = a
            .add_transition(
                l0,
                l1,
                HPolytope::universe(1),
                DenseMat::identity(1, 1),
                DenseVec::from_element(1, 0.0),
            )
            .unwrap();
        assert_eq!(a.location(l0).unwrap().outgoing(), &[t]);
    }

    #[test]
    fn initial_state_validates_location() {
        let mut a = Automaton::<f64>::new(1);
        let err = a.add_initial(LocationId(0), HPolytope::universe(1)).unwrap_err();
        assert!(matches!(err, ReachError::UnknownInitialLocation { .. }));
    }

    #[test]
    fn invariant_universe_intersect_is_identity() {
        let h = HPolytope::new(1, vec![HalfSpace::new(DenseVec::from_vec(vec![1.0]), 1.0)]);
        let out = Invariant::<f64>::Universe.intersect(&h);
        assert_eq!(out.half_spaces().len(), h.half_spaces().len());
    }
}

//! Forward reachability: flowpipe construction, discrete post, and the
//! fixpoint loop over the location graph (`spec.md` §4.8).
//!
//! Parallelisation follows `spec.md` §5: each (location, entry-set) pair in
//! the frontier is a pure function of its inputs, so one worker per pair is
//! spawned with `std::thread::scope`; the only mutable resource shared
//! across workers is each pair's own result slot, which is why
//! [`crate::sets::SupportFunction`]'s tree is `Arc`-shared rather than
//! `Rc`-shared (`spec.md` §5's "shared resources" note).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::automaton::{Automaton, Invariant, LocationId};
use crate::config::{ReachConfig, SimplificationSettings};
use crate::convert;
use crate::geometry::Point;
use crate::linalg::{matrix_exponential, DenseMat, DenseVec};
use crate::scalar::Scalar;
use crate::sets::{BoxSet, ConvexSet, ConvexSetVariant, VPolytope};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FlowpipeId(pub usize);

/// Result of [`compute_forward_reachability`]: every explored flowpipe's
/// segment sequence, the location it belongs to (indexed the same way, so
/// `flowpipe_locations[i]` is the location of `flowpipes[i]`), and whether
/// the run reached its bound or was cut short by cancellation.
#[derive(Clone, Debug)]
pub struct ReachOutcome<S: Scalar> {
    pub flowpipes: Vec<Vec<ConvexSetVariant<S>>>,
    pub flowpipe_locations: Vec<LocationId>,
    pub was_complete: bool,
    pub cancellation_reason: Option<String>,
}

/// An externally observable cancellation signal (`spec.md` §5), checked
/// between segments within a flowpipe and between frontier expansions.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Generator budget used whenever a flowpipe segment is converted through
/// an intermediate V-polytope representation (e.g. convex hull, discrete
/// post) before landing back in the configured representation. Not
/// user-configurable, unlike `config.simplification` which is applied
/// per-segment in [`build_flowpipe`].
const TRANSIENT_GENERATOR_BUDGET: usize = 32;

/// `spec.md` §4.8's main entry point.
pub fn compute_forward_reachability<S: Scalar>(
    automaton: &Automaton<S>,
    config: &ReachConfig,
    cancel: &CancellationToken,
) -> ReachOutcome<S> {
    let mut flowpipes: Vec<Vec<ConvexSetVariant<S>>> = Vec::new();
    let mut flowpipe_locations: Vec<LocationId> = Vec::new();
    let mut was_complete = true;
    let mut cancellation_reason: Option<String> = None;

    let mut frontier: Vec<(LocationId, ConvexSetVariant<S>)> = automaton
        .initial_states()
        .iter()
        .map(|(loc, set)| {
            let wrapped = ConvexSetVariant::HPoly(set.clone());
            (*loc, convert::to_representation(&wrapped, config.representation, TRANSIENT_GENERATOR_BUDGET))
        })
        .collect();

    let mut depth = 0u32;
    loop {
        if cancel.is_cancelled() {
            was_complete = false;
            cancellation_reason = Some("cancelled before frontier expansion".to_string());
            break;
        }
        if frontier.is_empty() {
            break;
        }

        let results = expand_frontier(automaton, &frontier, config, cancel);
        for ((loc, _), segments) in frontier.iter().zip(results.iter()) {
            flowpipes.push(segments.clone());
            flowpipe_locations.push(*loc);
        }

        // `jump_depth` bounds the number of discrete transitions taken from
        // any initial state; at the bound, flowpipes are still computed
        // (above) but no further transition-enabling intersection happens
        // (`spec.md` §8 scenario 6).
        if depth >= config.jump_depth {
            break;
        }
        if cancel.is_cancelled() {
            was_complete = false;
            cancellation_reason = Some("cancelled between frontier expansions".to_string());
            break;
        }

        let mut next_frontier = Vec::new();
        for ((loc, _), segments) in frontier.into_iter().zip(results.into_iter()) {
            next_frontier.extend(discrete_post_for_flowpipe(
                automaton,
                loc,
                &segments,
                config.representation,
                TRANSIENT_GENERATOR_BUDGET,
            ));
        }
        frontier = next_frontier;
        depth += 1;
    }

    ReachOutcome { flowpipes, flowpipe_locations, was_complete, cancellation_reason }
}

/// One worker per frontier pair, collected into a pre-sized slot array so
/// that flowpipe ids stay deterministic (assigned afterwards in frontier
/// order) regardless of which worker finishes first.
fn expand_frontier<S: Scalar>(
    automaton: &Automaton<S>,
    frontier: &[(LocationId, ConvexSetVariant<S>)],
    config: &ReachConfig,
    cancel: &CancellationToken,
) -> Vec<Vec<ConvexSetVariant<S>>> {
    let slots: Mutex<Vec<Option<Vec<ConvexSetVariant<S>>>>> =
        Mutex::new((0..frontier.len()).map(|_| None).collect());
    thread::scope(|scope| {
        for (idx, (loc, entry)) in frontier.iter().enumerate() {
            let slots = &slots;
            scope.spawn(move || {
                let segments = build_flowpipe(automaton, *loc, entry.clone(), config, cancel);
                slots.lock().expect("flowpipe result mutex poisoned")[idx] = Some(segments);
            });
        }
    });
    slots
        .into_inner()
        .expect("flowpipe result mutex poisoned")
        .into_iter()
        .map(|s| s.expect("every frontier slot is filled by its worker"))
        .collect()
}

/// Per-location flowpipe construction for entry set `entry` in location
/// `loc` (`spec.md` §4.8, steps 1-5).
fn build_flowpipe<S: Scalar>(
    automaton: &Automaton<S>,
    loc: LocationId,
    entry: ConvexSetVariant<S>,
    config: &ReachConfig,
    cancel: &CancellationToken,
) -> Vec<ConvexSetVariant<S>> {
    let location = automaton.location(loc).expect("frontier references a known location");

    let dim = automaton.dim();

    // Step 1-2: X0' = X0 ∩ invariant(loc); emit as segment 0.
    let x0 = simplify_segment(intersect_invariant(&entry, location.invariant()), dim, &config.simplification);
    if x0.is_empty() {
        return vec![x0];
    }
    let mut segments = vec![x0.clone()];

    let segment_count = config.segment_count();
    if segment_count == 0 {
        return segments;
    }

    // Step 3: Phi = exp(A*delta), split into linear part and translation.
    let (phi1, phi2) = discretize(location.flow(), config.time_step);

    // Step 4: bloated first segment.
    let stepped = x0.affine_image(&phi1, &phi2);
    let hulled = convert::convex_hull(&x0, &stepped, config.representation, TRANSIENT_GENERATOR_BUDGET);
    let radius = hausdorff_bloat_radius(location.flow(), config.time_step, &x0);
    let bloat_box = ConvexSetVariant::Box(symmetric_box(dim, radius));
    let mut current = simplify_segment(
        intersect_invariant(&hulled.minkowski_sum(&bloat_box), location.invariant()),
        dim,
        &config.simplification,
    );
    segments.push(current.clone());
    if current.is_empty() {
        return segments;
    }

    // Step 5: subsequent segments by the plain affine recurrence.
    for _ in 1..segment_count {
        if cancel.is_cancelled() {
            break;
        }
        let next = simplify_segment(
            intersect_invariant(&current.affine_image(&phi1, &phi2), location.invariant()),
            dim,
            &config.simplification,
        );
        if next.is_empty() {
            break;
        }
        segments.push(next.clone());
        current = next;
    }
    segments
}

/// Applies `spec.md` §6's per-segment simplification, when configured, by
/// reducing the segment's H-polytope approximation along a fixed axis
/// direction template (capped to `settings.directions` when given).
/// Representations with no useful H-polytope approximation (an empty
/// `Support` leaf) pass through unchanged.
fn simplify_segment<S: Scalar>(
    set: ConvexSetVariant<S>,
    dim: usize,
    simplification: &Option<SimplificationSettings>,
) -> ConvexSetVariant<S> {
    let Some(settings) = simplification else {
        return set;
    };
    if set.is_empty() {
        return set;
    }
    let Some(h) = set.to_hpolytope_approx(dim) else {
        return set;
    };
    let directions = axis_directions::<S>(dim, settings.directions);
    let strategy: crate::sets::ReduceStrategy = settings.strategy.into();
    ConvexSetVariant::HPoly(h.reduce_directed(&directions, strategy))
}

/// `+-e_i` for each axis, the template `reduce_directed` works against when
/// the caller hasn't supplied its own directions (`spec.md` §6's
/// `simplification.directions` is `Template`-strategy-specific; the other
/// strategies just need *some* spread of directions to steer which facets
/// they touch). `directions` caps the count so `Template` reproduces a
/// caller-chosen template size exactly.
fn axis_directions<S: Scalar>(dim: usize, limit: Option<u32>) -> Vec<DenseVec<S>> {
    let mut dirs = Vec::with_capacity(2 * dim);
    for i in 0..dim {
        let mut pos = DenseVec::from_element(dim, S::zero());
        pos[i] = S::one();
        dirs.push(pos);
        let mut neg = DenseVec::from_element(dim, S::zero());
        neg[i] = -S::one();
        dirs.push(neg);
    }
    if let Some(n) = limit {
        dirs.truncate(n as usize);
    }
    dirs
}

/// Discrete post for one flowpipe: for each outgoing transition, the
/// enabling points from every segment that meets the guard are collected
/// and hulled into the entry set for the transition's target
/// (`spec.md` §4.8's "discrete post from a flowpipe").
fn discrete_post_for_flowpipe<S: Scalar>(
    automaton: &Automaton<S>,
    loc: LocationId,
    segments: &[ConvexSetVariant<S>],
    representation: crate::config::Representation,
    generator_budget: usize,
) -> Vec<(LocationId, ConvexSetVariant<S>)> {
    let location = automaton.location(loc).expect("flowpipe references a known location");
    let dim = automaton.dim();
    let mut fired = Vec::new();
    for &t_id in location.outgoing() {
        let t = automaton.transition(t_id).expect("location references a known transition");
        let mut enabling_points: Vec<Point<S>> = Vec::new();
        let mut enabled = false;
        for s in segments {
            let clipped = s.intersect_half_spaces(t.guard().half_spaces());
            if clipped.is_empty() {
                continue;
            }
            enabled = true;
            for v in clipped.vertices() {
                enabling_points.push(t.apply_reset(&v));
            }
        }
        if enabled && !enabling_points.is_empty() {
            let hulled = VPolytope::new(dim, enabling_points).reduce_redundancy();
            let entry = convert::to_representation(&ConvexSetVariant::VPoly(hulled), representation, generator_budget);
            fired.push((t.target(), entry));
        }
    }
    fired
}

fn intersect_invariant<S: Scalar>(set: &ConvexSetVariant<S>, invariant: &Invariant<S>) -> ConvexSetVariant<S> {
    match invariant {
        Invariant::Universe => set.clone(),
        Invariant::Constrained(h) if crate::config::is_trivial_invariant(h) => set.clone(),
        Invariant::Constrained(h) => set.intersect_half_spaces(h.half_spaces()),
    }
}

fn symmetric_box<S: Scalar>(dim: usize, radius: S) -> BoxSet<S> {
    BoxSet::new(DenseVec::from_element(dim, -radius.clone()), DenseVec::from_element(dim, radius))
}

/// `Phi = exp(A*dt)` split into its leading `n x n` linear block and its
/// affine translation column (`spec.md` §4.8 step 3). The exponential
/// itself is computed in `f64` regardless of `S` — `spec.md` §4.1 notes the
/// matrix exponential is a transcendental function with no exact rational
/// closed form, so both scalar instantiations go through the same `f64`
/// path and convert back through [`Scalar::from_f64`].
fn discretize<S: Scalar>(flow: &DenseMat<S>, dt: f64) -> (DenseMat<S>, DenseVec<S>) {
    let n1 = flow.nrows();
    let n = n1 - 1;
    let mut flow_f64 = DenseMat::<f64>::from_element(n1, n1, 0.0);
    for r in 0..n1 {
        for c in 0..n1 {
            flow_f64[(r, c)] = flow[(r, c)].to_f64();
        }
    }
    let phi = matrix_exponential(&flow_f64, dt);

    let mut phi1 = DenseMat::<S>::from_element(n, n, S::zero());
    for r in 0..n {
        for c in 0..n {
            phi1[(r, c)] = S::from_f64(phi[(r, c)]);
        }
    }
    let phi2 = DenseVec::<S>::from_iterator(n, (0..n).map(|r| S::from_f64(phi[(r, n)])));
    (phi1, phi2)
}

/// Hausdorff bloating radius for the discretisation error of one time step,
/// the closed form from Le Guernic & Girard's zonotope reachability method
/// (`r = (e^{||A||*dt} - 1 - ||A||*dt) * diam(X0)`), applied here to any
/// representation via its own support function rather than only zonotopes.
/// `||A||` is the induced infinity-norm (max absolute row sum) of the
/// flow's linear block; `diam(X0)` is the infinity-norm diameter
/// `max_i (support(e_i) + support(-e_i))`, i.e. the set's support evaluated
/// against the infinity-norm unit ball's extreme directions (`spec.md`
/// §4.8 step 4).
fn hausdorff_bloat_radius<S: Scalar>(flow: &DenseMat<S>, dt: f64, x0: &ConvexSetVariant<S>) -> S {
    let n1 = flow.nrows();
    let n = n1 - 1;
    let mut norm_a = 0.0_f64;
    for r in 0..n {
        let mut row_sum = 0.0;
        for c in 0..n {
            row_sum += flow[(r, c)].to_f64().abs();
        }
        norm_a = norm_a.max(row_sum);
    }

    let dim = x0.dim();
    let mut diam = 0.0_f64;
    for i in 0..dim {
        let mut pos = DenseVec::from_element(dim, S::zero());
        pos[i] = S::one();
        let mut neg = DenseVec::from_element(dim, S::zero());
        neg[i] = -S::one();
        let sp = x0.support(&pos).map(|v| S::to_f64(&v)).unwrap_or(0.0);
        let sn = x0.support(&neg).map(|v| S::to_f64(&v)).unwrap_or(0.0);
        diam = diam.max(sp + sn);
    }

    if norm_a < 1e-12 {
        return S::zero();
    }
    let factor = (norm_a * dt).exp() - 1.0 - norm_a * dt;
    S::from_f64((factor * diam).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Automaton;
    use crate::config::Representation;
    use crate::geometry::HalfSpace;
    use crate::sets::HPolytope;

    fn falling_ball_automaton() -> Automaton<f64> {
        // h' = v, v' = -9.81; homogeneous 3x3 flow matrix.
        let mut a = Automaton::<f64>::new(2);
        let flow = DenseMat::<f64>::from_row_slice(
            3,
            3,
            &[0.0, 1.0, 0.0, 0.0, 0.0, -9.81, 0.0, 0.0, 0.0],
        );
        let invariant = crate::automaton::Invariant::Constrained(HPolytope::new(
            2,
            vec![
                HalfSpace::new(DenseVec::from_vec(vec![1.0, 0.0]), 20.0),
                HalfSpace::new(DenseVec::from_vec(vec![-1.0, 0.0]), 0.0),
                HalfSpace::new(DenseVec::from_vec(vec![0.0, 1.0]), 20.0),
                HalfSpace::new(DenseVec::from_vec(vec![0.0, -1.0]), 20.0),
            ],
        ));
        let loc = a.add_location(flow, invariant).unwrap();
        a.add_initial(
            loc,
            HPolytope::new(
                2,
                vec![
                    HalfSpace::new(DenseVec::from_vec(vec![1.0, 0.0]), 10.2),
                    HalfSpace::new(DenseVec::from_vec(vec![-1.0, 0.0]), -10.0),
                    HalfSpace::new(DenseVec::from_vec(vec![0.0, 1.0]), 0.009),
                    HalfSpace::new(DenseVec::from_vec(vec![0.0, -1.0]), 0.01),
                ],
            ),
        )
        .unwrap();
        a
    }

    fn base_config() -> ReachConfig {
        ReachConfig {
            time_horizon: 0.05,
            time_step: 0.01,
            jump_depth: 0,
            representation: Representation::HPoly,
            simplification: None,
        }
    }

    #[test]
    fn jump_depth_zero_yields_exactly_one_flowpipe_per_initial_location() {
        let a = falling_ball_automaton();
        let cfg = base_config();
        let outcome = compute_forward_reachability(&a, &cfg, &CancellationToken::new());
        assert_eq!(outcome.flowpipes.len(), 1);
        assert!(outcome.was_complete);
    }

    #[test]
    fn empty_intersection_short_circuits_to_one_empty_flowpipe() {
        let mut a = Automaton::<f64>::new(2);
        let flow = DenseMat::<f64>::identity(3, 3);
        let invariant = crate::automaton::Invariant::Constrained(HPolytope::new(
            2,
            vec![HalfSpace::new(DenseVec::from_vec(vec![1.0, 0.0]), -1.0)],
        ));
        let loc = a.add_location(flow, invariant).unwrap();
        a.add_initial(loc, HPolytope::new(2, vec![HalfSpace::new(DenseVec::from_vec(vec![-1.0, 0.0]), 0.0)]))
            .unwrap();
        let cfg = base_config();
        let outcome = compute_forward_reachability(&a, &cfg, &CancellationToken::new());
        assert_eq!(outcome.flowpipes.len(), 1);
        assert_eq!(outcome.flowpipes[0].len(), 1);
        assert!(outcome.flowpipes[0][0].is_empty());
    }

    #[test]
    fn falling_ball_height_decreases_within_invariant_bounds() {
        let a = falling_ball_automaton();
        let mut cfg = base_config();
        cfg.time_horizon = 0.2;
        let outcome = compute_forward_reachability(&a, &cfg, &CancellationToken::new());
        let flowpipe = &outcome.flowpipes[0];
        assert!(flowpipe.len() > 1);
        for seg in flowpipe {
            let hi = seg.support(&DenseVec::from_vec(vec![1.0, 0.0])).unwrap_or(20.0);
            let lo = -seg.support(&DenseVec::from_vec(vec![-1.0, 0.0])).unwrap_or(0.0);
            assert!(hi <= 20.0 + 1e-6);
            assert!(lo >= -1e-6);
        }
    }
}

//! End-to-end reachability scenarios, one test per `spec.md` §8 concrete
//! scenario.

use reachlin::automaton::{Automaton, Invariant};
use reachlin::config::{ReachConfig, Representation};
use reachlin::geometry::HalfSpace;
use reachlin::linalg::{DenseMat, DenseVec};
use reachlin::reach::{compute_forward_reachability, CancellationToken};
use reachlin::sets::{BoxSet, ConvexSet, ConvexSetVariant, HPolytope};

fn bouncing_ball() -> Automaton<f64> {
    let mut a = Automaton::<f64>::new(2);
    let flow = DenseMat::<f64>::from_row_slice(3, 3, &[0.0, 1.0, 0.0, 0.0, 0.0, -9.81, 0.0, 0.0, 0.0]);
    let invariant = Invariant::Constrained(HPolytope::new(
        2,
        vec![
            HalfSpace::new(DenseVec::from_vec(vec![1.0, 0.0]), 20.0),
            HalfSpace::new(DenseVec::from_vec(vec![-1.0, 0.0]), 0.0),
            HalfSpace::new(DenseVec::from_vec(vec![0.0, 1.0]), 20.0),
            HalfSpace::new(DenseVec::from_vec(vec![0.0, -1.0]), 20.0),
        ],
    ));
    let loc = a.add_location(flow, invariant).unwrap();
    a.add_transition(
        loc,
        loc,
        HPolytope::new(
            2,
            vec![
                HalfSpace::new(DenseVec::from_vec(vec![1.0, 0.0]), 0.0),
                HalfSpace::new(DenseVec::from_vec(vec![0.0, 1.0]), 0.0),
            ],
        ),
        DenseMat::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -0.9]),
        DenseVec::from_element(2, 0.0),
    )
    .unwrap();
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

/// Scenario 1: bouncing ball, single location with self-loop.
#[test]
fn bouncing_ball_produces_bounded_flowpipes() {
    let automaton = bouncing_ball();
    let cfg = ReachConfig {
        time_horizon: 3.0,
        time_step: 0.01,
        jump_depth: 3,
        representation: Representation::HPoly,
        simplification: None,
    };
    let outcome = compute_forward_reachability(&automaton, &cfg, &CancellationToken::new());
    assert!(outcome.was_complete);
    assert!(outcome.flowpipes.len() >= 4, "expected at least 4 flowpipes, got {}", outcome.flowpipes.len());

    let h_axis = DenseVec::from_vec(vec![1.0, 0.0]);
    let neg_h_axis = DenseVec::from_vec(vec![-1.0, 0.0]);
    let sup_h = |seg: &ConvexSetVariant<f64>| seg.support(&h_axis).unwrap_or(20.0);
    let inf_h = |seg: &ConvexSetVariant<f64>| -seg.support(&neg_h_axis).unwrap_or(0.0);

    let flowpipe_1_max_h = outcome.flowpipes[0].iter().map(sup_h).fold(f64::MIN, f64::max);
    assert!(flowpipe_1_max_h <= 10.2 + 1e-6);

    for flowpipe in &outcome.flowpipes {
        for seg in flowpipe {
            if seg.is_empty() {
                continue;
            }
            assert!(inf_h(seg) >= -1e-6);
        }
    }

    // Each discrete post goes through the self-loop's v -> -0.9v reset, so
    // consecutive flowpipes in the sequence are pre-jump/post-jump pairs:
    // the post-jump supremum of |v| must not exceed 0.9x the pre-jump one.
    let v_axis = DenseVec::from_vec(vec![0.0, 1.0]);
    let neg_v_axis = DenseVec::from_vec(vec![0.0, -1.0]);
    let max_abs_v = |flowpipe: &[ConvexSetVariant<f64>]| -> f64 {
        flowpipe
            .iter()
            .filter(|seg| !seg.is_empty())
            .map(|seg| {
                let sup_v = seg.support(&v_axis).unwrap_or(20.0);
                let inf_v = -seg.support(&neg_v_axis).unwrap_or(20.0);
                sup_v.abs().max(inf_v.abs())
            })
            .fold(0.0, f64::max)
    };
    for i in 1..outcome.flowpipes.len() {
        let pre_jump = max_abs_v(&outcome.flowpipes[i - 1]);
        let post_jump = max_abs_v(&outcome.flowpipes[i]);
        assert!(
            post_jump <= 0.9 * pre_jump + 1e-6,
            "post-jump sup|v| {post_jump} exceeds 0.9x pre-jump sup|v| {pre_jump}"
        );
    }
}

/// Scenario 2: empty intersection short-circuit.
#[test]
fn disjoint_initial_set_short_circuits() {
    let mut a = Automaton::<f64>::new(2);
    let flow = DenseMat::<f64>::identity(3, 3);
    let invariant = Invariant::Constrained(HPolytope::new(
        2,
        vec![HalfSpace::new(DenseVec::from_vec(vec![1.0, 0.0]), -5.0)],
    ));
    let loc = a.add_location(flow, invariant).unwrap();
    a.add_initial(loc, HPolytope::new(2, vec![HalfSpace::new(DenseVec::from_vec(vec![-1.0, 0.0]), -10.0)]))
        .unwrap();

    let cfg = ReachConfig {
        time_horizon: 1.0,
        time_step: 0.1,
        jump_depth: 3,
        representation: Representation::HPoly,
        simplification: None,
    };
    let outcome = compute_forward_reachability(&a, &cfg, &CancellationToken::new());
    assert_eq!(outcome.flowpipes.len(), 1);
    assert_eq!(outcome.flowpipes[0].len(), 1);
    assert!(outcome.flowpipes[0][0].is_empty());
}

/// Scenario 3: box Minkowski-sum closure.
#[test]
fn box_minkowski_sum_is_exact() {
    let a = BoxSet::new(DenseVec::from_vec(vec![0.0, 0.0]), DenseVec::from_vec(vec![1.0, 1.0]));
    let b = BoxSet::new(DenseVec::from_vec(vec![-0.5, -0.5]), DenseVec::from_vec(vec![0.5, 0.5]));
    let sum = a.minkowski_sum(&b);
    assert_eq!(*sum.lo(), DenseVec::from_vec(vec![-0.5, -0.5]));
    assert_eq!(*sum.hi(), DenseVec::from_vec(vec![1.5, 1.5]));
}

/// Scenario 5: vertex enumeration on the unit cube.
#[test]
fn unit_cube_vertex_enumeration_yields_eight_signed_vertices() {
    let half_spaces: Vec<HalfSpace<f64>> = (0..3)
        .flat_map(|i| {
            let mut pos = DenseVec::from_element(3, 0.0);
            pos[i] = 1.0;
            let mut neg = DenseVec::from_element(3, 0.0);
            neg[i] = -1.0;
            vec![HalfSpace::new(pos, 1.0), HalfSpace::new(neg, 1.0)]
        })
        .collect();
    let cube = HPolytope::new(3, half_spaces);
    let vertices = cube.vertices();
    assert_eq!(vertices.len(), 8);
    for v in &vertices {
        for i in 0..3 {
            assert!((v.coords[i].abs() - 1.0).abs() < 1e-9);
        }
    }
}

/// Scenario 6: jump-depth bound.
#[test]
fn jump_depth_zero_skips_discrete_post() {
    let automaton = bouncing_ball();
    let cfg = ReachConfig {
        time_horizon: 0.5,
        time_step: 0.05,
        jump_depth: 0,
        representation: Representation::HPoly,
        simplification: None,
    };
    let outcome = compute_forward_reachability(&automaton, &cfg, &CancellationToken::new());
    assert_eq!(outcome.flowpipes.len(), 1);
}

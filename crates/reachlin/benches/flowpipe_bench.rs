//! Criterion benchmark for end-to-end flowpipe construction on a small
//! affine bouncing-ball automaton, across the configured representations.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use reachlin::automaton::{Automaton, Invariant};
use reachlin::config::{ReachConfig, Representation};
use reachlin::geometry::HalfSpace;
use reachlin::linalg::DenseMat;
use reachlin::linalg::DenseVec;
use reachlin::reach::{compute_forward_reachability, CancellationToken};
use reachlin::sets::HPolytope;

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

fn bench_flowpipe(c: &mut Criterion) {
    let mut group = c.benchmark_group("bouncing_ball_flowpipe");
    for &representation in &[Representation::Box, Representation::HPoly, Representation::Zonotope] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{representation:?}")), &representation, |b, &representation| {
            b.iter_batched(
                || {
                    let automaton = bouncing_ball();
                    let cfg = ReachConfig {
                        time_horizon: 1.0,
                        time_step: 0.05,
                        jump_depth: 2,
                        representation,
                        simplification: None,
                    };
                    (automaton, cfg)
                },
                |(automaton, cfg)| compute_forward_reachability(&automaton, &cfg, &CancellationToken::new()),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_flowpipe);
criterion_main!(benches);

//! Criterion microbenches for the two-phase simplex LP core.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use reachlin::geometry::HalfSpace;
use reachlin::linalg::DenseVec;
use reachlin::optimizer::LinearProgram;

fn random_box_half_spaces(dim: usize, seed: u64) -> Vec<HalfSpace<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut half_spaces = Vec::with_capacity(2 * dim);
    for i in 0..dim {
        let mut pos = DenseVec::from_element(dim, 0.0);
        pos[i] = 1.0;
        half_spaces.push(HalfSpace::new(pos, rng.gen_range(0.5..2.0)));
        let mut neg = DenseVec::from_element(dim, 0.0);
        neg[i] = -1.0;
        half_spaces.push(HalfSpace::new(neg, rng.gen_range(0.5..2.0)));
    }
    half_spaces
}

fn bench_feasibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("lp_feasibility");
    for &dim in &[2usize, 4, 8, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |b, &dim| {
            b.iter_batched(
                || {
                    let half_spaces = random_box_half_spaces(dim, 7 + dim as u64);
                    LinearProgram::from_half_spaces(dim, &half_spaces)
                },
                |lp| lp.is_feasible(),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("lp_evaluate");
    for &dim in &[2usize, 4, 8, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |b, &dim| {
            let half_spaces = random_box_half_spaces(dim, 11 + dim as u64);
            let lp = LinearProgram::from_half_spaces(dim, &half_spaces);
            let mut direction = DenseVec::from_element(dim, 0.0);
            direction[0] = 1.0;
            b.iter(|| lp.evaluate(&direction))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_feasibility, bench_evaluate);
criterion_main!(benches);

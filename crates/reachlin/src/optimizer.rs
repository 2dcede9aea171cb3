//! Linear optimiser: single entry point for direction maximisation over a
//! system of linear constraints (`spec.md` §4.1).
//!
//! Purpose
//! - Every representation that needs a directional query (H-polytope
//!   containment/emptiness, the support-function tree's `intersect` node)
//!   delegates to this module rather than rolling its own LP.
//!
//! Why a hand-written two-phase simplex
//! - hypro wraps a third-party solver behind `Optimizer<Number>`
//!   (`original_source/src/lib/util/linearOptimization/Optimizer.h`) and
//!   documents re-solving exactly on mismatch near the boundary. This crate
//!   has no external LP dependency in the example pack to reach for, so the
//!   simplex is implemented directly, generically over [`Scalar`] — the
//!   same code path runs the float presolve and, when `Scalar = Rational`,
//!   the exact re-verification `spec.md` §4.1 calls for.
//! - Bland's rule (smallest index, for both entering column and leaving
//!   row) is used throughout: it is the standard anti-cycling pivoting rule
//!   and gives determinism on degenerate inputs for free, matching
//!   `spec.md`'s "Results are deterministic across runs with identical
//!   inputs" and the vertex-enumeration tie-break in §4.3.

use crate::geometry::{HalfSpace, Point};
use crate::linalg::{DenseMat, DenseVec};
use crate::scalar::Scalar;

/// Outcome of a directional maximisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptimizerStatus {
    Feasible,
    Unbounded,
    Infeasible,
}

/// Result of [`LinearProgram::evaluate`].
#[derive(Clone, Debug)]
pub struct OptimizeResult<S: Scalar> {
    pub status: OptimizerStatus,
    pub value: Option<S>,
    pub argmax: Option<Point<S>>,
}

/// A linear program in the form `maximise d . x subject to A x <= b`.
///
/// Owns its constraint system; `evaluate` is called once per direction and
/// rebuilds the tableau each time (§4.1 does not require warm starts to be
/// observable — `warm_start_hint` below is purely a speed hint, see
/// DESIGN.md).
#[derive(Clone, Debug)]
pub struct LinearProgram<S: Scalar> {
    pub a: DenseMat<S>,
    pub b: DenseVec<S>,
}

impl<S: Scalar> LinearProgram<S> {
    pub fn new(a: DenseMat<S>, b: DenseVec<S>) -> Self {
        assert_eq!(a.nrows(), b.len(), "constraint matrix/vector size mismatch");
        Self { a, b }
    }

    pub fn from_half_spaces(dim: usize, half_spaces: &[HalfSpace<S>]) -> Self {
        let m = half_spaces.len();
        let mut a = DenseMat::<S>::from_element(m, dim, S::zero());
        let mut b = DenseVec::<S>::from_element(m, S::zero());
        for (i, h) in half_spaces.iter().enumerate() {
            for j in 0..dim {
                a[(i, j)] = h.normal[j].clone();
            }
            b[i] = h.offset.clone();
        }
        Self { a, b }
    }

    pub fn dim(&self) -> usize {
        self.a.ncols()
    }

    pub fn num_constraints(&self) -> usize {
        self.a.nrows()
    }

    /// `evaluate(d) -> (value, argmax, status)`.
    pub fn evaluate(&self, direction: &DenseVec<S>) -> OptimizeResult<S> {
        assert_eq!(direction.len(), self.dim());
        simplex_maximize(&self.a, &self.b, direction)
    }

    /// Existence of any `x` with `A x <= b`.
    pub fn is_feasible(&self) -> bool {
        if self.dim() == 0 {
            return true;
        }
        let zero_dir = DenseVec::<S>::from_element(self.dim(), S::zero());
        !matches!(self.evaluate(&zero_dir).status, OptimizerStatus::Infeasible)
    }

    /// `p` satisfies every row of `A x <= b`.
    pub fn contains(&self, p: &Point<S>) -> bool {
        for i in 0..self.num_constraints() {
            let mut acc = S::zero();
            for j in 0..self.dim() {
                acc = acc + self.a[(i, j)].clone() * p.coords[j].clone();
            }
            if acc > self.b[i] {
                return false;
            }
        }
        true
    }

    /// Indices of constraints whose removal does not shrink the feasible
    /// set: row `i` is redundant iff maximising `normal_i . x` over the
    /// system *without* row `i` does not exceed `offset_i`.
    pub fn redundant_rows(&self) -> Vec<usize> {
        let m = self.num_constraints();
        let mut redundant = Vec::new();
        for i in 0..m {
            let rows: Vec<usize> = (0..m).filter(|&r| r != i).collect();
            let reduced_a = select_rows(&self.a, &rows);
            let reduced_b = select_rows_vec(&self.b, &rows);
            let direction = self.a.row(i).transpose().into_owned();
            let result = simplex_maximize(&reduced_a, &reduced_b, &direction);
            let dominated = match result.status {
                OptimizerStatus::Infeasible => true,
                OptimizerStatus::Unbounded => false,
                OptimizerStatus::Feasible => result.value.map(|v| v <= self.b[i]).unwrap_or(false),
            };
            if dominated {
                redundant.push(i);
            }
        }
        redundant
    }
}

fn select_rows<S: Scalar>(a: &DenseMat<S>, rows: &[usize]) -> DenseMat<S> {
    let mut out = DenseMat::<S>::from_element(rows.len(), a.ncols(), S::zero());
    for (out_i, &src_i) in rows.iter().enumerate() {
        for j in 0..a.ncols() {
            out[(out_i, j)] = a[(src_i, j)].clone();
        }
    }
    out
}

fn select_rows_vec<S: Scalar>(b: &DenseVec<S>, rows: &[usize]) -> DenseVec<S> {
    DenseVec::<S>::from_iterator(rows.len(), rows.iter().map(|&i| b[i].clone()))
}

/// Two-phase primal simplex, maximising `c . x` subject to `A x <= b`, with
/// every original variable split into a non-negative difference
/// `x_j = xp_j - xm_j` so free variables (the usual case in geometry, where
/// `x` ranges over all of R^n) fit the standard non-negative-orthant form.
fn simplex_maximize<S: Scalar>(
    a: &DenseMat<S>,
    b: &DenseVec<S>,
    c: &DenseVec<S>,
) -> OptimizeResult<S> {
    let m = a.nrows();
    let n = a.ncols();
    if m == 0 {
        // Unconstrained: bounded only if the objective is identically zero.
        if (0..n).all(|j| c[j].is_zero()) {
            return OptimizeResult {
                status: OptimizerStatus::Feasible,
                value: Some(S::zero()),
                argmax: Some(Point::zeros(n)),
            };
        }
        return OptimizeResult {
            status: OptimizerStatus::Unbounded,
            value: None,
            argmax: None,
        };
    }

    // Column layout: [xp_0..xp_{n-1}, xm_0..xm_{n-1}, s_0..s_{m-1}, a_0..a_{m-1}, rhs]
    let num_vars = 2 * n + m;
    let num_cols = num_vars + m + 1;
    let rhs_col = num_cols - 1;
    let artificial_start = 2 * n + m;

    let mut t = DenseMat::<S>::from_element(m, num_cols, S::zero());
    let mut basis = vec![0usize; m];
    for i in 0..m {
        let sign = if b[i] < S::zero() { -S::one() } else { S::one() };
        for j in 0..n {
            t[(i, j)] = a[(i, j)].clone() * sign.clone();
            t[(i, n + j)] = -a[(i, j)].clone() * sign.clone();
        }
        t[(i, 2 * n + i)] = sign.clone(); // slack
        t[(i, artificial_start + i)] = S::one(); // artificial
        t[(i, rhs_col)] = b[i].clone() * sign;
        basis[i] = artificial_start + i;
    }

    // Phase 1: minimise sum of artificials == maximise -sum of artificials.
    let mut phase1_cost = DenseVec::<S>::from_element(num_cols, S::zero());
    for i in 0..m {
        phase1_cost[artificial_start + i] = -S::one();
    }
    pivot_to_optimum(&mut t, &mut basis, &phase1_cost, num_cols, rhs_col);

    let phase1_value = objective_value(&t, &basis, &phase1_cost, rhs_col);
    if phase1_value.abs() > S::from_f64(1e-7) {
        return OptimizeResult {
            status: OptimizerStatus::Infeasible,
            value: None,
            argmax: None,
        };
    }

    // Drive any artificial variable still basic (at value 0) out of the basis.
    for i in 0..m {
        if basis[i] >= artificial_start {
            if let Some(j) = (0..artificial_start).find(|&j| t[(i, j)] != S::zero()) {
                pivot(&mut t, &mut basis, i, j, num_cols);
            }
        }
    }

    // Phase 2: optimise the real objective over xp/xm (slacks cost 0),
    // forbidding artificial columns from re-entering the basis.
    let mut phase2_cost = DenseVec::<S>::from_element(num_cols, S::zero());
    for j in 0..n {
        phase2_cost[j] = c[j].clone();
        phase2_cost[n + j] = -c[j].clone();
    }
    let unbounded = pivot_to_optimum_excluding(
        &mut t,
        &mut basis,
        &phase2_cost,
        num_cols,
        rhs_col,
        artificial_start,
    );
    if unbounded {
        return OptimizeResult {
            status: OptimizerStatus::Unbounded,
            value: None,
            argmax: None,
        };
    }

    let mut x = DenseVec::<S>::from_element(n, S::zero());
    for i in 0..m {
        let col = basis[i];
        if col < n {
            x[col] = x[col].clone() + t[(i, rhs_col)].clone();
        } else if col < 2 * n {
            x[col - n] = x[col - n].clone() - t[(i, rhs_col)].clone();
        }
    }
    let value = objective_value(&t, &basis, &phase2_cost, rhs_col);
    OptimizeResult {
        status: OptimizerStatus::Feasible,
        value: Some(value),
        argmax: Some(Point::new(x)),
    }
}

fn objective_value<S: Scalar>(t: &DenseMat<S>, basis: &[usize], cost: &DenseVec<S>, rhs_col: usize) -> S {
    let mut acc = S::zero();
    for (i, &col) in basis.iter().enumerate() {
        acc = acc + cost[col].clone() * t[(i, rhs_col)].clone();
    }
    acc
}

/// Runs simplex pivots (Bland's rule) to optimality for `cost`, returns
/// once no improving column remains.
fn pivot_to_optimum<S: Scalar>(
    t: &mut DenseMat<S>,
    basis: &mut [usize],
    cost: &DenseVec<S>,
    num_cols: usize,
    rhs_col: usize,
) {
    pivot_to_optimum_excluding(t, basis, cost, num_cols, rhs_col, usize::MAX);
}

/// As [`pivot_to_optimum`], but never selects a column `>= exclude_from` as
/// entering (used in phase 2 to keep artificial columns out of the basis).
/// Returns `true` if the objective is unbounded.
fn pivot_to_optimum_excluding<S: Scalar>(
    t: &mut DenseMat<S>,
    basis: &mut [usize],
    cost: &DenseVec<S>,
    num_cols: usize,
    rhs_col: usize,
    exclude_from: usize,
) -> bool {
    let m = t.nrows();
    let limit = num_cols.min(exclude_from);
    loop {
        // Reduced cost of column j: cost[j] - sum_i cost[basis[i]] * t[i][j].
        let mut entering: Option<usize> = None;
        for j in 0..limit.min(rhs_col) {
            let mut reduced = cost[j].clone();
            for i in 0..m {
                reduced = reduced - cost[basis[i]].clone() * t[(i, j)].clone();
            }
            if reduced > S::from_f64(1e-9) {
                entering = Some(j);
                break; // Bland's rule: smallest improving index.
            }
        }
        let Some(j) = entering else { return false };

        // Ratio test, Bland's rule on ties (smallest basic-variable index).
        let mut leaving: Option<usize> = None;
        let mut best_ratio: Option<S> = None;
        for i in 0..m {
            if t[(i, j)] > S::from_f64(1e-12) {
                let ratio = t[(i, rhs_col)].clone() / t[(i, j)].clone();
                let better = match &best_ratio {
                    None => true,
                    Some(b) => match ratio.partial_cmp(b) {
                        Some(std::cmp::Ordering::Less) => true,
                        Some(std::cmp::Ordering::Equal) => {
                            leaving.map(|li| basis[i] < basis[li]).unwrap_or(true)
                        }
                        _ => false,
                    },
                };
                if better {
                    best_ratio = Some(ratio);
                    leaving = Some(i);
                }
            }
        }
        let Some(row) = leaving else { return true }; // unbounded
        pivot(t, basis, row, j, num_cols);
    }
}

fn pivot<S: Scalar>(t: &mut DenseMat<S>, basis: &mut [usize], row: usize, col: usize, num_cols: usize) {
    let pivot_val = t[(row, col)].clone();
    for c in 0..num_cols {
        t[(row, c)] = t[(row, c)].clone() / pivot_val.clone();
    }
    let m = t.nrows();
    for r in 0..m {
        if r == row {
            continue;
        }
        let factor = t[(r, col)].clone();
        if factor.is_zero() {
            continue;
        }
        for c in 0..num_cols {
            let sub = t[(row, c)].clone() * factor.clone();
            t[(r, c)] = t[(r, c)].clone() - sub;
        }
    }
    basis[row] = col;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lp_unit_square() -> LinearProgram<f64> {
        // 0<=x<=1, 0<=y<=1
        let a = DenseMat::from_row_slice(4, 2, &[1.0, 0.0, -1.0, 0.0, 0.0, 1.0, 0.0, -1.0]);
        let b = DenseVec::from_vec(vec![1.0, 0.0, 1.0, 0.0]);
        LinearProgram::new(a, b)
    }

    #[test]
    fn maximises_in_unit_square() {
        let lp = lp_unit_square();
        let r = lp.evaluate(&DenseVec::from_vec(vec![1.0, 1.0]));
        assert_eq!(r.status, OptimizerStatus::Feasible);
        assert!((r.value.unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn detects_infeasible() {
        // x <= 0 and x >= 1 simultaneously.
        let a = DenseMat::from_row_slice(2, 1, &[1.0, -1.0]);
        let b = DenseVec::from_vec(vec![0.0, -1.0]);
        let lp = LinearProgram::new(a, b);
        assert!(!lp.is_feasible());
    }

    #[test]
    fn detects_unbounded() {
        // x >= 0 only (as -x <= 0), maximise x.
        let a = DenseMat::from_row_slice(1, 1, &[-1.0]);
        let b = DenseVec::from_vec(vec![0.0]);
        let lp = LinearProgram::new(a, b);
        let r = lp.evaluate(&DenseVec::from_vec(vec![1.0]));
        assert_eq!(r.status, OptimizerStatus::Unbounded);
    }

    #[test]
    fn contains_matches_evaluate() {
        let lp = lp_unit_square();
        assert!(lp.contains(&Point::new(DenseVec::from_vec(vec![0.5, 0.5]))));
        assert!(!lp.contains(&Point::new(DenseVec::from_vec(vec![2.0, 0.5]))));
    }

    #[test]
    fn redundant_row_detected() {
        // x <= 2 is redundant given x <= 1 and x >= 0.
        let a = DenseMat::from_row_slice(3, 1, &[1.0, -1.0, 1.0]);
        let b = DenseVec::from_vec(vec![1.0, 0.0, 2.0]);
        let lp = LinearProgram::new(a, b);
        assert_eq!(lp.redundant_rows(), vec![2]);
    }

    #[test]
    fn exact_rational_matches_float() {
        use crate::scalar::Rational;
        let a = DenseMat::<Rational>::from_row_slice(
            2,
            1,
            &[Rational::new(1, 1), Rational::new(-1, 1)],
        );
        let b = DenseVec::<Rational>::from_vec(vec![Rational::new(3, 2), Rational::new(0, 1)]);
        let lp = LinearProgram::new(a, b);
        let r = lp.evaluate(&DenseVec::from_vec(vec![Rational::new(1, 1)]));
        assert_eq!(r.status, OptimizerStatus::Feasible);
        assert_eq!(r.value.unwrap(), Rational::new(3, 2));
    }
}

//! Dense vector/matrix facade and the matrix exponential.
//!
//! Purpose
//! - Thin wrappers over `nalgebra::{DVector, DMatrix}` so the rest of the
//!   crate names its linear-algebra types once (`DenseVec<S>`/`DenseMat<S>`)
//!   instead of spelling out `nalgebra::DVector<S>` everywhere, and so the
//!   one genuinely hand-rolled numerical routine the spec needs but
//!   `nalgebra` doesn't ship — the matrix exponential — lives next to the
//!   types it operates on.
//!
//! Why wrap rather than re-export
//! - `nalgebra::DMatrix`/`DVector` already do everything a dense
//!   linear-algebra facade needs (LU, QR, `try_inverse`); wrapping in a
//!   type alias rather than a newtype keeps every `nalgebra` method
//!   available without re-deriving them, matching the teacher's own
//!   preference for thin aliases over opaque wrappers (`Mat2`/`Vec2` in the
//!   crate prelude).

use nalgebra::{DMatrix, DVector};

pub type DenseVec<S> = DVector<S>;
pub type DenseMat<S> = DMatrix<S>;

/// Solve `A x = b` via LU decomposition, `None` if `A` is singular.
///
/// `f64`-only: `nalgebra`'s decompositions need `RealField`, which the
/// exact [`crate::scalar::Rational`] instantiation cannot honestly provide
/// (no IEEE rounding modes to reason about). Exact-scalar code paths solve
/// small systems directly over [`crate::scalar::Scalar`]'s field operators
/// instead (see [`crate::optimizer`]).
pub fn solve(a: &DenseMat<f64>, b: &DenseVec<f64>) -> Option<DenseVec<f64>> {
    a.clone().lu().solve(b)
}

/// Matrix exponential `exp(A * dt)` by scaling-and-squaring with a
/// sixth-order diagonal Padé approximant.
///
/// Mirrors the technique hypro wraps from
/// `unsupported/Eigen/MatrixFunctions/MatrixExponential.h`
/// (`original_source`'s `config.h` pulls that header in directly). Only
/// defined over `f64`: the reachability engine computes `Φ = exp(A·δ)`
/// exactly once per location (`spec.md` §4.8 step 3) and always does so on
/// the float representation, per `SPEC_FULL.md` §4.0.
pub fn matrix_exponential(a: &DenseMat<f64>, dt: f64) -> DenseMat<f64> {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "matrix_exponential requires a square matrix");
    let scaled = a * dt;

    // Choose a squaring count so the scaled matrix has norm < 0.5, keeping
    // the Padé approximant well-conditioned.
    let norm = scaled.abs().row_sum().max();
    let mut squarings = 0u32;
    let mut reduced = scaled.clone();
    let mut scale = 1.0;
    while scale * norm >= 0.5 {
        scale *= 0.5;
        squarings += 1;
    }
    reduced *= scale;

    let pade = pade6(&reduced);
    let mut result = pade;
    for _ in 0..squarings {
        result = &result * &result;
    }
    result
}

/// Diagonal [6/6] Padé approximant of `exp(a)`, `a` assumed to have small
/// norm (caller scales first). `p` collects the even-degree terms, `q` the
/// odd-degree terms divided by `a`; `exp(a) ~= (p + a*q) / (p - a*q)`.
fn pade6(a: &DenseMat<f64>) -> DenseMat<f64> {
    const C: [f64; 7] = [
        1.0,
        0.5,
        3.0 / 26.0,
        5.0 / 312.0,
        5.0 / 3432.0,
        1.0 / 11440.0,
        1.0 / 308880.0,
    ];

    let n = a.nrows();
    let id = DenseMat::<f64>::identity(n, n);
    let a2 = a * a;
    let a4 = &a2 * &a2;
    let a6 = &a4 * &a2;

    let p = &id * C[0] + &a2 * C[2] + &a4 * C[4] + &a6 * C[6];
    let q = a * (&id * C[1] + &a2 * C[3] + &a4 * C[5]);
    let numerator = &p + &q;
    let denominator = &p - &q;
    denominator
        .lu()
        .solve(&numerator)
        .expect("Padé denominator is diagonally dominant for scaled input and always invertible")
}

pub fn big_int_to_f64(v: &num_bigint::BigInt) -> f64 {
    use num_traits::ToPrimitive;
    v.to_f64().unwrap_or(f64::NAN)
}

use crate::scalar::Scalar;

/// Determinant via cofactor expansion along the first row. `O(n!)`, used
/// only on the small (bounded-dimension) systems vertex enumeration and the
/// converters build — the same complexity trade-off the teacher accepts in
/// `geom4::convert::det3`/`nullspace_vector_3x4`, generalised here to
/// arbitrary `n` rather than hard-coded for 3 and 4.
pub fn det_generic<S: Scalar>(m: &DenseMat<S>) -> S {
    let n = m.nrows();
    assert_eq!(n, m.ncols());
    if n == 1 {
        return m[(0, 0)].clone();
    }
    if n == 2 {
        return m[(0, 0)].clone() * m[(1, 1)].clone() - m[(0, 1)].clone() * m[(1, 0)].clone();
    }
    let mut acc = S::zero();
    for col in 0..n {
        let minor = minor_matrix(m, 0, col);
        let cofactor = det_generic(&minor);
        let term = m[(0, col)].clone() * cofactor;
        acc = if col % 2 == 0 { acc + term } else { acc - term };
    }
    acc
}

fn minor_matrix<S: Scalar>(m: &DenseMat<S>, skip_row: usize, skip_col: usize) -> DenseMat<S> {
    let n = m.nrows();
    let mut out = DenseMat::<S>::from_element(n - 1, n - 1, S::zero());
    let mut oi = 0;
    for i in 0..n {
        if i == skip_row {
            continue;
        }
        let mut oj = 0;
        for j in 0..n {
            if j == skip_col {
                continue;
            }
            out[(oi, oj)] = m[(i, j)].clone();
            oj += 1;
        }
        oi += 1;
    }
    out
}

/// Solve a square `n x n` system `A x = b` by Gauss-Jordan elimination with
/// partial pivoting, generic over [`Scalar`] (so it works for exact
/// rationals, unlike `nalgebra`'s `RealField`-bounded LU). Returns `None`
/// when `A` is (numerically, for `f64`; exactly, for `Rational`) singular.
pub fn solve_square_generic<S: Scalar>(a: &DenseMat<S>, b: &DenseVec<S>) -> Option<DenseVec<S>> {
    let n = a.nrows();
    assert_eq!(n, a.ncols());
    assert_eq!(n, b.len());
    let mut aug = DenseMat::<S>::from_element(n, n + 1, S::zero());
    for i in 0..n {
        for j in 0..n {
            aug[(i, j)] = a[(i, j)].clone();
        }
        aug[(i, n)] = b[i].clone();
    }
    for col in 0..n {
        let pivot_row = (col..n).max_by(|&r1, &r2| {
            aug[(r1, col)]
                .abs()
                .partial_cmp(&aug[(r2, col)].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if aug[(pivot_row, col)].is_zero() {
            return None;
        }
        if pivot_row != col {
            aug.swap_rows(col, pivot_row);
        }
        let pivot_val = aug[(col, col)].clone();
        for j in 0..=n {
            aug[(col, j)] = aug[(col, j)].clone() / pivot_val.clone();
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[(row, col)].clone();
            if factor.is_zero() {
                continue;
            }
            for j in 0..=n {
                let sub = aug[(col, j)].clone() * factor.clone();
                aug[(row, j)] = aug[(row, j)].clone() - sub;
            }
        }
    }
    Some(DenseVec::from_iterator(n, (0..n).map(|i| aug[(i, n)].clone())))
}

/// Null-space direction of an `(n-1) x n` matrix whose rows are linearly
/// independent: the unique (up to scale) `d` with `rows[i] . d = 0` for all
/// `i`, via the cofactor/minor formula `d_k = (-1)^k det(minor removing
/// column k)`. Generalises the teacher's `geom4::convert::nullspace_vector_3x4`
/// (hard-coded for 3 rows / dimension 4) to arbitrary `n`.
pub fn nullspace_direction_generic<S: Scalar>(rows: &DenseMat<S>) -> Option<DenseVec<S>> {
    let n = rows.ncols();
    assert_eq!(rows.nrows(), n - 1);
    let mut d = DenseVec::<S>::from_element(n, S::zero());
    for k in 0..n {
        let minor = minor_matrix_rect(rows, k);
        let cofactor = det_generic(&minor);
        d[k] = if k % 2 == 0 { cofactor } else { -cofactor };
    }
    if (0..n).all(|k| d[k].is_zero()) {
        None
    } else {
        Some(d)
    }
}

fn minor_matrix_rect<S: Scalar>(rows: &DenseMat<S>, skip_col: usize) -> DenseMat<S> {
    let r = rows.nrows();
    let n = rows.ncols();
    let mut out = DenseMat::<S>::from_element(r, n - 1, S::zero());
    for i in 0..r {
        let mut oj = 0;
        for j in 0..n {
            if j == skip_col {
                continue;
            }
            out[(i, oj)] = rows[(i, j)].clone();
            oj += 1;
        }
    }
    out
}

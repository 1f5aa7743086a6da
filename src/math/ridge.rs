//! Regularized linear solver for the amplitude subproblem.
//!
//! For fixed lifetimes the model is linear in the amplitudes, so the inner
//! problem is
//!
//! ```text
//! minimize ||D·X - Y||²_F + alpha·||X||²_F
//! ```
//!
//! solved once per objective evaluation (variable projection).
//!
//! Implementation choices:
//! - The ridge term is folded in by stacking `sqrt(alpha)·I` beneath `D` and a
//!   zero block beneath `Y`, then solving ordinary least squares on the
//!   augmented system. This avoids forming normal equations, which would
//!   square the condition number.
//! - We use a thin QR factorization and explicit back-substitution on the
//!   K×K triangle. A (near-)zero diagonal entry of `R` under `alpha = 0`
//!   means degenerate lifetime columns and is reported as an error rather
//!   than allowed to propagate NaNs into the outer optimizer.

use nalgebra::DMatrix;

use crate::error::FitError;

/// Relative threshold on the diagonal of `R` below which the unregularized
/// system is treated as rank-deficient.
const SINGULAR_RTOL: f64 = 1e-10;

/// Solve `min_X ||D·X - Y||² + alpha·||X||²` for the K×N amplitude matrix.
pub fn solve_ridge(
    d: &DMatrix<f64>,
    y: &DMatrix<f64>,
    alpha: f64,
) -> Result<DMatrix<f64>, FitError> {
    let m = d.nrows();
    let k = d.ncols();
    let n = y.ncols();

    if k == 0 {
        return Err(FitError::Config("Decay matrix has no columns.".into()));
    }
    if y.nrows() != m {
        return Err(FitError::Config(format!(
            "Row mismatch between decay matrix ({m}) and observations ({}).",
            y.nrows()
        )));
    }
    if !(alpha.is_finite() && alpha >= 0.0) {
        return Err(FitError::Config(format!("Invalid alpha: {alpha} (must be >= 0).")));
    }
    if alpha == 0.0 && m < k {
        return Err(FitError::Config(format!(
            "Underdetermined system ({m} rows, {k} lifetimes) with alpha = 0."
        )));
    }

    // Ridge augmentation: sqrt(alpha)·I under D, zeros under Y.
    let (d_aug, y_aug) = if alpha > 0.0 {
        let sqrt_a = alpha.sqrt();
        let mut da = DMatrix::<f64>::zeros(m + k, k);
        da.view_mut((0, 0), (m, k)).copy_from(d);
        for i in 0..k {
            da[(m + i, i)] = sqrt_a;
        }
        let mut ya = DMatrix::<f64>::zeros(m + k, n);
        ya.view_mut((0, 0), (m, n)).copy_from(y);
        (da, ya)
    } else {
        (d.clone(), y.clone())
    };

    let qr = d_aug.qr();
    let r = qr.r();
    let z = qr.q().transpose() * y_aug;

    // Rank check on the triangle. With alpha > 0 the augmented matrix has
    // full column rank by construction, so this only ever fires at alpha = 0.
    let scale = (0..k).map(|i| r[(i, i)].abs()).fold(0.0_f64, f64::max);
    let tol = SINGULAR_RTOL * scale.max(f64::MIN_POSITIVE);
    for i in 0..k {
        if r[(i, i)].abs() <= tol {
            return Err(FitError::SingularMatrix {
                row: i,
                diag: r[(i, i)].abs(),
            });
        }
    }

    // Back-substitution, last row first, one accumulation per row.
    let mut x = DMatrix::<f64>::zeros(k, n);
    for i in (0..k).rev() {
        let mut acc = z.row(i).clone_owned();
        for j in (i + 1)..k {
            acc -= x.row(j) * r[(i, j)];
        }
        x.set_row(i, &(acc / r[(i, i)]));
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::decay_matrix;

    fn frobenius_residual(d: &DMatrix<f64>, y: &DMatrix<f64>, x: &DMatrix<f64>) -> f64 {
        (y - d * x).norm_squared()
    }

    #[test]
    fn unregularized_solve_matches_exact_solution() {
        // Y built exactly from a known X, so the OLS minimizer is X itself.
        let t: Vec<f64> = (0..12).map(|i| i as f64 * 0.5).collect();
        let d = decay_matrix(&[1.5, 6.0], &t, false, 0.0).unwrap();
        let x_true = DMatrix::from_row_slice(2, 3, &[1.0, -2.0, 0.5, 3.0, 0.25, -1.0]);
        let y = &d * &x_true;

        let x = solve_ridge(&d, &y, 0.0).unwrap();
        assert!((&x - &x_true).abs().max() < 1e-8);
    }

    #[test]
    fn matches_svd_least_squares_reference() {
        // Y deliberately not in the column span of D, so the minimizer is a
        // genuine least-squares solution; compare against nalgebra's SVD solve.
        let t: Vec<f64> = (0..20).map(|i| i as f64 * 0.3).collect();
        let d = decay_matrix(&[1.0, 4.0], &t, false, 0.0).unwrap();
        let y = DMatrix::from_fn(t.len(), 3, |i, j| {
            ((i * 7 + j * 3) % 11) as f64 / 11.0 - 0.4
        });

        let x = solve_ridge(&d, &y, 0.0).unwrap();
        let x_ref = d.clone().svd(true, true).solve(&y, 1e-14).unwrap();
        assert!((&x - &x_ref).abs().max() < 1e-8);
    }

    #[test]
    fn ridge_shrinks_towards_zero() {
        let t: Vec<f64> = (0..12).map(|i| i as f64 * 0.5).collect();
        let d = decay_matrix(&[1.5, 6.0], &t, false, 0.0).unwrap();
        let x_true = DMatrix::from_row_slice(2, 2, &[2.0, -1.0, 1.0, 4.0]);
        let y = &d * &x_true;

        let x0 = solve_ridge(&d, &y, 0.0).unwrap();
        let x1 = solve_ridge(&d, &y, 5.0).unwrap();
        assert!(x1.norm() < x0.norm());
    }

    #[test]
    fn training_residual_is_monotone_in_alpha() {
        let t: Vec<f64> = (0..15).map(|i| i as f64 * 0.4).collect();
        let d = decay_matrix(&[2.0, 7.0], &t, false, 0.0).unwrap();
        // Generic Y not in the column span of D.
        let y = DMatrix::from_fn(t.len(), 2, |i, j| {
            (0.3 * i as f64 + 1.7 * j as f64).sin() + 0.1 * i as f64
        });

        let mut prev = -1.0;
        for &alpha in &[0.0, 0.01, 0.1, 1.0, 10.0] {
            let x = solve_ridge(&d, &y, alpha).unwrap();
            let res = frobenius_residual(&d, &y, &x);
            assert!(
                res >= prev - 1e-12,
                "residual decreased from {prev} to {res} at alpha={alpha}"
            );
            prev = res;
        }
    }

    #[test]
    fn duplicate_lifetimes_are_singular_without_regularization() {
        let t: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let d = decay_matrix(&[5.0, 5.0], &t, false, 0.0).unwrap();
        let y = DMatrix::from_element(t.len(), 1, 1.0);

        let err = solve_ridge(&d, &y, 0.0).unwrap_err();
        assert!(matches!(err, FitError::SingularMatrix { .. }));

        // Regularization is the documented remedy.
        let x = solve_ridge(&d, &y, 1e-3).unwrap();
        assert!(x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn near_duplicate_lifetimes_are_singular_without_regularization() {
        let t: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let d = decay_matrix(&[5.0, 5.0 + 1e-12], &t, false, 0.0).unwrap();
        let y = DMatrix::from_element(t.len(), 1, 1.0);
        let err = solve_ridge(&d, &y, 0.0).unwrap_err();
        assert!(matches!(err, FitError::SingularMatrix { .. }));
    }

    #[test]
    fn row_mismatch_is_rejected() {
        let d = DMatrix::from_element(4, 2, 1.0);
        let y = DMatrix::from_element(5, 2, 1.0);
        assert!(matches!(solve_ridge(&d, &y, 0.0), Err(FitError::Config(_))));
    }

    #[test]
    fn negative_alpha_is_rejected() {
        let d = DMatrix::from_element(4, 2, 1.0);
        let y = DMatrix::from_element(4, 2, 1.0);
        assert!(matches!(solve_ridge(&d, &y, -0.5), Err(FitError::Config(_))));
    }
}

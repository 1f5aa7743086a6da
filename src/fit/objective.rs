//! The variable-projection residual objective.
//!
//! For a candidate lifetime vector the amplitudes have a closed-form ridge
//! solution, so the outer optimizer only ever sees a scalar function of the
//! lifetimes: build the decay basis, solve for the amplitudes, return the
//! squared Frobenius residual. Every evaluation is independent; nothing is
//! cached between calls.

use nalgebra::DMatrix;

use crate::error::FitError;
use crate::fit::optimizer::Objective;
use crate::math::{decay_matrix, solve_ridge};

/// Residual objective bound to one fit's data.
///
/// Borrows the selected spectral columns and the time grid; holds no mutable
/// state, so it is safe to evaluate from multiple threads.
pub struct Residual<'a> {
    y: &'a DMatrix<f64>,
    t: &'a [f64],
    alpha: f64,
    fit_width: bool,
    fwhm_mod: f64,
}

impl<'a> Residual<'a> {
    pub fn new(
        y: &'a DMatrix<f64>,
        t: &'a [f64],
        alpha: f64,
        fit_width: bool,
        fwhm_mod: f64,
    ) -> Self {
        Self {
            y,
            t,
            alpha,
            fit_width,
            fwhm_mod,
        }
    }
}

impl Objective for Residual<'_> {
    fn evaluate(&self, x: &[f64]) -> Result<f64, FitError> {
        let d = decay_matrix(x, self.t, self.fit_width, self.fwhm_mod)?;
        let das = solve_ridge(&d, self.y, self.alpha)?;
        Ok((self.y - d * das).norm_squared())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::decay_matrix;

    #[test]
    fn objective_is_zero_at_the_generating_lifetimes() {
        let t: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let d = decay_matrix(&[4.0, 15.0], &t, false, 0.0).unwrap();
        let das = DMatrix::from_row_slice(2, 2, &[1.0, -0.5, 0.3, 0.8]);
        let y = &d * &das;

        let obj = Residual::new(&y, &t, 0.0, false, 0.0);
        let at_truth = obj.evaluate(&[4.0, 15.0]).unwrap();
        assert!(at_truth < 1e-18, "residual at truth was {at_truth}");

        let off = obj.evaluate(&[2.0, 9.0]).unwrap();
        assert!(off > at_truth);
    }

    #[test]
    fn repeated_evaluations_are_identical() {
        let t: Vec<f64> = (0..20).map(|i| i as f64 * 0.5).collect();
        let d = decay_matrix(&[3.0], &t, false, 0.0).unwrap();
        let das = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let y = &d * &das;

        let obj = Residual::new(&y, &t, 0.1, false, 0.0);
        let a = obj.evaluate(&[2.5]).unwrap();
        let b = obj.evaluate(&[2.5]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bad_lifetime_surfaces_as_error() {
        let t = [0.0, 1.0];
        let y = DMatrix::from_element(2, 1, 1.0);
        let obj = Residual::new(&y, &t, 0.0, false, 0.0);
        assert!(obj.evaluate(&[-1.0]).is_err());
    }
}

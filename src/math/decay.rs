//! Decay basis matrix generation.
//!
//! Each column of the basis is one candidate exponential decay evaluated on
//! the time grid. Two branches:
//!
//! - no IRF (`fwhm_mod == 0`): plain `exp(-t/τ)`
//! - Gaussian IRF: the closed-form exponentially modified Gaussian
//!
//! ```text
//! D[i,j] = 0.5 · exp(-t/τ) · exp(w²/(2τ²)) / τ · (1 + erf((t − w²/τ) / (√2·w)))
//! ```
//!
//! where `w` is the sigma-equivalent IRF width. The matrix is a pure function
//! of its inputs and is rebuilt on every objective evaluation; caching it
//! across optimizer iterations would be wrong because τ changes each call.

use libm::erf;
use nalgebra::DMatrix;

use crate::error::FitError;

const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// Convert an IRF FWHM to its Gaussian sigma-equivalent: `FWHM / (2·sqrt(ln 2))`.
pub fn fwhm_to_sigma(fwhm: f64) -> f64 {
    fwhm / (2.0 * std::f64::consts::LN_2.sqrt())
}

/// Build the M×K decay basis for the given lifetimes and time grid.
///
/// When `fit_width` is set, the *last* entry of `taus` is consumed as the IRF
/// FWHM for this evaluation (so K = `taus.len() - 1`) and the convolved branch
/// is always used. Otherwise `fwhm_mod` (the data source's sigma-equivalent
/// width) decides the branch, with zero meaning no convolution.
pub fn decay_matrix(
    taus: &[f64],
    t: &[f64],
    fit_width: bool,
    fwhm_mod: f64,
) -> Result<DMatrix<f64>, FitError> {
    let (lifetimes, width) = if fit_width {
        let Some((&fwhm, rest)) = taus.split_last() else {
            return Err(FitError::Config(
                "Width-fitting requires at least one lifetime plus the width parameter.".into(),
            ));
        };
        if rest.is_empty() {
            return Err(FitError::Config(
                "Width-fitting requires at least one lifetime plus the width parameter.".into(),
            ));
        }
        (rest, Some(fwhm_to_sigma(fwhm)))
    } else if fwhm_mod != 0.0 {
        (taus, Some(fwhm_mod))
    } else {
        (taus, None)
    };

    if t.is_empty() {
        return Err(FitError::Config("Empty time grid.".into()));
    }
    for &tau in lifetimes {
        if !(tau.is_finite() && tau > 0.0) {
            return Err(FitError::NonPositiveLifetime { value: tau });
        }
    }
    if let Some(w) = width {
        if !(w.is_finite() && w > 0.0) {
            return Err(FitError::NonPositiveLifetime { value: w });
        }
    }

    let d = match width {
        None => DMatrix::from_fn(t.len(), lifetimes.len(), |i, j| (-t[i] / lifetimes[j]).exp()),
        Some(w) => DMatrix::from_fn(t.len(), lifetimes.len(), |i, j| {
            emg(t[i], lifetimes[j], w)
        }),
    };
    Ok(d)
}

/// Exponentially modified Gaussian: exponential decay `τ` convolved with a
/// Gaussian IRF of sigma `w`, evaluated at time `t`.
fn emg(t: f64, tau: f64, w: f64) -> f64 {
    let gauss = 0.5 * (-t / tau).exp() * (w * w / (2.0 * tau * tau)).exp() / tau;
    gauss * (1.0 + erf((t - w * w / tau) / (SQRT_2 * w)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fwhm_sigma_conversion() {
        // 2·sqrt(ln 2) ≈ 1.6651
        let s = fwhm_to_sigma(1.0);
        assert!((s - 0.6005612043932249).abs() < 1e-12);
    }

    #[test]
    fn pure_exponential_when_no_irf() {
        let t = [0.0, 1.0, 2.5, 10.0];
        let taus = [2.0, 8.0];
        let d = decay_matrix(&taus, &t, false, 0.0).unwrap();
        assert_eq!((d.nrows(), d.ncols()), (4, 2));
        for (i, &ti) in t.iter().enumerate() {
            for (j, &tau) in taus.iter().enumerate() {
                assert_eq!(d[(i, j)], (-ti / tau).exp());
            }
        }
    }

    #[test]
    fn convolved_branch_is_finite_and_positive() {
        let t: Vec<f64> = (0..40).map(|i| i as f64 * 0.5 - 2.0).collect();
        let d = decay_matrix(&[1.0, 5.0], &t, false, 0.3).unwrap();
        for v in d.iter() {
            assert!(v.is_finite());
            assert!(*v >= 0.0);
        }
    }

    #[test]
    fn convolution_approaches_pure_decay_for_narrow_irf() {
        // Well past time zero a very narrow IRF barely changes the decay
        // (up to the 1/τ amplitude convention of the EMG form).
        let tau = 4.0;
        let t = [8.0];
        let d = decay_matrix(&[tau], &t, false, 1e-4).unwrap();
        let pure = (-t[0] / tau).exp() / tau;
        assert!((d[(0, 0)] - pure).abs() / pure < 1e-6);
    }

    #[test]
    fn non_positive_lifetime_is_rejected() {
        let t = [0.0, 1.0];
        let err = decay_matrix(&[2.0, 0.0], &t, false, 0.0).unwrap_err();
        assert!(matches!(err, FitError::NonPositiveLifetime { .. }));
        let err = decay_matrix(&[-1.0], &t, false, 0.2).unwrap_err();
        assert!(matches!(err, FitError::NonPositiveLifetime { .. }));
    }

    #[test]
    fn width_fitting_consumes_trailing_parameter() {
        let t: Vec<f64> = (0..20).map(|i| i as f64).collect();
        // Two lifetimes plus a width guess: the basis must have exactly 2 columns.
        let d = decay_matrix(&[3.0, 12.0, 0.4], &t, true, 0.0).unwrap();
        assert_eq!(d.ncols(), 2);
        assert_eq!(d.nrows(), t.len());
    }

    #[test]
    fn width_fitting_rejects_non_positive_width() {
        let t = [0.0, 1.0, 2.0];
        let err = decay_matrix(&[3.0, -0.1], &t, true, 0.0).unwrap_err();
        assert!(matches!(err, FitError::NonPositiveLifetime { .. }));
    }

    #[test]
    fn width_fitting_needs_a_lifetime() {
        let t = [0.0, 1.0];
        assert!(decay_matrix(&[0.4], &t, true, 0.0).is_err());
    }
}

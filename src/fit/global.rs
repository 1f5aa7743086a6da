//! End-to-end global fit assembly.
//!
//! `GlobalFit` owns the immutable inputs of a fit (spectral basis, time grid,
//! IRF width) and runs the whole pipeline for each invocation: resolve the
//! column selection, minimize the residual objective over lifetimes,
//! recompute the amplitudes at the optimum, reconstruct the fitted spectra,
//! and package the result. No state survives between invocations.

use nalgebra::DMatrix;

use crate::data::DataSource;
use crate::domain::FitResult;
use crate::error::FitError;
use crate::fit::objective::Residual;
use crate::fit::optimizer::BoundedMinimizer;
use crate::fit::selection::{resolve_columns, select_columns};
use crate::math::{decay_matrix, fwhm_to_sigma, solve_ridge};

/// Immutable inputs of a global lifetime fit.
pub struct GlobalFit {
    /// Weighted left singular vectors, M×C.
    wlsv: DMatrix<f64>,
    /// Delay values, length M.
    t: Vec<f64>,
    /// Sigma-equivalent IRF width used when the width is *not* being fitted;
    /// zero disables convolution.
    fwhm_mod: f64,
}

impl GlobalFit {
    /// Build from an explicit basis, time grid, and IRF FWHM.
    pub fn new(wlsv: DMatrix<f64>, t: Vec<f64>, fwhm: f64) -> Result<Self, FitError> {
        if t.is_empty() {
            return Err(FitError::Config("Empty time grid.".into()));
        }
        if wlsv.nrows() != t.len() {
            return Err(FitError::Config(format!(
                "Spectral basis has {} rows for {} time points.",
                wlsv.nrows(),
                t.len()
            )));
        }
        if !(fwhm.is_finite() && fwhm >= 0.0) {
            return Err(FitError::Config(format!("Invalid IRF FWHM: {fwhm}.")));
        }
        Ok(Self {
            wlsv,
            t,
            fwhm_mod: fwhm_to_sigma(fwhm),
        })
    }

    /// Build from a data source: the basis is `U·diag(S)` (left singular
    /// vectors weighted by their singular values).
    pub fn from_source(source: &dyn DataSource) -> Result<Self, FitError> {
        let svd = source.svd();
        let wlsv = &svd.u * DMatrix::from_diagonal(&svd.s);
        Self::new(wlsv, source.time_grid().to_vec(), source.irf().fwhm)
    }

    pub fn basis(&self) -> &DMatrix<f64> {
        &self.wlsv
    }

    pub fn time_grid(&self) -> &[f64] {
        &self.t
    }

    /// Run one global fit.
    ///
    /// `x0` holds the initial lifetime guesses; with `fit_width` its last
    /// entry is the initial IRF FWHM and `bounds` must cover it too. The
    /// returned lifetimes never include the width, which comes back as a
    /// separate scalar.
    pub fn fit(
        &self,
        selector: &str,
        x0: &[f64],
        bounds: &[(f64, f64)],
        alpha: f64,
        fit_width: bool,
        minimizer: &dyn BoundedMinimizer,
    ) -> Result<FitResult, FitError> {
        if !(alpha.is_finite() && alpha >= 0.0) {
            return Err(FitError::Config(format!("Invalid alpha: {alpha} (must be >= 0).")));
        }
        if fit_width && x0.len() < 2 {
            return Err(FitError::Config(
                "Width-fitting needs at least one lifetime plus the width in x0.".into(),
            ));
        }

        let columns = resolve_columns(selector, self.wlsv.ncols())?;
        let y = select_columns(&self.wlsv, &columns);

        let objective = Residual::new(&y, &self.t, alpha, fit_width, self.fwhm_mod);
        let minimum = minimizer.minimize(&objective, x0, bounds)?;

        let (lifetimes, fwhm) = if fit_width {
            let Some((&w, rest)) = minimum.x.split_last() else {
                return Err(FitError::Config("Optimizer returned an empty vector.".into()));
            };
            (rest.to_vec(), Some(w))
        } else {
            (minimum.x.clone(), None)
        };

        // Recompute the linear part at the optimum for the packaged result.
        let d = decay_matrix(&minimum.x, &self.t, fit_width, self.fwhm_mod)?;
        let das = solve_ridge(&d, &y, alpha)?;
        let spec_fit = &d * &das;
        let residual = (&y - &spec_fit).norm_squared();

        Ok(FitResult {
            lifetimes,
            fwhm,
            das,
            spec_fit,
            columns,
            residual,
            warning: minimum.warning,
        })
    }
}

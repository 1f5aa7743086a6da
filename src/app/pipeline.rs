//! Shared fit pipeline used by the CLI front-end.
//!
//! Keeping this in one place avoids duplicating the workflow:
//! sample generation -> basis construction -> global fit -> result packaging.
//! The CLI then focuses on presentation and exports.

use nalgebra::DMatrix;

use crate::data::{SampleConfig, SampleData, generate_sample};
use crate::domain::{FitResult, RunConfig};
use crate::error::FitError;
use crate::fit::{GlobalFit, NelderMead, select_columns};

/// All computed outputs of a single `gfit fit` run.
pub struct RunOutput {
    pub sample: SampleData,
    pub fit: GlobalFit,
    pub result: FitResult,
    /// The basis columns that participated in the fit, for rendering.
    pub fitted_columns: DMatrix<f64>,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &RunConfig) -> Result<RunOutput, FitError> {
    let sample = generate_sample(&SampleConfig {
        lifetimes: config.true_lifetimes.clone(),
        n_times: config.n_times,
        n_wavelengths: config.n_wavelengths,
        fwhm: config.sample_fwhm,
        noise_sigma: config.noise_sigma,
        seed: config.seed,
    })?;

    let fit = GlobalFit::from_source(&sample)?;
    let bounds = build_bounds(config)?;
    let result = fit.fit(
        &config.selector,
        &config.x0,
        &bounds,
        config.alpha,
        config.fit_width,
        &NelderMead::default(),
    )?;

    let fitted_columns = select_columns(fit.basis(), &result.columns);
    Ok(RunOutput {
        sample,
        fit,
        result,
        fitted_columns,
    })
}

/// One shared (lo, hi) pair per lifetime, plus the width bounds when the
/// trailing x0 entry is the IRF width.
fn build_bounds(config: &RunConfig) -> Result<Vec<(f64, f64)>, FitError> {
    if config.x0.is_empty() {
        return Err(FitError::Config("Empty initial guess.".into()));
    }
    let mut bounds = vec![(config.tau_lo, config.tau_hi); config.x0.len()];
    if config.fit_width {
        let last = bounds.len() - 1;
        bounds[last] = (config.width_lo, config.width_hi);
    }
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RunConfig {
        RunConfig {
            selector: String::new(),
            x0: vec![4.0, 18.0],
            tau_lo: 1.0,
            tau_hi: 50.0,
            alpha: 0.0,
            fit_width: false,
            width_lo: 0.01,
            width_hi: 5.0,
            true_lifetimes: vec![5.0, 20.0],
            n_times: 51,
            n_wavelengths: 32,
            sample_fwhm: 0.0,
            noise_sigma: 1e-4,
            seed: 42,
            export: None,
        }
    }

    #[test]
    fn pipeline_recovers_the_generating_lifetimes() {
        let run = run_fit(&config()).unwrap();
        let mut taus = run.result.lifetimes.clone();
        taus.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((taus[0] - 5.0).abs() / 5.0 < 0.05, "tau1 = {}", taus[0]);
        assert!((taus[1] - 20.0).abs() / 20.0 < 0.05, "tau2 = {}", taus[1]);
        assert_eq!(run.result.columns, vec![1, 2, 3]);
        assert_eq!(run.fitted_columns.ncols(), 3);
    }

    #[test]
    fn width_bounds_replace_the_trailing_pair() {
        let mut c = config();
        c.fit_width = true;
        c.x0 = vec![4.0, 18.0, 0.5];
        let bounds = build_bounds(&c).unwrap();
        assert_eq!(bounds.len(), 3);
        assert_eq!(bounds[0], (1.0, 50.0));
        assert_eq!(bounds[2], (0.01, 5.0));
    }
}

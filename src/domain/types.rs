//! Shared domain types.
//!
//! These are kept lightweight so they can be used in-memory during fitting and
//! exported to JSON afterwards without conversion gymnastics.

use nalgebra::DMatrix;

/// Instrument response function parameters, as supplied by a data source.
///
/// Only `fwhm` participates in the decay model; the chirp parameters are
/// carried for downstream consumers (dispersion correction, reporting).
#[derive(Debug, Clone, Default)]
pub struct Irf {
    /// Polynomial order of the chirp correction.
    pub chirp_order: usize,
    /// Full width at half maximum of the Gaussian IRF, in time-grid units.
    pub fwhm: f64,
    /// Time-zero offset.
    pub mu0: f64,
    /// Chirp polynomial coefficients.
    pub mu: Vec<f64>,
    /// Reference wavelength for the chirp polynomial.
    pub lambda0: f64,
}

impl Irf {
    /// Gaussian sigma-equivalent of the FWHM: `FWHM / (2·sqrt(ln 2))`.
    pub fn fwhm_mod(&self) -> f64 {
        crate::math::fwhm_to_sigma(self.fwhm)
    }
}

/// Raised (as data, not as an error) when the optimizer exhausts its
/// iteration budget before meeting tolerance. The accompanying parameters are
/// the best found so far.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceWarning {
    /// Iterations actually performed.
    pub iterations: usize,
    /// Objective spread across the final simplex (or equivalent measure).
    pub f_spread: f64,
}

impl std::fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Optimizer stopped after {} iterations without meeting tolerance \
             (objective spread {:.3e}); result is best-effort.",
            self.iterations, self.f_spread
        )
    }
}

/// Output of a completed global fit.
#[derive(Debug, Clone)]
pub struct FitResult {
    /// Fitted lifetimes, length K. Never includes the IRF width.
    pub lifetimes: Vec<f64>,
    /// Fitted IRF FWHM, present only when width-fitting was requested.
    pub fwhm: Option<f64>,
    /// Decay-associated spectra, K×N (one row per lifetime, one column per
    /// fitted spectral component).
    pub das: DMatrix<f64>,
    /// Reconstruction `D·DAS`, M×N, on the same time grid as the input.
    pub spec_fit: DMatrix<f64>,
    /// Resolved 1-based spectral-basis column indices, in fit order.
    pub columns: Vec<usize>,
    /// Final value of the residual objective, `||Y - D·DAS||_F^2`.
    pub residual: f64,
    /// Present when the optimizer exhausted its budget (best-effort result).
    pub warning: Option<ConvergenceWarning>,
}

/// Configuration for one `gfit` run over synthetic data.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Spectral-basis selector string ("", "4", "2 4", ...).
    pub selector: String,
    /// Initial lifetime guesses (plus trailing FWHM guess when width-fitting).
    pub x0: Vec<f64>,
    /// Shared (lower, upper) bound applied to every lifetime parameter.
    pub tau_lo: f64,
    pub tau_hi: f64,
    /// Ridge weight for the linear subproblem.
    pub alpha: f64,
    /// Fit the IRF width as the trailing optimization parameter.
    pub fit_width: bool,
    /// Bounds for the width parameter when `fit_width` is set.
    pub width_lo: f64,
    pub width_hi: f64,

    /// Synthetic sample: true lifetimes, grid sizes, IRF width, noise, seed.
    pub true_lifetimes: Vec<f64>,
    pub n_times: usize,
    pub n_wavelengths: usize,
    pub sample_fwhm: f64,
    pub noise_sigma: f64,
    pub seed: u64,

    /// Optional JSON export path.
    pub export: Option<std::path::PathBuf>,
}

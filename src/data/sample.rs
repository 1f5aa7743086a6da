//! Synthetic transient-absorption sample generation.
//!
//! Builds a dataset with known ground truth: Gaussian amplitude bands over
//! wavelength, exponential (optionally IRF-convolved) kinetics over time,
//! plus seeded Gaussian noise. The SVD is computed once here: producing the
//! spectral basis is the data supplier's job, not the fit core's.

use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::data::source::{DataSource, Svd};
use crate::domain::Irf;
use crate::error::FitError;
use crate::math::{decay_matrix, fwhm_to_sigma};

/// Wavelength window of the synthetic spectra, in nm.
const WL_MIN: f64 = 400.0;
const WL_MAX: f64 = 700.0;
/// Width of each synthetic amplitude band, in nm.
const BAND_SIGMA: f64 = 40.0;

/// Parameters of one synthetic dataset.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Ground-truth lifetimes, one amplitude band each.
    pub lifetimes: Vec<f64>,
    pub n_times: usize,
    pub n_wavelengths: usize,
    /// IRF FWHM in time-grid units; zero disables convolution.
    pub fwhm: f64,
    /// Standard deviation of the additive Gaussian noise.
    pub noise_sigma: f64,
    pub seed: u64,
}

/// A generated dataset together with its SVD.
#[derive(Debug, Clone)]
pub struct SampleData {
    /// Noisy time×wavelength data matrix.
    pub data: DMatrix<f64>,
    /// Ground-truth decay-associated spectra, K×W.
    pub das_true: DMatrix<f64>,
    t: Vec<f64>,
    wls: Vec<f64>,
    irf: Irf,
    svd: Svd,
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, FitError> {
    if config.lifetimes.is_empty() {
        return Err(FitError::Config("Sample needs at least one lifetime.".into()));
    }
    for &tau in &config.lifetimes {
        if !(tau.is_finite() && tau > 0.0) {
            return Err(FitError::NonPositiveLifetime { value: tau });
        }
    }
    if config.n_times < 2 || config.n_wavelengths < 2 {
        return Err(FitError::Config("Sample grids need at least 2 points each.".into()));
    }
    if !(config.fwhm.is_finite() && config.fwhm >= 0.0) {
        return Err(FitError::Config(format!("Invalid sample FWHM: {}.", config.fwhm)));
    }
    if !(config.noise_sigma.is_finite() && config.noise_sigma >= 0.0) {
        return Err(FitError::Config(format!(
            "Invalid noise sigma: {}.",
            config.noise_sigma
        )));
    }

    // Time grid: span three times the slowest decay; when an IRF is present,
    // start a little before time zero so the rise is visible.
    let tau_max = config.lifetimes.iter().fold(0.0_f64, |a, &b| a.max(b));
    let t0 = if config.fwhm > 0.0 { -2.0 * config.fwhm } else { 0.0 };
    let t_end = 3.0 * tau_max;
    let dt = (t_end - t0) / (config.n_times as f64 - 1.0);
    let t: Vec<f64> = (0..config.n_times).map(|i| t0 + dt * i as f64).collect();

    let wl_step = (WL_MAX - WL_MIN) / (config.n_wavelengths as f64 - 1.0);
    let wls: Vec<f64> = (0..config.n_wavelengths)
        .map(|i| WL_MIN + wl_step * i as f64)
        .collect();

    // One Gaussian amplitude band per lifetime, centers spread across the
    // window, alternating sign so the components are clearly distinct.
    let k = config.lifetimes.len();
    let das_true = DMatrix::from_fn(k, config.n_wavelengths, |row, col| {
        let center = WL_MIN + (WL_MAX - WL_MIN) * (row as f64 + 1.0) / (k as f64 + 1.0);
        let dx = (wls[col] - center) / BAND_SIGMA;
        let sign = if row % 2 == 0 { 1.0 } else { -1.0 };
        sign * (-dx * dx).exp()
    });

    let d = decay_matrix(&config.lifetimes, &t, false, fwhm_to_sigma(config.fwhm))?;
    let mut data = &d * &das_true;

    if config.noise_sigma > 0.0 {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let normal = Normal::new(0.0, config.noise_sigma)
            .map_err(|e| FitError::Config(format!("Noise distribution error: {e}")))?;
        for v in data.iter_mut() {
            *v += normal.sample(&mut rng);
        }
    }

    let svd = data.clone().svd(true, true);
    let (Some(u), Some(vt)) = (svd.u, svd.v_t) else {
        return Err(FitError::Config("SVD of the sample data failed.".into()));
    };
    let s = svd.singular_values;

    Ok(SampleData {
        data,
        das_true,
        t,
        wls,
        irf: Irf {
            fwhm: config.fwhm,
            ..Irf::default()
        },
        svd: Svd { u, s, vt },
    })
}

impl DataSource for SampleData {
    fn svd(&self) -> &Svd {
        &self.svd
    }

    fn time_grid(&self) -> &[f64] {
        &self.t
    }

    fn wavelengths(&self) -> &[f64] {
        &self.wls
    }

    fn irf(&self) -> &Irf {
        &self.irf
    }
}

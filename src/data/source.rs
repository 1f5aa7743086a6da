//! The data-supply boundary of the fitting core.

use nalgebra::{DMatrix, DVector};

use crate::domain::Irf;

/// Singular value decomposition of a transient data matrix.
#[derive(Debug, Clone)]
pub struct Svd {
    /// Left singular vectors, M×C (time side).
    pub u: DMatrix<f64>,
    /// Singular values, length C, descending.
    pub s: DVector<f64>,
    /// Right singular vectors, C×W (spectral side).
    pub vt: DMatrix<f64>,
}

/// Supplier of everything a global fit needs.
///
/// Implementations own the raw data; the fit only ever reads through this
/// trait and never mutates the source.
pub trait DataSource {
    /// Precomputed SVD of the time×wavelength data matrix.
    fn svd(&self) -> &Svd;
    /// Delay values, length M. May be non-uniformly spaced.
    fn time_grid(&self) -> &[f64];
    /// Wavelength grid (used only by visualization/reporting).
    fn wavelengths(&self) -> &[f64];
    /// Instrument response parameters.
    fn irf(&self) -> &Irf;
}

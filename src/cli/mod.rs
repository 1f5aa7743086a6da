//! Command-line parsing for the global lifetime fitter.
//!
//! Argument parsing and command dispatch stay separate from the
//! modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gfit", version, about = "Global lifetime analysis of time-resolved spectra")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a synthetic dataset, run a global fit, and print the result.
    Fit(FitArgs),
    /// Print the singular-value spectrum of a synthetic dataset.
    Sv(SampleArgs),
}

/// Options controlling the fit itself.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Spectral-basis selector: "" = first 3 columns, "N" = first N,
    /// "2 4" = exactly those columns.
    #[arg(long, default_value = "")]
    pub svs: String,

    /// Initial lifetime guesses (append the FWHM guess when --fit-width).
    #[arg(long, value_delimiter = ',', default_values_t = [4.0, 18.0])]
    pub x0: Vec<f64>,

    /// Lower bound applied to every lifetime parameter.
    #[arg(long, default_value_t = 0.1)]
    pub tau_lo: f64,

    /// Upper bound applied to every lifetime parameter.
    #[arg(long, default_value_t = 100.0)]
    pub tau_hi: f64,

    /// Ridge weight for the amplitude solve.
    #[arg(long, default_value_t = 0.0)]
    pub alpha: f64,

    /// Fit the IRF width as the trailing parameter of x0.
    #[arg(long)]
    pub fit_width: bool,

    /// Lower bound for the IRF width when --fit-width is set.
    #[arg(long, default_value_t = 0.01)]
    pub width_lo: f64,

    /// Upper bound for the IRF width when --fit-width is set.
    #[arg(long, default_value_t = 5.0)]
    pub width_hi: f64,

    /// Export the fit to a JSON file.
    #[arg(long)]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub sample: SampleArgs,
}

/// Options controlling synthetic sample generation.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Ground-truth lifetimes of the synthetic dataset.
    #[arg(long, value_delimiter = ',', default_values_t = [5.0, 20.0])]
    pub true_taus: Vec<f64>,

    /// Number of time points.
    #[arg(long, default_value_t = 51)]
    pub n_times: usize,

    /// Number of wavelength points.
    #[arg(long, default_value_t = 64)]
    pub n_wavelengths: usize,

    /// IRF FWHM of the synthetic dataset (0 = no convolution).
    #[arg(long, default_value_t = 0.0)]
    pub fwhm: f64,

    /// Additive Gaussian noise sigma.
    #[arg(long, default_value_t = 1e-3)]
    pub noise: f64,

    /// Random seed for noise generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

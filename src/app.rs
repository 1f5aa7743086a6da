//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - generates the synthetic dataset
//! - runs the global fit
//! - renders results through the visualization adapter
//! - writes optional exports

use clap::Parser;

use crate::cli::{Cli, Command, FitArgs, SampleArgs};
use crate::data::SampleConfig;
use crate::domain::RunConfig;
use crate::error::FitError;
use crate::viz::{FitView, TextAdapter, VisualizationAdapter};

pub mod pipeline;

/// Entry point for the `gfit` binary.
pub fn run() -> Result<(), FitError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Sv(args) => handle_sv(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), FitError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    // Rendering happens strictly after the fit has completed.
    let mut adapter = TextAdapter::new(std::io::stdout());
    adapter.render(&FitView {
        result: &run.result,
        fitted_columns: &run.fitted_columns,
        t: run.fit.time_grid(),
    });

    if let Some(path) = &config.export {
        crate::io::write_fit_json(path, &run.result, run.fit.time_grid())?;
    }
    Ok(())
}

fn handle_sv(args: SampleArgs) -> Result<(), FitError> {
    let sample = crate::data::generate_sample(&sample_config_from_args(&args))?;
    let s: Vec<f64> = {
        use crate::data::DataSource;
        sample.svd().s.iter().copied().collect()
    };
    println!("{}", crate::report::format_singular_values(&s));
    Ok(())
}

pub fn run_config_from_args(args: &FitArgs) -> RunConfig {
    RunConfig {
        selector: args.svs.clone(),
        x0: args.x0.clone(),
        tau_lo: args.tau_lo,
        tau_hi: args.tau_hi,
        alpha: args.alpha,
        fit_width: args.fit_width,
        width_lo: args.width_lo,
        width_hi: args.width_hi,
        true_lifetimes: args.sample.true_taus.clone(),
        n_times: args.sample.n_times,
        n_wavelengths: args.sample.n_wavelengths,
        sample_fwhm: args.sample.fwhm,
        noise_sigma: args.sample.noise,
        seed: args.sample.seed,
        export: args.export.clone(),
    }
}

fn sample_config_from_args(args: &SampleArgs) -> SampleConfig {
    SampleConfig {
        lifetimes: args.true_taus.clone(),
        n_times: args.n_times,
        n_wavelengths: args.n_wavelengths,
        fwhm: args.fwhm,
        noise_sigma: args.noise,
        seed: args.seed,
    }
}

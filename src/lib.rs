//! `globalfit` library crate.
//!
//! Global lifetime analysis of time-resolved spectra: fit a sum of
//! exponential decays (optionally convolved with a Gaussian instrument
//! response) to a reduced spectral basis via separable nonlinear least
//! squares, recovering lifetimes and decay-associated spectra.
//!
//! The binary (`gfit`) is a thin wrapper around this library so that core
//! logic is testable without spawning processes and the fitting engine is
//! reusable from other front-ends.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod report;
pub mod viz;

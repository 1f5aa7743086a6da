//! Domain types shared across the pipeline.
//!
//! This module defines:
//!
//! - the instrument response function parameters (`Irf`)
//! - fit outputs (`FitResult`, `ConvergenceWarning`)
//! - run configuration for the CLI pipeline (`RunConfig`)

pub mod types;

pub use types::*;

//! Data supply for the fitting pipeline.
//!
//! The core never loads raw experiment files itself; it consumes a
//! [`DataSource`] that hands over a precomputed SVD, the delay grid, the
//! wavelength grid, and the instrument response parameters. A deterministic
//! synthetic generator (`sample`) implements the trait so the binary and the
//! end-to-end tests have data without any file I/O.

pub mod sample;
pub mod source;

pub use sample::*;
pub use source::*;

//! Reporting utilities: text formatting of fit results and singular values.

pub mod format;

pub use format::*;

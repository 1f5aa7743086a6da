//! Result export.

pub mod export;

pub use export::*;

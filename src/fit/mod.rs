//! Global fitting orchestration.
//!
//! Responsibilities:
//!
//! - the scalar residual objective minimized over lifetimes (`objective`)
//! - the bounded minimizer abstraction and the shipped Nelder–Mead (`optimizer`)
//! - spectral-basis column selection (`selection`)
//! - the end-to-end fit assembler (`global`)

pub mod global;
pub mod objective;
pub mod optimizer;
pub mod selection;

pub use global::*;
pub use objective::*;
pub use optimizer::*;
pub use selection::*;

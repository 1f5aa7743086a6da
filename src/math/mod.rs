//! Mathematical core: decay basis generation and the regularized linear solver.

pub mod decay;
pub mod ridge;

pub use decay::*;
pub use ridge::*;

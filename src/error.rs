//! Error taxonomy for the fitting pipeline.
//!
//! Numeric failures (bad lifetimes, rank-deficient solves, malformed bounds)
//! abort the current fit attempt and surface to the caller. Non-convergence is
//! deliberately *not* an error: the optimizer returns its best-found point
//! together with a [`crate::domain::ConvergenceWarning`].

/// Fatal errors raised by the fitting pipeline.
#[derive(Clone, PartialEq)]
pub enum FitError {
    /// A non-positive lifetime (or IRF width) reached the decay model.
    NonPositiveLifetime { value: f64 },
    /// Near-zero diagonal entry in R during an unregularized solve.
    ///
    /// The decay matrix is rank-deficient (typically duplicate or
    /// near-duplicate lifetimes). The remedy is to request `alpha > 0`.
    SingularMatrix { row: usize, diag: f64 },
    /// Malformed bounds, or an initial guess outside its bounds.
    BoundsViolation(String),
    /// Invalid configuration: selector, dimensions, alpha, etc.
    Config(String),
    /// Export/file I/O failure.
    Io(String),
}

impl FitError {
    /// Process exit code for the `gfit` binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::Config(_) | FitError::BoundsViolation(_) => 2,
            FitError::Io(_) => 3,
            FitError::NonPositiveLifetime { .. } | FitError::SingularMatrix { .. } => 4,
        }
    }
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::NonPositiveLifetime { value } => {
                write!(f, "Non-positive lifetime/width in decay model: {value}")
            }
            FitError::SingularMatrix { row, diag } => write!(
                f,
                "Singular decay matrix: |R[{row},{row}]| = {diag:.3e} with alpha = 0. \
                 Lifetimes are (near-)degenerate; retry with alpha > 0."
            ),
            FitError::BoundsViolation(msg) => write!(f, "Bounds violation: {msg}"),
            FitError::Config(msg) => write!(f, "{msg}"),
            FitError::Io(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::fmt::Debug for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FitError({self})")
    }
}

impl std::error::Error for FitError {}

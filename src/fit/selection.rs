//! Spectral-basis column selection.
//!
//! Which weighted left singular vectors participate in a fit is controlled by
//! a small selector string:
//!
//! - empty/whitespace: the first three columns (or fewer if the basis is
//!   smaller)
//! - a single integer `N`: the prefix of the first `N` columns
//! - several integers: exactly those 1-based columns, in the given order
//!   (order is preserved and duplicates are allowed)

use nalgebra::DMatrix;

use crate::error::FitError;

/// Number of leading basis columns fitted when no selector is given.
const DEFAULT_PREFIX: usize = 3;

/// Resolve a selector string to explicit 1-based column indices.
pub fn resolve_columns(selector: &str, total: usize) -> Result<Vec<usize>, FitError> {
    if total == 0 {
        return Err(FitError::Config("Spectral basis has no columns.".into()));
    }

    let tokens: Vec<&str> = selector.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok((1..=total.min(DEFAULT_PREFIX)).collect());
    }

    let parsed = tokens
        .iter()
        .map(|tok| {
            tok.parse::<usize>()
                .map_err(|_| FitError::Config(format!("Invalid basis selector token: '{tok}'.")))
        })
        .collect::<Result<Vec<usize>, _>>()?;

    let check = |idx: usize| -> Result<(), FitError> {
        if idx == 0 || idx > total {
            return Err(FitError::Config(format!(
                "Basis column {idx} out of range 1..={total}."
            )));
        }
        Ok(())
    };

    if parsed.len() == 1 {
        check(parsed[0])?;
        Ok((1..=parsed[0]).collect())
    } else {
        for &idx in &parsed {
            check(idx)?;
        }
        Ok(parsed)
    }
}

/// Extract the selected columns (1-based indices) into a new matrix, in the
/// order given.
pub fn select_columns(basis: &DMatrix<f64>, indices: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(basis.nrows(), indices.len(), |i, j| {
        basis[(i, indices[j] - 1)]
    })
}

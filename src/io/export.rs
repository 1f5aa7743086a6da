//! JSON export of completed fits.
//!
//! The export is meant to be easy to consume from notebooks or downstream
//! scripts, so matrices are written as plain nested row-major arrays.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::domain::FitResult;
use crate::error::FitError;

/// On-disk representation of one fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub lifetimes: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fwhm: Option<f64>,
    /// 1-based spectral-basis column indices, in fit order.
    pub columns: Vec<usize>,
    pub residual: f64,
    pub converged: bool,
    pub t: Vec<f64>,
    /// K rows, one per lifetime.
    pub das: Vec<Vec<f64>>,
    /// M rows, one per time point.
    pub spec_fit: Vec<Vec<f64>>,
}

impl FitFile {
    pub fn from_result(result: &FitResult, t: &[f64]) -> Self {
        Self {
            lifetimes: result.lifetimes.clone(),
            fwhm: result.fwhm,
            columns: result.columns.clone(),
            residual: result.residual,
            converged: result.warning.is_none(),
            t: t.to_vec(),
            das: rows(&result.das),
            spec_fit: rows(&result.spec_fit),
        }
    }
}

fn rows(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    (0..m.nrows())
        .map(|i| (0..m.ncols()).map(|j| m[(i, j)]).collect())
        .collect()
}

/// Write one fit to a JSON file.
pub fn write_fit_json(path: &Path, result: &FitResult, t: &[f64]) -> Result<(), FitError> {
    let file = FitFile::from_result(result, t);
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| FitError::Io(format!("Failed to serialize fit: {e}")))?;

    let mut out = File::create(path)
        .map_err(|e| FitError::Io(format!("Failed to create '{}': {e}", path.display())))?;
    out.write_all(json.as_bytes())
        .map_err(|e| FitError::Io(format!("Failed to write '{}': {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_file_round_trips_through_json() {
        let result = FitResult {
            lifetimes: vec![5.0, 20.0],
            fwhm: Some(0.4),
            das: DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]),
            spec_fit: DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.5, 0.1, 0.2, 0.3]),
            columns: vec![2, 4],
            residual: 1e-5,
            warning: None,
        };
        let t = [0.0, 1.0, 2.0];

        let file = FitFile::from_result(&result, &t);
        let json = serde_json::to_string(&file).unwrap();
        let back: FitFile = serde_json::from_str(&json).unwrap();

        assert_eq!(back.lifetimes, vec![5.0, 20.0]);
        assert_eq!(back.columns, vec![2, 4]);
        assert_eq!(back.das, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(back.spec_fit.len(), 3);
        assert!(back.converged);
    }
}

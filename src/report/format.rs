//! Deterministic text formatting of fit outputs.
//!
//! Formatting lives in one place so the math/fitting code stays clean and
//! output changes are localized (useful for golden tests).

use crate::domain::FitResult;

/// Format the full fit summary: selected columns, lifetimes, width,
/// residual, and the DAS table.
pub fn format_fit_summary(result: &FitResult) -> String {
    let mut out = String::new();

    out.push_str("=== gfit - Global Lifetime Fit ===\n");
    out.push_str(&format!(
        "Singular vectors for fit: {}\n",
        result
            .columns
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    ));
    out.push_str(&format!(
        "Fitted lifetimes: [{}]\n",
        result
            .lifetimes
            .iter()
            .map(|t| format!("{t:.4}"))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    if let Some(fwhm) = result.fwhm {
        out.push_str(&format!("Fitted IRF FWHM: {fwhm:.4}\n"));
    }
    out.push_str(&format!("Residual: {:.6e}\n", result.residual));

    out.push_str("\nDecay-associated spectra (rows = lifetimes, cols = components):\n");
    for (row, tau) in result.lifetimes.iter().enumerate() {
        let amps = (0..result.das.ncols())
            .map(|col| format!("{:>10.4}", result.das[(row, col)]))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!("  tau {tau:>9.4} | {amps}\n"));
    }

    if let Some(warning) = &result.warning {
        out.push_str(&format!("\nWARNING: {warning}\n"));
    }

    out
}

/// Format the singular-value spectrum with the fraction each value carries.
pub fn format_singular_values(s: &[f64]) -> String {
    let total: f64 = s.iter().map(|v| v * v).sum();
    let mut out = String::new();
    out.push_str("=== gfit - Singular Values ===\n");
    out.push_str("  n |       value | variance share\n");
    for (i, &v) in s.iter().enumerate() {
        let share = if total > 0.0 { v * v / total } else { 0.0 };
        out.push_str(&format!("{:>3} | {v:>11.4e} | {share:>13.6}\n", i + 1));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConvergenceWarning;
    use nalgebra::DMatrix;

    fn result() -> FitResult {
        FitResult {
            lifetimes: vec![5.0, 20.0],
            fwhm: None,
            das: DMatrix::from_row_slice(2, 2, &[1.0, -0.5, 0.25, 0.75]),
            spec_fit: DMatrix::zeros(3, 2),
            columns: vec![1, 2],
            residual: 1.5e-4,
            warning: None,
        }
    }

    #[test]
    fn summary_lists_columns_and_lifetimes() {
        let text = format_fit_summary(&result());
        assert!(text.contains("Singular vectors for fit: 1 2"));
        assert!(text.contains("5.0000"));
        assert!(text.contains("20.0000"));
        assert!(!text.contains("WARNING"));
    }

    #[test]
    fn summary_includes_width_and_warning_when_present() {
        let mut r = result();
        r.fwhm = Some(0.35);
        r.warning = Some(ConvergenceWarning {
            iterations: 100,
            f_spread: 1e-3,
        });
        let text = format_fit_summary(&r);
        assert!(text.contains("Fitted IRF FWHM: 0.3500"));
        assert!(text.contains("WARNING"));
    }

    #[test]
    fn singular_value_shares_sum_to_one() {
        let text = format_singular_values(&[3.0, 1.0]);
        assert!(text.contains("0.9"));
        assert!(text.lines().count() >= 4);
    }
}

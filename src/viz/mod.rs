//! The visualization boundary.
//!
//! The fit pipeline never renders anything itself; after a fit completes it
//! hands an immutable [`FitView`] to a [`VisualizationAdapter`]. Nothing the
//! adapter does flows back into fitting, so a slow or interactive sink cannot
//! affect optimizer convergence. Rendering must happen strictly after the fit
//! returns, never from inside an objective evaluation.

use nalgebra::DMatrix;

use crate::domain::FitResult;

/// Everything a renderer needs from one completed fit.
pub struct FitView<'a> {
    pub result: &'a FitResult,
    /// The spectral-basis columns that were fitted, M×N, matching
    /// `result.columns`.
    pub fitted_columns: &'a DMatrix<f64>,
    pub t: &'a [f64],
}

/// A pure rendering sink.
pub trait VisualizationAdapter {
    /// Render one completed fit.
    fn render(&mut self, view: &FitView<'_>);

    /// Optional selection event (e.g. the user picked component `index`,
    /// 0-based into `result.columns`). Default: ignored.
    fn on_select(&mut self, _view: &FitView<'_>, _index: usize) {}
}

/// Text adapter: writes the formatted summary to any `io::Write` sink.
pub struct TextAdapter<W: std::io::Write> {
    out: W,
}

impl<W: std::io::Write> TextAdapter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: std::io::Write> VisualizationAdapter for TextAdapter<W> {
    fn render(&mut self, view: &FitView<'_>) {
        // A rendering sink has no feedback channel; a failed write cannot
        // abort a fit that already finished.
        let _ = write!(self.out, "{}", crate::report::format_fit_summary(view.result));
    }
}

// src/chart/mod.rs

use anyhow::{anyhow, Error, Result};
use plotters::style::RGBColor;
use std::ops::Range;
use std::path::Path;

use crate::analysis::{BinnedPay, DepartmentSubset, MedianPivot, PayrollForecast};
use crate::report::format_thousands;

pub mod boxplot;
pub mod forecast;
pub mod median;
pub mod scatter;

pub use boxplot::render_pay_boxplot;
pub use forecast::render_forecast;
pub use median::render_median_trend;
pub use scatter::render_pay_scatter;

pub const SCATTER_FILE: &str = "pay_vs_service_scatter.png";
pub const BOXPLOT_FILE: &str = "pay_distribution_boxplot.png";
pub const FORECAST_FILE: &str = "payroll_forecast_ci.png";
pub const MEDIAN_FILE: &str = "median_pay_by_job_title.png";

/// Where the pipeline sends its four charts.
pub trait ChartSink {
    fn pay_scatter(&mut self, subset: &DepartmentSubset, path: &Path) -> Result<()>;
    fn pay_boxplot(
        &mut self,
        department: &str,
        job_titles: &[String],
        binned: &BinnedPay,
        path: &Path,
    ) -> Result<()>;
    fn forecast(&mut self, forecast: &PayrollForecast, path: &Path) -> Result<()>;
    fn median_trend(&mut self, department: &str, pivot: &MedianPivot, path: &Path) -> Result<()>;
}

/// Renders every chart as a PNG with plotters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCharts;

impl ChartSink for PngCharts {
    fn pay_scatter(&mut self, subset: &DepartmentSubset, path: &Path) -> Result<()> {
        render_pay_scatter(subset, path)
    }

    fn pay_boxplot(
        &mut self,
        department: &str,
        job_titles: &[String],
        binned: &BinnedPay,
        path: &Path,
    ) -> Result<()> {
        render_pay_boxplot(department, job_titles, binned, path)
    }

    fn forecast(&mut self, forecast: &PayrollForecast, path: &Path) -> Result<()> {
        render_forecast(forecast, path)
    }

    fn median_trend(&mut self, department: &str, pivot: &MedianPivot, path: &Path) -> Result<()> {
        render_median_trend(department, pivot, path)
    }
}

pub(crate) const CAPTION_FONT: (&str, i32) = ("sans-serif", 22);

const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Colour for the `idx`-th series, cycling after ten.
pub fn series_color(idx: usize) -> RGBColor {
    PALETTE[idx % PALETTE.len()]
}

/// Plotters errors are generic over the backend; flatten them for `?`.
pub(crate) fn draw_err<E: std::fmt::Display>(e: E) -> Error {
    anyhow!("chart rendering failed: {}", e)
}

/// `[min, max]` of `values` widened by 5% on each side. Falls back to `0..1`
/// when there is nothing to show.
pub fn padded_range<I: IntoIterator<Item = f64>>(values: I) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return 0.0..1.0;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { lo.abs().max(1.0) * 0.05 };
    (lo - pad)..(hi + pad)
}

/// Axis labels such as `$1,250,000`.
pub fn axis_currency(v: &f64) -> String {
    let s = format_thousands(v.round());
    format!("${}", s.trim_end_matches(".00"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_range_widens_both_sides() {
        let r = padded_range([10.0, 20.0]);
        assert!((r.start - 9.5).abs() < 1e-12);
        assert!((r.end - 20.5).abs() < 1e-12);
    }

    #[test]
    fn padded_range_handles_degenerate_input() {
        assert_eq!(padded_range(Vec::<f64>::new()), 0.0..1.0);
        let r = padded_range([100.0]);
        assert!(r.start < 100.0 && r.end > 100.0);
        assert_eq!(padded_range([f64::NAN]), 0.0..1.0);
    }

    #[test]
    fn axis_labels() {
        assert_eq!(axis_currency(&1_250_000.4), "$1,250,000");
        assert_eq!(axis_currency(&0.0), "$0");
    }

    #[test]
    fn palette_cycles() {
        let rgb = |c: RGBColor| (c.0, c.1, c.2);
        assert_eq!(rgb(series_color(0)), rgb(series_color(10)));
        assert_ne!(rgb(series_color(0)), rgb(series_color(1)));
    }
}

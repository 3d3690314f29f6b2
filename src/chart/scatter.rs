use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

use super::{axis_currency, draw_err, padded_range, series_color, CAPTION_FONT};
use crate::analysis::DepartmentSubset;

/// Tenure vs total pay, one colour per job title. An empty subset still
/// produces a (blank) chart.
pub fn render_pay_scatter(subset: &DepartmentSubset, path: &Path) -> Result<()> {
    let series: Vec<(&String, Vec<(f64, f64)>)> = subset
        .job_titles
        .iter()
        .map(|t| (t, subset.points_for(t)))
        .collect();
    let x_range = padded_range(series.iter().flat_map(|(_, p)| p.iter().map(|(x, _)| *x)));
    let y_range = padded_range(series.iter().flat_map(|(_, p)| p.iter().map(|(_, y)| *y)));

    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "{}: Estimated Years of Service vs Total Pay by Job Title",
                subset.department
            ),
            CAPTION_FONT,
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(100)
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Estimated Years of Service")
        .y_desc("Total Payments ($)")
        .y_label_formatter(&axis_currency)
        .draw()
        .map_err(draw_err)?;

    for (idx, (title, points)) in series.into_iter().enumerate() {
        let color = series_color(idx);
        chart
            .draw_series(
                points
                    .into_iter()
                    .map(move |p| Circle::new(p, 3, color.mix(0.6).filled())),
            )
            .map_err(draw_err)?
            .label(title.as_str())
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    if !subset.job_titles.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    info!(path = %path.display(), points = subset.records.len(), "wrote scatter");
    Ok(())
}

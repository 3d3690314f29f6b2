use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

use super::{axis_currency, draw_err, padded_range, series_color, CAPTION_FONT};
use crate::analysis::MedianPivot;

/// One line per job title through its yearly median pay.
pub fn render_median_trend(department: &str, pivot: &MedianPivot, path: &Path) -> Result<()> {
    let x_range = padded_range(pivot.years.iter().map(|y| *y as f64));
    let y_range = padded_range(pivot.cells.iter().flatten().flatten().copied());

    let root = BitMapBackend::new(path, (1400, 700)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Median Total Pay Over Time by Job Title ({})", department),
            CAPTION_FONT,
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(100)
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Median Total Payments ($)")
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&axis_currency)
        .draw()
        .map_err(draw_err)?;

    for (idx, title) in pivot.job_titles.iter().enumerate() {
        let color = series_color(idx);
        let points: Vec<(f64, f64)> = pivot
            .series(title)
            .into_iter()
            .map(|(y, v)| (y as f64, v))
            .collect();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(draw_err)?
            .label(title.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart
            .draw_series(points.iter().map(|p| Circle::new(*p, 3, color.filled())))
            .map_err(draw_err)?;
    }

    if !pivot.job_titles.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    info!(path = %path.display(), titles = pivot.job_titles.len(), "wrote median trend");
    Ok(())
}

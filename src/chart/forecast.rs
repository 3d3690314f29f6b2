use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

use super::{axis_currency, draw_err, padded_range, CAPTION_FONT};
use crate::analysis::PayrollForecast;

const DASHES_PER_SEGMENT: usize = 8;

/// Cut a polyline into short pieces, keeping every other one.
pub fn dashed_segments(points: &[(f64, f64)]) -> Vec<[(f64, f64); 2]> {
    let mut dashes = Vec::new();
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        let step = 1.0 / DASHES_PER_SEGMENT as f64;
        for k in (0..DASHES_PER_SEGMENT).step_by(2) {
            let t0 = k as f64 * step;
            let t1 = t0 + step;
            dashes.push([
                (x0 + (x1 - x0) * t0, y0 + (y1 - y0) * t0),
                (x0 + (x1 - x0) * t1, y0 + (y1 - y0) * t1),
            ]);
        }
    }
    dashes
}

/// Historical totals, the dashed forecast and its shaded band.
pub fn render_forecast(forecast: &PayrollForecast, path: &Path) -> Result<()> {
    let history: Vec<(f64, f64)> = forecast
        .history
        .iter()
        .map(|(y, v)| (*y as f64, *v))
        .collect();
    let projected: Vec<(f64, f64)> = forecast
        .points
        .iter()
        .map(|p| (p.year as f64, p.forecast))
        .collect();

    let x_range = padded_range(
        history
            .iter()
            .chain(&projected)
            .map(|(x, _)| *x),
    );
    let y_range = padded_range(
        history.iter().map(|(_, v)| *v).chain(
            forecast
                .points
                .iter()
                .flat_map(|p| [p.lower_ci, p.upper_ci]),
        ),
    );
    let (first, last) = match (forecast.points.first(), forecast.points.last()) {
        (Some(f), Some(l)) => (f.year, l.year),
        _ => (0, 0),
    };

    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "Payroll Forecast: {}-{} with 95% Confidence Interval",
                first, last
            ),
            CAPTION_FONT,
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(110)
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Total Payroll ($)")
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&axis_currency)
        .draw()
        .map_err(draw_err)?;

    let band_color = GREEN.mix(0.2);
    let mut band: Vec<(f64, f64)> = forecast
        .points
        .iter()
        .map(|p| (p.year as f64, p.upper_ci))
        .collect();
    band.extend(
        forecast
            .points
            .iter()
            .rev()
            .map(|p| (p.year as f64, p.lower_ci)),
    );
    chart
        .draw_series(std::iter::once(Polygon::new(band, band_color.filled())))
        .map_err(draw_err)?
        .label("95% Confidence Interval")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], band_color.filled()));

    chart
        .draw_series(LineSeries::new(history.iter().copied(), BLUE.stroke_width(2)))
        .map_err(draw_err)?
        .label("Historical")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
    chart
        .draw_series(
            history
                .iter()
                .map(|p| Circle::new(*p, 4, BLUE.filled())),
        )
        .map_err(draw_err)?;

    chart
        .draw_series(
            dashed_segments(&projected)
                .into_iter()
                .map(|d| PathElement::new(d.to_vec(), GREEN.stroke_width(2))),
        )
        .map_err(draw_err)?
        .label("Forecast (Holt-Winters)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 8, y)], GREEN.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    info!(path = %path.display(), "wrote forecast chart");
    Ok(())
}

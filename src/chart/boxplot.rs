use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

use super::{axis_currency, draw_err, padded_range, series_color, CAPTION_FONT};
use crate::analysis::BinnedPay;

/// Share of each bin's width taken up by its boxes.
const GROUP_WIDTH: f64 = 0.8;

/// Horizontal span `(left, right)` of the box for `slot` out of `slots`
/// inside bin `bin`. Bin `i` covers `[i, i + 1)` on the x axis.
pub fn box_span(bin: usize, slot: usize, slots: usize) -> (f64, f64) {
    let slots = slots.max(1);
    let width = GROUP_WIDTH / slots as f64;
    let left = bin as f64 + (1.0 - GROUP_WIDTH) / 2.0 + slot as f64 * width;
    (left + width * 0.1, left + width * 0.9)
}

/// Grouped box plot of pay per tenure bin and job title.
pub fn render_pay_boxplot(
    department: &str,
    job_titles: &[String],
    binned: &BinnedPay,
    path: &Path,
) -> Result<()> {
    let y_range = padded_range(binned.groups.iter().flat_map(|g| {
        let s = &g.stats;
        [s.whisker_low, s.whisker_high]
            .into_iter()
            .chain(s.outliers.iter().copied())
    }));
    let bins = binned.bins.bin_count();

    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{}: Pay Distribution by Years of Service (Binned)", department),
            CAPTION_FONT,
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(100)
        .build_cartesian_2d(0.0..bins as f64, y_range)
        .map_err(draw_err)?;

    let edges = &binned.bins.edges;
    let edge_label = |x: &f64| {
        let i = x.round();
        if (x - i).abs() < 1e-9 && i >= 0.0 && (i as usize) < edges.len() {
            format!("{:.1}", edges[i as usize])
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bins + 1)
        .x_label_formatter(&edge_label)
        .x_desc("Service Years")
        .y_desc("Total Payments ($)")
        .y_label_formatter(&axis_currency)
        .draw()
        .map_err(draw_err)?;

    for group in &binned.groups {
        let slot = job_titles
            .iter()
            .position(|t| *t == group.job_title)
            .unwrap_or(0);
        let color = series_color(slot);
        let (x0, x1) = box_span(group.bin, slot, job_titles.len());
        let xm = (x0 + x1) / 2.0;
        let s = &group.stats;

        chart
            .draw_series([
                Rectangle::new([(x0, s.q1), (x1, s.q3)], color.mix(0.6).filled()),
                Rectangle::new([(x0, s.q1), (x1, s.q3)], BLACK.stroke_width(1)),
            ])
            .map_err(draw_err)?;
        chart
            .draw_series([
                PathElement::new(vec![(x0, s.median), (x1, s.median)], BLACK.stroke_width(2)),
                PathElement::new(vec![(xm, s.q3), (xm, s.whisker_high)], BLACK.stroke_width(1)),
                PathElement::new(vec![(xm, s.q1), (xm, s.whisker_low)], BLACK.stroke_width(1)),
                PathElement::new(
                    vec![(x0, s.whisker_high), (x1, s.whisker_high)],
                    BLACK.stroke_width(1),
                ),
                PathElement::new(
                    vec![(x0, s.whisker_low), (x1, s.whisker_low)],
                    BLACK.stroke_width(1),
                ),
            ])
            .map_err(draw_err)?;
        chart
            .draw_series(
                s.outliers
                    .iter()
                    .map(|v| Circle::new((xm, *v), 2, BLACK.stroke_width(1))),
            )
            .map_err(draw_err)?;
    }

    for (idx, title) in job_titles.iter().enumerate() {
        let color = series_color(idx);
        chart
            .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())
            .map_err(draw_err)?
            .label(title.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    info!(path = %path.display(), boxes = binned.groups.len(), "wrote box plot");
    Ok(())
}

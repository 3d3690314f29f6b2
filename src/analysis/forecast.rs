// src/analysis/forecast.rs

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::holt::{fit_holt, HoltFit};
use crate::model::ServiceRecord;

/// Sum of `total_payments` per year, ascending.
pub fn payroll_by_year(records: &[ServiceRecord]) -> BTreeMap<i32, f64> {
    let mut totals = BTreeMap::new();
    for r in records {
        *totals.entry(r.year()).or_insert(0.0) += r.total_payments();
    }
    totals
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub year: i32,
    pub forecast: f64,
    pub lower_ci: f64,
    pub upper_ci: f64,
}

/// Holt forecast of annual payroll with a constant-width interval.
#[derive(Debug, Clone)]
pub struct PayrollForecast {
    pub history: BTreeMap<i32, f64>,
    pub points: Vec<ForecastPoint>,
    pub residual_std: f64,
    pub z: f64,
    pub fit: HoltFit,
}

impl PayrollForecast {
    pub fn final_point(&self) -> Option<&ForecastPoint> {
        self.points.last()
    }
}

/// Fit on the whole `history` and forecast `end - start + 1` years, labelled
/// `start..=end`. Every point gets the same band, `± z * residual_std`.
pub fn forecast_payroll(
    history: &BTreeMap<i32, f64>,
    start: i32,
    end: i32,
    z: f64,
) -> Result<PayrollForecast> {
    if end < start {
        bail!("forecast end year {} is before start year {}", end, start);
    }
    let series: Vec<f64> = history.values().copied().collect();
    let fit = fit_holt(&series).context("fitting payroll trend")?;

    if let Some((&last, _)) = history.iter().next_back() {
        if start != last + 1 {
            warn!(
                last_observed = last,
                forecast_start = start,
                "forecast years do not directly follow the observed history"
            );
        }
    }

    let horizon = (end - start + 1) as usize;
    let residual_std = fit.residual_std();
    let band = z * residual_std;
    let points: Vec<ForecastPoint> = (start..=end)
        .zip(fit.forecast(horizon))
        .map(|(year, forecast)| ForecastPoint {
            year,
            forecast,
            lower_ci: forecast - band,
            upper_ci: forecast + band,
        })
        .collect();

    info!(
        years = history.len(),
        horizon,
        residual_std,
        alpha = fit.params.alpha,
        beta = fit.params.beta,
        "payroll forecast ready"
    );

    Ok(PayrollForecast {
        history: history.clone(),
        points,
        residual_std,
        z,
        fit,
    })
}

// src/analysis/holt.rs

use anyhow::{bail, Result};
use tracing::debug;

/// Smoothing weights plus the level/trend state before the first observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoltParams {
    pub alpha: f64,
    pub beta: f64,
    pub initial_level: f64,
    pub initial_trend: f64,
}

/// A fitted additive-trend (Holt) model.
#[derive(Debug, Clone)]
pub struct HoltFit {
    pub params: HoltParams,
    observed: Vec<f64>,
    fitted: Vec<f64>,
    level: f64,
    trend: f64,
    sse: f64,
}

const GRID_STEPS: usize = 20;
const REFINE_ROUNDS: usize = 3;

impl HoltFit {
    /// Run the level/trend recursions with fixed parameters.
    pub fn with_params(series: &[f64], params: HoltParams) -> Self {
        let (fitted, level, trend) = run_filter(
            series,
            params.alpha,
            params.beta,
            params.initial_level,
            params.initial_trend,
        );
        let sse = fitted
            .iter()
            .zip(series)
            .map(|(f, y)| (f - y).powi(2))
            .sum();
        Self {
            params,
            observed: series.to_vec(),
            fitted,
            level,
            trend,
            sse,
        }
    }

    /// Fixed smoothing weights; the starting level and trend are solved by
    /// least squares for those weights.
    pub fn with_smoothing(series: &[f64], alpha: f64, beta: f64) -> Self {
        let (initial_level, initial_trend) = solve_initial_state(series, alpha, beta);
        Self::with_params(
            series,
            HoltParams {
                alpha,
                beta,
                initial_level,
                initial_trend,
            },
        )
    }

    /// One-step-ahead in-sample estimates.
    pub fn fitted(&self) -> &[f64] {
        &self.fitted
    }

    /// `fitted - observed` per point.
    pub fn residuals(&self) -> Vec<f64> {
        self.fitted
            .iter()
            .zip(&self.observed)
            .map(|(f, y)| f - y)
            .collect()
    }

    /// Sample standard deviation (n - 1) of the residuals.
    pub fn residual_std(&self) -> f64 {
        let r = self.residuals();
        if r.len() < 2 {
            return 0.0;
        }
        let n = r.len() as f64;
        let mean = r.iter().sum::<f64>() / n;
        let var = r.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        var.sqrt()
    }

    pub fn sse(&self) -> f64 {
        self.sse
    }

    /// `level + k * trend` for `k = 1..=horizon`.
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        (1..=horizon)
            .map(|k| self.level + k as f64 * self.trend)
            .collect()
    }
}

/// Fit Holt's linear method by minimizing the in-sample squared one-step error.
///
/// Alpha and beta are searched over `[0, 1]`: a coarse grid first, then
/// progressively finer grids around the best point. For each candidate the
/// initial state is solved in closed form.
pub fn fit_holt(series: &[f64]) -> Result<HoltFit> {
    if series.len() < 2 {
        bail!(
            "insufficient history for trend smoothing: need at least 2 observations, got {}",
            series.len()
        );
    }
    if series.iter().any(|v| !v.is_finite()) {
        bail!("series contains non-finite values");
    }

    let mut best = HoltFit::with_smoothing(series, 0.0, 0.0);
    for i in 0..=GRID_STEPS {
        for j in 0..=GRID_STEPS {
            let alpha = i as f64 / GRID_STEPS as f64;
            let beta = j as f64 / GRID_STEPS as f64;
            let candidate = HoltFit::with_smoothing(series, alpha, beta);
            if candidate.sse < best.sse {
                best = candidate;
            }
        }
    }

    let mut step = 1.0 / GRID_STEPS as f64;
    for _ in 0..REFINE_ROUNDS {
        let (centre_a, centre_b) = (best.params.alpha, best.params.beta);
        step /= 10.0;
        for i in -10i32..=10 {
            for j in -10i32..=10 {
                let alpha = (centre_a + i as f64 * step).clamp(0.0, 1.0);
                let beta = (centre_b + j as f64 * step).clamp(0.0, 1.0);
                let candidate = HoltFit::with_smoothing(series, alpha, beta);
                if candidate.sse < best.sse {
                    best = candidate;
                }
            }
        }
    }

    debug!(
        alpha = best.params.alpha,
        beta = best.params.beta,
        initial_level = best.params.initial_level,
        initial_trend = best.params.initial_trend,
        sse = best.sse,
        "fitted Holt model"
    );
    Ok(best)
}

fn run_filter(series: &[f64], alpha: f64, beta: f64, l0: f64, b0: f64) -> (Vec<f64>, f64, f64) {
    let mut level = l0;
    let mut trend = b0;
    let mut fitted = Vec::with_capacity(series.len());
    for &y in series {
        fitted.push(level + trend);
        let prev_level = level;
        level = alpha * y + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
    }
    (fitted, level, trend)
}

/// The fitted values are linear in the initial state, so for fixed weights the
/// best `(l0, b0)` is a 2x2 least-squares solve.
fn solve_initial_state(series: &[f64], alpha: f64, beta: f64) -> (f64, f64) {
    let zeros = vec![0.0; series.len()];
    let (base, _, _) = run_filter(series, alpha, beta, 0.0, 0.0);
    let (unit_level, _, _) = run_filter(&zeros, alpha, beta, 1.0, 0.0);
    let (unit_trend, _, _) = run_filter(&zeros, alpha, beta, 0.0, 1.0);

    let r: Vec<f64> = base.iter().zip(series).map(|(f, y)| f - y).collect();
    let dot = |a: &[f64], b: &[f64]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>();

    let aa = dot(&unit_level, &unit_level);
    let ab = dot(&unit_level, &unit_trend);
    let bb = dot(&unit_trend, &unit_trend);
    let ar = dot(&unit_level, &r);
    let br = dot(&unit_trend, &r);

    let det = aa * bb - ab * ab;
    if det.abs() <= 1e-12 * (aa * bb).max(1.0) {
        // collinear basis: start from the first two observations
        let slope = series[1] - series[0];
        return (series[0] - slope, slope);
    }
    let l0 = (-ar * bb + br * ab) / det;
    let b0 = (-br * aa + ar * ab) / det;
    (l0, b0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * b.abs().max(1.0)
    }

    #[test]
    fn recursions_with_known_parameters() {
        let fit = HoltFit::with_params(
            &[12.0, 14.0],
            HoltParams {
                alpha: 0.5,
                beta: 0.5,
                initial_level: 10.0,
                initial_trend: 0.0,
            },
        );
        assert_eq!(fit.fitted(), &[10.0, 11.5]);
        assert_eq!(fit.residuals(), vec![-2.0, -2.5]);
        assert_eq!(fit.forecast(2), vec![13.875, 15.0]);
        assert_eq!(fit.sse(), 4.0 + 6.25);
    }

    #[test]
    fn linear_series_is_extrapolated() -> Result<()> {
        let series: Vec<f64> = (0..6).map(|t| 1_000.0 + 250.0 * t as f64).collect();
        let fit = fit_holt(&series)?;
        let fc = fit.forecast(3);
        assert!(close(fc[0], 2_500.0, 1e-6), "{:?}", fc);
        assert!(close(fc[1], 2_750.0, 1e-6), "{:?}", fc);
        assert!(close(fc[2], 3_000.0, 1e-6), "{:?}", fc);
        assert!(fit.residual_std() < 1e-6);
        Ok(())
    }

    #[test]
    fn optimized_fit_beats_fixed_weights() -> Result<()> {
        let series = [
            120.0, 131.0, 128.0, 142.0, 150.0, 149.0, 163.0, 171.0, 168.0, 180.0,
        ];
        let fit = fit_holt(&series)?;
        for (a, b) in [(0.5, 0.5), (0.2, 0.1), (1.0, 0.0), (0.9, 0.9)] {
            let fixed = HoltFit::with_smoothing(&series, a, b);
            assert!(fit.sse() <= fixed.sse() + 1e-9, "{} > {}", fit.sse(), fixed.sse());
        }
        assert!((0.0..=1.0).contains(&fit.params.alpha));
        assert!((0.0..=1.0).contains(&fit.params.beta));
        Ok(())
    }

    #[test]
    fn two_points_fit_exactly() -> Result<()> {
        let fit = fit_holt(&[50_000.0, 52_000.0])?;
        assert!(fit.sse() < 1e-6);
        assert_eq!(fit.residuals().len(), 2);
        Ok(())
    }

    #[test]
    fn needs_two_observations() {
        assert!(fit_holt(&[]).is_err());
        let err = fit_holt(&[1.0]).unwrap_err();
        assert!(err.to_string().contains("insufficient history"));
        assert!(fit_holt(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn residual_std_uses_sample_denominator() {
        let fit = HoltFit::with_params(
            &[1.0, 2.0, 3.0],
            HoltParams {
                alpha: 0.0,
                beta: 0.0,
                initial_level: 2.0,
                initial_trend: 0.0,
            },
        );
        // residuals: 1, 0, -1
        assert_eq!(fit.residuals(), vec![1.0, 0.0, -1.0]);
        assert!((fit.residual_std() - 1.0).abs() < 1e-12);
    }
}

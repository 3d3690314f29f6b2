// src/pipeline.rs

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use tracing::{info, warn};

use crate::analysis::{
    forecast_payroll, payroll_by_year, DepartmentSubset, MedianPivot, PayrollForecast,
};
use crate::chart::{self, ChartSink, PngCharts};
use crate::config::AnalysisConfig;
use crate::export;
use crate::model::ServiceRecord;
use crate::process::{self, CleaningReport};
use crate::report;

/// What one run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub cleaning: CleaningReport,
    pub records: usize,
    pub department_records: usize,
    pub forecast: PayrollForecast,
    pub console: Vec<String>,
    pub written: Vec<PathBuf>,
}

/// Load, clean and derive tenure: the table every view reads.
pub fn prepare_records(config: &AnalysisConfig) -> Result<(Vec<ServiceRecord>, CleaningReport)> {
    let raw = process::load_payroll_csv(&config.input)?;
    let (records, cleaning) = process::clean_records(&raw)
        .with_context(|| format!("cleaning {:?}", config.input))?;
    Ok((process::derive_tenure(records), cleaning))
}

/// Run every step in order and print the forecast lines.
pub fn run(config: &AnalysisConfig) -> Result<RunOutcome> {
    config.validate()?;
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating output directory {:?}", config.output_dir))?;

    let (records, cleaning) = prepare_records(config)?;
    let outcome = analyse(config, &records, cleaning, &mut PngCharts)?;
    for line in &outcome.console {
        println!("{}", line);
    }
    Ok(outcome)
}

/// The three views plus optional exports over an already prepared table.
pub fn analyse<C: ChartSink>(
    config: &AnalysisConfig,
    records: &[ServiceRecord],
    cleaning: CleaningReport,
    charts: &mut C,
) -> Result<RunOutcome> {
    let out = &config.output_dir;
    let mut written = Vec::new();

    // ─── 1) pay vs service ───────────────────────────────────────────
    let subset = DepartmentSubset::select(records, &config.department, config.top_job_titles);
    let scatter_path = out.join(chart::SCATTER_FILE);
    charts.pay_scatter(&subset, &scatter_path)?;
    written.push(scatter_path);

    match subset.binned_pay(config.service_bins) {
        Some(binned) => {
            let path = out.join(chart::BOXPLOT_FILE);
            charts.pay_boxplot(&subset.department, &subset.job_titles, &binned, &path)?;
            written.push(path);
        }
        None => {
            warn!(
                department = %config.department,
                "No records found for selected department with top job titles; skipping box plot"
            );
        }
    }

    // ─── 2) payroll forecast ─────────────────────────────────────────
    let history = payroll_by_year(records);
    let forecast = forecast_payroll(
        &history,
        config.forecast_start,
        config.forecast_end,
        config.z,
    )?;
    let forecast_path = out.join(chart::FORECAST_FILE);
    charts.forecast(&forecast, &forecast_path)?;
    written.push(forecast_path);

    let console = forecast
        .final_point()
        .map(|p| report::forecast_lines(p).to_vec())
        .unwrap_or_default();

    // ─── 3) median pay by job title ──────────────────────────────────
    let pivot = MedianPivot::build(&subset.records);
    let median_path = out.join(chart::MEDIAN_FILE);
    charts.median_trend(&subset.department, &pivot, &median_path)?;
    written.push(median_path);

    // ─── 4) optional tables ──────────────────────────────────────────
    if config.export_tables {
        let summary = export::RunSummary::new(
            &config.department,
            &cleaning,
            records.len(),
            subset.records.len(),
            &subset.job_titles,
            &forecast,
        );
        written.extend(export::export_tables(out, records, &forecast, &summary)?);
    }

    info!(files = written.len(), "analysis complete");
    Ok(RunOutcome {
        cleaning,
        records: records.len(),
        department_records: subset.records.len(),
        forecast,
        console,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::BinnedPay;
    use std::io::Write;
    use std::path::Path;
    use tempfile::tempdir;

    /// Records which charts were asked for instead of drawing them.
    #[derive(Default)]
    struct ChartLog {
        drawn: Vec<String>,
    }

    impl ChartLog {
        fn note(&mut self, path: &Path) -> Result<()> {
            let name = path.file_name().context("chart path has no file name")?;
            self.drawn.push(name.to_string_lossy().into_owned());
            Ok(())
        }
    }

    impl ChartSink for ChartLog {
        fn pay_scatter(&mut self, _: &DepartmentSubset, path: &Path) -> Result<()> {
            self.note(path)
        }

        fn pay_boxplot(&mut self, _: &str, _: &[String], _: &BinnedPay, path: &Path) -> Result<()> {
            self.note(path)
        }

        fn forecast(&mut self, _: &PayrollForecast, path: &Path) -> Result<()> {
            self.note(path)
        }

        fn median_trend(&mut self, _: &str, _: &MedianPivot, path: &Path) -> Result<()> {
            self.note(path)
        }
    }

    const SAMPLE: &str = "Year,Department Title,Job Class Title,Total Payments
2006,Police (LAPD),Police Officer II,\"$50,000\"
2007,Police (LAPD),Police Officer II,\"$52,000\"
2008,Police (LAPD),Police Officer II,\"$55,500\"
2008,Police (LAPD),Police Sergeant I,\"$80,000\"
2009,Police (LAPD),Police Sergeant I,\"$83,250.50\"
2009,Fire (LAFD),Firefighter III,\"$70,000\"
2004,Fire (LAFD),Firefighter III,\"$1\"
";

    fn sample_config(dir: &std::path::Path) -> Result<AnalysisConfig> {
        let input = dir.join("payroll.csv");
        let mut f = fs::File::create(&input)?;
        f.write_all(SAMPLE.as_bytes())?;
        Ok(AnalysisConfig {
            input,
            output_dir: dir.join("figures"),
            forecast_start: 2010,
            forecast_end: 2012,
            ..Default::default()
        })
    }

    #[test]
    fn prepares_clean_table() -> Result<()> {
        let dir = tempdir()?;
        let cfg = sample_config(dir.path())?;
        let (records, cleaning) = prepare_records(&cfg)?;
        assert_eq!(cleaning.rows_read, 7);
        assert_eq!(cleaning.year_out_of_range, 1);
        assert_eq!(records.len(), 6);
        for r in &records {
            assert!(r.year() > 2005);
            assert!(r.estimated_years_of_service >= 0);
        }
        let officer: Vec<i32> = records
            .iter()
            .filter(|r| r.job_class_title() == "Police Officer II")
            .map(|r| r.estimated_years_of_service)
            .collect();
        assert_eq!(officer, vec![0, 1, 2]);
        Ok(())
    }

    #[test]
    fn missing_input_is_fatal() {
        let cfg = AnalysisConfig {
            input: PathBuf::from("/no/such/payroll.csv"),
            ..Default::default()
        };
        assert!(prepare_records(&cfg).is_err());
    }

    #[test]
    #[ignore = "renders PNGs; needs system fonts"]
    fn full_run_writes_all_charts() -> Result<()> {
        let dir = tempdir()?;
        let mut cfg = sample_config(dir.path())?;
        cfg.export_tables = true;
        let outcome = run(&cfg)?;
        for name in [
            chart::SCATTER_FILE,
            chart::BOXPLOT_FILE,
            chart::FORECAST_FILE,
            chart::MEDIAN_FILE,
            export::CLEANED_FILE,
        ] {
            assert!(cfg.output_dir.join(name).exists(), "{} missing", name);
        }
        assert_eq!(outcome.console.len(), 2);
        assert!(outcome.console[0].starts_with("Expected total payroll cost in 2012: $"));
        Ok(())
    }

    #[test]
    fn analyse_draws_every_chart_for_known_department() -> Result<()> {
        let dir = tempdir()?;
        let cfg = sample_config(dir.path())?;
        let (records, cleaning) = prepare_records(&cfg)?;
        let mut charts = ChartLog::default();
        let outcome = analyse(&cfg, &records, cleaning, &mut charts)?;
        assert_eq!(
            charts.drawn,
            vec![
                chart::SCATTER_FILE,
                chart::BOXPLOT_FILE,
                chart::FORECAST_FILE,
                chart::MEDIAN_FILE
            ]
        );
        assert_eq!(outcome.department_records, 5);
        assert_eq!(outcome.written.len(), 4);
        assert_eq!(outcome.console.len(), 2);
        Ok(())
    }

    #[test]
    fn unknown_department_skips_box_plot() -> Result<()> {
        let dir = tempdir()?;
        let mut cfg = sample_config(dir.path())?;
        cfg.department = "Harbor (Port of LA)".to_string();
        let (records, cleaning) = prepare_records(&cfg)?;
        let mut charts = ChartLog::default();
        let outcome = analyse(&cfg, &records, cleaning, &mut charts)?;
        assert_eq!(outcome.department_records, 0);
        assert_eq!(
            charts.drawn,
            vec![chart::SCATTER_FILE, chart::FORECAST_FILE, chart::MEDIAN_FILE]
        );
        assert!(!outcome
            .written
            .contains(&cfg.output_dir.join(chart::BOXPLOT_FILE)));
        // the forecast does not depend on the department
        assert_eq!(outcome.console.len(), 2);
        Ok(())
    }

    #[test]
    #[ignore = "renders PNGs; needs system fonts"]
    fn unknown_department_renders_scatter_only() -> Result<()> {
        let dir = tempdir()?;
        let mut cfg = sample_config(dir.path())?;
        cfg.department = "Harbor (Port of LA)".to_string();
        run(&cfg)?;
        assert!(cfg.output_dir.join(chart::SCATTER_FILE).exists());
        assert!(!cfg.output_dir.join(chart::BOXPLOT_FILE).exists());
        Ok(())
    }
}

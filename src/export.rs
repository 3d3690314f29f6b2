// src/export.rs

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use std::{fs::File, path::Path, sync::Arc};
use tracing::info;

use crate::analysis::{ForecastPoint, PayrollForecast};
use crate::model::ServiceRecord;
use crate::process::CleaningReport;

pub const CLEANED_FILE: &str = "cleaned_payroll.parquet";
pub const FORECAST_TABLE_FILE: &str = "payroll_forecast.parquet";
pub const SUMMARY_FILE: &str = "run_summary.json";

fn write_batch(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .with_context(|| format!("creating Arrow writer for {:?}", path))?;
    writer.write(batch).with_context(|| format!("writing {:?}", path))?;
    writer.close().with_context(|| format!("closing {:?}", path))?;
    Ok(())
}

/// The cleaned table with its tenure columns.
pub fn service_records_batch(records: &[ServiceRecord]) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("department_title", DataType::Utf8, false),
        Field::new("job_class_title", DataType::Utf8, false),
        Field::new("total_payments", DataType::Float64, false),
        Field::new("estimated_start_year", DataType::Int32, false),
        Field::new("estimated_years_of_service", DataType::Int32, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.year()))),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.department_title()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.job_class_title()),
        )),
        Arc::new(Float64Array::from_iter_values(
            records.iter().map(|r| r.total_payments()),
        )),
        Arc::new(Int32Array::from_iter_values(
            records.iter().map(|r| r.estimated_start_year),
        )),
        Arc::new(Int32Array::from_iter_values(
            records.iter().map(|r| r.estimated_years_of_service),
        )),
    ];
    RecordBatch::try_new(Arc::new(schema), columns).context("building cleaned payroll batch")
}

pub fn forecast_batch(points: &[ForecastPoint]) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("forecast", DataType::Float64, false),
        Field::new("lower_ci", DataType::Float64, false),
        Field::new("upper_ci", DataType::Float64, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from_iter_values(points.iter().map(|p| p.year))),
        Arc::new(Float64Array::from_iter_values(points.iter().map(|p| p.forecast))),
        Arc::new(Float64Array::from_iter_values(points.iter().map(|p| p.lower_ci))),
        Arc::new(Float64Array::from_iter_values(points.iter().map(|p| p.upper_ci))),
    ];
    RecordBatch::try_new(Arc::new(schema), columns).context("building forecast batch")
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub department: String,
    pub cleaning: CleaningReport,
    pub service_records: usize,
    pub department_records: usize,
    pub job_titles: Vec<String>,
    pub alpha: f64,
    pub beta: f64,
    pub residual_std: f64,
    pub final_forecast: Option<ForecastPoint>,
}

impl RunSummary {
    pub fn new(
        department: &str,
        cleaning: &CleaningReport,
        service_records: usize,
        department_records: usize,
        job_titles: &[String],
        forecast: &PayrollForecast,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            department: department.to_string(),
            cleaning: cleaning.clone(),
            service_records,
            department_records,
            job_titles: job_titles.to_vec(),
            alpha: forecast.fit.params.alpha,
            beta: forecast.fit.params.beta,
            residual_std: forecast.residual_std,
            final_forecast: forecast.final_point().copied(),
        }
    }
}

/// Write the Parquet tables and the JSON summary into `out_dir`.
pub fn export_tables(
    out_dir: &Path,
    records: &[ServiceRecord],
    forecast: &PayrollForecast,
    summary: &RunSummary,
) -> Result<Vec<std::path::PathBuf>> {
    let cleaned = out_dir.join(CLEANED_FILE);
    write_batch(&cleaned, &service_records_batch(records)?)?;

    let table = out_dir.join(FORECAST_TABLE_FILE);
    write_batch(&table, &forecast_batch(&forecast.points)?)?;

    let summary_path = out_dir.join(SUMMARY_FILE);
    let file = File::create(&summary_path)
        .with_context(|| format!("creating {:?}", summary_path))?;
    serde_json::to_writer_pretty(file, summary)
        .with_context(|| format!("writing {:?}", summary_path))?;

    info!(dir = %out_dir.display(), rows = records.len(), "exported tables");
    Ok(vec![cleaned, table, summary_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::forecast_payroll;
    use crate::model::PayrollRecord;
    use crate::process::derive_tenure;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn rec(year: i32, job: &str, pay: f64) -> PayrollRecord {
        PayrollRecord {
            year,
            department_title: "Police (LAPD)".into(),
            job_class_title: job.into(),
            total_payments: pay,
        }
    }

    fn read_rows(path: &Path) -> Result<usize> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
        let mut rows = 0;
        for batch in reader {
            rows += batch?.num_rows();
        }
        Ok(rows)
    }

    #[test]
    fn writes_tables_and_summary() -> Result<()> {
        let dir = tempdir()?;
        let records = derive_tenure(vec![
            rec(2006, "Officer", 50_000.0),
            rec(2007, "Officer", 52_000.0),
            rec(2008, "Officer", 55_000.0),
        ]);
        let history: BTreeMap<i32, f64> = crate::analysis::payroll_by_year(&records);
        let forecast = forecast_payroll(&history, 2009, 2011, 1.96)?;
        let summary = RunSummary::new(
            "Police (LAPD)",
            &CleaningReport::default(),
            records.len(),
            records.len(),
            &["Officer".to_string()],
            &forecast,
        );

        let written = export_tables(dir.path(), &records, &forecast, &summary)?;
        assert_eq!(written.len(), 3);
        assert_eq!(read_rows(&dir.path().join(CLEANED_FILE))?, 3);
        assert_eq!(read_rows(&dir.path().join(FORECAST_TABLE_FILE))?, 3);

        let json: serde_json::Value =
            serde_json::from_reader(File::open(dir.path().join(SUMMARY_FILE))?)?;
        assert_eq!(json["department"], "Police (LAPD)");
        assert_eq!(json["final_forecast"]["year"], 2011);
        Ok(())
    }

    #[test]
    fn cleaned_batch_has_tenure_columns() -> Result<()> {
        let records = derive_tenure(vec![rec(2006, "Officer", 1.0), rec(2007, "Officer", 2.0)]);
        let batch = service_records_batch(&records)?;
        assert_eq!(batch.num_columns(), 6);
        let tenure = batch
            .column(5)
            .as_any()
            .downcast_ref::<Int32Array>()
            .expect("tenure column is Int32");
        assert_eq!(tenure.values().to_vec(), vec![0, 1]);
        Ok(())
    }
}

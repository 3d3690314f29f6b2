use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use super::columns::ColumnIndex;
use super::raw_table::RawTable;
use super::utils::{is_missing, parse_currency, parse_year};
use crate::model::PayrollRecord;

/// Only years after this one are analysed.
pub const MIN_YEAR_EXCLUSIVE: i32 = 2005;

/// Row counts for one cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub missing_total_payments: usize,
    pub invalid_year: usize,
    pub year_out_of_range: usize,
    pub missing_job_class_title: usize,
    pub rows_kept: usize,
}

/// Filter and type the raw rows.
///
/// Filters run in this order: null `total_payments`, null or non-numeric
/// `year`, `year <= 2005`. Only rows that survive all three have their amount
/// parsed, and a malformed amount there aborts the whole pass. Rows without a
/// job title are dropped last, since they have no tenure group.
///
/// Title cells are stored exactly as the CSV decoder returns them.
#[tracing::instrument(level = "info", skip(table), fields(rows = table.len()))]
pub fn clean_records(table: &RawTable) -> Result<(Vec<PayrollRecord>, CleaningReport)> {
    let idx = ColumnIndex::resolve(&table.headers)?;
    let mut report = CleaningReport {
        rows_read: table.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(table.len());

    for (row_no, row) in table.rows.iter().enumerate() {
        let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");

        let payments = cell(idx.total_payments);
        if is_missing(payments) {
            report.missing_total_payments += 1;
            continue;
        }

        let year = match parse_year(cell(idx.year)) {
            Some(y) => y,
            None => {
                report.invalid_year += 1;
                continue;
            }
        };
        if year <= MIN_YEAR_EXCLUSIVE {
            report.year_out_of_range += 1;
            continue;
        }

        let total_payments = parse_currency(payments)
            .with_context(|| format!("row {}: bad total_payments", row_no + 1))?;

        let job_class_title = cell(idx.job_class_title);
        if is_missing(job_class_title) {
            report.missing_job_class_title += 1;
            continue;
        }

        records.push(PayrollRecord {
            year,
            department_title: cell(idx.department_title).to_string(),
            job_class_title: job_class_title.to_string(),
            total_payments,
        });
    }

    report.rows_kept = records.len();
    info!(
        rows_read = report.rows_read,
        rows_kept = report.rows_kept,
        missing_total_payments = report.missing_total_payments,
        invalid_year = report.invalid_year,
        year_out_of_range = report.year_out_of_range,
        missing_job_class_title = report.missing_job_class_title,
        "cleaned payroll rows"
    );
    Ok((records, report))
}

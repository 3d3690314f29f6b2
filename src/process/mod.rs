// src/process/mod.rs
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::{fs::File, io::Read, path::Path};
use tracing::debug;

pub mod clean;
pub mod columns;
pub mod raw_table;
pub mod tenure;
pub mod utils;

pub use clean::{clean_records, CleaningReport};
pub use raw_table::RawTable;
pub use tenure::derive_tenure;

/// Open `path` and read every record into a [`RawTable`].
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_payroll_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open payroll CSV: {:?}", path.as_ref()))?;
    let table = read_payroll_csv(file)
        .with_context(|| format!("Failed to read payroll CSV: {:?}", path.as_ref()))?;
    debug!(
        rows = table.len(),
        columns = table.headers.len(),
        "loaded payroll CSV"
    );
    Ok(table)
}

/// Read a header row plus data rows from any reader.
/// Short rows are kept; absent trailing cells read as missing later on.
pub fn read_payroll_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok(RawTable { headers, rows })
}

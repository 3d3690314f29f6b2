// src/config.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

/// Settings for one analysis run.
///
/// Every field has a default, so a YAML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub department: String,
    pub forecast_start: i32,
    pub forecast_end: i32,
    pub top_job_titles: usize,
    pub service_bins: usize,
    /// Normal quantile for the forecast band; 1.96 is a 95% band.
    pub z: f64,
    pub export_tables: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/data.csv"),
            output_dir: PathBuf::from("outputs/figures"),
            department: "Police (LAPD)".to_string(),
            forecast_start: 2013,
            forecast_end: 2017,
            top_job_titles: 5,
            service_bins: 10,
            z: 1.96,
            export_tables: false,
        }
    }
}

impl AnalysisConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config {:?}", path.as_ref()))?;
        let cfg: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {:?}", path.as_ref()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.forecast_end < self.forecast_start {
            bail!(
                "forecast_end ({}) must not be before forecast_start ({})",
                self.forecast_end,
                self.forecast_start
            );
        }
        if self.top_job_titles == 0 {
            bail!("top_job_titles must be at least 1");
        }
        if self.service_bins == 0 {
            bail!("service_bins must be at least 1");
        }
        if !(self.z.is_finite() && self.z > 0.0) {
            bail!("z must be a positive number, got {}", self.z);
        }
        if self.department.trim().is_empty() {
            bail!("department must not be empty");
        }
        Ok(())
    }
}

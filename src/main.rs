use anyhow::Result;
use clap::Parser;
use payrollscope::{pipeline, AnalysisConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "payrollscope")]
#[command(about = "Payroll cleaning, tenure estimates, charts and a Holt payroll forecast")]
struct Args {
    /// YAML file with analysis settings; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Payroll CSV
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where the PNG charts (and exports) are written
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Department to chart, matched ignoring case
    #[arg(short, long)]
    department: Option<String>,

    #[arg(long)]
    forecast_start: Option<i32>,

    #[arg(long)]
    forecast_end: Option<i32>,

    /// Also write Parquet tables and a JSON run summary
    #[arg(long)]
    export_tables: bool,
}

impl Args {
    fn into_config(self) -> Result<AnalysisConfig> {
        let mut cfg = match &self.config {
            Some(path) => AnalysisConfig::from_yaml_file(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(v) = self.input {
            cfg.input = v;
        }
        if let Some(v) = self.output_dir {
            cfg.output_dir = v;
        }
        if let Some(v) = self.department {
            cfg.department = v;
        }
        if let Some(v) = self.forecast_start {
            cfg.forecast_start = v;
        }
        if let Some(v) = self.forecast_end {
            cfg.forecast_end = v;
        }
        cfg.export_tables |= self.export_tables;
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) resolve settings ─────────────────────────────────────────
    let cfg = Args::parse().into_config()?;
    info!(
        input = %cfg.input.display(),
        output_dir = %cfg.output_dir.display(),
        department = %cfg.department,
        "startup"
    );

    // ─── 3) run ──────────────────────────────────────────────────────
    let outcome = pipeline::run(&cfg)?;
    info!(
        records = outcome.records,
        department_records = outcome.department_records,
        files = outcome.written.len(),
        "all done"
    );
    Ok(())
}

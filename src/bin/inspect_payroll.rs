use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use payrollscope::process::{clean_records, derive_tenure, load_payroll_csv};
use payrollscope::report::format_currency;

use prettytable::{format, Cell, Row, Table};

#[derive(Parser)]
#[command(name = "inspect_payroll")]
#[command(about = "Summarize a payroll CSV per department after cleaning")]
struct Args {
    /// Payroll CSV
    input: PathBuf,

    /// How many departments to list, largest first
    #[arg(short, long, default_value_t = 20)]
    top: usize,
}

#[derive(Debug)]
struct DepartmentStats {
    department: String,
    records: usize,
    job_titles: usize,
    total_payments: f64,
    first_year: i32,
    last_year: i32,
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let raw = load_payroll_csv(&args.input)?;
    let (records, report) =
        clean_records(&raw).with_context(|| format!("cleaning {:?}", args.input))?;
    let records = derive_tenure(records);

    let mut by_dept: HashMap<&str, (DepartmentStats, Vec<&str>)> = HashMap::new();
    for r in &records {
        let (stats, titles) = by_dept.entry(r.department_title()).or_insert_with(|| {
            (
                DepartmentStats {
                    department: r.department_title().to_string(),
                    records: 0,
                    job_titles: 0,
                    total_payments: 0.0,
                    first_year: r.year(),
                    last_year: r.year(),
                },
                Vec::new(),
            )
        });
        stats.records += 1;
        stats.total_payments += r.total_payments();
        stats.first_year = stats.first_year.min(r.year());
        stats.last_year = stats.last_year.max(r.year());
        if !titles.contains(&r.job_class_title()) {
            titles.push(r.job_class_title());
        }
    }

    let mut display_data: Vec<DepartmentStats> = by_dept
        .into_values()
        .map(|(mut stats, titles)| {
            stats.job_titles = titles.len();
            stats
        })
        .collect();
    display_data.sort_by(|a, b| {
        b.records
            .cmp(&a.records)
            .then_with(|| a.department.cmp(&b.department))
    });

    println!(
        "rows read: {}, kept: {} (missing pay: {}, bad year: {}, year <= 2005: {}, no job title: {})",
        report.rows_read,
        report.rows_kept,
        report.missing_total_payments,
        report.invalid_year,
        report.year_out_of_range,
        report.missing_job_class_title
    );

    if display_data.is_empty() {
        println!("No records survived cleaning.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.add_row(Row::new(vec![
        Cell::new("Department").style_spec("bFg"),
        Cell::new("Records").style_spec("bFg"),
        Cell::new("Job Titles").style_spec("bFg"),
        Cell::new("Total Payments").style_spec("bFg"),
        Cell::new("Years").style_spec("bFg"),
    ]));
    for stats in display_data.into_iter().take(args.top) {
        table.add_row(Row::new(vec![
            Cell::new(&stats.department),
            Cell::new(&stats.records.to_string()).style_spec("r"),
            Cell::new(&stats.job_titles.to_string()).style_spec("r"),
            Cell::new(&format_currency(stats.total_payments)).style_spec("r"),
            Cell::new(&format!("{}-{}", stats.first_year, stats.last_year)),
        ]));
    }
    println!("\n--- Departments ---");
    table.printstd();
    Ok(())
}

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::model::{PayrollRecord, ServiceRecord};

/// First year each job title appears in `records`.
pub fn start_years(records: &[PayrollRecord]) -> HashMap<&str, i32> {
    let mut first: HashMap<&str, i32> = HashMap::new();
    for r in records {
        first
            .entry(r.job_class_title.as_str())
            .and_modify(|y| *y = (*y).min(r.year))
            .or_insert(r.year);
    }
    first
}

/// Attach an estimated start year and years of service to every record.
///
/// The start year is the minimum year across all records with the same job
/// title, so the estimate undercounts anyone hired before the data begins.
pub fn derive_tenure(records: Vec<PayrollRecord>) -> Vec<ServiceRecord> {
    let starts: HashMap<String, i32> = start_years(&records)
        .into_iter()
        .map(|(title, year)| (title.to_string(), year))
        .collect();
    debug!(job_titles = starts.len(), "derived start years");

    let total = records.len();
    let out: Vec<ServiceRecord> = records
        .into_iter()
        .filter_map(|record| {
            let start = starts[record.job_class_title.as_str()];
            let service = record.year - start;
            if service < 0 {
                return None;
            }
            Some(ServiceRecord {
                record,
                estimated_start_year: start,
                estimated_years_of_service: service,
            })
        })
        .collect();

    if out.len() != total {
        warn!(dropped = total - out.len(), "dropped rows with negative tenure");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, job: &str, pay: f64) -> PayrollRecord {
        PayrollRecord {
            year,
            department_title: "Police (LAPD)".into(),
            job_class_title: job.into(),
            total_payments: pay,
        }
    }

    #[test]
    fn example_officer_tenure() {
        let out = derive_tenure(vec![rec(2006, "Officer", 50_000.0), rec(2007, "Officer", 52_000.0)]);
        assert!(out.iter().all(|r| r.estimated_start_year == 2006));
        let tenure: Vec<i32> = out.iter().map(|r| r.estimated_years_of_service).collect();
        assert_eq!(tenure, vec![0, 1]);
    }

    #[test]
    fn tenure_is_relative_to_title_minimum() {
        let out = derive_tenure(vec![
            rec(2012, "Clerk", 1.0),
            rec(2009, "Captain", 1.0),
            rec(2010, "Clerk", 1.0),
            rec(2014, "Captain", 1.0),
            rec(2010, "Clerk", 1.0),
        ]);
        assert_eq!(out.len(), 5);
        for r in &out {
            let expected_start = if r.job_class_title() == "Clerk" { 2010 } else { 2009 };
            assert_eq!(r.estimated_start_year, expected_start);
            assert_eq!(r.estimated_years_of_service, r.year() - expected_start);
            assert!(r.estimated_years_of_service >= 0);
        }
        let zeros = out.iter().filter(|r| r.estimated_years_of_service == 0).count();
        assert_eq!(zeros, 3);
    }

    #[test]
    fn single_year_title_has_zero_tenure() {
        let out = derive_tenure(vec![rec(2015, "Solo", 1.0), rec(2015, "Solo", 2.0)]);
        assert!(out.iter().all(|r| r.estimated_years_of_service == 0));
    }
}

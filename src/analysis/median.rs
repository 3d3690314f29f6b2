use std::collections::{BTreeMap, BTreeSet};

use super::department::quantile_sorted;
use crate::model::ServiceRecord;

/// Median pay per (year, job title), laid out with years as rows and job
/// titles as columns. Both axes are sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct MedianPivot {
    pub years: Vec<i32>,
    pub job_titles: Vec<String>,
    /// `cells[row][col]`; `None` where a title has no records that year.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl MedianPivot {
    pub fn build(records: &[&ServiceRecord]) -> Self {
        let mut groups: BTreeMap<(i32, &str), Vec<f64>> = BTreeMap::new();
        for r in records {
            groups
                .entry((r.year(), r.job_class_title()))
                .or_default()
                .push(r.total_payments());
        }

        let years: Vec<i32> = groups
            .keys()
            .map(|(y, _)| *y)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let job_titles: Vec<String> = groups
            .keys()
            .map(|(_, t)| *t)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let cells = years
            .iter()
            .map(|y| {
                job_titles
                    .iter()
                    .map(|t| groups.get(&(*y, t.as_str())).map(|v| median(v)))
                    .collect()
            })
            .collect();

        Self {
            years,
            job_titles,
            cells,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn get(&self, year: i32, title: &str) -> Option<f64> {
        let row = self.years.iter().position(|y| *y == year)?;
        let col = self.job_titles.iter().position(|t| t == title)?;
        self.cells[row][col]
    }

    /// `(year, median)` pairs for one title, skipping years without data.
    pub fn series(&self, title: &str) -> Vec<(i32, f64)> {
        let Some(col) = self.job_titles.iter().position(|t| t == title) else {
            return Vec::new();
        };
        self.years
            .iter()
            .zip(&self.cells)
            .filter_map(|(y, row)| row[col].map(|v| (*y, v)))
            .collect()
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    quantile_sorted(&sorted, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PayrollRecord;

    fn rec(year: i32, job: &str, pay: f64) -> ServiceRecord {
        ServiceRecord {
            record: PayrollRecord {
                year,
                department_title: "Police (LAPD)".into(),
                job_class_title: job.into(),
                total_payments: pay,
            },
            estimated_start_year: 2006,
            estimated_years_of_service: year - 2006,
        }
    }

    #[test]
    fn two_titles_two_years() {
        let records = vec![
            rec(2014, "Sergeant", 90.0),
            rec(2013, "Officer", 10.0),
            rec(2013, "Officer", 30.0),
            rec(2013, "Sergeant", 70.0),
            rec(2014, "Officer", 20.0),
            rec(2014, "Officer", 40.0),
            rec(2014, "Officer", 60.0),
            rec(2013, "Sergeant", 80.0),
        ];
        let refs: Vec<&ServiceRecord> = records.iter().collect();
        let pivot = MedianPivot::build(&refs);

        assert_eq!(pivot.years, vec![2013, 2014]);
        assert_eq!(pivot.job_titles, vec!["Officer", "Sergeant"]);
        assert_eq!(pivot.cells.len(), 2);
        assert!(pivot.cells.iter().all(|row| row.len() == 2));
        assert_eq!(pivot.get(2013, "Officer"), Some(20.0));
        assert_eq!(pivot.get(2014, "Officer"), Some(40.0));
        assert_eq!(pivot.get(2013, "Sergeant"), Some(75.0));
        assert_eq!(pivot.get(2014, "Sergeant"), Some(90.0));
    }

    #[test]
    fn missing_cells_are_none() {
        let records = vec![rec(2013, "A", 1.0), rec(2014, "B", 2.0)];
        let refs: Vec<&ServiceRecord> = records.iter().collect();
        let pivot = MedianPivot::build(&refs);
        assert_eq!(pivot.cells, vec![vec![Some(1.0), None], vec![None, Some(2.0)]]);
        assert_eq!(pivot.series("B"), vec![(2014, 2.0)]);
        assert!(pivot.series("Z").is_empty());
    }

    #[test]
    fn empty_input_gives_empty_pivot() {
        let pivot = MedianPivot::build(&[]);
        assert!(pivot.is_empty());
        assert!(pivot.job_titles.is_empty());
    }
}

// src/analysis/department.rs

use std::collections::HashMap;
use tracing::debug;

use crate::model::ServiceRecord;

/// Records whose department matches `name`, ignoring case.
pub fn filter_department<'a>(records: &'a [ServiceRecord], name: &str) -> Vec<&'a ServiceRecord> {
    let wanted = name.to_lowercase();
    records
        .iter()
        .filter(|r| r.department_title().to_lowercase() == wanted)
        .collect()
}

/// The `n` most frequent job titles, most frequent first. Ties keep the order
/// in which the titles first appear.
pub fn top_job_titles(records: &[&ServiceRecord], n: usize) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, r) in records.iter().enumerate() {
        counts.entry(r.job_class_title()).or_insert((0, pos)).0 += 1;
    }
    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(title, (count, first))| (title, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(n)
        .map(|(title, _, _)| title.to_string())
        .collect()
}

/// One department narrowed to its most common job titles.
#[derive(Debug, Clone)]
pub struct DepartmentSubset<'a> {
    pub department: String,
    pub job_titles: Vec<String>,
    pub records: Vec<&'a ServiceRecord>,
}

impl<'a> DepartmentSubset<'a> {
    pub fn select(records: &'a [ServiceRecord], department: &str, top_n: usize) -> Self {
        let dept = filter_department(records, department);
        let job_titles = top_job_titles(&dept, top_n);
        let subset: Vec<&ServiceRecord> = dept
            .into_iter()
            .filter(|r| job_titles.iter().any(|t| t == r.job_class_title()))
            .collect();
        debug!(
            department,
            titles = job_titles.len(),
            records = subset.len(),
            "selected department subset"
        );
        Self {
            department: department.to_string(),
            job_titles,
            records: subset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(tenure, total_payments)` points for one job title.
    pub fn points_for(&self, title: &str) -> Vec<(f64, f64)> {
        self.records
            .iter()
            .filter(|r| r.job_class_title() == title)
            .map(|r| (r.estimated_years_of_service as f64, r.total_payments()))
            .collect()
    }

    /// Group pay into equal-width tenure bins, per job title.
    /// `None` when there is nothing to bin; the caller skips the box plot.
    pub fn binned_pay(&self, bins: usize) -> Option<BinnedPay> {
        if self.is_empty() {
            return None;
        }
        let tenure: Vec<f64> = self
            .records
            .iter()
            .map(|r| r.estimated_years_of_service as f64)
            .collect();
        let edges = ServiceBins::equal_width(&tenure, bins)?;

        let mut groups = Vec::new();
        for bin in 0..edges.bin_count() {
            for title in &self.job_titles {
                let pay: Vec<f64> = self
                    .records
                    .iter()
                    .filter(|r| r.job_class_title() == title)
                    .filter(|r| edges.bin_of(r.estimated_years_of_service as f64) == Some(bin))
                    .map(|r| r.total_payments())
                    .collect();
                if let Some(stats) = BoxStats::from_values(&pay) {
                    groups.push(BoxGroup {
                        bin,
                        job_title: title.clone(),
                        stats,
                    });
                }
            }
        }
        Some(BinnedPay {
            bins: edges,
            groups,
        })
    }
}

/// Equal-width, right-closed bins `(e0, e1], (e1, e2], ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceBins {
    pub edges: Vec<f64>,
}

impl ServiceBins {
    /// Split the range of `values` into `bins` equal parts. The lowest edge is
    /// pulled down by 0.1% of the range so the minimum falls inside the first
    /// bin. A zero-width range is widened by 0.1% on both sides.
    pub fn equal_width(values: &[f64], bins: usize) -> Option<Self> {
        if bins == 0 || values.is_empty() {
            return None;
        }
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let edges = if lo == hi {
            let pad = if lo != 0.0 { 0.001 * lo.abs() } else { 0.001 };
            linspace(lo - pad, hi + pad, bins + 1)
        } else {
            let mut edges = linspace(lo, hi, bins + 1);
            edges[0] -= (hi - lo) * 0.001;
            edges
        };
        Some(Self { edges })
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    pub fn bin_of(&self, v: f64) -> Option<usize> {
        let first = *self.edges.first()?;
        let last = *self.edges.last()?;
        if v <= first || v > last {
            return None;
        }
        // index of the first edge >= v, minus one
        let upper = self.edges.partition_point(|e| *e < v);
        Some(upper - 1)
    }

    /// Interval label such as `(1.5, 3.0]`.
    pub fn label(&self, bin: usize) -> String {
        format!("({:.1}, {:.1}]", self.edges[bin], self.edges[bin + 1])
    }
}

fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![lo];
    }
    let step = (hi - lo) / (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
        .collect()
}

/// Box-plot summary of a group of pay values.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
    pub count: usize,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| *v >= low_fence && *v <= high_fence)
            .collect();
        let whisker_low = inside.first().copied().unwrap_or(q1);
        let whisker_high = inside.last().copied().unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
            count: sorted.len(),
        })
    }
}

/// Linear-interpolation quantile of already sorted data.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone)]
pub struct BoxGroup {
    pub bin: usize,
    pub job_title: String,
    pub stats: BoxStats,
}

/// Everything the box plot draws.
#[derive(Debug, Clone)]
pub struct BinnedPay {
    pub bins: ServiceBins,
    pub groups: Vec<BoxGroup>,
}

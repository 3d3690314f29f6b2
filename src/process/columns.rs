use anyhow::{anyhow, Result};

pub const YEAR: &str = "year";
pub const DEPARTMENT_TITLE: &str = "department_title";
pub const JOB_CLASS_TITLE: &str = "job_class_title";
pub const TOTAL_PAYMENTS: &str = "total_payments";

/// Trim, lowercase, then turn each space into `_`.
/// `" Job Class Title"` becomes `"job_class_title"`.
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

pub fn normalize_headers(headers: &[String]) -> Vec<String> {
    headers.iter().map(|h| normalize_column_name(h)).collect()
}

/// Positions of the columns the analysis reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub year: usize,
    pub department_title: usize,
    pub job_class_title: usize,
    pub total_payments: usize,
}

impl ColumnIndex {
    /// Resolve required columns against raw headers. Normalization is applied
    /// here, so callers may pass headers exactly as the file spells them.
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let normalized = normalize_headers(headers);
        let find = |name: &str| -> Result<usize> {
            normalized.iter().position(|h| h == name).ok_or_else(|| {
                anyhow!(
                    "required column `{}` not found (columns: {})",
                    name,
                    normalized.join(", ")
                )
            })
        };

        Ok(Self {
            year: find(YEAR)?,
            department_title: find(DEPARTMENT_TITLE)?,
            job_class_title: find(JOB_CLASS_TITLE)?,
            total_payments: find(TOTAL_PAYMENTS)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalizes_spacing_and_case() {
        assert_eq!(normalize_column_name(" Job Class Title "), "job_class_title");
        assert_eq!(normalize_column_name("Total Payments"), "total_payments");
        assert_eq!(normalize_column_name("YEAR"), "year");
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = owned(&["  Department Title", "Year ", "Job  Class Title", "total_payments"]);
        let once = normalize_headers(&raw);
        let twice = normalize_headers(&once);
        assert_eq!(once, twice);
        assert_eq!(once[2], "job__class_title");
    }

    #[test]
    fn resolves_required_columns() -> Result<()> {
        let headers = owned(&[
            "Row ID",
            "Year",
            "Department Title",
            "Job Class Title",
            "Total Payments",
        ]);
        let idx = ColumnIndex::resolve(&headers)?;
        assert_eq!(
            idx,
            ColumnIndex {
                year: 1,
                department_title: 2,
                job_class_title: 3,
                total_payments: 4,
            }
        );
        Ok(())
    }

    #[test]
    fn missing_column_is_named() {
        let headers = owned(&["Year", "Department Title", "Job Class Title"]);
        let err = ColumnIndex::resolve(&headers).unwrap_err();
        assert!(err.to_string().contains("total_payments"));
    }
}

// src/model.rs

use serde::Serialize;

/// One cleaned payroll row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollRecord {
    pub year: i32,
    pub department_title: String,
    pub job_class_title: String,
    pub total_payments: f64,
}

/// A payroll row plus the tenure estimate derived from its job title.
///
/// `estimated_start_year` is the first year the job title appears anywhere in
/// the dataset, not a hire date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRecord {
    #[serde(flatten)]
    pub record: PayrollRecord,
    pub estimated_start_year: i32,
    pub estimated_years_of_service: i32,
}

impl ServiceRecord {
    pub fn year(&self) -> i32 {
        self.record.year
    }

    pub fn job_class_title(&self) -> &str {
        &self.record.job_class_title
    }

    pub fn department_title(&self) -> &str {
        &self.record.department_title
    }

    pub fn total_payments(&self) -> f64 {
        self.record.total_payments
    }
}

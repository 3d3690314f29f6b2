pub mod department;
pub mod forecast;
pub mod holt;
pub mod median;

pub use department::{BinnedPay, BoxStats, DepartmentSubset, ServiceBins};
pub use forecast::{forecast_payroll, payroll_by_year, ForecastPoint, PayrollForecast};
pub use holt::{fit_holt, HoltFit, HoltParams};
pub use median::MedianPivot;

pub mod analysis;
pub mod chart;
pub mod config;
pub mod export;
pub mod model;
pub mod pipeline;
pub mod process;
pub mod report;

pub use config::AnalysisConfig;
pub use model::{PayrollRecord, ServiceRecord};

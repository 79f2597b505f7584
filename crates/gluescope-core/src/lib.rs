pub mod config;
pub mod cost;
pub mod deep;
pub mod error;
pub mod inventory;
pub mod model;
pub mod provider;
pub mod report;
pub mod tags;
pub mod validate;

pub use error::{Error, Result};
pub use model::{JobAnalysisResult, JobCategory, Priority};
pub use provider::glue::GlueProvider;
pub use report::{ReportWriter, ScanReport};

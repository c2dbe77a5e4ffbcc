pub mod audit_options;
pub mod metrics;
pub mod page_result;
pub mod report;

pub use audit_options::{AuditOptions, Category, FormFactor, LogLevel, OutputFormat};
pub use metrics::{MetricRecord, TIMING_AUDITS};
pub use page_result::PageResult;
pub use report::LighthouseReport;

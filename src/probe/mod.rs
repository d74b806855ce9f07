//! Probe definitions, execution, and reporting

pub mod report;
pub mod runner;
pub mod step;

pub use report::{ReportCollector, RunReport, StepOutcome, StepStatus};
pub use runner::{CancelToken, ProbeRunner};
pub use step::{Extraction, Method, ProbeAction, ProbeStep};

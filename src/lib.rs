//! apiprobe - contract verification harness for HTTP authentication APIs
//!
//! Runs an ordered sequence of dependent HTTP probes against a service,
//! decodes issued compact tokens (payload only, no signature verification),
//! and reports structured pass/fail/skip results per step.

pub mod cli;
pub mod commands;
pub mod common;
pub mod probe;
pub mod suite;
pub mod token;

// Re-export commonly used types for tests
pub use common::{DecodeError, Error, Result};
pub use probe::{CancelToken, ProbeRunner, RunReport, StepOutcome, StepStatus};

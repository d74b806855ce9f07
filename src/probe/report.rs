//! Run reporting
//!
//! Outcomes are plain data. Rendering sits on top so the same report can go
//! to a terminal as text or to a machine consumer as JSON.

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

/// Outcome status of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pass,
    Fail,
    Skipped,
}

/// What happened to one step during a run. Created once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step_name: String,
    pub status: StepStatus,
    pub message: String,
    /// Whether the step was marked required in its definition
    pub required: bool,
    /// Value the step captured for later steps, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<Value>,
}

impl StepOutcome {
    pub fn pass(name: &str, required: bool, message: impl Into<String>) -> Self {
        Self {
            step_name: name.to_string(),
            status: StepStatus::Pass,
            message: message.into(),
            required,
            captured: None,
        }
    }

    pub fn fail(name: &str, required: bool, message: impl Into<String>) -> Self {
        Self {
            step_name: name.to_string(),
            status: StepStatus::Fail,
            message: message.into(),
            required,
            captured: None,
        }
    }

    pub fn skipped(name: &str, required: bool, message: impl Into<String>) -> Self {
        Self {
            step_name: name.to_string(),
            status: StepStatus::Skipped,
            message: message.into(),
            required,
            captured: None,
        }
    }

    pub fn with_capture(mut self, value: Value) -> Self {
        self.captured = Some(value);
        self
    }
}

/// Accumulates per-step outcomes into a final report
#[derive(Debug, Default)]
pub struct ReportCollector {
    outcomes: Vec<StepOutcome>,
}

impl ReportCollector {
    pub fn record(&mut self, outcome: StepOutcome) {
        self.outcomes.push(outcome);
    }

    /// Seal the collected outcomes into a report.
    ///
    /// Overall status is Pass iff every required step passed; a required
    /// step that was skipped counts against the run, since its check never
    /// got to execute.
    pub fn finalize(self) -> RunReport {
        let passed = self
            .outcomes
            .iter()
            .all(|o| !o.required || o.status == StepStatus::Pass);
        RunReport {
            passed,
            outcomes: self.outcomes,
        }
    }
}

/// The result of one run: an ordered outcome per defined step
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub passed: bool,
    pub outcomes: Vec<StepOutcome>,
}

impl RunReport {
    /// Render the report as colored terminal text
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for outcome in &self.outcomes {
            let marker = match outcome.status {
                StepStatus::Pass => "✓".green().to_string(),
                StepStatus::Fail => "✗".red().to_string(),
                StepStatus::Skipped => "-".yellow().to_string(),
            };
            out.push_str(&format!(
                "  {} {}: {}\n",
                marker,
                outcome.step_name.bold(),
                outcome.message.dimmed()
            ));
        }
        let summary = if self.passed {
            format!("{}", "✓ Probes Passed".green().bold())
        } else {
            format!("{}", "✗ Probes Failed".red().bold())
        };
        out.push_str(&format!("\n{summary}\n"));
        out
    }
}

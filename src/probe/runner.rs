//! Probe execution
//!
//! Runs an ordered sequence of probes against one target, threading captured
//! values from each step into the steps that depend on it. Steps execute
//! strictly in order because each may need state captured by an earlier one;
//! there is nothing to parallelize in a dependency chain.
//!
//! A run never fails mid-flight: transport problems, failed assertions, and
//! unmet dependencies all land in the report as step outcomes. Only a
//! malformed sequence errors before the run starts.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::common::{Error, Result};
use crate::token;

use super::report::{ReportCollector, RunReport, StepOutcome};
use super::step::{ProbeAction, ProbeStep};

/// Signals a running sequence to stop. Observed between steps, so the
/// in-flight request (if any) completes before the run winds down.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Executes probe sequences against a single target service.
///
/// Each call to [`ProbeRunner::run`] owns its own capture map and report, so
/// independent runs (different users, different suites) share nothing.
pub struct ProbeRunner {
    client: reqwest::Client,
    base_url: String,
    step_timeout: Duration,
    cancel: CancelToken,
}

impl ProbeRunner {
    pub fn new(base_url: impl Into<String>, step_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            step_timeout,
            cancel: CancelToken::new(),
        }
    }

    /// Replace the cancellation token, e.g. to share one across runs
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels this runner's sequences
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the sequence, producing exactly one outcome per defined step.
    ///
    /// Each step executes at most once; there are no retries. When a step
    /// marked `required` fails, the remaining steps are recorded as Skipped
    /// without issuing their requests.
    pub async fn run(&self, steps: &[ProbeStep]) -> Result<RunReport> {
        validate(steps)?;

        let mut captures: HashMap<String, Value> = HashMap::new();
        let mut collector = ReportCollector::default();
        // Name of the required step that failed, once one has
        let mut aborted_by: Option<String> = None;

        for step in steps {
            if self.cancel.is_cancelled() {
                collector.record(StepOutcome::skipped(
                    &step.name,
                    step.required,
                    Error::Cancelled.to_string(),
                ));
                continue;
            }

            if let Some(failed) = &aborted_by {
                collector.record(StepOutcome::skipped(
                    &step.name,
                    step.required,
                    format!("required step '{failed}' failed"),
                ));
                continue;
            }

            if let Some(dep) = &step.depends_on {
                if !captures.contains_key(dep) {
                    collector.record(StepOutcome::skipped(
                        &step.name,
                        step.required,
                        Error::DependencyUnmet.to_string(),
                    ));
                    continue;
                }
            }

            debug!(step = %step.name, "executing probe");
            let outcome = self.execute(step, &captures).await;

            if let Some(value) = &outcome.captured {
                captures.insert(step.name.clone(), value.clone());
            }
            if step.required && outcome.status == super::report::StepStatus::Fail {
                aborted_by = Some(step.name.clone());
            }
            collector.record(outcome);
        }

        Ok(collector.finalize())
    }

    async fn execute(&self, step: &ProbeStep, captures: &HashMap<String, Value>) -> StepOutcome {
        match &step.action {
            ProbeAction::Request {
                method,
                path,
                headers,
                body,
                bearer_from_capture,
                extract,
            } => {
                let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
                let mut request = self
                    .client
                    .request(method.as_reqwest(), &url)
                    .timeout(self.step_timeout);

                for (key, value) in headers {
                    request = request.header(key.as_str(), value.as_str());
                }

                if *bearer_from_capture {
                    // depends_on presence and the capture itself were checked
                    // before execute(); a non-string capture is a step failure.
                    let dep = step.depends_on.as_deref().unwrap_or_default();
                    match captures.get(dep).and_then(Value::as_str) {
                        Some(bearer) => request = request.bearer_auth(bearer),
                        None => {
                            return StepOutcome::fail(
                                &step.name,
                                step.required,
                                format!("capture from '{dep}' is not a string token"),
                            )
                        }
                    }
                }

                if let Some(body) = body {
                    request = request.json(body);
                }

                let response = match request.send().await {
                    Ok(response) => response,
                    Err(e) => {
                        return StepOutcome::fail(
                            &step.name,
                            step.required,
                            self.transport_message(e),
                        )
                    }
                };

                let status = response.status();
                let body: Value = match response.json().await {
                    Ok(value) => value,
                    Err(e) => {
                        return StepOutcome::fail(
                            &step.name,
                            step.required,
                            format!("malformed response (status {status}): {e}"),
                        )
                    }
                };

                match extract.apply(&body) {
                    Ok(Some(captured)) => {
                        StepOutcome::pass(&step.name, step.required, extract.describe_pass())
                            .with_capture(captured)
                    }
                    Ok(None) => {
                        StepOutcome::pass(&step.name, step.required, extract.describe_pass())
                    }
                    Err(message) => StepOutcome::fail(&step.name, step.required, message),
                }
            }

            ProbeAction::DecodeToken { require_claim } => {
                let dep = step.depends_on.as_deref().unwrap_or_default();
                let token_str = match captures.get(dep).and_then(Value::as_str) {
                    Some(s) => s,
                    None => {
                        return StepOutcome::fail(
                            &step.name,
                            step.required,
                            format!("capture from '{dep}' is not a string token"),
                        )
                    }
                };

                let claims = match token::decode(token_str) {
                    Ok(claims) => claims,
                    Err(e) => return StepOutcome::fail(&step.name, step.required, e.to_string()),
                };

                if let Some(claim) = require_claim {
                    match claims.get(claim) {
                        Some(value) if !value.is_null() => {}
                        _ => {
                            return StepOutcome::fail(
                                &step.name,
                                step.required,
                                format!("`{claim}` claim not found in token payload"),
                            )
                        }
                    }
                }

                let message = match require_claim {
                    Some(claim) => format!("`{claim}` claim present"),
                    None => "payload decoded".to_string(),
                };
                StepOutcome::pass(&step.name, step.required, message)
                    .with_capture(Value::Object(claims))
            }
        }
    }

    fn transport_message(&self, e: reqwest::Error) -> String {
        if e.is_timeout() {
            Error::Timeout(self.step_timeout.as_millis() as u64).to_string()
        } else {
            Error::Transport(e.to_string()).to_string()
        }
    }
}

/// Reject malformed sequences before anything executes.
///
/// Checks are structural only: names unique, dependencies point at an
/// earlier step, and steps that consume a capture actually declare one.
fn validate(steps: &[ProbeStep]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();

    for step in steps {
        if let Some(dep) = &step.depends_on {
            if !seen.contains(dep.as_str()) {
                return Err(Error::StepDefinition(format!(
                    "step '{}' depends on '{}', which is not an earlier step",
                    step.name, dep
                )));
            }
        }

        match &step.action {
            ProbeAction::Request {
                bearer_from_capture: true,
                ..
            } if step.depends_on.is_none() => {
                return Err(Error::StepDefinition(format!(
                    "step '{}' sends a bearer token but has no depends_on",
                    step.name
                )));
            }
            ProbeAction::DecodeToken { .. } if step.depends_on.is_none() => {
                return Err(Error::StepDefinition(format!(
                    "step '{}' decodes a captured token but has no depends_on",
                    step.name
                )));
            }
            _ => {}
        }

        if !seen.insert(&step.name) {
            return Err(Error::StepDefinition(format!(
                "duplicate step name '{}'",
                step.name
            )));
        }
    }

    Ok(())
}

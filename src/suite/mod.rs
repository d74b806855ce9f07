//! Probe suite loading
//!
//! A suite is a named, ordered probe sequence. Suites load from YAML files,
//! and a built-in suite covers the common login / list-users / token-claims
//! flow against an authentication service.

use std::path::Path;

use serde::Deserialize;
use serde_json::json;

use crate::common::{Config, Error, Result};
use crate::probe::step::{Extraction, Method, ProbeAction, ProbeStep};

/// A complete probe suite loaded from a YAML file
#[derive(Debug, Deserialize)]
pub struct ProbeSuite {
    /// Name of the suite
    pub name: String,
    /// Optional description of what the suite verifies
    pub description: Option<String>,
    /// The ordered probe sequence
    pub steps: Vec<ProbeStep>,
}

impl ProbeSuite {
    /// Load a suite from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::ConfigParse(format!("failed to parse probe suite: {e}")))
    }

    /// Keep only the named steps, preserving suite order.
    ///
    /// Errors when a requested name does not exist, since a silently
    /// shrunken run would report Pass for checks that never happened.
    pub fn select(mut self, names: &[String]) -> Result<Self> {
        for name in names {
            if !self.steps.iter().any(|s| &s.name == name) {
                return Err(Error::Config(format!(
                    "suite '{}' has no step named '{}'",
                    self.name, name
                )));
            }
        }
        self.steps.retain(|s| names.contains(&s.name));
        Ok(self)
    }
}

/// The built-in login / list-users / token-claims sequence.
///
/// Mirrors the role checks an authentication service is expected to satisfy:
/// login returns a token and a `user.role`, the users listing carries a
/// `role` per user, and the token payload carries a `roles` claim.
pub fn builtin_suite(config: &Config) -> ProbeSuite {
    ProbeSuite {
        name: "role-verification".to_string(),
        description: Some("Verifies role fields across login, user listing, and token claims".to_string()),
        steps: vec![
            ProbeStep {
                name: "login".to_string(),
                depends_on: None,
                required: true,
                action: ProbeAction::Request {
                    method: Method::Post,
                    path: "/api/auth/login".to_string(),
                    headers: Default::default(),
                    body: Some(json!({
                        "username": config.credentials.username,
                        "password": config.credentials.password,
                    })),
                    bearer_from_capture: false,
                    extract: Extraction {
                        capture: Some("token".to_string()),
                        require: vec!["user.role".to_string()],
                        fail_on_empty: None,
                    },
                },
            },
            ProbeStep {
                name: "get-users".to_string(),
                depends_on: Some("login".to_string()),
                required: true,
                action: ProbeAction::Request {
                    method: Method::Get,
                    path: "/api/users".to_string(),
                    headers: Default::default(),
                    body: None,
                    bearer_from_capture: true,
                    extract: Extraction {
                        capture: None,
                        require: vec!["0.role".to_string()],
                        fail_on_empty: Some("no users found".to_string()),
                    },
                },
            },
            ProbeStep {
                name: "jwt-roles".to_string(),
                depends_on: Some("login".to_string()),
                required: true,
                action: ProbeAction::DecodeToken {
                    require_claim: Some("roles".to_string()),
                },
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_suite_shape() {
        let config = Config::default();
        let suite = builtin_suite(&config);
        assert_eq!(suite.name, "role-verification");
        let names: Vec<&str> = suite.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["login", "get-users", "jwt-roles"]);
        assert!(suite.steps.iter().all(|s| s.required));
    }

    #[test]
    fn test_select_preserves_order() {
        let suite = builtin_suite(&Config::default());
        let selected = suite
            .select(&["jwt-roles".to_string(), "login".to_string()])
            .unwrap();
        let names: Vec<&str> = selected.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["login", "jwt-roles"]);
    }

    #[test]
    fn test_select_unknown_step_errors() {
        let suite = builtin_suite(&Config::default());
        assert!(suite.select(&["nonexistent".to_string()]).is_err());
    }

    #[test]
    fn test_suite_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
name: smoke
description: health endpoint answers
steps:
  - name: health
    action: request
    method: GET
    path: /healthz
    required: true
    extract:
      require: [status]
"#
        )
        .unwrap();

        let suite = ProbeSuite::from_file(file.path()).unwrap();
        assert_eq!(suite.name, "smoke");
        assert_eq!(suite.steps.len(), 1);
        assert_eq!(suite.steps[0].name, "health");
    }

    #[test]
    fn test_suite_from_missing_file_errors() {
        let err = ProbeSuite::from_file(Path::new("/nonexistent/suite.yaml")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}

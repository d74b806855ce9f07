//! Probe step definitions
//!
//! A step is one named request plus its success criteria. Steps are plain
//! data so sequences can be written in YAML; what to check is expressed as
//! dot-separated paths into the JSON response body rather than code.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// HTTP method for a probe request
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single named probe in a sequence
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeStep {
    /// Step name, also the key its capture is stored under
    pub name: String,
    /// Name of an earlier step whose capture this step consumes
    #[serde(default)]
    pub depends_on: Option<String>,
    /// A failure here skips the remainder of the sequence
    #[serde(default)]
    pub required: bool,
    /// What the step does
    #[serde(flatten)]
    pub action: ProbeAction,
}

/// The work a probe step performs
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ProbeAction {
    /// Issue an HTTP request and check its JSON response body
    Request {
        method: Method,
        /// Path joined to the configured base URL
        path: String,
        /// Extra headers to send
        #[serde(default)]
        headers: HashMap<String, String>,
        /// JSON request body
        #[serde(default)]
        body: Option<Value>,
        /// Send the dependency's capture as a bearer token
        #[serde(default)]
        bearer_from_capture: bool,
        /// Checks applied to the response body
        #[serde(default)]
        extract: Extraction,
    },
    /// Decode the dependency's captured token and check its claims
    DecodeToken {
        /// Claim that must be present in the decoded payload
        #[serde(default)]
        require_claim: Option<String>,
    },
}

/// What to pull out of, and assert about, a JSON response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Extraction {
    /// Dot-separated path of a value to capture for later steps
    #[serde(default)]
    pub capture: Option<String>,
    /// Dot-separated paths that must resolve to a non-null value
    #[serde(default)]
    pub require: Vec<String>,
    /// Fail with this message when the body is an empty array
    #[serde(default)]
    pub fail_on_empty: Option<String>,
}

impl Extraction {
    /// Apply the checks to a response body.
    ///
    /// Returns the captured value on success, or the assertion failure
    /// message. `require` paths that resolve to `null` count as missing.
    pub fn apply(&self, body: &Value) -> Result<Option<Value>, String> {
        if let Some(message) = &self.fail_on_empty {
            if matches!(body, Value::Array(items) if items.is_empty()) {
                return Err(message.clone());
            }
        }

        for path in &self.require {
            match lookup(body, path) {
                Some(value) if !value.is_null() => {}
                _ => return Err(format!("`{path}` not found in response body")),
            }
        }

        match &self.capture {
            Some(path) => match lookup(body, path) {
                Some(value) if !value.is_null() => Ok(Some(value.clone())),
                _ => Err(format!("`{path}` not found in response body")),
            },
            None => Ok(None),
        }
    }

    /// Human-readable summary of what passed, for the step outcome message
    pub fn describe_pass(&self) -> String {
        let mut parts: Vec<String> = self
            .require
            .iter()
            .map(|p| format!("`{p}` present"))
            .collect();
        if let Some(path) = &self.capture {
            parts.push(format!("captured `{path}`"));
        }
        if parts.is_empty() {
            "response received".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Resolve a dot-separated path against a JSON value.
///
/// Object segments are keys; array segments are numeric indices, so
/// `0.role` reads the `role` field of the first element.
pub fn lookup<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = body;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_object() {
        let body = json!({"user": {"role": "admin"}});
        assert_eq!(lookup(&body, "user.role"), Some(&json!("admin")));
        assert_eq!(lookup(&body, "user.missing"), None);
        assert_eq!(lookup(&body, "user.role.deeper"), None);
    }

    #[test]
    fn test_lookup_array_index() {
        let body = json!([{"role": "admin"}, {"role": "viewer"}]);
        assert_eq!(lookup(&body, "0.role"), Some(&json!("admin")));
        assert_eq!(lookup(&body, "1.role"), Some(&json!("viewer")));
        assert_eq!(lookup(&body, "2.role"), None);
        assert_eq!(lookup(&body, "not-a-number"), None);
    }

    #[test]
    fn test_extraction_capture_and_require() {
        let extract = Extraction {
            capture: Some("token".into()),
            require: vec!["user.role".into()],
            fail_on_empty: None,
        };
        let body = json!({"token": "abc", "user": {"role": "admin"}});
        assert_eq!(extract.apply(&body).unwrap(), Some(json!("abc")));
    }

    #[test]
    fn test_extraction_missing_require_names_the_path() {
        let extract = Extraction {
            capture: None,
            require: vec!["user.role".into()],
            fail_on_empty: None,
        };
        let err = extract.apply(&json!({"user": {}})).unwrap_err();
        assert_eq!(err, "`user.role` not found in response body");
    }

    #[test]
    fn test_extraction_null_counts_as_missing() {
        let extract = Extraction {
            capture: Some("token".into()),
            require: vec![],
            fail_on_empty: None,
        };
        let err = extract.apply(&json!({"token": null})).unwrap_err();
        assert_eq!(err, "`token` not found in response body");
    }

    #[test]
    fn test_extraction_empty_array_message() {
        let extract = Extraction {
            capture: None,
            require: vec!["0.role".into()],
            fail_on_empty: Some("no users found".into()),
        };
        let err = extract.apply(&json!([])).unwrap_err();
        assert_eq!(err, "no users found");
    }

    #[test]
    fn test_step_deserializes_from_yaml() {
        let step: ProbeStep = serde_yaml::from_str(
            r#"
            name: login
            required: true
            action: request
            method: POST
            path: /api/auth/login
            body:
              username: u
              password: p
            extract:
              capture: token
              require: [user.role]
            "#,
        )
        .unwrap();

        assert_eq!(step.name, "login");
        assert!(step.required);
        match step.action {
            ProbeAction::Request {
                method,
                ref path,
                ref extract,
                ..
            } => {
                assert_eq!(method, Method::Post);
                assert_eq!(path, "/api/auth/login");
                assert_eq!(extract.capture.as_deref(), Some("token"));
            }
            _ => panic!("expected a request action"),
        }
    }

    #[test]
    fn test_decode_step_deserializes_from_yaml() {
        let step: ProbeStep = serde_yaml::from_str(
            r#"
            name: jwt-roles
            depends_on: login
            action: decode_token
            require_claim: roles
            "#,
        )
        .unwrap();

        assert_eq!(step.depends_on.as_deref(), Some("login"));
        assert!(matches!(
            step.action,
            ProbeAction::DecodeToken { require_claim: Some(ref c) } if c == "roles"
        ));
    }
}

//! Error types for the probe harness
//!
//! Step-level problems (transport, assertion, unmet dependency) are captured
//! into step outcomes during a run and never escape `run()`. The variants
//! here cover everything that can go wrong before a run starts, plus the
//! messages those outcomes are built from.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the probe harness
#[derive(Error, Debug)]
pub enum Error {
    // === Transport Errors ===
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    // === Assertion Errors ===
    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error("dependency unmet")]
    DependencyUnmet,

    #[error("cancelled")]
    Cancelled,

    // === Token Errors ===
    #[error(transparent)]
    Decode(#[from] DecodeError),

    // === Step Definition Errors ===
    #[error("invalid probe definition: {0}")]
    StepDefinition(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while decoding a compact dot-separated token.
///
/// Decoding never touches the signature segment, so a successful decode says
/// nothing about the authenticity of the claims. Callers that need trust must
/// verify the token elsewhere.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed token: expected at least 2 dot-separated segments")]
    MalformedStructure,

    #[error("invalid payload encoding: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

//! Compact token payload decoding
//!
//! Splits a dot-separated token and decodes its second segment as base64url
//! JSON. This is decode-only: the signature segment is never inspected, so a
//! successful decode is not proof of authenticity. The harness uses it to
//! check which claims a service puts in its tokens, nothing more.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::{Map, Value};

use crate::common::DecodeError;

/// Claims carried in a decoded token payload, keyed by claim name.
pub type TokenClaims = Map<String, Value>;

/// Decode the payload segment of a compact dot-separated token.
///
/// Fails with [`DecodeError::MalformedStructure`] when fewer than 2 segments
/// are present, [`DecodeError::InvalidEncoding`] when the payload is not
/// base64url, and [`DecodeError::InvalidPayload`] when the decoded bytes are
/// not a UTF-8 JSON object.
pub fn decode(token: &str) -> Result<TokenClaims, DecodeError> {
    let mut segments = token.split('.');
    let _header = segments.next();
    let payload = segments.next().ok_or(DecodeError::MalformedStructure)?;

    // Tolerate padded input; the engine itself rejects '=' characters.
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;

    let text =
        String::from_utf8(bytes).map_err(|e| DecodeError::InvalidPayload(e.to_string()))?;
    let value: Value =
        serde_json::from_str(&text).map_err(|e| DecodeError::InvalidPayload(e.to_string()))?;

    match value {
        Value::Object(claims) => Ok(claims),
        other => Err(DecodeError::InvalidPayload(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

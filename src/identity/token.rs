use base64::Engine;
use serde_json::Value;
use thiserror::Error;

use super::claims::Claims;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenDecodeError {
    #[error("token has no payload segment")]
    MissingPayload,
    #[error("token payload is not base64url: {0}")]
    InvalidBase64(String),
    #[error("token payload is not utf-8")]
    InvalidUtf8,
    #[error("token payload is not a claims object: {0}")]
    InvalidJson(String),
}

/// Decode the claims of a `header.payload.signature` token.
///
/// The signature is neither checked nor required to be present, and `exp` is not
/// enforced: the result drives display and branching, not trust.
pub fn decode_claims(token: &str) -> Result<Claims, TokenDecodeError> {
    let text = payload_text(token)?;
    serde_json::from_str::<Claims>(&text).map_err(|e| TokenDecodeError::InvalidJson(e.to_string()))
}

/// Raw `role` claim of any token whose payload is JSON.
///
/// Unlike [`decode_claims`] no other claim is required. `Ok(None)` when the claim is
/// absent, empty or not a string.
pub fn decode_role_claim(token: &str) -> Result<Option<String>, TokenDecodeError> {
    let text = payload_text(token)?;
    let payload: Value = serde_json::from_str(&text).map_err(|e| TokenDecodeError::InvalidJson(e.to_string()))?;
    Ok(payload
        .get("role")
        .and_then(Value::as_str)
        .filter(|r| !r.is_empty())
        .map(str::to_string))
}

fn payload_text(token: &str) -> Result<String, TokenDecodeError> {
    let payload = token.trim().split('.').nth(1).filter(|s| !s.is_empty()).ok_or(TokenDecodeError::MissingPayload)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| TokenDecodeError::InvalidBase64(e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| TokenDecodeError::InvalidUtf8)
}

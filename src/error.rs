//! Unified client error model.
//! Every failure path of the client ends in one of these variants; the view layer
//! turns them into a human-readable alert and the caller returns to its prior state.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::identity::TokenDecodeError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// Local form validation failed; nothing was sent.
    Validation { code: String, message: String },
    /// Server answered 401/403, or the local session is missing.
    Auth { code: String, message: String },
    NotFound { code: String, message: String },
    /// Server refused the payload (400/409/422).
    Rejected { code: String, message: String },
    /// Any other non-success status.
    Remote { code: String, message: String },
    /// Transport failure or timeout.
    Network { code: String, message: String },
    /// Server payload did not match the expected schema.
    Malformed { code: String, message: String },
    /// Session token could not be decoded.
    Decode { code: String, message: String },
    /// Token store medium failed.
    Storage { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Validation { code, .. }
            | AppError::Auth { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Rejected { code, .. }
            | AppError::Remote { code, .. }
            | AppError::Network { code, .. }
            | AppError::Malformed { code, .. }
            | AppError::Decode { code, .. }
            | AppError::Storage { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation { message, .. }
            | AppError::Auth { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Rejected { message, .. }
            | AppError::Remote { message, .. }
            | AppError::Network { message, .. }
            | AppError::Malformed { message, .. }
            | AppError::Decode { message, .. }
            | AppError::Storage { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn validation<S: Into<String>>(code: S, msg: S) -> Self { AppError::Validation { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn rejected<S: Into<String>>(code: S, msg: S) -> Self { AppError::Rejected { code: code.into(), message: msg.into() } }
    pub fn remote<S: Into<String>>(code: S, msg: S) -> Self { AppError::Remote { code: code.into(), message: msg.into() } }
    pub fn network<S: Into<String>>(code: S, msg: S) -> Self { AppError::Network { code: code.into(), message: msg.into() } }
    pub fn malformed<S: Into<String>>(code: S, msg: S) -> Self { AppError::Malformed { code: code.into(), message: msg.into() } }
    pub fn decode<S: Into<String>>(code: S, msg: S) -> Self { AppError::Decode { code: code.into(), message: msg.into() } }
    pub fn storage<S: Into<String>>(code: S, msg: S) -> Self { AppError::Storage { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Classify a non-success HTTP status returned by the booking API.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = server_message(body).unwrap_or_else(|| format!("HTTP {}", status));
        match status {
            401 | 403 => AppError::auth(format!("http_{}", status), message),
            404 => AppError::not_found("http_404".to_string(), message),
            400 | 409 | 422 => AppError::rejected(format!("http_{}", status), message),
            _ => AppError::remote(format!("http_{}", status), message),
        }
    }

    /// Best-effort HTTP status equivalent, used when reporting errors as JSON.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Validation { .. } => 400,
            AppError::Auth { .. } => 401,
            AppError::NotFound { .. } => 404,
            AppError::Rejected { .. } => 422,
            AppError::Remote { .. } => 502,
            AppError::Network { .. } => 503,
            AppError::Malformed { .. } => 502,
            AppError::Decode { .. } => 401,
            AppError::Storage { .. } => 500,
            AppError::Internal { .. } => 500,
        }
    }

    /// True when the failure came from the server or the wire rather than local input.
    pub fn is_remote(&self) -> bool {
        matches!(self, AppError::Auth { .. } | AppError::NotFound { .. } | AppError::Rejected { .. }
            | AppError::Remote { .. } | AppError::Network { .. } | AppError::Malformed { .. })
    }
}

// NestJS-style error bodies carry `message` as a string or a list of strings.
fn server_message(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    match v.get("message")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(|m| m.as_str()).collect();
            if parts.is_empty() { None } else { Some(parts.join("; ")) }
        }
        _ => None,
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Network { code: "timeout".into(), message: err.to_string() }
        } else if err.is_decode() {
            AppError::Malformed { code: "invalid_body".into(), message: err.to_string() }
        } else {
            AppError::Network { code: "transport".into(), message: err.to_string() }
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage { code: "io_error".into(), message: err.to_string() }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Malformed { code: "invalid_json".into(), message: err.to_string() }
    }
}

impl From<TokenDecodeError> for AppError {
    fn from(err: TokenDecodeError) -> Self {
        AppError::Decode { code: "token_decode".into(), message: err.to_string() }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal { code: "internal".into(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(AppError::from_status(401, ""), AppError::Auth { .. }));
        assert!(matches!(AppError::from_status(403, ""), AppError::Auth { .. }));
        assert!(matches!(AppError::from_status(404, ""), AppError::NotFound { .. }));
        assert!(matches!(AppError::from_status(422, ""), AppError::Rejected { .. }));
        assert!(matches!(AppError::from_status(500, ""), AppError::Remote { .. }));
        assert_eq!(AppError::from_status(500, "").message(), "HTTP 500");
        assert_eq!(AppError::from_status(418, "").code_str(), "http_418");
    }

    #[test]
    fn server_message_is_preferred() {
        let e = AppError::from_status(400, r#"{"statusCode":400,"message":["email must be an email","password too short"]}"#);
        assert_eq!(e.message(), "email must be an email; password too short");
        let e = AppError::from_status(401, r#"{"message":"Unauthorized"}"#);
        assert_eq!(e.message(), "Unauthorized");
        // non-json bodies fall back to the status line
        let e = AppError::from_status(502, "<html>bad gateway</html>");
        assert_eq!(e.message(), "HTTP 502");
    }

    #[test]
    fn http_status_mapping() {
        assert_eq!(AppError::validation("missing_field", "x").http_status(), 400);
        assert_eq!(AppError::auth("auth", "no").http_status(), 401);
        assert_eq!(AppError::not_found("nf", "missing").http_status(), 404);
        assert_eq!(AppError::network("timeout", "slow").http_status(), 503);
        assert_eq!(AppError::storage("io", "disk").http_status(), 500);
    }

    #[test]
    fn remote_vs_local() {
        assert!(AppError::network("transport", "down").is_remote());
        assert!(AppError::malformed("schema", "bad").is_remote());
        assert!(!AppError::validation("missing_field", "x").is_remote());
        assert!(!AppError::storage("io", "disk").is_remote());
    }

    #[test]
    fn serializes_with_type_tag() {
        let v = serde_json::to_value(AppError::auth("http_401", "Unauthorized")).unwrap();
        assert_eq!(v["type"], "auth");
        assert_eq!(v["code"], "http_401");
    }
}

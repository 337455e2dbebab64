//! Error taxonomy for remote calls.
//!
//! ERROR HANDLING
//! ==============
//! The server reports failures as `{"detail": ...}`. A string detail is shown
//! verbatim, a list of field errors is joined into one message, and anything
//! else falls back to a per-operation generic message chosen by the caller.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Field-level validation messages.
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("unauthorized{}", detail_suffix(.0.as_deref()))]
    Unauthorized(Option<String>),

    #[error("forbidden{}", detail_suffix(.0.as_deref()))]
    Forbidden(Option<String>),

    #[error("not found{}", detail_suffix(.0.as_deref()))]
    NotFound(Option<String>),

    #[error("server returned status {status}{}", detail_suffix(.detail.as_deref()))]
    Status { status: u16, detail: Option<String> },

    /// The response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),
}

fn detail_suffix(detail: Option<&str>) -> String {
    detail.map(|d| format!(": {d}")).unwrap_or_default()
}

/// Parsed `detail` field of an error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Detail {
    Text(String),
    Messages(Vec<String>),
    Missing,
}

pub(crate) fn parse_detail(body: &[u8]) -> Detail {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return Detail::Missing;
    };
    match value.get("detail") {
        Some(Value::String(text)) => Detail::Text(text.clone()),
        Some(Value::Array(items)) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(obj) => obj.get("msg").and_then(Value::as_str).map(str::to_owned),
                    _ => None,
                })
                .collect();
            if messages.is_empty() { Detail::Missing } else { Detail::Messages(messages) }
        }
        _ => Detail::Missing,
    }
}

impl ApiError {
    /// Classify a non-success HTTP response.
    #[must_use]
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let detail = match parse_detail(body) {
            Detail::Messages(messages) => return Self::Validation(messages),
            Detail::Text(text) => Some(text),
            Detail::Missing => None,
        };
        match status {
            401 => Self::Unauthorized(detail),
            403 => Self::Forbidden(detail),
            404 => Self::NotFound(detail),
            _ => Self::Status { status, detail },
        }
    }

    /// Human-readable message for a notification, or `fallback` when the
    /// server supplied nothing usable.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(messages) if !messages.is_empty() => messages.join(", "),
            Self::Unauthorized(Some(d)) | Self::Forbidden(Some(d)) | Self::NotFound(Some(d)) => d.clone(),
            Self::Status { detail: Some(d), .. } => d.clone(),
            _ => fallback.to_owned(),
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Failures worth an error-level log line rather than a warning.
    #[must_use]
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Decode(_) | Self::Status { status: 500..=599, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() { Self::Decode(e.to_string()) } else { Self::Transport(e.to_string()) }
    }
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Flat error taxonomy for user-facing error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationFailed,
    NotFound,
    AlreadyExists,
    Internal,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::Internal => "INTERNAL",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

/// Envelope carried by every surfaced error: a code plus message, optional
/// details, the offending field for validation failures, and the underlying
/// cause when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl ErrorReport {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            field: None,
            cause: None,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            ..Self::new(ErrorCode::ValidationFailed, message)
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AlreadyExists, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unknown, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Render the message shown in the error modal.
    ///
    /// Validation failures with a known field render as `"<field>: <message>"`.
    /// Internal and unknown errors hide their message behind a generic line;
    /// everything else shows the message as-is.
    pub fn to_user_message(&self) -> String {
        match (self.code, &self.field) {
            (ErrorCode::ValidationFailed, Some(field)) => {
                format!("{field}: {}", self.message)
            }
            (ErrorCode::Internal | ErrorCode::Unknown, _) => {
                "An unexpected error occurred".to_string()
            }
            _ => self.message.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("config validation error: {0}")]
    Validation(String),

    #[error("config watch error: {0}")]
    Watch(String),
}

/// Errors surfaced by the floating-window widget. These are treated as
/// cosmetic by the coordinator: logged, never propagated.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("widget create failed: {0}")]
    Create(String),

    #[error("widget geometry call failed: {0}")]
    Geometry(String),

    #[error("widget already closed: {0}")]
    Closed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("bridge transport error: {0}")]
    Transport(String),

    #[error("bridge call '{operation}' timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("bridge decode error: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CardboardError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Widget(#[from] WidgetError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl CardboardError {
    /// Normalize any crate error into the user-facing report envelope.
    pub fn to_report(&self) -> ErrorReport {
        match self {
            CardboardError::Config(ConfigError::FileNotFound(path)) => {
                ErrorReport::not_found(format!("config file not found: {}", path.display()))
            }
            CardboardError::Config(ConfigError::Validation(msg)) => {
                ErrorReport::new(ErrorCode::ValidationFailed, msg.clone())
            }
            CardboardError::Config(e) => {
                ErrorReport::internal("configuration failure").with_cause(e.to_string())
            }
            CardboardError::Widget(e) => {
                ErrorReport::internal("window widget failure").with_cause(e.to_string())
            }
            CardboardError::Bridge(e @ BridgeError::Timeout { .. }) => {
                ErrorReport::internal("backend call timed out").with_cause(e.to_string())
            }
            CardboardError::Bridge(e) => {
                ErrorReport::internal("backend bridge failure").with_cause(e.to_string())
            }
            CardboardError::Io(e) => ErrorReport::internal("io failure").with_cause(e.to_string()),
            CardboardError::Other(msg) => ErrorReport::unknown(msg.clone()),
        }
    }
}

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::model::ContentState;

/// Domain-level invariant failure with a stable code and a structured location.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvariantViolation {
    pub code: &'static str,
    pub path: String,
    pub details: serde_json::Value,
}

impl InvariantViolation {
    pub fn new(code: &'static str, path: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            code,
            path: path.into(),
            details,
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.code, self.path)
    }
}

/// High-level error type shared across SiteDesk components.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid persisted document {}: {message}", path.display())]
    InvalidDocument { path: PathBuf, message: String },
    #[error("invariant violation: {0}")]
    Invariant(InvariantViolation),
    #[error("write conflict on the {state} index: stored revision changed")]
    Conflict { state: ContentState },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("config error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
    #[error("project error: {0}")]
    Project(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SiteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<InvariantViolation> for SiteError {
    fn from(violation: InvariantViolation) -> Self {
        Self::Invariant(violation)
    }
}

impl SiteError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_document(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for transports that map errors to responses.
    pub fn code(&self) -> &'static str {
        match self {
            SiteError::Io { .. } => "STORAGE_IO",
            SiteError::InvalidDocument { .. } => "INVALID_PERSISTED_DOCUMENT",
            SiteError::Invariant(violation) => violation.code,
            SiteError::Conflict { .. } => "WRITE_CONFLICT",
            SiteError::InvalidRequest(_) => "INVALID_REQUEST",
            SiteError::Config { .. } => "CONFIG_INVALID",
            SiteError::Project(_) => "PROJECT_NOT_FOUND",
            SiteError::Serialization(_) => "SERIALIZATION",
        }
    }

    pub fn context<T: fmt::Display>(self, ctx: T) -> Self {
        match self {
            SiteError::InvalidRequest(msg) => SiteError::InvalidRequest(format!("{ctx}: {msg}")),
            SiteError::Project(msg) => SiteError::Project(format!("{ctx}: {msg}")),
            SiteError::Serialization(msg) => SiteError::Serialization(format!("{ctx}: {msg}")),
            SiteError::InvalidDocument { path, message } => SiteError::InvalidDocument {
                path,
                message: format!("{ctx}: {message}"),
            },
            SiteError::Config { path, message } => SiteError::Config {
                path,
                message: format!("{ctx}: {message}"),
            },
            other @ (SiteError::Io { .. }
            | SiteError::Invariant(_)
            | SiteError::Conflict { .. }) => other,
        }
    }
}

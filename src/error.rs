//! Centralized error handling for swiftstatus

use std::io;
use thiserror::Error;

/// Error type for swiftstatus operations
#[derive(Debug, Error)]
pub enum StatusError {
    /// Malformed configuration text. Fatal before polling begins.
    #[error("parse error on line {line} near '{token}': {message}")]
    Parse {
        line: usize,
        token: String,
        message: String,
    },

    /// A configured module type has no registered constructor
    #[error("unknown module type '{0}'")]
    UnknownModuleType(String),

    /// A module option has the wrong type or an unusable value
    #[error("invalid option '{option}' for module '{module}': {message}")]
    InvalidOption {
        module: String,
        option: String,
        message: String,
    },

    /// A metric could not be queried this tick; the module falls back
    #[error("{metric} unavailable: {reason}")]
    MetricUnavailable { metric: String, reason: String },

    /// Configuration errors outside the text grammar (missing file, TOML shape)
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StatusError {
    pub fn parse(line: usize, token: impl Into<String>, message: impl Into<String>) -> Self {
        StatusError::Parse {
            line,
            token: token.into(),
            message: message.into(),
        }
    }

    pub fn unavailable(metric: impl Into<String>, reason: impl Into<String>) -> Self {
        StatusError::MetricUnavailable {
            metric: metric.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_option(
        module: impl Into<String>,
        option: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        StatusError::InvalidOption {
            module: module.into(),
            option: option.into(),
            message: message.into(),
        }
    }

    /// Whether a module can recover from this error by showing its fallback
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StatusError::MetricUnavailable { .. } | StatusError::Io(_))
    }
}

/// Type alias for Results in swiftstatus
pub type Result<T> = std::result::Result<T, StatusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_line_and_token() {
        let err = StatusError::parse(3, "}", "unmatched closing brace");
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("'}'"));
    }

    #[test]
    fn only_metric_failures_are_recoverable() {
        assert!(StatusError::unavailable("battery 0", "missing").is_recoverable());
        assert!(!StatusError::UnknownModuleType("volume".into()).is_recoverable());
        assert!(!StatusError::parse(1, "x", "y").is_recoverable());
    }
}

//! Error handling for dyndata-rs
//!
//! This module defines the crate-level error type and a Result alias.
//! Node evaluation failures are reported through receivers as
//! [`NodeError`](crate::pipeline::NodeError); `DynDataError` covers everything that happens before a
//! graph is running (configuration, expression loading, binding).

use thiserror::Error;

/// Main error type for dyndata-rs operations
#[derive(Error, Debug)]
pub enum DynDataError {
    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Malformed or unsupported expression
    #[error("Expression error: {0}")]
    Expression(String),

    /// A binding needed more nodes than the configured quota allows
    #[error("Node quota exceeded: binding needs more than {limit} nodes")]
    QuotaExceeded { limit: usize },

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<DynDataError>,
    },
}

impl DynDataError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        DynDataError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for DynDataError {
    fn from(err: serde_json::Error) -> Self {
        DynDataError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for DynDataError {
    fn from(err: toml::de::Error) -> Self {
        DynDataError::Serialization(err.to_string())
    }
}

/// Result type alias for dyndata-rs operations
pub type Result<T> = std::result::Result<T, DynDataError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DynDataError::Expression("unknown node".to_string());
        assert_eq!(err.to_string(), "Expression error: unknown node");
    }

    #[test]
    fn test_error_with_context() {
        let err = DynDataError::Config("bad value".to_string());
        let with_ctx = err.with_context("Failed to load config.toml");
        assert!(with_ctx.to_string().contains("Failed to load config.toml"));
    }

    #[test]
    fn test_quota_display() {
        let err = DynDataError::QuotaExceeded { limit: 3 };
        assert!(err.to_string().contains('3'));
    }
}

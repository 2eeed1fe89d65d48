//! Node-level error types.
//!
//! A `NodeError` never aborts evaluation. It travels down the graph through
//! `DynamicValueReceiver::on_invalidated` so consumers can render a fallback
//! until the next valid update arrives.

use thiserror::Error;

/// Reasons a node could not produce a value for an update.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Value out of range: {0}")]
    OutOfRange(String),

    #[error("No state value for key '{0}'")]
    MissingState(String),

    #[error("State key '{key}' holds {actual}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type NodeResult<T> = std::result::Result<T, NodeError>;

//! Serializable dynamic expressions.
//!
//! Expressions describe *what* to compute; the evaluator turns them into a
//! graph of nodes. Each enum is internally tagged with `type`, so the same
//! tree can be written in JSON or TOML:
//!
//! ```json
//! {
//!   "kind": "duration",
//!   "expr": {
//!     "type": "between",
//!     "start": { "type": "fixed", "epoch_seconds": 1700000000 },
//!     "end": { "type": "platform_time" }
//!   }
//! }
//! ```

use crate::error::{DynDataError, Result, ResultExt};
use crate::pipeline::nodes::{ArithmeticOp, DurationPart};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An expression producing an instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DynamicInstant {
    /// Constant offset from the Unix epoch.
    Fixed {
        epoch_seconds: i64,
        #[serde(default)]
        nanos: u32,
    },
    /// The current time, refreshed on every platform tick.
    PlatformTime,
    /// An instant held in the state store.
    State { key: String },
}

/// An expression producing a duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DynamicDuration {
    /// `end - start`.
    Between {
        start: DynamicInstant,
        end: DynamicInstant,
    },
    /// Constant duration.
    Fixed {
        seconds: i64,
        #[serde(default)]
        nanos: u32,
    },
    /// A duration held in the state store.
    State { key: String },
}

/// An expression producing a 32-bit integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DynamicInt32 {
    Fixed {
        value: i32,
    },
    State {
        key: String,
    },
    Arithmetic {
        op: ArithmeticOp,
        lhs: Box<DynamicInt32>,
        rhs: Box<DynamicInt32>,
    },
    DurationPart {
        part: DurationPart,
        duration: DynamicDuration,
    },
}

/// A top-level expression file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "expr", rename_all = "snake_case")]
pub enum DynamicExpression {
    Instant(DynamicInstant),
    Duration(DynamicDuration),
    Int32(DynamicInt32),
}

impl DynamicExpression {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load an expression file; the format follows the extension
    /// (`.toml`, anything else is read as JSON).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(DynDataError::from)
            .with_context(|| format!("Failed to read expression file {}", path.display()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&text),
            _ => Self::from_json(&text),
        }
    }
}

//! Core value types for dyndata-rs
//!
//! This module defines the values that flow through the evaluation graph:
//!
//! - [`TimeInstant`] - an absolute point in time (UTC, nanosecond precision)
//! - [`Duration`] - a signed elapsed time between two instants
//! - [`DynamicValue`] - tagged union held by the state store
//! - [`StateValue`] - conversion from a `DynamicValue` into a typed node input

use chrono::{DateTime, TimeDelta, Utc};

/// An absolute point in time.
pub type TimeInstant = DateTime<Utc>;

/// A signed elapsed time. Negative when the end precedes the start.
pub type Duration = TimeDelta;

/// A value stored in the [`StateStore`](crate::pipeline::StateStore).
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Int32(i32),
    Instant(TimeInstant),
    Duration(Duration),
}

impl DynamicValue {
    /// Name of the contained type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            DynamicValue::Int32(_) => "int32",
            DynamicValue::Instant(_) => "instant",
            DynamicValue::Duration(_) => "duration",
        }
    }
}

impl From<i32> for DynamicValue {
    fn from(v: i32) -> Self {
        DynamicValue::Int32(v)
    }
}

impl From<TimeInstant> for DynamicValue {
    fn from(v: TimeInstant) -> Self {
        DynamicValue::Instant(v)
    }
}

impl From<Duration> for DynamicValue {
    fn from(v: Duration) -> Self {
        DynamicValue::Duration(v)
    }
}

/// A type that a state source node can extract from a [`DynamicValue`].
pub trait StateValue: Clone + 'static {
    /// Name used in type mismatch errors.
    const TYPE_NAME: &'static str;

    /// Extract the typed value, or `None` if the variant does not match.
    fn from_dynamic(value: &DynamicValue) -> Option<Self>;
}

impl StateValue for i32 {
    const TYPE_NAME: &'static str = "int32";

    fn from_dynamic(value: &DynamicValue) -> Option<Self> {
        match value {
            DynamicValue::Int32(v) => Some(*v),
            _ => None,
        }
    }
}

impl StateValue for TimeInstant {
    const TYPE_NAME: &'static str = "instant";

    fn from_dynamic(value: &DynamicValue) -> Option<Self> {
        match value {
            DynamicValue::Instant(v) => Some(*v),
            _ => None,
        }
    }
}

impl StateValue for Duration {
    const TYPE_NAME: &'static str = "duration";

    fn from_dynamic(value: &DynamicValue) -> Option<Self> {
        match value {
            DynamicValue::Duration(v) => Some(*v),
            _ => None,
        }
    }
}

//! Shorthand constructors for expression trees

use dyndata_rs::pipeline::{
    ArithmeticOp, DurationPart, DynamicDuration, DynamicInstant, DynamicInt32,
};
use dyndata_rs::types::TimeInstant;

pub fn fixed_instant(at: TimeInstant) -> DynamicInstant {
    DynamicInstant::Fixed {
        epoch_seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos(),
    }
}

pub fn state_instant(key: &str) -> DynamicInstant {
    DynamicInstant::State {
        key: key.to_string(),
    }
}

pub fn between(start: DynamicInstant, end: DynamicInstant) -> DynamicDuration {
    DynamicDuration::Between { start, end }
}

pub fn part(part: DurationPart, duration: DynamicDuration) -> DynamicInt32 {
    DynamicInt32::DurationPart { part, duration }
}

pub fn int(value: i32) -> DynamicInt32 {
    DynamicInt32::Fixed { value }
}

pub fn arith(op: ArithmeticOp, lhs: DynamicInt32, rhs: DynamicInt32) -> DynamicInt32 {
    DynamicInt32::Arithmetic {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}


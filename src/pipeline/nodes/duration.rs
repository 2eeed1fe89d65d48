//! Dynamic data nodes which yield durations or read parts of them.

use crate::pipeline::error::{NodeError, NodeResult};
use crate::pipeline::node::TransformState;
use crate::pipeline::nodes::bi_transform::{BiTransformNode, LhsReceiver, RhsReceiver};
use crate::pipeline::nodes::unary_transform::UnaryTransformNode;
use crate::pipeline::receiver::DynamicValueReceiver;
use crate::types::{Duration, TimeInstant};
use serde::{Deserialize, Serialize};

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// Duration from a start instant (first slot) to an end instant (second slot).
///
/// The result is `end - start` and is negative when the end precedes the
/// start.
pub struct BetweenInstancesNode {
    node: BiTransformNode<TimeInstant, TimeInstant, Duration>,
}

impl BetweenInstancesNode {
    pub fn new(downstream: impl DynamicValueReceiver<Duration> + 'static) -> Self {
        Self {
            node: BiTransformNode::new(
                "BetweenInstances",
                downstream,
                |start: &TimeInstant, end: &TimeInstant| Ok(end.signed_duration_since(*start)),
            ),
        }
    }

    pub fn start_receiver(&self) -> LhsReceiver<TimeInstant, TimeInstant, Duration> {
        self.node.lhs_receiver()
    }

    pub fn end_receiver(&self) -> RhsReceiver<TimeInstant, TimeInstant, Duration> {
        self.node.rhs_receiver()
    }

    pub fn state(&self) -> TransformState {
        self.node.state()
    }
}

/// Which part of a duration to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPart {
    /// Whole days, signed.
    TotalDays,
    /// Whole hours, signed.
    TotalHours,
    /// Whole minutes, signed.
    TotalMinutes,
    /// Whole seconds, signed.
    TotalSeconds,
    /// Day component of the absolute duration.
    Days,
    /// Hour-of-day component (0..24) of the absolute duration.
    Hours,
    /// Minute component (0..60) of the absolute duration.
    Minutes,
    /// Second component (0..60) of the absolute duration.
    Seconds,
}

impl DurationPart {
    /// Extract this part from `duration`. Totals truncate toward zero.
    pub fn extract(self, duration: &Duration) -> NodeResult<i32> {
        let total_seconds = duration.num_seconds();
        let abs_seconds = total_seconds.unsigned_abs();
        let value = match self {
            DurationPart::TotalDays => duration.num_days(),
            DurationPart::TotalHours => duration.num_hours(),
            DurationPart::TotalMinutes => duration.num_minutes(),
            DurationPart::TotalSeconds => total_seconds,
            DurationPart::Days => (abs_seconds / SECONDS_PER_DAY) as i64,
            DurationPart::Hours => ((abs_seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR) as i64,
            DurationPart::Minutes => ((abs_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE) as i64,
            DurationPart::Seconds => (abs_seconds % SECONDS_PER_MINUTE) as i64,
        };
        i32::try_from(value).map_err(|_| NodeError::Overflow("duration part"))
    }
}

/// Reads one [`DurationPart`] from each incoming duration.
pub struct GetDurationPartNode {
    node: UnaryTransformNode<Duration, i32>,
}

impl GetDurationPartNode {
    pub fn new(part: DurationPart, downstream: impl DynamicValueReceiver<i32> + 'static) -> Self {
        Self {
            node: UnaryTransformNode::new("GetDurationPart", downstream, move |d: &Duration| {
                part.extract(d)
            }),
        }
    }
}

impl DynamicValueReceiver<Duration> for GetDurationPartNode {
    fn on_pre_update(&mut self) {
        self.node.on_pre_update();
    }

    fn on_data(&mut self, value: Duration) {
        self.node.on_data(value);
    }

    fn on_invalidated(&mut self, reason: NodeError) {
        self.node.on_invalidated(reason);
    }

    fn on_post_update(&mut self) {
        self.node.on_post_update();
    }
}

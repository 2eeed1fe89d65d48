//! Source nodes with a constant value.

use crate::pipeline::error::NodeError;
use crate::pipeline::node::DynamicDataNode;
use crate::pipeline::receiver::DynamicValueReceiver;
use crate::types::TimeInstant;
use chrono::{DateTime, Utc};

/// Pushes a constant value once per activation.
pub struct FixedValueNode<T> {
    value: T,
    downstream: Box<dyn DynamicValueReceiver<T>>,
    announced: bool,
}

impl<T: Clone> FixedValueNode<T> {
    pub fn new(value: T, downstream: impl DynamicValueReceiver<T> + 'static) -> Self {
        Self {
            value,
            downstream: Box::new(downstream),
            announced: false,
        }
    }
}

impl<T: Clone> DynamicDataNode for FixedValueNode<T> {
    fn name(&self) -> &str {
        "FixedValue"
    }

    fn on_pre_activate(&mut self) {
        if !self.announced {
            self.downstream.on_pre_update();
            self.announced = true;
        }
    }

    fn on_activate(&mut self) {
        self.on_pre_activate();
        self.downstream.on_data(self.value.clone());
        self.downstream.on_post_update();
        self.announced = false;
    }
}

/// A constant instant given as an offset from the Unix epoch.
///
/// Offsets outside the representable range invalidate the output.
pub struct FixedInstantNode {
    epoch_seconds: i64,
    nanos: u32,
    downstream: Box<dyn DynamicValueReceiver<TimeInstant>>,
    announced: bool,
}

impl FixedInstantNode {
    pub fn new(
        epoch_seconds: i64,
        nanos: u32,
        downstream: impl DynamicValueReceiver<TimeInstant> + 'static,
    ) -> Self {
        Self {
            epoch_seconds,
            nanos,
            downstream: Box::new(downstream),
            announced: false,
        }
    }
}

impl DynamicDataNode for FixedInstantNode {
    fn name(&self) -> &str {
        "FixedInstant"
    }

    fn on_pre_activate(&mut self) {
        if !self.announced {
            self.downstream.on_pre_update();
            self.announced = true;
        }
    }

    fn on_activate(&mut self) {
        self.on_pre_activate();
        match DateTime::<Utc>::from_timestamp(self.epoch_seconds, self.nanos) {
            Some(instant) => self.downstream.on_data(instant),
            None => self.downstream.on_invalidated(NodeError::OutOfRange(format!(
                "{}s + {}ns since epoch",
                self.epoch_seconds, self.nanos
            ))),
        }
        self.downstream.on_post_update();
        self.announced = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::receiver::{ReceivedUpdate, UpdateRecorder};

    #[test]
    fn test_fixed_value_pushes_on_each_activation() {
        let recorder = UpdateRecorder::new();
        let mut node = FixedValueNode::new(5, recorder.clone());

        assert!(recorder.is_empty());
        node.on_activate();
        node.on_deactivate();
        node.on_activate();

        assert_eq!(recorder.values(), vec![5, 5]);
    }

    #[test]
    fn test_pre_activation_announces_once() {
        let recorder = UpdateRecorder::new();
        let mut node = FixedValueNode::new(7, recorder.clone());

        node.on_pre_activate();
        node.on_activate();

        assert_eq!(
            recorder.updates(),
            vec![
                ReceivedUpdate::PreUpdate,
                ReceivedUpdate::Data(7),
                ReceivedUpdate::PostUpdate
            ]
        );
    }

    #[test]
    fn test_fixed_instant() {
        let recorder = UpdateRecorder::new();
        let mut node = FixedInstantNode::new(1_700_000_000, 250_000_000, recorder.clone());
        node.on_activate();

        let instant = recorder.last_value().unwrap();
        assert_eq!(instant.timestamp(), 1_700_000_000);
        assert_eq!(instant.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_fixed_instant_out_of_range() {
        let recorder = UpdateRecorder::new();
        let mut node = FixedInstantNode::new(i64::MAX, 0, recorder.clone());
        node.on_activate();

        let updates = recorder.updates();
        assert_eq!(updates.len(), 3);
        assert!(matches!(
            updates[1],
            ReceivedUpdate::Invalidated(NodeError::OutOfRange(_))
        ));
    }
}

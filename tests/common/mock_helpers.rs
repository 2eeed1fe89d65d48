//! Mock receivers for checking notification order

use dyndata_rs::pipeline::{DynamicValueReceiver, NodeError};
use dyndata_rs::types::Duration;
use mockall::mock;

mock! {
    pub DurationSink {}

    impl DynamicValueReceiver<Duration> for DurationSink {
        fn on_pre_update(&mut self);
        fn on_data(&mut self, value: Duration);
        fn on_invalidated(&mut self, reason: NodeError);
        fn on_post_update(&mut self);
    }
}

mock! {
    pub Int32Sink {}

    impl DynamicValueReceiver<i32> for Int32Sink {
        fn on_pre_update(&mut self);
        fn on_data(&mut self, value: i32);
        fn on_invalidated(&mut self, reason: NodeError);
        fn on_post_update(&mut self);
    }
}

//! Maps each upstream value through a function.
//!
//! Announcements and post-updates are forwarded as-is; a failing function
//! turns the value into an invalidation.

use crate::pipeline::error::{NodeError, NodeResult};
use crate::pipeline::receiver::DynamicValueReceiver;

/// Single-input transform node. Acts as the receiver of its upstream.
pub struct UnaryTransformNode<I, O> {
    name: &'static str,
    downstream: Box<dyn DynamicValueReceiver<O>>,
    transform: Box<dyn Fn(&I) -> NodeResult<O>>,
}

impl<I, O: 'static> UnaryTransformNode<I, O> {
    pub fn new<D, F>(name: &'static str, downstream: D, transform: F) -> Self
    where
        D: DynamicValueReceiver<O> + 'static,
        F: Fn(&I) -> NodeResult<O> + 'static,
    {
        Self {
            name,
            downstream: Box::new(downstream),
            transform: Box::new(transform),
        }
    }
}

impl<I, O> DynamicValueReceiver<I> for UnaryTransformNode<I, O> {
    fn on_pre_update(&mut self) {
        self.downstream.on_pre_update();
    }

    fn on_data(&mut self, value: I) {
        match (self.transform)(&value) {
            Ok(out) => self.downstream.on_data(out),
            Err(e) => {
                tracing::warn!("{} failed to transform input: {}", self.name, e);
                self.downstream.on_invalidated(e);
            }
        }
    }

    fn on_invalidated(&mut self, reason: NodeError) {
        self.downstream.on_invalidated(reason);
    }

    fn on_post_update(&mut self) {
        self.downstream.on_post_update();
    }
}

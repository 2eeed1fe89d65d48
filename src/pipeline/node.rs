//! Node abstraction for the evaluation graph.
//!
//! Transform nodes are passive: they are receivers owned by their upstream
//! and only run when a value is pushed into them. Source nodes originate
//! values and therefore have a lifecycle, driven by
//! [`BoundDynamicType`](crate::pipeline::BoundDynamicType):
//!
//! - `on_pre_activate`: announce the initial value with `on_pre_update`.
//! - `on_activate`: start producing values (push the initial one).
//! - `on_deactivate`: stop producing values and release registrations.
//!
//! A binding pre-activates every source before activating any, so a
//! combining node fed by several sources emits once per start, even when it
//! still holds values from an earlier run.

/// Whether a combining node has seen enough input to produce output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformState {
    /// At least one input slot has never received a value.
    AwaitingFirstValue,
    /// Every input slot has received a value. Never left once reached.
    Ready,
}

/// A node that originates values.
pub trait DynamicDataNode {
    /// Human-readable name of this node.
    fn name(&self) -> &str;

    /// Called on every source of a binding before any is activated. A
    /// source that announces here must not announce again in `on_activate`.
    fn on_pre_activate(&mut self) {}

    /// Called when evaluation starts.
    fn on_activate(&mut self);

    /// Called when evaluation stops.
    fn on_deactivate(&mut self) {}
}

impl<N: DynamicDataNode + ?Sized> DynamicDataNode for Box<N> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_pre_activate(&mut self) {
        (**self).on_pre_activate();
    }

    fn on_activate(&mut self) {
        (**self).on_activate();
    }

    fn on_deactivate(&mut self) {
        (**self).on_deactivate();
    }
}

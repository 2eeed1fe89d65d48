//! The push protocol between dynamic data nodes.
//!
//! Every update travels as three calls: `on_pre_update` announces that a new
//! value is on its way, `on_data` (or `on_invalidated`) delivers it, and
//! `on_post_update` closes the update. Receivers with several inputs use the
//! announcement to hold back output until all of their inputs have settled.

use crate::pipeline::error::NodeError;
use std::cell::RefCell;
use std::rc::Rc;

/// Sink for values pushed by a dynamic data node.
pub trait DynamicValueReceiver<T> {
    /// An update is in flight. A value or invalidation follows.
    fn on_pre_update(&mut self);

    /// A new value.
    fn on_data(&mut self, value: T);

    /// The upstream could not produce a value for this update.
    fn on_invalidated(&mut self, reason: NodeError);

    /// The update announced by `on_pre_update` is complete.
    fn on_post_update(&mut self) {}
}

impl<T, R: DynamicValueReceiver<T> + ?Sized> DynamicValueReceiver<T> for Box<R> {
    fn on_pre_update(&mut self) {
        (**self).on_pre_update();
    }

    fn on_data(&mut self, value: T) {
        (**self).on_data(value);
    }

    fn on_invalidated(&mut self, reason: NodeError) {
        (**self).on_invalidated(reason);
    }

    fn on_post_update(&mut self) {
        (**self).on_post_update();
    }
}

/// One notification observed by an [`UpdateRecorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReceivedUpdate<T> {
    PreUpdate,
    Data(T),
    Invalidated(NodeError),
    PostUpdate,
}

/// Receiver that logs every notification it gets.
///
/// Clones share the same log, so one clone can be handed to a node while
/// another is kept to inspect what arrived.
#[derive(Debug)]
pub struct UpdateRecorder<T> {
    log: Rc<RefCell<Vec<ReceivedUpdate<T>>>>,
}

impl<T> UpdateRecorder<T> {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Number of notifications received so far.
    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// Forget everything received so far.
    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    /// Number of invalidations received so far.
    pub fn invalidation_count(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|u| matches!(u, ReceivedUpdate::Invalidated(_)))
            .count()
    }
}

impl<T: Clone> UpdateRecorder<T> {
    /// Snapshot of every notification, in arrival order.
    pub fn updates(&self) -> Vec<ReceivedUpdate<T>> {
        self.log.borrow().clone()
    }

    /// Only the delivered values, in arrival order.
    pub fn values(&self) -> Vec<T> {
        self.log
            .borrow()
            .iter()
            .filter_map(|u| match u {
                ReceivedUpdate::Data(v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    /// The most recently delivered value.
    pub fn last_value(&self) -> Option<T> {
        self.log.borrow().iter().rev().find_map(|u| match u {
            ReceivedUpdate::Data(v) => Some(v.clone()),
            _ => None,
        })
    }
}

impl<T> Clone for UpdateRecorder<T> {
    fn clone(&self) -> Self {
        Self {
            log: Rc::clone(&self.log),
        }
    }
}

impl<T> Default for UpdateRecorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DynamicValueReceiver<T> for UpdateRecorder<T> {
    fn on_pre_update(&mut self) {
        self.log.borrow_mut().push(ReceivedUpdate::PreUpdate);
    }

    fn on_data(&mut self, value: T) {
        self.log.borrow_mut().push(ReceivedUpdate::Data(value));
    }

    fn on_invalidated(&mut self, reason: NodeError) {
        self.log.borrow_mut().push(ReceivedUpdate::Invalidated(reason));
    }

    fn on_post_update(&mut self) {
        self.log.borrow_mut().push(ReceivedUpdate::PostUpdate);
    }
}

/// Receiver that forwards data to a closure and logs invalidations.
pub struct FnReceiver<F> {
    name: &'static str,
    on_value: F,
}

impl<F> FnReceiver<F> {
    pub fn new(name: &'static str, on_value: F) -> Self {
        Self { name, on_value }
    }
}

impl<T, F: FnMut(T)> DynamicValueReceiver<T> for FnReceiver<F> {
    fn on_pre_update(&mut self) {}

    fn on_data(&mut self, value: T) {
        (self.on_value)(value);
    }

    fn on_invalidated(&mut self, reason: NodeError) {
        tracing::warn!("{} invalidated: {}", self.name, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_clones_share_log() {
        let recorder = UpdateRecorder::<i32>::new();
        let mut handle = recorder.clone();

        handle.on_pre_update();
        handle.on_data(7);
        handle.on_post_update();

        assert_eq!(
            recorder.updates(),
            vec![
                ReceivedUpdate::PreUpdate,
                ReceivedUpdate::Data(7),
                ReceivedUpdate::PostUpdate
            ]
        );
        assert_eq!(recorder.values(), vec![7]);
        assert_eq!(recorder.last_value(), Some(7));
    }

    #[test]
    fn test_boxed_receiver_forwards() {
        let recorder = UpdateRecorder::<i32>::new();
        let mut boxed: Box<dyn DynamicValueReceiver<i32>> = Box::new(recorder.clone());

        boxed.on_invalidated(NodeError::DivisionByZero);
        assert_eq!(recorder.invalidation_count(), 1);
    }

    #[test]
    fn test_fn_receiver() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut receiver = FnReceiver::new("test", move |v: i32| sink.borrow_mut().push(v));

        receiver.on_pre_update();
        receiver.on_data(1);
        receiver.on_invalidated(NodeError::DivisionByZero);
        receiver.on_data(2);

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }
}

//! Generic node combining two independently updating inputs.
//!
//! The node caches the latest value of each input slot and, once both slots
//! have been populated, recomputes its output from both cached values every
//! time either slot changes.
//!
//! Pre-updates are counted per slot. While any slot still has an announced
//! value outstanding, output is held back, so a batch that touches both
//! inputs produces a single downstream emission.

use crate::pipeline::error::{NodeError, NodeResult};
use crate::pipeline::node::TransformState;
use crate::pipeline::receiver::DynamicValueReceiver;
use std::cell::RefCell;
use std::rc::Rc;

type Transform<A, B, R> = Box<dyn Fn(&A, &B) -> NodeResult<R>>;

#[derive(Debug, Clone, Copy)]
enum Side {
    Lhs = 0,
    Rhs = 1,
}

#[derive(Debug, Default)]
struct SlotStatus {
    /// Pre-updates received without a matching value yet.
    pending: u32,
    /// Set while the upstream of this slot is invalid.
    invalid: Option<NodeError>,
}

struct BiTransformInner<A, B, R> {
    name: &'static str,
    lhs: Option<A>,
    rhs: Option<B>,
    status: [SlotStatus; 2],
    downstream: Box<dyn DynamicValueReceiver<R>>,
    transform: Transform<A, B, R>,
    /// A pre-update has been forwarded downstream and not yet closed.
    announced: bool,
    /// A slot changed since the last emission.
    dirty: bool,
}

impl<A, B, R> BiTransformInner<A, B, R> {
    fn is_ready(&self) -> bool {
        self.lhs.is_some() && self.rhs.is_some()
    }

    fn has_pending(&self) -> bool {
        self.status.iter().any(|s| s.pending > 0)
    }

    fn status_mut(&mut self, side: Side) -> &mut SlotStatus {
        &mut self.status[side as usize]
    }

    fn pre_update(&mut self, side: Side) {
        if self.is_ready() && !self.announced {
            self.downstream.on_pre_update();
            self.announced = true;
        }
        self.status_mut(side).pending += 1;
    }

    fn value_arrived(&mut self, side: Side) {
        let status = self.status_mut(side);
        status.pending = status.pending.saturating_sub(1);
        status.invalid = None;
        self.dirty = true;
        self.resolve();
    }

    fn invalidated(&mut self, side: Side, reason: NodeError) {
        let status = self.status_mut(side);
        status.pending = status.pending.saturating_sub(1);
        status.invalid = Some(reason);
        self.dirty = true;
        self.resolve();
    }

    fn post_update(&mut self, side: Side) {
        // A post-update that still has a pending count closes an update that
        // never delivered a value.
        let status = self.status_mut(side);
        if status.pending > 0 {
            status.pending -= 1;
            self.resolve();
        }
    }

    fn resolve(&mut self) {
        if self.has_pending() || !self.is_ready() {
            return;
        }
        if !self.dirty && !self.announced {
            return;
        }

        if !self.announced {
            self.downstream.on_pre_update();
        }
        match self.evaluate() {
            Ok(value) => self.downstream.on_data(value),
            Err(reason) => self.downstream.on_invalidated(reason),
        }
        self.downstream.on_post_update();

        self.announced = false;
        self.dirty = false;
    }

    fn evaluate(&self) -> NodeResult<R> {
        for status in &self.status {
            if let Some(reason) = &status.invalid {
                return Err(reason.clone());
            }
        }
        match (&self.lhs, &self.rhs) {
            (Some(lhs), Some(rhs)) => (self.transform)(lhs, rhs).map_err(|e| {
                tracing::warn!("{} failed to combine inputs: {}", self.name, e);
                e
            }),
            _ => Err(NodeError::InvalidInput(format!(
                "{} evaluated with a missing operand",
                self.name
            ))),
        }
    }
}

fn with_inner<A, B, R>(
    inner: &Rc<RefCell<BiTransformInner<A, B, R>>>,
    f: impl FnOnce(&mut BiTransformInner<A, B, R>),
) {
    match inner.try_borrow_mut() {
        Ok(mut node) => f(&mut node),
        Err(_) => {
            tracing::error!("Dropped reentrant update: node is still propagating a value")
        }
    }
}

/// Generic two-input combinator node.
///
/// `A` and `B` are the slot types, `R` the output type. The combining
/// function must be pure; a returned error is pushed downstream as an
/// invalidation and leaves the cached inputs untouched.
pub struct BiTransformNode<A, B, R> {
    inner: Rc<RefCell<BiTransformInner<A, B, R>>>,
}

impl<A: 'static, B: 'static, R: 'static> BiTransformNode<A, B, R> {
    pub fn new<D, F>(name: &'static str, downstream: D, transform: F) -> Self
    where
        D: DynamicValueReceiver<R> + 'static,
        F: Fn(&A, &B) -> NodeResult<R> + 'static,
    {
        Self {
            inner: Rc::new(RefCell::new(BiTransformInner {
                name,
                lhs: None,
                rhs: None,
                status: [SlotStatus::default(), SlotStatus::default()],
                downstream: Box::new(downstream),
                transform: Box::new(transform),
                announced: false,
                dirty: false,
            })),
        }
    }

    /// Receiver for the first operand.
    pub fn lhs_receiver(&self) -> LhsReceiver<A, B, R> {
        LhsReceiver {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Receiver for the second operand.
    pub fn rhs_receiver(&self) -> RhsReceiver<A, B, R> {
        RhsReceiver {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn state(&self) -> TransformState {
        match self.inner.try_borrow() {
            Ok(node) if !node.is_ready() => TransformState::AwaitingFirstValue,
            // Mid-propagation implies both operands are present.
            _ => TransformState::Ready,
        }
    }
}

/// First-operand slot of a [`BiTransformNode`].
pub struct LhsReceiver<A, B, R> {
    inner: Rc<RefCell<BiTransformInner<A, B, R>>>,
}

impl<A, B, R> Clone for LhsReceiver<A, B, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A, B, R> DynamicValueReceiver<A> for LhsReceiver<A, B, R> {
    fn on_pre_update(&mut self) {
        with_inner(&self.inner, |n| n.pre_update(Side::Lhs));
    }

    fn on_data(&mut self, value: A) {
        with_inner(&self.inner, |n| {
            n.lhs = Some(value);
            n.value_arrived(Side::Lhs);
        });
    }

    fn on_invalidated(&mut self, reason: NodeError) {
        with_inner(&self.inner, |n| n.invalidated(Side::Lhs, reason));
    }

    fn on_post_update(&mut self) {
        with_inner(&self.inner, |n| n.post_update(Side::Lhs));
    }
}

/// Second-operand slot of a [`BiTransformNode`].
pub struct RhsReceiver<A, B, R> {
    inner: Rc<RefCell<BiTransformInner<A, B, R>>>,
}

impl<A, B, R> Clone for RhsReceiver<A, B, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A, B, R> DynamicValueReceiver<B> for RhsReceiver<A, B, R> {
    fn on_pre_update(&mut self) {
        with_inner(&self.inner, |n| n.pre_update(Side::Rhs));
    }

    fn on_data(&mut self, value: B) {
        with_inner(&self.inner, |n| {
            n.rhs = Some(value);
            n.value_arrived(Side::Rhs);
        });
    }

    fn on_invalidated(&mut self, reason: NodeError) {
        with_inner(&self.inner, |n| n.invalidated(Side::Rhs, reason));
    }

    fn on_post_update(&mut self) {
        with_inner(&self.inner, |n| n.post_update(Side::Rhs));
    }
}

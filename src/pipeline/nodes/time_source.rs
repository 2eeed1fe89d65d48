//! The current time as a dynamic value.
//!
//! The source does not schedule itself. Whoever owns the evaluation loop
//! calls [`PlatformTimeSource::tick`] at the desired rate; each tick pushes
//! the clock's current instant to every active time node.

use crate::pipeline::id::ListenerId;
use crate::pipeline::node::DynamicDataNode;
use crate::pipeline::receiver::DynamicValueReceiver;
use crate::types::{Duration, TimeInstant};
use chrono::Utc;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Where the current time comes from.
pub trait Clock {
    fn now(&self) -> TimeInstant;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimeInstant {
        Utc::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<TimeInstant>>,
}

impl ManualClock {
    pub fn new(start: TimeInstant) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, instant: TimeInstant) {
        self.now.set(instant);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimeInstant {
        self.now.get()
    }
}

type SharedTimeReceiver = Rc<RefCell<dyn DynamicValueReceiver<TimeInstant>>>;

struct PlatformTimeInner {
    clock: Box<dyn Clock>,
    listeners: Vec<(ListenerId, SharedTimeReceiver)>,
    next_listener_id: u64,
}

/// Broadcasts the current time to registered receivers. Clones share state.
#[derive(Clone)]
pub struct PlatformTimeSource {
    inner: Rc<RefCell<PlatformTimeInner>>,
}

impl PlatformTimeSource {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PlatformTimeInner {
                clock: Box::new(clock),
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
        }
    }

    /// Source backed by the system clock.
    pub fn system() -> Self {
        Self::new(SystemClock)
    }

    pub fn now(&self) -> TimeInstant {
        self.inner.borrow().clock.now()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn register(&self, receiver: SharedTimeReceiver) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_listener_id);
        inner.next_listener_id += 1;
        inner.listeners.push((id, receiver));
        id
    }

    pub fn unregister(&self, id: ListenerId) {
        self.inner
            .borrow_mut()
            .listeners
            .retain(|(lid, _)| *lid != id);
    }

    /// Push the current instant to every registered receiver.
    pub fn tick(&self) {
        let (now, listeners): (TimeInstant, Vec<SharedTimeReceiver>) = {
            let inner = self.inner.borrow();
            (
                inner.clock.now(),
                inner.listeners.iter().map(|(_, r)| Rc::clone(r)).collect(),
            )
        };
        if listeners.is_empty() {
            return;
        }
        tracing::trace!("Platform time tick {} to {} receiver(s)", now, listeners.len());

        for listener in &listeners {
            deliver(listener, |r| r.on_pre_update());
        }
        for listener in &listeners {
            deliver(listener, |r| r.on_data(now));
        }
        for listener in &listeners {
            deliver(listener, |r| r.on_post_update());
        }
    }
}

fn deliver(
    receiver: &SharedTimeReceiver,
    f: impl FnOnce(&mut dyn DynamicValueReceiver<TimeInstant>),
) {
    match receiver.try_borrow_mut() {
        Ok(mut r) => f(&mut *r),
        Err(_) => tracing::error!("Dropped reentrant platform time update"),
    }
}

/// Source node producing the current time on activation and on every tick.
pub struct PlatformTimeNode {
    source: PlatformTimeSource,
    downstream: SharedTimeReceiver,
    registration: Option<ListenerId>,
    announced: bool,
}

impl PlatformTimeNode {
    pub fn new(
        source: PlatformTimeSource,
        downstream: impl DynamicValueReceiver<TimeInstant> + 'static,
    ) -> Self {
        Self {
            source,
            downstream: Rc::new(RefCell::new(downstream)),
            registration: None,
            announced: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.registration.is_some()
    }
}

impl DynamicDataNode for PlatformTimeNode {
    fn name(&self) -> &str {
        "PlatformTime"
    }

    fn on_pre_activate(&mut self) {
        if self.registration.is_some() || self.announced {
            return;
        }
        self.downstream.borrow_mut().on_pre_update();
        self.announced = true;
    }

    fn on_activate(&mut self) {
        if self.registration.is_some() {
            return;
        }
        self.on_pre_activate();
        self.announced = false;
        self.registration = Some(self.source.register(Rc::clone(&self.downstream)));

        let now = self.source.now();
        let mut downstream = self.downstream.borrow_mut();
        downstream.on_data(now);
        downstream.on_post_update();
    }

    fn on_deactivate(&mut self) {
        if let Some(id) = self.registration.take() {
            self.source.unregister(id);
        }
    }
}

impl Drop for PlatformTimeNode {
    fn drop(&mut self) {
        self.on_deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::receiver::UpdateRecorder;
    use chrono::TimeZone;

    fn start() -> TimeInstant {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(start());
        let view = clock.clone();
        clock.advance(Duration::seconds(90));
        assert_eq!(view.now(), start() + Duration::seconds(90));
    }

    #[test]
    fn test_node_emits_on_activation_and_ticks() {
        let clock = ManualClock::new(start());
        let source = PlatformTimeSource::new(clock.clone());
        let recorder = UpdateRecorder::new();
        let mut node = PlatformTimeNode::new(source.clone(), recorder.clone());

        node.on_activate();
        clock.advance(Duration::seconds(1));
        source.tick();

        assert_eq!(
            recorder.values(),
            vec![start(), start() + Duration::seconds(1)]
        );
    }

    #[test]
    fn test_deactivated_node_ignores_ticks() {
        let source = PlatformTimeSource::new(ManualClock::new(start()));
        let recorder = UpdateRecorder::new();
        let mut node = PlatformTimeNode::new(source.clone(), recorder.clone());

        node.on_activate();
        node.on_deactivate();
        source.tick();

        assert_eq!(recorder.values().len(), 1);
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn test_repeated_activation_registers_once() {
        let source = PlatformTimeSource::new(ManualClock::new(start()));
        let mut node = PlatformTimeNode::new(source.clone(), UpdateRecorder::<TimeInstant>::new());

        node.on_activate();
        node.on_activate();
        assert_eq!(source.listener_count(), 1);
        assert!(node.is_active());
    }
}

//! Keyed values shared across bindings, and the source node that follows one key.
//!
//! A commit notifies listeners in three passes: every affected listener gets
//! its pre-update first, then its value, then its post-update. A node fed by
//! two keys changed in the same commit therefore sees both announcements
//! before either value and emits once.

use crate::pipeline::error::NodeError;
use crate::pipeline::id::ListenerId;
use crate::pipeline::node::DynamicDataNode;
use crate::pipeline::receiver::DynamicValueReceiver;
use crate::types::{DynamicValue, StateValue};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Observer of one state key.
pub trait StateListener {
    fn on_pre_update(&mut self);

    /// `None` means the key was removed.
    fn on_state_changed(&mut self, key: &str, value: Option<&DynamicValue>);

    fn on_post_update(&mut self);
}

type SharedListener = Rc<RefCell<dyn StateListener>>;

#[derive(Default)]
struct StateStoreInner {
    values: HashMap<String, DynamicValue>,
    listeners: HashMap<String, Vec<(ListenerId, SharedListener)>>,
    next_listener_id: u64,
}

/// Shared map of dynamic values. Clones refer to the same store.
#[derive(Clone, Default)]
pub struct StateStore {
    inner: Rc<RefCell<StateStoreInner>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `values`. No listeners exist yet.
    pub fn with_values<K: Into<String>>(values: impl IntoIterator<Item = (K, DynamicValue)>) -> Self {
        let store = Self::new();
        store
            .inner
            .borrow_mut()
            .values
            .extend(values.into_iter().map(|(k, v)| (k.into(), v)));
        store
    }

    pub fn get(&self, key: &str) -> Option<DynamicValue> {
        self.inner.borrow().values.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().values.is_empty()
    }

    /// Number of listeners registered for `key`.
    pub fn listener_count(&self, key: &str) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(key)
            .map_or(0, |l| l.len())
    }

    /// Set a single key.
    pub fn set_state(&self, key: impl Into<String>, value: impl Into<DynamicValue>) {
        self.commit(vec![(key.into(), Some(value.into()))]);
    }

    /// Remove a single key. Its listeners are invalidated.
    pub fn remove_state(&self, key: &str) {
        self.commit(vec![(key.to_string(), None)]);
    }

    /// Replace the whole store with `new_state` as one batch.
    ///
    /// Keys missing from `new_state` are removed.
    pub fn set_states(&self, new_state: HashMap<String, DynamicValue>) {
        let mut changes: Vec<(String, Option<DynamicValue>)> = self
            .inner
            .borrow()
            .values
            .keys()
            .filter(|k| !new_state.contains_key(*k))
            .map(|k| (k.clone(), None))
            .collect();
        changes.extend(new_state.into_iter().map(|(k, v)| (k, Some(v))));
        self.commit(changes);
    }

    /// Register `listener` for changes to `key`.
    pub fn register_listener(&self, key: &str, listener: SharedListener) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_listener_id);
        inner.next_listener_id += 1;
        inner
            .listeners
            .entry(key.to_string())
            .or_default()
            .push((id, listener));
        id
    }

    pub fn unregister_listener(&self, key: &str, id: ListenerId) {
        let mut inner = self.inner.borrow_mut();
        if let Some(listeners) = inner.listeners.get_mut(key) {
            listeners.retain(|(lid, _)| *lid != id);
            if listeners.is_empty() {
                inner.listeners.remove(key);
            }
        }
    }

    fn commit(&self, changes: Vec<(String, Option<DynamicValue>)>) {
        // Collect affected listeners first so no store borrow is held while
        // they run; listeners may read the store.
        let affected: Vec<(String, Option<DynamicValue>, Vec<SharedListener>)> = {
            let mut inner = self.inner.borrow_mut();
            let mut affected = Vec::new();
            for (key, new_value) in changes {
                let old_value = match &new_value {
                    Some(v) => inner.values.insert(key.clone(), v.clone()),
                    None => inner.values.remove(&key),
                };
                if old_value == new_value {
                    continue;
                }
                let listeners: Vec<SharedListener> = inner
                    .listeners
                    .get(&key)
                    .map(|l| l.iter().map(|(_, listener)| Rc::clone(listener)).collect())
                    .unwrap_or_default();
                if !listeners.is_empty() {
                    affected.push((key, new_value, listeners));
                }
            }
            affected
        };

        if affected.is_empty() {
            return;
        }
        tracing::debug!("State commit notifies {} key(s)", affected.len());

        for (_, _, listeners) in &affected {
            for listener in listeners {
                notify(listener, |l| l.on_pre_update());
            }
        }
        for (key, value, listeners) in &affected {
            for listener in listeners {
                notify(listener, |l| l.on_state_changed(key, value.as_ref()));
            }
        }
        for (_, _, listeners) in &affected {
            for listener in listeners {
                notify(listener, |l| l.on_post_update());
            }
        }
    }
}

fn notify(listener: &SharedListener, f: impl FnOnce(&mut dyn StateListener)) {
    match listener.try_borrow_mut() {
        Ok(mut l) => f(&mut *l),
        Err(_) => tracing::error!("Dropped reentrant state notification"),
    }
}

struct StateForwarder<T> {
    key: String,
    downstream: Box<dyn DynamicValueReceiver<T>>,
}

impl<T: StateValue> StateForwarder<T> {
    fn push(&mut self, value: Option<&DynamicValue>) {
        match value {
            None => self
                .downstream
                .on_invalidated(NodeError::MissingState(self.key.clone())),
            Some(v) => match T::from_dynamic(v) {
                Some(typed) => self.downstream.on_data(typed),
                None => self.downstream.on_invalidated(NodeError::TypeMismatch {
                    key: self.key.clone(),
                    expected: T::TYPE_NAME,
                    actual: v.type_name(),
                }),
            },
        }
    }
}

impl<T: StateValue> StateListener for StateForwarder<T> {
    fn on_pre_update(&mut self) {
        self.downstream.on_pre_update();
    }

    fn on_state_changed(&mut self, _key: &str, value: Option<&DynamicValue>) {
        self.push(value);
    }

    fn on_post_update(&mut self) {
        self.downstream.on_post_update();
    }
}

/// Source node that follows one key of a [`StateStore`].
pub struct StateSourceNode<T: StateValue> {
    store: StateStore,
    key: String,
    forwarder: Rc<RefCell<StateForwarder<T>>>,
    registration: Option<ListenerId>,
    announced: bool,
}

impl<T: StateValue> StateSourceNode<T> {
    pub fn new(
        store: StateStore,
        key: impl Into<String>,
        downstream: impl DynamicValueReceiver<T> + 'static,
    ) -> Self {
        let key = key.into();
        Self {
            store,
            forwarder: Rc::new(RefCell::new(StateForwarder {
                key: key.clone(),
                downstream: Box::new(downstream),
            })),
            key,
            registration: None,
            announced: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_active(&self) -> bool {
        self.registration.is_some()
    }
}

impl<T: StateValue> DynamicDataNode for StateSourceNode<T> {
    fn name(&self) -> &str {
        "StateSource"
    }

    fn on_pre_activate(&mut self) {
        if self.registration.is_some() || self.announced {
            return;
        }
        self.forwarder.borrow_mut().downstream.on_pre_update();
        self.announced = true;
    }

    fn on_activate(&mut self) {
        if self.registration.is_some() {
            return;
        }
        self.on_pre_activate();
        self.announced = false;

        let listener: SharedListener = self.forwarder.clone();
        self.registration = Some(self.store.register_listener(&self.key, listener));
        tracing::debug!("State source subscribed to '{}'", self.key);

        let current = self.store.get(&self.key);
        let mut forwarder = self.forwarder.borrow_mut();
        forwarder.push(current.as_ref());
        forwarder.downstream.on_post_update();
    }

    fn on_deactivate(&mut self) {
        if let Some(id) = self.registration.take() {
            self.store.unregister_listener(&self.key, id);
            tracing::debug!("State source unsubscribed from '{}'", self.key);
        }
    }
}

impl<T: StateValue> Drop for StateSourceNode<T> {
    fn drop(&mut self) {
        self.on_deactivate();
    }
}

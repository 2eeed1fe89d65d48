//! Binds dynamic expressions to receivers.
//!
//! Binding walks an expression tree top-down. Each level creates its node
//! with the already-built downstream receiver, then binds its operands into
//! the node's input receivers. Leaves become source nodes, which are the only
//! nodes the resulting [`BoundDynamicType`] needs to hold; transform nodes
//! are kept alive by the receivers that feed them.

use crate::config::EvaluatorConfig;
use crate::error::{DynDataError, Result};
use crate::pipeline::expr::{DynamicDuration, DynamicInstant, DynamicInt32};
use crate::pipeline::id::NodeId;
use crate::pipeline::node::DynamicDataNode;
use crate::pipeline::nodes::{
    ArithmeticNode, BetweenInstancesNode, FixedInstantNode, FixedValueNode, GetDurationPartNode,
    PlatformTimeNode, PlatformTimeSource, StateSourceNode, StateStore,
};
use crate::pipeline::receiver::DynamicValueReceiver;
use crate::types::{Duration, TimeInstant};

type Downstream<T> = Box<dyn DynamicValueReceiver<T>>;

/// Builds node graphs for expressions against one state store and one
/// platform time source.
pub struct DynamicTypeEvaluator {
    max_nodes: usize,
    state_store: StateStore,
    time_source: PlatformTimeSource,
}

impl DynamicTypeEvaluator {
    pub fn new(
        config: &EvaluatorConfig,
        state_store: StateStore,
        time_source: PlatformTimeSource,
    ) -> Self {
        Self {
            max_nodes: config.max_nodes,
            state_store,
            time_source,
        }
    }

    pub fn state_store(&self) -> &StateStore {
        &self.state_store
    }

    pub fn time_source(&self) -> &PlatformTimeSource {
        &self.time_source
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    pub fn bind_instant(
        &self,
        expr: &DynamicInstant,
        receiver: impl DynamicValueReceiver<TimeInstant> + 'static,
    ) -> Result<BoundDynamicType> {
        let mut binder = self.binder();
        binder.instant(expr, Box::new(receiver))?;
        Ok(binder.finish())
    }

    pub fn bind_duration(
        &self,
        expr: &DynamicDuration,
        receiver: impl DynamicValueReceiver<Duration> + 'static,
    ) -> Result<BoundDynamicType> {
        let mut binder = self.binder();
        binder.duration(expr, Box::new(receiver))?;
        Ok(binder.finish())
    }

    pub fn bind_int32(
        &self,
        expr: &DynamicInt32,
        receiver: impl DynamicValueReceiver<i32> + 'static,
    ) -> Result<BoundDynamicType> {
        let mut binder = self.binder();
        binder.int32(expr, Box::new(receiver))?;
        Ok(binder.finish())
    }

    fn binder(&self) -> Binder<'_> {
        Binder {
            evaluator: self,
            next_id: NodeId(0),
            sources: Vec::new(),
        }
    }
}

struct Binder<'a> {
    evaluator: &'a DynamicTypeEvaluator,
    next_id: NodeId,
    sources: Vec<(NodeId, Box<dyn DynamicDataNode>)>,
}

impl Binder<'_> {
    /// Reserve an id for a new node, failing once the quota is used up.
    fn allocate(&mut self, kind: &'static str) -> Result<NodeId> {
        let limit = self.evaluator.max_nodes;
        if self.next_id.index() >= limit {
            tracing::warn!("Node quota of {} exceeded while binding {}", limit, kind);
            return Err(DynDataError::QuotaExceeded { limit });
        }
        let id = self.next_id;
        self.next_id = id.next();
        tracing::trace!("Allocated {} for {}", id, kind);
        Ok(id)
    }

    fn add_source(&mut self, id: NodeId, node: impl DynamicDataNode + 'static) {
        self.sources.push((id, Box::new(node)));
    }

    fn instant(&mut self, expr: &DynamicInstant, downstream: Downstream<TimeInstant>) -> Result<()> {
        match expr {
            DynamicInstant::Fixed {
                epoch_seconds,
                nanos,
            } => {
                let id = self.allocate("fixed instant")?;
                self.add_source(id, FixedInstantNode::new(*epoch_seconds, *nanos, downstream));
            }
            DynamicInstant::PlatformTime => {
                let id = self.allocate("platform time")?;
                let source = self.evaluator.time_source.clone();
                self.add_source(id, PlatformTimeNode::new(source, downstream));
            }
            DynamicInstant::State { key } => {
                let id = self.allocate("instant state")?;
                let store = self.evaluator.state_store.clone();
                self.add_source(id, StateSourceNode::<TimeInstant>::new(store, key, downstream));
            }
        }
        Ok(())
    }

    fn duration(&mut self, expr: &DynamicDuration, downstream: Downstream<Duration>) -> Result<()> {
        match expr {
            DynamicDuration::Between { start, end } => {
                self.allocate("between instants")?;
                let node = BetweenInstancesNode::new(downstream);
                self.instant(start, Box::new(node.start_receiver()))?;
                self.instant(end, Box::new(node.end_receiver()))?;
            }
            DynamicDuration::Fixed { seconds, nanos } => {
                let value = Duration::new(*seconds, *nanos).ok_or_else(|| {
                    DynDataError::Expression(format!(
                        "Fixed duration {}s {}ns is out of range",
                        seconds, nanos
                    ))
                })?;
                let id = self.allocate("fixed duration")?;
                self.add_source(id, FixedValueNode::new(value, downstream));
            }
            DynamicDuration::State { key } => {
                let id = self.allocate("duration state")?;
                let store = self.evaluator.state_store.clone();
                self.add_source(id, StateSourceNode::<Duration>::new(store, key, downstream));
            }
        }
        Ok(())
    }

    fn int32(&mut self, expr: &DynamicInt32, downstream: Downstream<i32>) -> Result<()> {
        match expr {
            DynamicInt32::Fixed { value } => {
                let id = self.allocate("fixed int32")?;
                self.add_source(id, FixedValueNode::new(*value, downstream));
            }
            DynamicInt32::State { key } => {
                let id = self.allocate("int32 state")?;
                let store = self.evaluator.state_store.clone();
                self.add_source(id, StateSourceNode::<i32>::new(store, key, downstream));
            }
            DynamicInt32::Arithmetic { op, lhs, rhs } => {
                self.allocate("arithmetic")?;
                let node = ArithmeticNode::new(*op, downstream);
                self.int32(lhs, Box::new(node.lhs_receiver()))?;
                self.int32(rhs, Box::new(node.rhs_receiver()))?;
            }
            DynamicInt32::DurationPart { part, duration } => {
                self.allocate("duration part")?;
                let node = GetDurationPartNode::new(*part, downstream);
                self.duration(duration, Box::new(node))?;
            }
        }
        Ok(())
    }

    fn finish(self) -> BoundDynamicType {
        let node_count = self.next_id.index();
        tracing::debug!(
            "Bound {} node(s), {} source(s)",
            node_count,
            self.sources.len()
        );
        BoundDynamicType {
            sources: self.sources,
            node_count,
            active: false,
        }
    }
}

/// A bound expression graph.
///
/// Nothing is emitted until [`start_evaluation`](Self::start_evaluation).
/// Dropping the binding stops evaluation.
pub struct BoundDynamicType {
    sources: Vec<(NodeId, Box<dyn DynamicDataNode>)>,
    node_count: usize,
    active: bool,
}

impl BoundDynamicType {
    /// Total number of nodes created for this binding.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activate every source in creation order. No-op when already active.
    ///
    /// All sources announce their first value before any delivers it, so a
    /// restarted binding recomputes from fresh inputs only and emits once.
    pub fn start_evaluation(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        for (_, source) in &mut self.sources {
            source.on_pre_activate();
        }
        for (id, source) in &mut self.sources {
            tracing::debug!("Activating {} {}", source.name(), id);
            source.on_activate();
        }
    }

    /// Deactivate every source in reverse creation order.
    pub fn close(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        for (id, source) in self.sources.iter_mut().rev() {
            tracing::debug!("Deactivating {} {}", source.name(), id);
            source.on_deactivate();
        }
    }
}

impl Drop for BoundDynamicType {
    fn drop(&mut self) {
        self.close();
    }
}

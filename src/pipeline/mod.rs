//! Push-based dynamic value pipeline.
//!
//! Values flow from source nodes (fixed values, state keys, the platform
//! clock) through transform nodes to a caller-supplied receiver. Every
//! update is bracketed by pre/post notifications so combining nodes emit
//! exactly once per logical update, even when several inputs change
//! together.
//!
//! # Architecture
//!
//! ```text
//! [FixedInstant] ──► start ┐
//!                          ├──► [BetweenInstances] ──► [GetDurationPart] ──► receiver
//! [PlatformTime] ──► end   ┘
//! ```
//!
//! # Design
//!
//! - **Passive transforms**: transform nodes are receivers and only run when
//!   pushed to.
//! - **Sources own the graph**: a `BoundDynamicType` holds the sources, which
//!   hold their downstream chain.
//! - **Single-threaded**: nodes share state through `Rc<RefCell<_>>`; the
//!   binary keeps the graph on its main thread.

pub mod error;
pub mod evaluator;
pub mod expr;
pub mod id;
pub mod node;
pub mod nodes;
pub mod receiver;

pub use error::{NodeError, NodeResult};
pub use evaluator::{BoundDynamicType, DynamicTypeEvaluator};
pub use expr::{DynamicDuration, DynamicExpression, DynamicInstant, DynamicInt32};
pub use id::{ListenerId, NodeId};
pub use node::{DynamicDataNode, TransformState};
pub use nodes::{
    ArithmeticNode, ArithmeticOp, BetweenInstancesNode, BiTransformNode, Clock, DurationPart,
    FixedInstantNode, FixedValueNode, GetDurationPartNode, ManualClock, PlatformTimeNode,
    PlatformTimeSource, StateListener, StateSourceNode, StateStore, SystemClock,
    UnaryTransformNode,
};
pub use receiver::{DynamicValueReceiver, FnReceiver, ReceivedUpdate, UpdateRecorder};

//! Built-in dynamic data node implementations.

pub mod arithmetic;
pub mod bi_transform;
pub mod duration;
pub mod fixed;
pub mod state_source;
pub mod time_source;
pub mod unary_transform;

pub use arithmetic::{ArithmeticNode, ArithmeticOp};
pub use bi_transform::{BiTransformNode, LhsReceiver, RhsReceiver};
pub use duration::{BetweenInstancesNode, DurationPart, GetDurationPartNode};
pub use fixed::{FixedInstantNode, FixedValueNode};
pub use state_source::{StateListener, StateSourceNode, StateStore};
pub use time_source::{Clock, ManualClock, PlatformTimeNode, PlatformTimeSource, SystemClock};
pub use unary_transform::UnaryTransformNode;

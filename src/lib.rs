//! # DynData-RS: reactive dynamic values
//!
//! Evaluates expressions over instants, durations and integers whose inputs
//! change over time. An expression is bound to a receiver, which builds a
//! graph of nodes; starting evaluation pushes the first value, and every
//! later change to the platform clock or the state store pushes a fresh one.
//!
//! ## Architecture
//!
//! - **Pipeline**: source and transform nodes speaking a pre/data/post push
//!   protocol
//! - **Expressions**: serde-tagged expression trees loaded from JSON or TOML
//! - **Evaluator**: turns expressions into node graphs under a node quota
//!
//! ## Example
//!
//! ```ignore
//! use dyndata_rs::{
//!     config::EvaluatorConfig,
//!     pipeline::{DynamicExpression, DynamicTypeEvaluator, FnReceiver, PlatformTimeSource, StateStore},
//! };
//!
//! let evaluator = DynamicTypeEvaluator::new(
//!     &EvaluatorConfig::load_or_default(),
//!     StateStore::new(),
//!     PlatformTimeSource::system(),
//! );
//! let DynamicExpression::Duration(expr) = DynamicExpression::load("uptime.json")? else {
//!     unreachable!()
//! };
//! let mut bound = evaluator.bind_duration(&expr, FnReceiver::new("uptime", |d| println!("{d}")))?;
//! bound.start_evaluation();
//! loop {
//!     std::thread::sleep(std::time::Duration::from_secs(1));
//!     evaluator.time_source().tick();
//! }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use config::EvaluatorConfig;
pub use error::{DynDataError, Result};
pub use pipeline::{BoundDynamicType, DynamicExpression, DynamicTypeEvaluator};
pub use types::{DynamicValue, Duration, StateValue, TimeInstant};

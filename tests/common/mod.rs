//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use chrono::{TimeZone, Utc};
use dyndata_rs::{
    config::EvaluatorConfig,
    pipeline::{DynamicTypeEvaluator, ManualClock, PlatformTimeSource, StateStore},
    types::{Duration, TimeInstant},
};

/// Fixed reference instant used across tests
pub fn t0() -> TimeInstant {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
}

/// `t0()` shifted by a number of seconds
pub fn at(offset_secs: i64) -> TimeInstant {
    t0() + Duration::seconds(offset_secs)
}

/// An evaluator over an empty state store and a manual clock set to `t0()`.
pub struct TestHarness {
    pub evaluator: DynamicTypeEvaluator,
    pub clock: ManualClock,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_max_nodes(EvaluatorConfig::default().max_nodes)
    }

    pub fn with_max_nodes(max_nodes: usize) -> Self {
        let clock = ManualClock::new(t0());
        let config = EvaluatorConfig {
            max_nodes,
            ..Default::default()
        };
        let evaluator = DynamicTypeEvaluator::new(
            &config,
            StateStore::new(),
            PlatformTimeSource::new(clock.clone()),
        );
        Self { evaluator, clock }
    }

    pub fn store(&self) -> &StateStore {
        self.evaluator.state_store()
    }

    /// Move the clock forward and deliver one tick.
    pub fn advance(&self, secs: i64) {
        self.clock.advance(Duration::seconds(secs));
        self.evaluator.time_source().tick();
    }
}

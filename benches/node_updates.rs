//! Benchmarks for update propagation through node graphs
//!
//! Run with: cargo bench

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dyndata_rs::config::EvaluatorConfig;
use dyndata_rs::pipeline::{
    ArithmeticOp, BetweenInstancesNode, DurationPart, DynamicDuration, DynamicInstant,
    DynamicInt32, DynamicTypeEvaluator, DynamicValueReceiver, ManualClock, NodeError,
    PlatformTimeSource, StateStore, UpdateRecorder,
};
use dyndata_rs::types::{Duration, DynamicValue, TimeInstant};
use std::collections::HashMap;

fn t0() -> TimeInstant {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Receiver that discards values.
struct Sink;

impl<T> DynamicValueReceiver<T> for Sink {
    fn on_pre_update(&mut self) {}

    fn on_data(&mut self, value: T) {
        black_box(value);
    }

    fn on_invalidated(&mut self, _reason: NodeError) {}
}

fn bench_between_instances(c: &mut Criterion) {
    let mut group = c.benchmark_group("between_instances");
    group.throughput(Throughput::Elements(1));

    group.bench_function("single_slot_update", |b| {
        let node = BetweenInstancesNode::new(Sink);
        let mut start = node.start_receiver();
        let mut end = node.end_receiver();
        start.on_data(t0());
        end.on_data(t0());

        let mut secs = 0;
        b.iter(|| {
            secs += 1;
            end.on_pre_update();
            end.on_data(t0() + Duration::seconds(secs));
            end.on_post_update();
        });
    });

    group.bench_function("coalesced_batch", |b| {
        let node = BetweenInstancesNode::new(Sink);
        let mut start = node.start_receiver();
        let mut end = node.end_receiver();
        start.on_data(t0());
        end.on_data(t0());

        let mut secs = 0;
        b.iter(|| {
            secs += 1;
            start.on_pre_update();
            end.on_pre_update();
            start.on_data(t0() + Duration::seconds(secs));
            end.on_data(t0() + Duration::seconds(2 * secs));
            start.on_post_update();
            end.on_post_update();
        });
    });

    group.finish();
}

fn bench_platform_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("platform_tick");

    for bindings in [1usize, 16, 128] {
        let clock = ManualClock::new(t0());
        let evaluator = DynamicTypeEvaluator::new(
            &EvaluatorConfig::default(),
            StateStore::new(),
            PlatformTimeSource::new(clock.clone()),
        );
        let expr = DynamicInt32::DurationPart {
            part: DurationPart::Seconds,
            duration: DynamicDuration::Between {
                start: DynamicInstant::Fixed {
                    epoch_seconds: t0().timestamp(),
                    nanos: 0,
                },
                end: DynamicInstant::PlatformTime,
            },
        };
        let mut bound: Vec<_> = (0..bindings)
            .map(|_| evaluator.bind_int32(&expr, Sink).unwrap())
            .collect();
        bound.iter_mut().for_each(|b| b.start_evaluation());

        group.throughput(Throughput::Elements(bindings as u64));
        group.bench_with_input(BenchmarkId::new("tick", bindings), &bindings, |b, _| {
            b.iter(|| {
                clock.advance(Duration::seconds(1));
                evaluator.time_source().tick();
            });
        });
    }

    group.finish();
}

fn bench_state_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_batch");
    group.throughput(Throughput::Elements(1));

    group.bench_function("diamond", |b| {
        let store = StateStore::new();
        store.set_state("a", 1);
        store.set_state("b", 1);
        let evaluator = DynamicTypeEvaluator::new(
            &EvaluatorConfig::default(),
            store.clone(),
            PlatformTimeSource::new(ManualClock::new(t0())),
        );
        let expr = DynamicInt32::Arithmetic {
            op: ArithmeticOp::Add,
            lhs: Box::new(DynamicInt32::State { key: "a".into() }),
            rhs: Box::new(DynamicInt32::State { key: "b".into() }),
        };
        let recorder = UpdateRecorder::<i32>::new();
        let mut bound = evaluator.bind_int32(&expr, recorder.clone()).unwrap();
        bound.start_evaluation();

        let mut n = 1;
        b.iter(|| {
            n += 1;
            let batch: HashMap<String, DynamicValue> = [
                ("a".to_string(), DynamicValue::Int32(n)),
                ("b".to_string(), DynamicValue::Int32(n)),
            ]
            .into_iter()
            .collect();
            store.set_states(batch);
            recorder.clear();
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_between_instances,
    bench_platform_tick,
    bench_state_batch
);
criterion_main!(benches);

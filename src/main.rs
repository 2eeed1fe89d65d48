//! DynData - Main Entry Point
//!
//! Loads an expression file and evaluates it against the system clock,
//! printing every value it produces.
//!
//! ```text
//! dyndata <expression.json|expression.toml> [ticks]
//! ```

use anyhow::{bail, Context};
use crossbeam_channel::{bounded, Receiver};
use dyndata_rs::{
    config::EvaluatorConfig,
    pipeline::{
        BoundDynamicType, DynamicExpression, DynamicTypeEvaluator, FnReceiver, PlatformTimeSource,
        StateStore,
    },
    types::{Duration, TimeInstant},
};
use std::path::PathBuf;
use std::thread;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

struct Args {
    expression: PathBuf,
    ticks: Option<u64>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = std::env::args().skip(1);
    let Some(expression) = args.next() else {
        bail!("usage: dyndata <expression.json|expression.toml> [ticks]");
    };
    let ticks = args
        .next()
        .map(|t| t.parse::<u64>())
        .transpose()
        .context("ticks must be a non-negative integer")?;
    Ok(Args {
        expression: PathBuf::from(expression),
        ticks,
    })
}

/// Install the global subscriber. The returned guard flushes the log file
/// and must live until exit.
fn init_logging(config: &EvaluatorConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let stderr = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "dyndata.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .boxed();
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(file)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .init();
            None
        }
    }
}

/// Spawn a thread that sends one message per tick interval. It exits once
/// the receiver is dropped.
fn spawn_ticker(interval: std::time::Duration) -> Receiver<()> {
    let (tx, rx) = bounded(1);
    thread::spawn(move || loop {
        thread::sleep(interval);
        if tx.send(()).is_err() {
            break;
        }
    });
    rx
}

fn bind(evaluator: &DynamicTypeEvaluator, expr: &DynamicExpression) -> anyhow::Result<BoundDynamicType> {
    let bound = match expr {
        DynamicExpression::Instant(e) => evaluator.bind_instant(
            e,
            FnReceiver::new("instant", |v: TimeInstant| println!("{}", v.to_rfc3339())),
        ),
        DynamicExpression::Duration(e) => evaluator.bind_duration(
            e,
            FnReceiver::new("duration", |v: Duration| println!("{}", v)),
        ),
        DynamicExpression::Int32(e) => {
            evaluator.bind_int32(e, FnReceiver::new("int32", |v: i32| println!("{}", v)))
        }
    };
    Ok(bound?)
}

fn main() -> anyhow::Result<()> {
    // Logging depends on the config, so a load failure is reported once
    // the subscriber is up.
    let loaded = EvaluatorConfig::try_load_default();
    let config = loaded.as_ref().cloned().unwrap_or_default();
    let _guard = init_logging(&config);
    if let Err(e) = &loaded {
        tracing::warn!("Ignoring config, using defaults: {}", e);
    }

    let args = parse_args()?;
    tracing::info!("Evaluating {:?}", args.expression);

    let expr = DynamicExpression::load(&args.expression)?;
    let evaluator =
        DynamicTypeEvaluator::new(&config, StateStore::new(), PlatformTimeSource::system());

    let mut bound = bind(&evaluator, &expr)?;
    tracing::debug!("Bound {} node(s)", bound.node_count());
    bound.start_evaluation();

    let ticks = spawn_ticker(config.tick_interval());
    let mut remaining = args.ticks;
    while remaining != Some(0) {
        if ticks.recv().is_err() {
            break;
        }
        evaluator.time_source().tick();
        remaining = remaining.map(|n| n - 1);
    }

    tracing::info!("Shutting down...");
    bound.close();
    Ok(())
}

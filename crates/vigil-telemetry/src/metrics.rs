//! Prometheus metrics for the vigil engine.
//!
//! Covers the decision pipeline end to end:
//! - Signal generation and gate rejections
//! - Queue pressure and venue fills
//! - Circuit breaker trips
//! - Tick duration and portfolio gauges
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A failure means a
//! duplicate metric name, which should crash at startup rather than
//! fail silently. These panics only occur during static initialization.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram, register_int_gauge, CounterVec,
    Gauge, Histogram, IntGauge,
};

/// Total signals produced by strategies.
pub static SIGNALS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vigil_signals_total",
        "Total signals produced by strategies",
        &["strategy", "direction"]
    )
    .unwrap()
});

/// Total gate rejections by reason.
pub static GATE_REJECTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vigil_gate_rejected_total",
        "Total risk gate rejections",
        &["reason"]
    )
    .unwrap()
});

/// Total intents accepted into the queue.
pub static INTENTS_QUEUED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vigil_intents_queued_total",
        "Total intents accepted into the execution queue",
        &["direction"]
    )
    .unwrap()
});

/// Total intents dropped by a full queue.
pub static QUEUE_DROPPED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vigil_queue_dropped_total",
        "Total intents dropped because the queue was full",
        &["direction"]
    )
    .unwrap()
});

/// Total confirmed fills.
pub static FILLS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vigil_fills_total",
        "Total confirmed venue fills",
        &["direction"]
    )
    .unwrap()
});

/// Total failed venue submissions.
pub static SUBMIT_FAILED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vigil_submit_failed_total",
        "Total failed venue submissions",
        &["direction"]
    )
    .unwrap()
});

/// Total circuit breaker trips by reason.
pub static BREAKER_TRIPPED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vigil_breaker_tripped_total",
        "Total circuit breaker trips",
        &["reason"]
    )
    .unwrap()
});

/// Tick duration in milliseconds.
pub static TICK_DURATION_MS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "vigil_tick_duration_ms",
        "Full tick duration in milliseconds",
        vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0]
    )
    .unwrap()
});

/// Currently open positions.
pub static OPEN_POSITIONS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("vigil_open_positions", "Currently open positions").unwrap()
});

/// Daily realized PnL in quote currency.
pub static DAILY_PNL: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("vigil_daily_pnl", "Daily realized PnL in quote currency").unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a generated signal.
    pub fn signal_generated(strategy: &str, direction: &str) {
        SIGNALS_TOTAL.with_label_values(&[strategy, direction]).inc();
    }

    /// Record a gate rejection.
    pub fn gate_rejected(reason: &str) {
        GATE_REJECTED_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record an intent accepted into the queue.
    pub fn intent_queued(direction: &str) {
        INTENTS_QUEUED_TOTAL.with_label_values(&[direction]).inc();
    }

    /// Record an intent dropped by a full queue.
    pub fn queue_dropped(direction: &str) {
        QUEUE_DROPPED_TOTAL.with_label_values(&[direction]).inc();
    }

    /// Record a confirmed fill.
    pub fn fill(direction: &str) {
        FILLS_TOTAL.with_label_values(&[direction]).inc();
    }

    /// Record a failed submission.
    pub fn submit_failed(direction: &str) {
        SUBMIT_FAILED_TOTAL.with_label_values(&[direction]).inc();
    }

    /// Record a circuit breaker trip.
    pub fn breaker_tripped(reason: &str) {
        BREAKER_TRIPPED_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record tick duration.
    pub fn tick_duration(duration_ms: f64) {
        TICK_DURATION_MS.observe(duration_ms);
    }

    /// Set the open positions gauge.
    pub fn open_positions(count: i64) {
        OPEN_POSITIONS.set(count);
    }

    /// Set the daily PnL gauge.
    pub fn daily_pnl(pnl: f64) {
        DAILY_PNL.set(pnl);
    }
}

//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Messages persisted, by conversation kind
//! - Active WebSocket connection gauge
//! - Fan-out bus events published/received, by topic

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Messages persisted, labeled by conversation kind ("room" / "dm")
pub static MESSAGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("messages_total", "Total number of messages persisted").namespace("chat_relay"),
        &["kind"],
    )
    .expect("Failed to create MESSAGES_TOTAL metric")
});

/// Active WebSocket connections on this instance
pub static SOCKETS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("sockets_active", "Number of active WebSocket connections")
            .namespace("chat_relay"),
    )
    .expect("Failed to create SOCKETS_ACTIVE metric")
});

/// Fan-out bus traffic, labeled by topic and direction
pub static FANOUT_EVENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("fanout_events_total", "Fan-out bus events by topic and direction")
            .namespace("chat_relay"),
        &["topic", "direction"],
    )
    .expect("Failed to create FANOUT_EVENTS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(MESSAGES_TOTAL.clone()))
        .expect("Failed to register MESSAGES_TOTAL");
    registry
        .register(Box::new(SOCKETS_ACTIVE.clone()))
        .expect("Failed to register SOCKETS_ACTIVE");
    registry
        .register(Box::new(FANOUT_EVENTS_TOTAL.clone()))
        .expect("Failed to register FANOUT_EVENTS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Metrics should be valid UTF-8")
}

/// Record a persisted message by kind label
pub fn record_message(kind: &str) {
    MESSAGES_TOTAL.with_label_values(&[kind]).inc();
}

/// Update the active socket gauge
pub fn set_active_sockets(count: usize) {
    SOCKETS_ACTIVE.set(count as i64);
}

/// Record a bus event published by this instance
pub fn record_fanout_published(topic: &str) {
    FANOUT_EVENTS_TOTAL
        .with_label_values(&[topic, "published"])
        .inc();
}

/// Record a bus event received from the broker
pub fn record_fanout_received(topic: &str) {
    FANOUT_EVENTS_TOTAL
        .with_label_values(&[topic, "received"])
        .inc();
}

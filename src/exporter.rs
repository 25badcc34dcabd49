//! # Metrics exporter
//!
//! Exposes the counters emitted by engines (`mologger_messages_total`,
//! `mologger_engine_failures_total`, ...) to Prometheus. Without an
//! installed recorder those counters are no-ops.

use anyhow::Result;
use metrics::{describe_counter, Unit};
use std::net::SocketAddr;

/// Register descriptions for every counter the crate emits
pub fn describe_metrics() {
    describe_counter!(
        "mologger_messages_total",
        Unit::Count,
        "Messages seen by the metrics engine, by level"
    );
    describe_counter!(
        "mologger_tracked_events_total",
        Unit::Count,
        "Info messages promoted to tracked events"
    );
    describe_counter!(
        "mologger_engine_failures_total",
        Unit::Count,
        "Failures contained inside an engine"
    );
    describe_counter!(
        "mologger_engine_panics_total",
        Unit::Count,
        "Engine panics isolated by the dispatcher"
    );
}

#[cfg(not(test))]
pub fn install_prometheus_recorder(prometheus_addr: SocketAddr) -> Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    PrometheusBuilder::new()
        .with_http_listener(prometheus_addr)
        .install()
        .map_err(anyhow::Error::from)?;
    describe_metrics();
    Ok(())
}

#[cfg(test)]
pub fn install_prometheus_recorder(_prometheus_addr: SocketAddr) -> Result<()> {
    // Do nothing in tests to avoid starting a listener.
    describe_metrics();
    Ok(())
}

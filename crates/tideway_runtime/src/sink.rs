//! Logging and metrics sinks.
//!
//! Sinks are injected collaborator interfaces: one sink per process,
//! referenced by many machines. Everything here is fire-and-forget and
//! must never affect control flow.

use std::sync::Arc;

use tracing::{debug, info};

/// Structured record of one completed execution, success or failure.
#[derive(Debug)]
pub struct ExecRecord<'a> {
    /// The accumulated script text, including `// @param` lines.
    pub script: &'a str,
    /// Per-line elapsed nanoseconds, one line per fragment.
    pub timings: &'a str,
    /// The credential, present only for authenticated executions.
    pub token: Option<&'a str>,
    /// The failure message, when the execution failed.
    pub error: Option<&'a str>,
}

/// Sink for structured execution event records.
pub trait EventSink: Send + Sync {
    /// Records one execution. Must not fail or block.
    fn record(&self, record: &ExecRecord<'_>);
}

/// Sink for execution counters and gauges.
pub trait MetricsSink: Send + Sync {
    /// One request was handled.
    fn count_request(&self);
    /// One request failed.
    fn count_error(&self);
    /// Total execution time of a request, microseconds.
    fn record_time_micros(&self, micros: u64);
    /// Evaluated token count of a request.
    fn record_ops(&self, ops: u64);
    /// Available process memory, bytes (best-effort gauge).
    fn record_free_memory(&self, bytes: u64);
}

// Delegating impls so a caller can install a shared sink and keep a
// handle to it (a test counter, a registry-exported gauge set).
impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn record(&self, record: &ExecRecord<'_>) {
        (**self).record(record);
    }
}

impl<T: MetricsSink + ?Sized> MetricsSink for Arc<T> {
    fn count_request(&self) {
        (**self).count_request();
    }

    fn count_error(&self) {
        (**self).count_error();
    }

    fn record_time_micros(&self, micros: u64) {
        (**self).record_time_micros(micros);
    }

    fn record_ops(&self, ops: u64) {
        (**self).record_ops(ops);
    }

    fn record_free_memory(&self, bytes: u64) {
        (**self).record_free_memory(bytes);
    }
}

/// Event sink that emits `tracing` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, record: &ExecRecord<'_>) {
        info!(
            target: "tideway::events",
            script = record.script,
            timings = record.timings,
            token = record.token,
            error = record.error,
            "script execution"
        );
    }
}

/// Metrics sink that emits `tracing` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn count_request(&self) {
        debug!(target: "tideway::metrics", counter = "requests", value = 1u64);
    }

    fn count_error(&self) {
        debug!(target: "tideway::metrics", counter = "errors", value = 1u64);
    }

    fn record_time_micros(&self, micros: u64) {
        debug!(target: "tideway::metrics", counter = "time.us", value = micros);
    }

    fn record_ops(&self, ops: u64) {
        debug!(target: "tideway::metrics", counter = "ops", value = ops);
    }

    fn record_free_memory(&self, bytes: u64) {
        debug!(target: "tideway::metrics", gauge = "memory.free", value = bytes);
    }
}

/// Event sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn record(&self, _record: &ExecRecord<'_>) {}
}

/// Metrics sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMetricsSink;

impl MetricsSink for NullMetricsSink {
    fn count_request(&self) {}
    fn count_error(&self) {}
    fn record_time_micros(&self, _micros: u64) {}
    fn record_ops(&self, _ops: u64) {}
    fn record_free_memory(&self, _bytes: u64) {}
}

/// Best-effort read of available memory for the free-memory gauge.
#[must_use]
pub fn available_memory() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
        for line in meminfo.lines() {
            if let Some(rest) = line.strip_prefix("MemAvailable:") {
                let kib: u64 = rest.trim().trim_end_matches(" kB").trim().parse().ok()?;
                return Some(kib * 1024);
            }
        }
        None
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

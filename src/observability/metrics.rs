//! Metrics collection.
//!
//! # Metrics
//! - `waymark_dispatch_total` (counter): dispatch passes by phase
//! - `waymark_dispatch_invocations_total` (counter): middleware invoked by phase
//! - `waymark_dispatch_halted_total` (counter): passes stopped by a halt
//! - `waymark_submit_total` (counter): submissions by method and outcome
//!
//! # Design Decisions
//! - No exporter is installed here; without a recorder every call is a no-op
//! - Labels are static strings only

use std::sync::atomic::{AtomicBool, Ordering};

use crate::http::Method;
use crate::middleware::DispatchReport;

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Turn metric recording on or off process-wide.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

/// Whether metric recording is currently on.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub fn record_dispatch(report: &DispatchReport) {
    if !is_enabled() {
        return;
    }
    let phase = report.phase.as_str();
    metrics::counter!("waymark_dispatch_total", "phase" => phase).increment(1);
    metrics::counter!("waymark_dispatch_invocations_total", "phase" => phase)
        .increment(report.invoked as u64);
    if report.halted() {
        metrics::counter!("waymark_dispatch_halted_total", "phase" => phase).increment(1);
    }
}

pub fn record_submission(method: Method, completed: bool) {
    if !is_enabled() {
        return;
    }
    let outcome = if completed { "completed" } else { "failed" };
    metrics::counter!("waymark_submit_total", "method" => method.as_str(), "outcome" => outcome)
        .increment(1);
}

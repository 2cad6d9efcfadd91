//! Implementation of different callback functions.
use crate::report::Report;
use tracing::info;

/// Trait for implementing callbacks for sequential MC algorithms
pub trait Callback {
    /// This method is called after the pilot sample and after the main phase of an evaluation and
    /// may print information about it.
    fn print(&self, report: &Report);
}

/// A callback function that does nothing
pub struct SinkCallback {}

impl Callback for SinkCallback {
    fn print(&self, _: &Report) {}
}

/// A callback function that prints the estimate after each phase
pub struct SimpleCallback {}

impl Callback for SimpleCallback {
    fn print(&self, report: &Report) {
        match (report.mean, report.half_width) {
            (Some(mean), Some(half_width)) => println!(
                "{}: N={} E={} \u{b1} {} ({}% CL)",
                report.state,
                report.count,
                mean,
                half_width,
                report.confidence_level * 100.0
            ),
            _ => println!("{}: N={}", report.state, report.count),
        }
    }
}

/// A callback that emits the full report as a structured `tracing` event.
pub struct TracingCallback {}

impl Callback for TracingCallback {
    fn print(&self, report: &Report) {
        info!(
            state = %report.state,
            count = report.count,
            function_calls = report.function_calls,
            mean = ?report.mean,
            half_width = ?report.half_width,
            converged = report.converged,
            "integration progress"
        );
    }
}

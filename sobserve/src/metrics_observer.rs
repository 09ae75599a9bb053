//! Metrics-based observer for tool execution lifecycle events.
//!
//! ```rust
//! use sobserve::MetricsToolObserver;
//! use stooling::ToolObserver;
//!
//! fn accepts_observer(_observer: &dyn ToolObserver) {}
//!
//! let observer = MetricsToolObserver;
//! accepts_observer(&observer);
//! ```

use std::time::Duration;

use stooling::{ToolError, ToolExecutionContext, ToolObserver};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsToolObserver;

impl ToolObserver for MetricsToolObserver {
    fn on_execution_start(&self, _call_id: &str, tool_name: &str, _context: &ToolExecutionContext) {
        metrics::counter!(
            "skein_tool_execution_start_total",
            "tool_name" => tool_name.to_string()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        _call_id: &str,
        tool_name: &str,
        _context: &ToolExecutionContext,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "skein_tool_execution_success_total",
            "tool_name" => tool_name.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "skein_tool_execution_duration_seconds",
            "tool_name" => tool_name.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        _call_id: &str,
        tool_name: &str,
        _context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "skein_tool_execution_failure_total",
            "tool_name" => tool_name.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "skein_tool_execution_duration_seconds",
            "tool_name" => tool_name.to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

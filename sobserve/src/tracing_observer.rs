//! Tracing-based observer for tool execution lifecycle events.
//!
//! ```rust
//! use sobserve::TracingToolObserver;
//! use stooling::ToolObserver;
//!
//! fn accepts_observer(_observer: &dyn ToolObserver) {}
//!
//! let observer = TracingToolObserver;
//! accepts_observer(&observer);
//! ```

use std::time::Duration;

use stooling::{ToolError, ToolExecutionContext, ToolObserver};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingToolObserver;

impl ToolObserver for TracingToolObserver {
    fn on_execution_start(&self, call_id: &str, tool_name: &str, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name,
            tool_call_id = call_id,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_execution_success(
        &self,
        call_id: &str,
        tool_name: &str,
        context: &ToolExecutionContext,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name,
            tool_call_id = call_id,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        call_id: &str,
        tool_name: &str,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "tool",
            event = "execution_failure",
            tool_name,
            tool_call_id = call_id,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

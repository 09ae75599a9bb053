//! Observer hooks for tool execution lifecycle events.
//!
//! ```rust
//! use stooling::{NoopToolObserver, ToolObserver};
//!
//! fn assert_observer_trait(_observer: &dyn ToolObserver) {}
//!
//! let observer = NoopToolObserver;
//! assert_observer_trait(&observer);
//! ```

use std::time::Duration;

use crate::{ToolError, ToolExecutionContext};

pub trait ToolObserver: Send + Sync {
    fn on_execution_start(
        &self,
        _call_id: &str,
        _tool_name: &str,
        _context: &ToolExecutionContext,
    ) {
    }

    fn on_execution_success(
        &self,
        _call_id: &str,
        _tool_name: &str,
        _context: &ToolExecutionContext,
        _elapsed: Duration,
    ) {
    }

    fn on_execution_failure(
        &self,
        _call_id: &str,
        _tool_name: &str,
        _context: &ToolExecutionContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolObserver;

impl ToolObserver for NoopToolObserver {}

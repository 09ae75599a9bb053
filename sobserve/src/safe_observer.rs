use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use stooling::{ToolError, ToolExecutionContext, ToolObserver};

/// Isolates the engine from a panicking observer. Panics inside the inner
/// observer are swallowed; the exchange keeps running.
pub struct SafeToolObserver<O> {
    inner: O,
}

impl<O> SafeToolObserver<O> {
    pub fn new(inner: O) -> Self {
        Self { inner }
    }
}

impl<O> ToolObserver for SafeToolObserver<O>
where
    O: ToolObserver,
{
    fn on_execution_start(&self, call_id: &str, tool_name: &str, context: &ToolExecutionContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_start(call_id, tool_name, context)
        }));
    }

    fn on_execution_success(
        &self,
        call_id: &str,
        tool_name: &str,
        context: &ToolExecutionContext,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_success(call_id, tool_name, context, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        call_id: &str,
        tool_name: &str,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_failure(call_id, tool_name, context, error, elapsed)
        }));
    }
}

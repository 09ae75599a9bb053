//! Tool runtime context shared with handlers during execution.

use scommon::{CancelToken, MetadataMap, SessionId, TraceId};

/// Carried into every tool invocation. The cancel token is the exchange's
/// effective token: handlers doing slow I/O should observe it themselves,
/// since the engine only checks it before starting a call.
#[derive(Debug, Clone)]
pub struct ToolExecutionContext {
    pub session_id: SessionId,
    pub trace_id: Option<TraceId>,
    pub metadata: MetadataMap,
    pub cancel: CancelToken,
}

impl ToolExecutionContext {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            trace_id: None,
            metadata: MetadataMap::new(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

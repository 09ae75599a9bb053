//! Engine error type covering provider, tooling, and orchestration faults.

use std::error::Error;
use std::fmt::{Display, Formatter};

use serde_json::Value;
use sprovider::ProviderError;
use stooling::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// A completed tool call carried argument text that is not valid JSON.
    MalformedArguments,
    /// The provider stream or transport failed.
    Provider,
    /// A tool failed in a way that could not be folded into a result value.
    Tooling,
    /// A validator aborted the exchange.
    Aborted,
    /// The exchange was configured in a way the engine cannot run.
    InvalidRequest,
}

#[derive(Debug, Clone)]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub message: String,
    pub tool_name: Option<String>,
    pub tool_call_id: Option<String>,
    pub payload: Option<Value>,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            tool_name: None,
            tool_call_id: None,
            payload: None,
        }
    }

    pub fn malformed_arguments(
        message: impl Into<String>,
        tool_name: impl Into<String>,
        tool_call_id: impl Into<String>,
    ) -> Self {
        Self::new(EngineErrorKind::MalformedArguments, message)
            .with_tool(tool_name, tool_call_id)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::Provider, message)
    }

    pub fn tooling(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::Tooling, message)
    }

    pub fn aborted(message: impl Into<String>, payload: Value) -> Self {
        let mut error = Self::new(EngineErrorKind::Aborted, message);
        error.payload = Some(payload);
        error
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::InvalidRequest, message)
    }

    pub fn with_tool(mut self, tool_name: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self.tool_call_id = Some(tool_call_id.into());
        self
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.tool_name, &self.tool_call_id) {
            (Some(name), Some(id)) => {
                write!(f, "{:?}: {} (tool: {name}, call: {id})", self.kind, self.message)
            }
            (Some(name), None) => write!(f, "{:?}: {} (tool: {name})", self.kind, self.message),
            _ => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for EngineError {}

impl From<ProviderError> for EngineError {
    fn from(error: ProviderError) -> Self {
        Self::provider(error.to_string())
    }
}

impl From<ToolError> for EngineError {
    fn from(error: ToolError) -> Self {
        let mut engine_error = Self::tooling(error.message.clone());
        engine_error.tool_name = error.tool_name.clone();
        engine_error.tool_call_id = error.tool_call_id.clone();
        engine_error
    }
}

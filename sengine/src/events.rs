//! Canonical event vocabulary emitted by the engine during an exchange.

use std::pin::Pin;

use futures_core::Stream;
use serde_json::Value;
use sprovider::TokenUsage;

use crate::{EngineError, ToolHistoryEntry};

pub type ExchangeEventStream<'a> =
    Pin<Box<dyn Stream<Item = Result<EngineEvent, EngineError>> + Send + 'a>>;

/// Stages a single tool call can move through. Every call that reaches
/// `Preparing` is settled with exactly one of the three terminal stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStage {
    Preparing,
    Running,
    Completed,
    Canceled,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolLifecycleEvent {
    pub call_id: String,
    pub tool_name: String,
    pub stage: ToolStage,
    /// Stage-specific payload: parsed arguments for `Running`, a status
    /// line re-emitted as a running update, the result for `Completed`,
    /// or the synthesized error value for `Error` and denial `Canceled`.
    pub detail: Option<Value>,
}

impl ToolLifecycleEvent {
    pub fn new(call_id: impl Into<String>, tool_name: impl Into<String>, stage: ToolStage) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            stage,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Final accounting for a finished exchange, also carried on `Done`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeSummary {
    pub text: String,
    pub reasoning: String,
    pub usage: TokenUsage,
    pub history: Vec<ToolHistoryEntry>,
    pub rounds: u32,
    pub cancelled: bool,
}

/// Snapshot of the outbound request handed to before-request hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub session_id: String,
    pub model: String,
    pub round: u32,
    pub message_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ContentDelta(String),
    ReasoningDelta(String),
    Usage(TokenUsage),
    ToolLifecycle(ToolLifecycleEvent),
    /// A validator aborted the exchange. Terminal: no `Done` follows.
    ToolAbort {
        tool_name: String,
        arguments: Value,
        payload: Value,
    },
    Done(ExchangeSummary),
}

//! Per-exchange state threaded through the round loop.

use std::time::Instant;

use scommon::{MetadataMap, SessionId, TraceId};
use serde_json::Value;

/// Sampling and request knobs forwarded to the provider request builder.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub metadata: MetadataMap,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A tool call under accumulation. `arguments` holds the raw argument text
/// as streamed so far; it is only parsed once the round finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
    pub metadata: Option<Value>,
}

/// One settled tool call: what was asked and what came back, tagged with
/// the round it ran in. Hooks may rewrite `result` before the thread and
/// history record it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolHistoryEntry {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: Value,
    pub result: Value,
    pub round: u32,
}

/// Mutable state for one exchange. The thread holds provider-native message
/// values and grows as tool rounds settle; `round` counts completed
/// tool rounds, starting at zero for the opening request. `started_at`
/// marks request creation, read by rate-limit cooldowns.
#[derive(Debug, Clone)]
pub struct ExchangeContext {
    pub session_id: SessionId,
    pub trace_id: Option<TraceId>,
    pub model: String,
    pub options: RequestOptions,
    pub thread: Vec<Value>,
    pub history: Vec<ToolHistoryEntry>,
    pub round: u32,
    pub started_at: Instant,
}

impl ExchangeContext {
    pub fn new(
        session_id: impl Into<SessionId>,
        model: impl Into<String>,
        thread: Vec<Value>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            trace_id: None,
            model: model.into(),
            options: RequestOptions::default(),
            thread,
            history: Vec::new(),
            round: 0,
            started_at: Instant::now(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn push_message(&mut self, message: Value) {
        self.thread.push(message);
    }

    pub(crate) fn advance_round(&mut self) {
        self.round += 1;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn context_starts_at_round_zero_with_seed_thread() {
        let thread = vec![json!({"role": "user", "content": "hi"})];
        let mut context = ExchangeContext::new("session-1", "gpt-test", thread)
            .with_options(RequestOptions::new().with_temperature(0.2));

        assert_eq!(context.round, 0);
        assert_eq!(context.thread.len(), 1);
        assert_eq!(context.options.temperature, Some(0.2));
        assert!(context.started_at <= Instant::now());

        context.advance_round();
        assert_eq!(context.round, 1);
    }
}

//! Normalizer for Ollama NDJSON chat stream chunks.

use serde::Deserialize;
use serde_json::Value;

use crate::{FinishKind, NormalizedEvent, TokenUsage};

/// Ollama delivers tool calls atomically with object-typed arguments and no
/// call ids; ids are synthesized here and arguments serialized to the string
/// form the shared accumulator expects. There is no finish-reason field, so
/// the terminal kind is derived from whether the round started any calls.
#[derive(Debug, Clone, Default)]
pub struct OllamaNormalizer {
    calls_started: u64,
}

impl OllamaNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_round(&mut self) {
        self.calls_started = 0;
    }

    pub fn normalize(&mut self, chunk: &Value) -> Vec<NormalizedEvent> {
        let Ok(chunk) = OllamaChunk::deserialize(chunk) else {
            return Vec::new();
        };

        let mut events = Vec::new();

        if let Some(message) = chunk.message {
            if let Some(content) = message.content {
                if !content.is_empty() {
                    events.push(NormalizedEvent::ContentDelta(content));
                }
            }

            if let Some(thinking) = message.thinking {
                if !thinking.is_empty() {
                    events.push(NormalizedEvent::ReasoningDelta(thinking));
                }
            }

            for call in message.tool_calls.unwrap_or_default() {
                let Some(function) = call.function else {
                    continue;
                };

                let arguments = function
                    .arguments
                    .as_ref()
                    .and_then(|value| serde_json::to_string(value).ok())
                    .unwrap_or_else(|| "{}".to_string());

                let id = format!("call_{}", self.calls_started);
                self.calls_started += 1;

                events.push(NormalizedEvent::ToolCallStart {
                    id,
                    name: function.name.unwrap_or_default(),
                    arguments,
                    metadata: None,
                });
            }
        }

        if chunk.done.unwrap_or(false) {
            events.push(NormalizedEvent::Usage(TokenUsage::new(
                chunk.prompt_eval_count.unwrap_or(0),
                chunk.eval_count.unwrap_or(0),
            )));

            let finish = if self.calls_started > 0 {
                FinishKind::ToolUse
            } else {
                FinishKind::Stop
            };
            events.push(NormalizedEvent::Finished(finish));
        }

        events
    }
}

#[derive(Debug, Deserialize)]
struct OllamaChunk {
    message: Option<OllamaMessage>,
    done: Option<bool>,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: Option<String>,
    thinking: Option<String>,
    tool_calls: Option<Vec<OllamaToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OllamaToolCall {
    function: Option<OllamaToolFunction>,
}

#[derive(Debug, Deserialize)]
struct OllamaToolFunction {
    name: Option<String>,
    arguments: Option<Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn atomic_tool_calls_get_synthesized_ids_and_string_arguments() {
        let mut normalizer = OllamaNormalizer::new();
        let events = normalizer.normalize(&json!({
            "message": {
                "content": "",
                "tool_calls": [
                    {"function": {"name": "lookup", "arguments": {"q": "rust"}}},
                    {"function": {"name": "sum", "arguments": {"values": [1, 2]}}}
                ]
            },
            "done": false
        }));

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            NormalizedEvent::ToolCallStart {
                id: "call_0".into(),
                name: "lookup".into(),
                arguments: "{\"q\":\"rust\"}".into(),
                metadata: None,
            }
        );
        assert!(matches!(
            &events[1],
            NormalizedEvent::ToolCallStart { id, name, .. }
                if id == "call_1" && name == "sum"
        ));
    }

    #[test]
    fn done_chunk_yields_usage_then_finish() {
        let mut normalizer = OllamaNormalizer::new();
        let events = normalizer.normalize(&json!({
            "message": {"content": "bye"},
            "done": true,
            "prompt_eval_count": 20,
            "eval_count": 8
        }));

        assert_eq!(
            events,
            vec![
                NormalizedEvent::ContentDelta("bye".into()),
                NormalizedEvent::Usage(TokenUsage::new(20, 8)),
                NormalizedEvent::Finished(FinishKind::Stop),
            ]
        );
    }

    #[test]
    fn finish_kind_reflects_started_tool_calls() {
        let mut normalizer = OllamaNormalizer::new();
        normalizer.normalize(&json!({
            "message": {"tool_calls": [{"function": {"name": "lookup", "arguments": {}}}]}
        }));

        let done = normalizer.normalize(&json!({"done": true}));
        assert_eq!(done.last(), Some(&NormalizedEvent::Finished(FinishKind::ToolUse)));

        normalizer.reset_round();
        let done = normalizer.normalize(&json!({"done": true}));
        assert_eq!(done.last(), Some(&NormalizedEvent::Finished(FinishKind::Stop)));
    }
}

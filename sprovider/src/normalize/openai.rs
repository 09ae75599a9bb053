//! Normalizer for OpenAI-style chat-completions stream chunks.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::{FinishKind, NormalizedEvent, TokenUsage};

/// OpenAI keys tool-call deltas by positional `index`; only the first delta
/// for an index carries the id and function name. The index-to-id table
/// lives here so the shared accumulator stays id-keyed.
#[derive(Debug, Clone, Default)]
pub struct OpenAiNormalizer {
    index_ids: BTreeMap<u64, String>,
}

impl OpenAiNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_round(&mut self) {
        self.index_ids.clear();
    }

    pub fn normalize(&mut self, chunk: &Value) -> Vec<NormalizedEvent> {
        let Ok(chunk) = OpenAiChunk::deserialize(chunk) else {
            return Vec::new();
        };

        let mut events = Vec::new();

        if let Some(usage) = chunk.usage {
            events.push(NormalizedEvent::Usage(TokenUsage {
                input_tokens: usage.prompt_tokens.unwrap_or(0),
                output_tokens: usage.completion_tokens.unwrap_or(0),
                total_tokens: usage.total_tokens.unwrap_or(0),
            }));
        }

        let Some(choice) = chunk.choices.and_then(|choices| choices.into_iter().next())
        else {
            return events;
        };

        if let Some(delta) = choice.delta {
            if let Some(content) = delta.content {
                if !content.is_empty() {
                    events.push(NormalizedEvent::ContentDelta(content));
                }
            }

            if let Some(reasoning) = delta.reasoning_content {
                if !reasoning.is_empty() {
                    events.push(NormalizedEvent::ReasoningDelta(reasoning));
                }
            }

            for delta_call in delta.tool_calls.unwrap_or_default() {
                self.apply_tool_call_delta(delta_call, &mut events);
            }
        }

        if let Some(reason) = choice.finish_reason {
            events.push(NormalizedEvent::Finished(parse_finish_reason(&reason)));
        }

        events
    }

    fn apply_tool_call_delta(&mut self, delta: DeltaToolCall, events: &mut Vec<NormalizedEvent>) {
        let index = delta.index.unwrap_or(0);
        let (name, arguments) = match delta.function {
            Some(function) => (function.name, function.arguments),
            None => (None, None),
        };

        match self.index_ids.get(&index) {
            Some(id) => {
                if let Some(fragment) = arguments {
                    if !fragment.is_empty() {
                        events.push(NormalizedEvent::ToolCallDelta {
                            id: Some(id.clone()),
                            arguments: fragment,
                        });
                    }
                }
            }
            None => {
                let id = delta.id.unwrap_or_else(|| format!("tool_call_{index}"));
                self.index_ids.insert(index, id.clone());
                events.push(NormalizedEvent::ToolCallStart {
                    id,
                    name: name.unwrap_or_default(),
                    arguments: arguments.unwrap_or_default(),
                    metadata: None,
                });
            }
        }
    }
}

fn parse_finish_reason(value: &str) -> FinishKind {
    match value {
        "stop" => FinishKind::Stop,
        "tool_calls" => FinishKind::ToolUse,
        "length" => FinishKind::MaxTokens,
        "cancelled" => FinishKind::Cancelled,
        _ => FinishKind::Other,
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiChunk {
    choices: Option<Vec<OpenAiChoice>>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    delta: Option<OpenAiDelta>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiDelta {
    content: Option<String>,
    reasoning_content: Option<String>,
    tool_calls: Option<Vec<DeltaToolCall>>,
}

#[derive(Debug, Deserialize)]
struct DeltaToolCall {
    index: Option<u64>,
    id: Option<String>,
    function: Option<DeltaToolFunction>,
}

#[derive(Debug, Deserialize)]
struct DeltaToolFunction {
    name: Option<String>,
    arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn content_delta_chunks_map_to_content_events() {
        let mut normalizer = OpenAiNormalizer::new();
        let events = normalizer.normalize(&json!({
            "choices": [{"delta": {"content": "hello"}}]
        }));

        assert_eq!(events, vec![NormalizedEvent::ContentDelta("hello".into())]);
    }

    #[test]
    fn index_keyed_tool_deltas_resolve_to_stable_ids() {
        let mut normalizer = OpenAiNormalizer::new();

        let start = normalizer.normalize(&json!({
            "choices": [{"delta": {"tool_calls": [
                {"index": 0, "id": "call_abc", "function": {"name": "lookup", "arguments": "{\"q\":"}}
            ]}}]
        }));
        assert_eq!(
            start,
            vec![NormalizedEvent::ToolCallStart {
                id: "call_abc".into(),
                name: "lookup".into(),
                arguments: "{\"q\":".into(),
                metadata: None,
            }]
        );

        let delta = normalizer.normalize(&json!({
            "choices": [{"delta": {"tool_calls": [
                {"index": 0, "function": {"arguments": "\"rust\"}"}}
            ]}}]
        }));
        assert_eq!(
            delta,
            vec![NormalizedEvent::ToolCallDelta {
                id: Some("call_abc".into()),
                arguments: "\"rust\"}".into(),
            }]
        );
    }

    #[test]
    fn missing_id_synthesizes_one_from_the_index() {
        let mut normalizer = OpenAiNormalizer::new();
        let events = normalizer.normalize(&json!({
            "choices": [{"delta": {"tool_calls": [
                {"index": 2, "function": {"name": "sum", "arguments": "[1"}}
            ]}}]
        }));

        assert_eq!(
            events,
            vec![NormalizedEvent::ToolCallStart {
                id: "tool_call_2".into(),
                name: "sum".into(),
                arguments: "[1".into(),
                metadata: None,
            }]
        );
    }

    #[test]
    fn finish_reason_and_usage_map_to_terminal_events() {
        let mut normalizer = OpenAiNormalizer::new();
        let events = normalizer.normalize(&json!({
            "choices": [{"delta": {}, "finish_reason": "tool_calls"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        }));

        assert_eq!(
            events,
            vec![
                NormalizedEvent::Usage(TokenUsage {
                    input_tokens: 12,
                    output_tokens: 5,
                    total_tokens: 17,
                }),
                NormalizedEvent::Finished(FinishKind::ToolUse),
            ]
        );
    }

    #[test]
    fn unknown_shapes_are_ignored() {
        let mut normalizer = OpenAiNormalizer::new();
        assert!(normalizer.normalize(&json!({"ping": true})).is_empty());
        assert!(normalizer.normalize(&json!("not an object")).is_empty());
    }

    #[test]
    fn renormalizing_with_a_fresh_normalizer_repeats_events() {
        let chunk = json!({
            "choices": [{"delta": {"tool_calls": [
                {"index": 0, "id": "call_1", "function": {"name": "lookup", "arguments": "{}"}}
            ]}}]
        });

        let first = OpenAiNormalizer::new().normalize(&chunk);
        let second = OpenAiNormalizer::new().normalize(&chunk);
        assert_eq!(first, second);
    }
}

//! Normalizer for Anthropic messages-API stream events.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::{FinishKind, NormalizedEvent, TokenUsage};

/// Anthropic addresses tool-use blocks by id at `content_block_start` but by
/// positional block index for every `input_json_delta` that follows; the
/// index-to-id table is kept here. The stop reason arrives on
/// `message_delta` while the terminal marker is `message_stop`, so the
/// reason is remembered between the two.
#[derive(Debug, Clone, Default)]
pub struct ClaudeNormalizer {
    block_ids: BTreeMap<u64, String>,
    pending_finish: Option<FinishKind>,
}

impl ClaudeNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_round(&mut self) {
        self.block_ids.clear();
        self.pending_finish = None;
    }

    pub fn normalize(&mut self, chunk: &Value) -> Vec<NormalizedEvent> {
        let Ok(chunk) = ClaudeEvent::deserialize(chunk) else {
            return Vec::new();
        };

        let Some(kind) = chunk.r#type.as_deref() else {
            return Vec::new();
        };

        match kind {
            "message_start" => chunk
                .message
                .and_then(|message| message.usage)
                .map(|usage| vec![NormalizedEvent::Usage(usage.into_token_usage())])
                .unwrap_or_default(),
            "content_block_start" => self.on_block_start(chunk),
            "content_block_delta" => self.on_block_delta(chunk),
            "message_delta" => self.on_message_delta(chunk),
            "message_stop" => {
                let finish = self.pending_finish.take().unwrap_or(FinishKind::Stop);
                vec![NormalizedEvent::Finished(finish)]
            }
            _ => Vec::new(),
        }
    }

    fn on_block_start(&mut self, chunk: ClaudeEvent) -> Vec<NormalizedEvent> {
        let Some(block) = chunk.content_block else {
            return Vec::new();
        };

        if block.r#type.as_deref() != Some("tool_use") {
            return Vec::new();
        }

        let index = chunk.index.unwrap_or(0);
        let id = block
            .id
            .unwrap_or_else(|| format!("tool_use_{index}"));
        self.block_ids.insert(index, id.clone());

        vec![NormalizedEvent::ToolCallStart {
            id,
            name: block.name.unwrap_or_default(),
            arguments: String::new(),
            metadata: None,
        }]
    }

    fn on_block_delta(&mut self, chunk: ClaudeEvent) -> Vec<NormalizedEvent> {
        let Some(delta) = chunk.delta else {
            return Vec::new();
        };

        match delta.r#type.as_deref() {
            Some("text_delta") => delta
                .text
                .filter(|text| !text.is_empty())
                .map(|text| vec![NormalizedEvent::ContentDelta(text)])
                .unwrap_or_default(),
            Some("thinking_delta") => delta
                .thinking
                .filter(|thinking| !thinking.is_empty())
                .map(|thinking| vec![NormalizedEvent::ReasoningDelta(thinking)])
                .unwrap_or_default(),
            Some("input_json_delta") => {
                let index = chunk.index.unwrap_or(0);
                let fragment = delta.partial_json.unwrap_or_default();
                if fragment.is_empty() {
                    return Vec::new();
                }

                vec![NormalizedEvent::ToolCallDelta {
                    id: self.block_ids.get(&index).cloned(),
                    arguments: fragment,
                }]
            }
            _ => Vec::new(),
        }
    }

    fn on_message_delta(&mut self, chunk: ClaudeEvent) -> Vec<NormalizedEvent> {
        let mut events = Vec::new();

        if let Some(usage) = chunk.usage {
            events.push(NormalizedEvent::Usage(usage.into_token_usage()));
        }

        if let Some(reason) = chunk.delta.and_then(|delta| delta.stop_reason) {
            self.pending_finish = Some(parse_stop_reason(&reason));
        }

        events
    }
}

fn parse_stop_reason(value: &str) -> FinishKind {
    match value {
        "end_turn" => FinishKind::Stop,
        "tool_use" => FinishKind::ToolUse,
        "max_tokens" => FinishKind::MaxTokens,
        _ => FinishKind::Other,
    }
}

#[derive(Debug, Deserialize)]
struct ClaudeEvent {
    r#type: Option<String>,
    index: Option<u64>,
    message: Option<ClaudeMessage>,
    content_block: Option<ClaudeContentBlock>,
    delta: Option<ClaudeDelta>,
    usage: Option<ClaudeUsage>,
}

#[derive(Debug, Deserialize)]
struct ClaudeMessage {
    usage: Option<ClaudeUsage>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContentBlock {
    r#type: Option<String>,
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeDelta {
    r#type: Option<String>,
    text: Option<String>,
    thinking: Option<String>,
    partial_json: Option<String>,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeUsage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

impl ClaudeUsage {
    fn into_token_usage(self) -> TokenUsage {
        TokenUsage::new(
            self.input_tokens.unwrap_or(0),
            self.output_tokens.unwrap_or(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn text_and_thinking_deltas_map_to_canonical_deltas() {
        let mut normalizer = ClaudeNormalizer::new();

        let text = normalizer.normalize(&json!({
            "type": "content_block_delta",
            "index": 0,
            "delta": {"type": "text_delta", "text": "hi"}
        }));
        assert_eq!(text, vec![NormalizedEvent::ContentDelta("hi".into())]);

        let thinking = normalizer.normalize(&json!({
            "type": "content_block_delta",
            "index": 0,
            "delta": {"type": "thinking_delta", "thinking": "hmm"}
        }));
        assert_eq!(thinking, vec![NormalizedEvent::ReasoningDelta("hmm".into())]);
    }

    #[test]
    fn tool_use_blocks_resolve_json_deltas_through_the_index_table() {
        let mut normalizer = ClaudeNormalizer::new();

        let start = normalizer.normalize(&json!({
            "type": "content_block_start",
            "index": 1,
            "content_block": {"type": "tool_use", "id": "toolu_01", "name": "lookup"}
        }));
        assert_eq!(
            start,
            vec![NormalizedEvent::ToolCallStart {
                id: "toolu_01".into(),
                name: "lookup".into(),
                arguments: String::new(),
                metadata: None,
            }]
        );

        let delta = normalizer.normalize(&json!({
            "type": "content_block_delta",
            "index": 1,
            "delta": {"type": "input_json_delta", "partial_json": "{\"q\":\"rust\"}"}
        }));
        assert_eq!(
            delta,
            vec![NormalizedEvent::ToolCallDelta {
                id: Some("toolu_01".into()),
                arguments: "{\"q\":\"rust\"}".into(),
            }]
        );
    }

    #[test]
    fn stop_reason_is_remembered_until_message_stop() {
        let mut normalizer = ClaudeNormalizer::new();

        let delta = normalizer.normalize(&json!({
            "type": "message_delta",
            "delta": {"stop_reason": "tool_use"},
            "usage": {"output_tokens": 9}
        }));
        assert_eq!(
            delta,
            vec![NormalizedEvent::Usage(TokenUsage::new(0, 9))]
        );

        let stop = normalizer.normalize(&json!({"type": "message_stop"}));
        assert_eq!(stop, vec![NormalizedEvent::Finished(FinishKind::ToolUse)]);
    }

    #[test]
    fn text_blocks_and_unknown_events_produce_nothing() {
        let mut normalizer = ClaudeNormalizer::new();

        let text_block = normalizer.normalize(&json!({
            "type": "content_block_start",
            "index": 0,
            "content_block": {"type": "text", "text": ""}
        }));
        assert!(text_block.is_empty());

        assert!(normalizer.normalize(&json!({"type": "ping"})).is_empty());
    }
}

//! Provider-native thread message shapes for tool calls and results.

use serde_json::{Value, json};

use crate::ProviderKind;

/// Formats tool-call and tool-result messages in the exact shape the next
/// provider request needs. Both functions are pure; the caller appends their
/// outputs to the conversation thread in call/result pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadFormatter {
    kind: ProviderKind,
}

impl ThreadFormatter {
    pub fn for_kind(kind: ProviderKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn tool_call_message(&self, id: &str, name: &str, arguments: &Value) -> Value {
        match self.kind {
            ProviderKind::OpenAi => json!({
                "role": "assistant",
                "content": Value::Null,
                "tool_calls": [{
                    "id": id,
                    "type": "function",
                    "function": {
                        "name": name,
                        "arguments": arguments.to_string(),
                    },
                }],
            }),
            ProviderKind::Claude => json!({
                "role": "assistant",
                "content": [{
                    "type": "tool_use",
                    "id": id,
                    "name": name,
                    "input": arguments,
                }],
            }),
            ProviderKind::Ollama => json!({
                "role": "assistant",
                "content": "",
                "tool_calls": [{
                    "function": {
                        "name": name,
                        "arguments": arguments,
                    },
                }],
            }),
        }
    }

    pub fn tool_result_message(&self, id: &str, name: &str, result: &Value) -> Value {
        match self.kind {
            ProviderKind::OpenAi => json!({
                "role": "tool",
                "tool_call_id": id,
                "content": render_result(result),
            }),
            ProviderKind::Claude => json!({
                "role": "user",
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": id,
                    "content": render_result(result),
                }],
            }),
            ProviderKind::Ollama => json!({
                "role": "tool",
                "tool_name": name,
                "content": render_result(result),
            }),
        }
    }
}

fn render_result(result: &Value) -> String {
    match result {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn openai_pairs_use_tool_call_id_addressing() {
        let formatter = ThreadFormatter::for_kind(ProviderKind::OpenAi);
        let arguments = json!({"q": "rust"});

        let call = formatter.tool_call_message("call_1", "lookup", &arguments);
        assert_eq!(call["role"], "assistant");
        assert_eq!(call["tool_calls"][0]["id"], "call_1");
        assert_eq!(
            call["tool_calls"][0]["function"]["arguments"],
            "{\"q\":\"rust\"}"
        );

        let result = formatter.tool_result_message("call_1", "lookup", &json!({"hits": 3}));
        assert_eq!(result["role"], "tool");
        assert_eq!(result["tool_call_id"], "call_1");
        assert_eq!(result["content"], "{\"hits\":3}");
    }

    #[test]
    fn claude_pairs_use_content_blocks() {
        let formatter = ThreadFormatter::for_kind(ProviderKind::Claude);
        let arguments = json!({"q": "rust"});

        let call = formatter.tool_call_message("toolu_01", "lookup", &arguments);
        assert_eq!(call["content"][0]["type"], "tool_use");
        assert_eq!(call["content"][0]["input"], arguments);

        let result = formatter.tool_result_message("toolu_01", "lookup", &json!("three hits"));
        assert_eq!(result["role"], "user");
        assert_eq!(result["content"][0]["type"], "tool_result");
        assert_eq!(result["content"][0]["tool_use_id"], "toolu_01");
        assert_eq!(result["content"][0]["content"], "three hits");
    }

    #[test]
    fn ollama_results_are_addressed_by_tool_name() {
        let formatter = ThreadFormatter::for_kind(ProviderKind::Ollama);
        let result = formatter.tool_result_message("call_0", "sum", &json!(3));
        assert_eq!(result["tool_name"], "sum");
        assert_eq!(result["content"], "3");
    }
}

//! Argument parsing and synthetic result values for the tool round.

use serde_json::{json, Value};
use stooling::ToolError;

use crate::{EngineError, PendingToolCall};

/// Parses the accumulated argument text. Providers omit arguments entirely
/// for no-parameter tools, so empty text maps to an empty object; anything
/// else must be valid JSON.
pub(crate) fn parse_arguments(call: &PendingToolCall) -> Result<Value, EngineError> {
    let text = call.arguments.trim();
    if text.is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(text).map_err(|err| {
        EngineError::malformed_arguments(
            format!("tool call arguments are not valid JSON: {err}"),
            call.name.clone(),
            call.id.clone(),
        )
    })
}

/// Result recorded for a call the validator denied. Denials share the
/// `error` key with every other synthetic result so the model sees one
/// uniform error surface.
pub(crate) fn denial_result(reason: &str) -> Value {
    json!({ "error": reason })
}

/// Result recorded for a call naming a tool the registry does not know.
pub(crate) fn unknown_tool_result(tool_name: &str) -> Value {
    json!({ "error": format!("Tool '{tool_name}' does not exist or is not available") })
}

/// Result recorded when the tool stream yields an error.
pub(crate) fn failure_result(error: &ToolError) -> Value {
    json!({ "error": error.message, "retryable": error.is_retryable() })
}

/// Result recorded when the tool stream ends without a final value.
pub(crate) fn empty_result() -> Value {
    json!({ "error": "tool produced no result" })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(arguments: &str) -> PendingToolCall {
        PendingToolCall {
            id: "call_1".to_string(),
            name: "search".to_string(),
            arguments: arguments.to_string(),
            metadata: None,
        }
    }

    #[test]
    fn empty_arguments_parse_as_an_empty_object() {
        assert_eq!(parse_arguments(&call("")).unwrap(), json!({}));
        assert_eq!(parse_arguments(&call("  ")).unwrap(), json!({}));
    }

    #[test]
    fn truncated_arguments_are_a_malformed_arguments_error() {
        let error = parse_arguments(&call("{\"query\":")).unwrap_err();
        assert_eq!(error.kind, crate::EngineErrorKind::MalformedArguments);
        assert_eq!(error.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn synthetic_results_share_the_error_key() {
        assert_eq!(denial_result("read-only"), json!({"error": "read-only"}));

        let unknown = unknown_tool_result("ghost")
            .get("error")
            .and_then(Value::as_str)
            .unwrap()
            .to_string();
        assert_eq!(unknown, "Tool 'ghost' does not exist or is not available");
    }
}

//! The normalized event vocabulary every provider normalizer must satisfy.

use serde_json::Value;

use crate::{FinishKind, TokenUsage};

/// Canonical event produced from one provider-native stream chunk.
///
/// This is the seam that keeps the rest of the engine provider-agnostic:
/// normalizers translate wire quirks (index-keyed deltas, block events,
/// atomic tool calls) into this closed vocabulary and nothing else.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedEvent {
    ContentDelta(String),
    ReasoningDelta(String),
    Usage(TokenUsage),
    ToolCallStart {
        id: String,
        name: String,
        arguments: String,
        metadata: Option<Value>,
    },
    /// A fragment of tool-call arguments. `id` is `None` when the provider
    /// addresses the call implicitly (the accumulator then targets the most
    /// recently started call).
    ToolCallDelta {
        id: Option<String>,
        arguments: String,
    },
    Finished(FinishKind),
}

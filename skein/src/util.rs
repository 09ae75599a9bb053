//! Small convenience constructors for common values.

use serde_json::{Value, json};

use crate::{ExchangeContext, ProviderKind, SessionId};

pub fn system_message(content: impl Into<String>) -> Value {
    json!({"role": "system", "content": content.into()})
}

pub fn user_message(content: impl Into<String>) -> Value {
    json!({"role": "user", "content": content.into()})
}

pub fn assistant_message(content: impl Into<String>) -> Value {
    json!({"role": "assistant", "content": content.into()})
}

pub fn exchange(
    session_id: impl Into<SessionId>,
    model: impl Into<String>,
    thread: Vec<Value>,
) -> ExchangeContext {
    ExchangeContext::new(session_id, model, thread)
}

pub fn parse_provider_kind(value: &str) -> Option<ProviderKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "openai" => Some(ProviderKind::OpenAi),
        "claude" | "anthropic" => Some(ProviderKind::Claude),
        "ollama" | "local" => Some(ProviderKind::Ollama),
        _ => None,
    }
}

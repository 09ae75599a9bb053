//! HTTP endpoint wiring for the built-in provider dialects.

use scommon::BoxFuture;
use sengine::{ChunkStreamFactory, Engine, ExchangeContext};
use stooling::ToolRegistry;
use serde_json::{Value, json};
use sprovider::{
    BoxedChunkStream, HttpChunkTransport, ProviderError, ProviderKind, ToolDefinition, WireFraming,
};

const CLAUDE_VERSION: &str = "2023-06-01";
const CLAUDE_DEFAULT_MAX_TOKENS: u32 = 4096;

/// Where and how to reach one provider's streaming chat endpoint.
#[derive(Debug, Clone)]
pub struct ProviderEndpoint {
    pub kind: ProviderKind,
    pub url: String,
    pub api_key: Option<String>,
}

impl ProviderEndpoint {
    pub fn openai() -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
        }
    }

    pub fn claude() -> Self {
        Self {
            kind: ProviderKind::Claude,
            url: "https://api.anthropic.com/v1/messages".to_string(),
            api_key: None,
        }
    }

    pub fn ollama() -> Self {
        Self {
            kind: ProviderKind::Ollama,
            url: "http://localhost:11434/api/chat".to_string(),
            api_key: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn framing(&self) -> WireFraming {
        match self.kind {
            ProviderKind::OpenAi | ProviderKind::Claude => WireFraming::Sse,
            ProviderKind::Ollama => WireFraming::Ndjson,
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        match self.kind {
            ProviderKind::OpenAi => {
                if let Some(api_key) = &self.api_key {
                    headers.push(("Authorization".to_string(), format!("Bearer {api_key}")));
                }
            }
            ProviderKind::Claude => {
                if let Some(api_key) = &self.api_key {
                    headers.push(("x-api-key".to_string(), api_key.clone()));
                }
                headers.push(("anthropic-version".to_string(), CLAUDE_VERSION.to_string()));
            }
            ProviderKind::Ollama => {}
        }
        headers
    }
}

/// Opens provider streams over HTTP for the engine's round loop.
pub struct HttpStreamFactory {
    endpoint: ProviderEndpoint,
    transport: HttpChunkTransport,
    tools: Vec<ToolDefinition>,
}

impl HttpStreamFactory {
    pub fn new(endpoint: ProviderEndpoint, tools: Vec<ToolDefinition>) -> Self {
        let transport = HttpChunkTransport::new(reqwest::Client::new(), endpoint.framing());
        Self {
            endpoint,
            transport,
            tools,
        }
    }

    fn request_body(&self, context: &ExchangeContext) -> Value {
        build_request_body(self.endpoint.kind, context, &self.tools)
    }
}

impl ChunkStreamFactory for HttpStreamFactory {
    fn open_stream<'a>(
        &'a self,
        context: &'a ExchangeContext,
    ) -> BoxFuture<'a, Result<BoxedChunkStream<'static>, ProviderError>> {
        Box::pin(async move {
            let body = self.request_body(context);
            let headers = self.endpoint.headers();
            self.transport
                .stream(&self.endpoint.url, &headers, &body)
                .await
        })
    }
}

/// Builds the provider-native streaming request body. Tool schemas are
/// stored as JSON text and re-parsed here; an unparsable schema degrades to
/// an open object rather than failing the request.
pub fn build_request_body(
    kind: ProviderKind,
    context: &ExchangeContext,
    tools: &[ToolDefinition],
) -> Value {
    match kind {
        ProviderKind::OpenAi => {
            let mut body = json!({
                "model": context.model,
                "messages": context.thread,
                "stream": true,
                "stream_options": {"include_usage": true},
            });
            if let Some(temperature) = context.options.temperature {
                body["temperature"] = json!(temperature);
            }
            if let Some(max_tokens) = context.options.max_tokens {
                body["max_tokens"] = json!(max_tokens);
            }
            if !tools.is_empty() {
                body["tools"] = Value::Array(
                    tools
                        .iter()
                        .map(|tool| {
                            json!({
                                "type": "function",
                                "function": {
                                    "name": tool.name,
                                    "description": tool.description,
                                    "parameters": parse_schema(&tool.input_schema),
                                },
                            })
                        })
                        .collect(),
                );
            }
            body
        }
        ProviderKind::Claude => {
            let mut body = json!({
                "model": context.model,
                "messages": context.thread,
                "stream": true,
                "max_tokens": context.options.max_tokens.unwrap_or(CLAUDE_DEFAULT_MAX_TOKENS),
            });
            if let Some(temperature) = context.options.temperature {
                body["temperature"] = json!(temperature);
            }
            if !tools.is_empty() {
                body["tools"] = Value::Array(
                    tools
                        .iter()
                        .map(|tool| {
                            json!({
                                "name": tool.name,
                                "description": tool.description,
                                "input_schema": parse_schema(&tool.input_schema),
                            })
                        })
                        .collect(),
                );
            }
            body
        }
        ProviderKind::Ollama => {
            let mut body = json!({
                "model": context.model,
                "messages": context.thread,
                "stream": true,
            });
            if let Some(temperature) = context.options.temperature {
                body["options"] = json!({"temperature": temperature});
            }
            if !tools.is_empty() {
                body["tools"] = Value::Array(
                    tools
                        .iter()
                        .map(|tool| {
                            json!({
                                "type": "function",
                                "function": {
                                    "name": tool.name,
                                    "description": tool.description,
                                    "parameters": parse_schema(&tool.input_schema),
                                },
                            })
                        })
                        .collect(),
                );
            }
            body
        }
    }
}

fn parse_schema(schema: &str) -> Value {
    serde_json::from_str(schema).unwrap_or_else(|_| json!({"type": "object"}))
}

/// Wires an engine for one endpoint: HTTP factory, the registry's tool
/// definitions advertised on every request, and matching normalizer and
/// thread formatter dialects.
pub fn engine_for(endpoint: ProviderEndpoint, tools: ToolRegistry) -> Engine {
    let kind = endpoint.kind;
    let factory = HttpStreamFactory::new(endpoint, tools.definitions());
    Engine::builder(kind, factory).with_tools(tools).build()
}

#[cfg(test)]
mod tests {
    use sengine::RequestOptions;
    use serde_json::json;

    use crate::util::user_message;

    use super::*;

    fn sample_tools() -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            name: "search".to_string(),
            description: "Searches the index".to_string(),
            input_schema: "{\"type\":\"object\",\"properties\":{\"query\":{\"type\":\"string\"}}}"
                .to_string(),
        }]
    }

    fn sample_context() -> ExchangeContext {
        ExchangeContext::new("session-1", "test-model", vec![user_message("go")])
            .with_options(RequestOptions::new().with_temperature(0.1).with_max_tokens(256))
    }

    #[test]
    fn openai_body_wraps_tools_as_functions() {
        let body = build_request_body(ProviderKind::OpenAi, &sample_context(), &sample_tools());

        assert_eq!(body["stream"], json!(true));
        assert_eq!(body["stream_options"]["include_usage"], json!(true));
        assert_eq!(body["temperature"], json!(0.1));
        assert_eq!(body["max_tokens"], json!(256));
        assert_eq!(body["tools"][0]["type"], json!("function"));
        assert_eq!(body["tools"][0]["function"]["name"], json!("search"));
        assert_eq!(
            body["tools"][0]["function"]["parameters"]["type"],
            json!("object")
        );
    }

    #[test]
    fn claude_body_requires_max_tokens_and_flat_tools() {
        let context = ExchangeContext::new("session-1", "test-model", vec![user_message("go")]);
        let body = build_request_body(ProviderKind::Claude, &context, &sample_tools());

        assert_eq!(body["max_tokens"], json!(CLAUDE_DEFAULT_MAX_TOKENS));
        assert_eq!(body["tools"][0]["name"], json!("search"));
        assert!(body["tools"][0].get("type").is_none());
    }

    #[test]
    fn ollama_body_nests_temperature_under_options() {
        let body = build_request_body(ProviderKind::Ollama, &sample_context(), &[]);

        assert_eq!(body["options"]["temperature"], json!(0.1));
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn unparsable_schema_degrades_to_an_open_object() {
        assert_eq!(parse_schema("{broken"), json!({"type": "object"}));
    }

    #[test]
    fn claude_endpoint_always_sends_the_version_header() {
        let endpoint = ProviderEndpoint::claude().with_api_key("key-1");
        let headers = endpoint.headers();

        assert!(headers.contains(&("x-api-key".to_string(), "key-1".to_string())));
        assert!(headers.contains(&(
            "anthropic-version".to_string(),
            CLAUDE_VERSION.to_string()
        )));
    }

    #[test]
    fn openai_endpoint_uses_a_bearer_token() {
        let endpoint = ProviderEndpoint::openai().with_api_key("key-1");
        assert_eq!(
            endpoint.headers(),
            vec![("Authorization".to_string(), "Bearer key-1".to_string())]
        );
        assert_eq!(endpoint.framing(), WireFraming::Sse);
        assert_eq!(ProviderEndpoint::ollama().framing(), WireFraming::Ndjson);
    }
}

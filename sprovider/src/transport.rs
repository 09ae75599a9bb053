//! HTTP chunk transport over SSE and NDJSON wire framings.

use async_stream::try_stream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use crate::{BoxedChunkStream, ProviderError};

/// How a provider frames its stream body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFraming {
    /// `data:` lines with a `[DONE]` terminator (OpenAI, Anthropic).
    Sse,
    /// One JSON object per line (Ollama).
    Ndjson,
}

/// Incremental SSE parser. Bytes may split lines arbitrarily; payloads are
/// only released once their terminating newline arrives.
#[derive(Debug, Default)]
pub struct SseBuffer {
    buffer: String,
    finished: bool,
}

impl SseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feeds raw text and returns the complete `data:` payloads it released.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        let mut payloads = Vec::new();
        if self.finished {
            return payloads;
        }

        self.buffer.push_str(text);
        while let Some(newline_index) = self.buffer.find('\n') {
            let line = self.buffer.drain(..=newline_index).collect::<String>();
            let line = line.trim();

            let Some(payload) = line.strip_prefix("data:") else {
                continue;
            };

            let payload = payload.trim();
            if payload == "[DONE]" {
                self.finished = true;
                break;
            }

            if !payload.is_empty() {
                payloads.push(payload.to_string());
            }
        }

        payloads
    }
}

/// Incremental line-delimited JSON parser.
#[derive(Debug, Default)]
pub struct NdjsonBuffer {
    buffer: String,
}

impl NdjsonBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        self.buffer.push_str(text);

        while let Some(newline_index) = self.buffer.find('\n') {
            let line = self.buffer.drain(..=newline_index).collect::<String>();
            let line = line.trim();
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }

        lines
    }
}

/// Streams provider-native chunk payloads from an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpChunkTransport {
    client: Client,
    framing: WireFraming,
}

impl HttpChunkTransport {
    pub fn new(client: Client, framing: WireFraming) -> Self {
        Self { client, framing }
    }

    pub async fn stream(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
    ) -> Result<BoxedChunkStream<'static>, ProviderError> {
        let mut builder = self.client.post(url).json(body);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|err| {
            if err.is_timeout() {
                ProviderError::timeout(err.to_string())
            } else {
                ProviderError::transport(err.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(parse_error(response).await);
        }

        let framing = self.framing;
        let mut bytes = response.bytes_stream();

        let stream = try_stream! {
            let mut sse = SseBuffer::new();
            let mut ndjson = NdjsonBuffer::new();

            while let Some(item) = bytes.next().await {
                let bytes = item.map_err(|err| ProviderError::transport(err.to_string()))?;
                let text = std::str::from_utf8(&bytes)
                    .map_err(|err| ProviderError::transport(err.to_string()))?;

                let payloads = match framing {
                    WireFraming::Sse => sse.push(text),
                    WireFraming::Ndjson => ndjson.push(text),
                };

                for payload in payloads {
                    let chunk: Value = serde_json::from_str(&payload)
                        .map_err(|err| ProviderError::transport(err.to_string()))?;
                    yield chunk;
                }

                if framing == WireFraming::Sse && sse.is_finished() {
                    break;
                }
            }
        };

        Ok(Box::pin(stream) as BoxedChunkStream<'static>)
    }
}

async fn parse_error(response: Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body)
        .unwrap_or_else(|| format!("provider request failed with status {status}"));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::timeout(message)
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::invalid_request(message)
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            ProviderError::unavailable(message)
        }
        _ => ProviderError::transport(message),
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<Value>(body).ok()?;
    parsed
        .pointer("/error/message")
        .or_else(|| parsed.get("error"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

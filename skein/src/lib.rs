//! Unified facade over the skein workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the core skein crates and provides endpoint wiring,
//! convenience constructors, and macros for common setup flows.

mod macros;

pub mod prelude;
pub mod providers;
pub mod util;

pub use scommon;
pub use sengine;
pub use sobserve;
pub use sprovider;
pub use stooling;

pub use scommon::{BoxFuture, CancelToken, Cancelled, MetadataMap, Registry, SessionId, TraceId};
pub use sengine::{
    AllowAllValidator, ChunkStreamFactory, Engine, EngineBuilder, EngineError, EngineErrorKind,
    EngineEvent, ExchangeContext, ExchangeEventStream, ExchangeSummary, HookHandle, HookRegistry,
    PendingToolCall, RequestInfo, RequestOptions, RoundAccumulator, ToolHistoryEntry,
    ToolLifecycleEvent, ToolStage, ToolValidator, ValidationDecision, cancel_after,
};
pub use sobserve::{
    MetricsToolObserver, SafeToolObserver, TracingToolObserver, install_metrics_hooks,
    install_tracing_hooks,
};
pub use sprovider::{
    BoxedChunkStream, ChunkNormalizer, ChunkStream, FinishKind, HttpChunkTransport, NdjsonBuffer,
    NormalizedEvent, ProviderError, ProviderErrorKind, ProviderKind, SseBuffer, ThreadFormatter,
    TokenUsage, ToolDefinition, VecChunkStream, WireFraming,
};
pub use stooling::{
    FunctionTool, NoopToolObserver, Tool, ToolChunk, ToolError, ToolErrorKind,
    ToolExecutionContext, ToolObserver, ToolRegistry, ToolStream, parse_json_object,
    parse_json_value, required_string,
};

pub use providers::{HttpStreamFactory, ProviderEndpoint, engine_for};
pub use util::{
    assistant_message, exchange, parse_provider_kind, system_message, user_message,
};

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn sk_messages_macro_builds_a_thread() {
        let thread = crate::sk_messages![
            system => "You are concise.",
            user => "Summarize the repo",
        ];

        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0], json!({"role": "system", "content": "You are concise."}));
        assert_eq!(thread[1]["role"], json!("user"));
    }
}

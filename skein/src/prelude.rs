//! Common imports for most skein applications.

pub use crate::{
    assistant_message, engine_for, exchange, parse_provider_kind, system_message, user_message,
};
pub use crate::{sk_messages, sk_msg};
pub use crate::{
    AllowAllValidator, BoxFuture, CancelToken, ChunkNormalizer, ChunkStreamFactory, Engine,
    EngineBuilder, EngineError, EngineErrorKind, EngineEvent, ExchangeContext, ExchangeEventStream,
    ExchangeSummary, FinishKind, FunctionTool, HookHandle, HookRegistry, HttpStreamFactory,
    MetadataMap, NormalizedEvent, ProviderEndpoint, ProviderError, ProviderKind, RequestOptions,
    SessionId, ThreadFormatter, TokenUsage, Tool, ToolDefinition, ToolError, ToolExecutionContext,
    ToolHistoryEntry, ToolLifecycleEvent, ToolObserver, ToolRegistry, ToolStage, ToolValidator,
    TraceId, ValidationDecision, cancel_after,
};
pub use crate::{
    MetricsToolObserver, SafeToolObserver, TracingToolObserver, install_metrics_hooks,
    install_tracing_hooks,
};

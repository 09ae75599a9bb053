//! Normalized streaming and tool-call orchestration over model providers.
//!
//! One exchange pulls provider-native chunks through a per-provider
//! normalizer, accumulates partial tool calls, executes completed rounds
//! strictly in order under an allow/deny/abort validation gate, rewrites the
//! conversation thread in the provider's native shape, and recurses into a
//! new provider request until the model stops requesting tools.

mod accumulator;
mod context;
mod deadline;
mod engine;
mod error;
mod events;
mod executor;
mod hooks;
mod validate;

pub mod prelude {
    pub use crate::{
        AllowAllValidator, ChunkStreamFactory, Engine, EngineBuilder, EngineError,
        EngineErrorKind, EngineEvent, ExchangeContext, ExchangeEventStream, ExchangeSummary,
        HookHandle, HookRegistry, PendingToolCall, RequestOptions, ToolHistoryEntry,
        ToolLifecycleEvent, ToolStage, ToolValidator, ValidationDecision,
    };
    pub use scommon::{CancelToken, MetadataMap, SessionId, TraceId};
    pub use sprovider::{
        ChunkNormalizer, FinishKind, NormalizedEvent, ProviderKind, ThreadFormatter, TokenUsage,
    };
    pub use stooling::{
        FunctionTool, NoopToolObserver, Tool, ToolError, ToolExecutionContext, ToolObserver,
        ToolRegistry,
    };
}

pub use accumulator::RoundAccumulator;
pub use context::{ExchangeContext, PendingToolCall, RequestOptions, ToolHistoryEntry};
pub use deadline::cancel_after;
pub use engine::{ChunkStreamFactory, Engine, EngineBuilder};
pub use error::{EngineError, EngineErrorKind};
pub use events::{
    EngineEvent, ExchangeEventStream, ExchangeSummary, RequestInfo, ToolLifecycleEvent, ToolStage,
};
pub use hooks::{ContentChunkInfo, HookHandle, HookRegistry};
pub use validate::{AllowAllValidator, ToolValidator, ValidationDecision};

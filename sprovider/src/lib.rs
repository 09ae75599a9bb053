//! Provider-agnostic wire model and per-provider chunk normalization.

mod error;
mod events;
mod model;
mod normalize;
mod stream;
mod thread;

#[cfg(feature = "transport")]
mod transport;

pub mod prelude {
    pub use crate::{
        ChunkNormalizer, FinishKind, NormalizedEvent, ProviderError, ProviderErrorKind,
        ProviderKind, ThreadFormatter, TokenUsage, ToolDefinition,
    };
}

pub use error::{ProviderError, ProviderErrorKind};
pub use events::NormalizedEvent;
pub use model::{FinishKind, ProviderKind, TokenUsage, ToolDefinition};
pub use normalize::{ChunkNormalizer, ClaudeNormalizer, OllamaNormalizer, OpenAiNormalizer};
pub use stream::{BoxedChunkStream, ChunkStream, VecChunkStream};
pub use thread::ThreadFormatter;

#[cfg(feature = "transport")]
pub use transport::{HttpChunkTransport, NdjsonBuffer, SseBuffer, WireFraming};

//! Per-provider chunk normalizers behind one closed dispatch type.

mod claude;
mod ollama;
mod openai;

use serde_json::Value;

use crate::{NormalizedEvent, ProviderKind};

pub use claude::ClaudeNormalizer;
pub use ollama::OllamaNormalizer;
pub use openai::OpenAiNormalizer;

/// Translates provider-native stream chunks into [`NormalizedEvent`]s.
///
/// One variant per provider, selected once at engine construction. The
/// contract for every variant:
/// - a chunk maps to zero or more events, in source order;
/// - malformed-but-recognized shapes never error, unknown shapes are ignored;
/// - positional addressing (index-keyed tool-call deltas) is resolved to
///   stable ids here and never leaks to the caller;
/// - no implicit memoization: a fresh normalizer fed the same chunks
///   produces the same events.
#[derive(Debug, Clone)]
pub enum ChunkNormalizer {
    OpenAi(OpenAiNormalizer),
    Claude(ClaudeNormalizer),
    Ollama(OllamaNormalizer),
}

impl ChunkNormalizer {
    pub fn for_kind(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::OpenAi => Self::OpenAi(OpenAiNormalizer::new()),
            ProviderKind::Claude => Self::Claude(ClaudeNormalizer::new()),
            ProviderKind::Ollama => Self::Ollama(OllamaNormalizer::new()),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::OpenAi(_) => ProviderKind::OpenAi,
            Self::Claude(_) => ProviderKind::Claude,
            Self::Ollama(_) => ProviderKind::Ollama,
        }
    }

    pub fn normalize(&mut self, chunk: &Value) -> Vec<NormalizedEvent> {
        match self {
            Self::OpenAi(normalizer) => normalizer.normalize(chunk),
            Self::Claude(normalizer) => normalizer.normalize(chunk),
            Self::Ollama(normalizer) => normalizer.normalize(chunk),
        }
    }

    /// Resets per-round addressing state. Called by the engine between
    /// provider round trips so positional indices from a new stream cannot
    /// collide with ids from the previous one.
    pub fn reset_round(&mut self) {
        match self {
            Self::OpenAi(normalizer) => normalizer.reset_round(),
            Self::Claude(normalizer) => normalizer.reset_round(),
            Self::Ollama(normalizer) => normalizer.reset_round(),
        }
    }
}

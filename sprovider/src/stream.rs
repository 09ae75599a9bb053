//! Raw chunk stream contracts and an in-memory stream for tests.
//!
//! ```rust
//! use serde_json::json;
//! use sprovider::{BoxedChunkStream, VecChunkStream};
//!
//! let stream = VecChunkStream::new(vec![Ok(json!({"done": true}))]);
//! let _boxed: BoxedChunkStream<'static> = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use serde_json::Value;

use crate::ProviderError;

/// Provider chunk stream contract.
///
/// Invariants for consumers:
/// - Chunks are yielded in wire order.
/// - The stream is finite and non-restartable.
/// - Once the stream yields `None`, it must not yield additional items.
pub trait ChunkStream: Stream<Item = Result<Value, ProviderError>> + Send {}

impl<T> ChunkStream for T where T: Stream<Item = Result<Value, ProviderError>> + Send {}

pub type BoxedChunkStream<'a> = Pin<Box<dyn ChunkStream + 'a>>;

#[derive(Debug)]
pub struct VecChunkStream {
    chunks: VecDeque<Result<Value, ProviderError>>,
}

impl VecChunkStream {
    pub fn new(chunks: Vec<Result<Value, ProviderError>>) -> Self {
        Self {
            chunks: chunks.into(),
        }
    }

    pub fn from_values(chunks: Vec<Value>) -> Self {
        Self::new(chunks.into_iter().map(Ok).collect())
    }
}

impl Stream for VecChunkStream {
    type Item = Result<Value, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Value, ProviderError>>> {
        Poll::Ready(self.chunks.pop_front())
    }
}

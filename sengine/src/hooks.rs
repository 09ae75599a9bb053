//! Ordered hook lists observed at fixed points in an exchange.
//!
//! Hooks run in registration order. Async hooks receive the exchange's
//! cancel token and may trip it; the engine checks the token after each
//! hook point. The tool-result hook is synchronous and may rewrite the
//! entry before the thread and history record it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use scommon::{BoxFuture, CancelToken};

use crate::{ExchangeSummary, RequestInfo, ToolHistoryEntry};

/// Accumulated content handed to content-chunk hooks.
///
/// `output_tokens` is the usage reported so far; providers that only
/// report usage at stream end leave it at zero until then, so
/// `chunk_count` is the reliable mid-stream progress counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunkInfo {
    pub delta: String,
    pub accumulated: String,
    pub chunk_count: u64,
    pub output_tokens: u32,
}

type BeforeRequestHook =
    Arc<dyn Fn(RequestInfo, CancelToken) -> BoxFuture<'static, ()> + Send + Sync>;
type ContentChunkHook =
    Arc<dyn Fn(ContentChunkInfo, CancelToken) -> BoxFuture<'static, ()> + Send + Sync>;
type ToolResultHook = Arc<dyn Fn(&mut ToolHistoryEntry) + Send + Sync>;
type ExchangeCompleteHook = Arc<dyn Fn(ExchangeSummary) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookKind {
    BeforeRequest,
    ContentChunk,
    ToolResult,
    ExchangeComplete,
}

/// Detaches one registered hook. Unsubscribing twice is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookHandle {
    kind: HookKind,
    id: u64,
}

#[derive(Default)]
pub struct HookRegistry {
    next_id: AtomicU64,
    before_request: Mutex<Vec<(u64, BeforeRequestHook)>>,
    content_chunk: Mutex<Vec<(u64, ContentChunkHook)>>,
    tool_result: Mutex<Vec<(u64, ToolResultHook)>>,
    exchange_complete: Mutex<Vec<(u64, ExchangeCompleteHook)>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn on_before_request<F>(&self, hook: F) -> HookHandle
    where
        F: Fn(RequestInfo, CancelToken) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.before_request
            .lock()
            .expect("hook list poisoned")
            .push((id, Arc::new(hook)));
        HookHandle {
            kind: HookKind::BeforeRequest,
            id,
        }
    }

    pub fn on_content_chunk<F>(&self, hook: F) -> HookHandle
    where
        F: Fn(ContentChunkInfo, CancelToken) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.content_chunk
            .lock()
            .expect("hook list poisoned")
            .push((id, Arc::new(hook)));
        HookHandle {
            kind: HookKind::ContentChunk,
            id,
        }
    }

    pub fn on_tool_result<F>(&self, hook: F) -> HookHandle
    where
        F: Fn(&mut ToolHistoryEntry) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.tool_result
            .lock()
            .expect("hook list poisoned")
            .push((id, Arc::new(hook)));
        HookHandle {
            kind: HookKind::ToolResult,
            id,
        }
    }

    pub fn on_exchange_complete<F>(&self, hook: F) -> HookHandle
    where
        F: Fn(ExchangeSummary) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.exchange_complete
            .lock()
            .expect("hook list poisoned")
            .push((id, Arc::new(hook)));
        HookHandle {
            kind: HookKind::ExchangeComplete,
            id,
        }
    }

    /// Removes the hook behind `handle`. Returns `false` when it was
    /// already removed.
    pub fn unsubscribe(&self, handle: HookHandle) -> bool {
        fn remove<T>(list: &Mutex<Vec<(u64, T)>>, id: u64) -> bool {
            let mut list = list.lock().expect("hook list poisoned");
            let before = list.len();
            list.retain(|(hook_id, _)| *hook_id != id);
            list.len() != before
        }

        match handle.kind {
            HookKind::BeforeRequest => remove(&self.before_request, handle.id),
            HookKind::ContentChunk => remove(&self.content_chunk, handle.id),
            HookKind::ToolResult => remove(&self.tool_result, handle.id),
            HookKind::ExchangeComplete => remove(&self.exchange_complete, handle.id),
        }
    }

    pub(crate) async fn run_before_request(&self, info: &RequestInfo, cancel: &CancelToken) {
        let hooks: Vec<BeforeRequestHook> = {
            let list = self.before_request.lock().expect("hook list poisoned");
            list.iter().map(|(_, hook)| Arc::clone(hook)).collect()
        };
        for hook in hooks {
            hook(info.clone(), cancel.clone()).await;
        }
    }

    pub(crate) async fn run_content_chunk(&self, info: &ContentChunkInfo, cancel: &CancelToken) {
        let hooks: Vec<ContentChunkHook> = {
            let list = self.content_chunk.lock().expect("hook list poisoned");
            list.iter().map(|(_, hook)| Arc::clone(hook)).collect()
        };
        for hook in hooks {
            hook(info.clone(), cancel.clone()).await;
        }
    }

    pub(crate) fn run_tool_result(&self, entry: &mut ToolHistoryEntry) {
        let hooks: Vec<ToolResultHook> = {
            let list = self.tool_result.lock().expect("hook list poisoned");
            list.iter().map(|(_, hook)| Arc::clone(hook)).collect()
        };
        for hook in hooks {
            hook(entry);
        }
    }

    pub(crate) async fn run_exchange_complete(&self, summary: &ExchangeSummary) {
        let hooks: Vec<ExchangeCompleteHook> = {
            let list = self.exchange_complete.lock().expect("hook list poisoned");
            list.iter().map(|(_, hook)| Arc::clone(hook)).collect()
        };
        for hook in hooks {
            hook(summary.clone()).await;
        }
    }
}

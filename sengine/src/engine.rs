//! Round controller: streams one exchange across provider round trips.

use std::sync::Arc;
use std::time::Instant;

use async_stream::try_stream;
use futures_util::StreamExt;
use scommon::{BoxFuture, CancelToken};
use sprovider::{
    BoxedChunkStream, ChunkNormalizer, NormalizedEvent, ProviderError, ProviderKind,
    ThreadFormatter, TokenUsage,
};
use stooling::{
    NoopToolObserver, ToolChunk, ToolError, ToolExecutionContext, ToolObserver, ToolRegistry,
};

use crate::executor::{
    denial_result, empty_result, failure_result, parse_arguments, unknown_tool_result,
};
use crate::hooks::ContentChunkInfo;
use crate::{
    AllowAllValidator, EngineError, EngineEvent, ExchangeContext, ExchangeEventStream,
    ExchangeSummary, HookRegistry, RequestInfo, RoundAccumulator, ToolHistoryEntry,
    ToolLifecycleEvent, ToolStage, ToolValidator, ValidationDecision,
};

/// Opens one provider chunk stream for the request the context describes.
/// Called once per round; the thread grows between calls as tool results
/// settle.
pub trait ChunkStreamFactory: Send + Sync {
    fn open_stream<'a>(
        &'a self,
        context: &'a ExchangeContext,
    ) -> BoxFuture<'a, Result<BoxedChunkStream<'static>, ProviderError>>;
}

pub struct EngineBuilder {
    kind: ProviderKind,
    factory: Arc<dyn ChunkStreamFactory>,
    tools: Arc<ToolRegistry>,
    validator: Arc<dyn ToolValidator>,
    observer: Arc<dyn ToolObserver>,
    hooks: Arc<HookRegistry>,
    cancel: CancelToken,
}

impl EngineBuilder {
    pub fn new(kind: ProviderKind, factory: impl ChunkStreamFactory + 'static) -> Self {
        Self {
            kind,
            factory: Arc::new(factory),
            tools: Arc::new(ToolRegistry::new()),
            validator: Arc::new(AllowAllValidator),
            observer: Arc::new(NoopToolObserver),
            hooks: Arc::new(HookRegistry::new()),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Arc::new(tools);
        self
    }

    pub fn with_validator(mut self, validator: impl ToolValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn with_observer(mut self, observer: impl ToolObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<HookRegistry>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            kind: self.kind,
            formatter: ThreadFormatter::for_kind(self.kind),
            factory: self.factory,
            tools: self.tools,
            validator: self.validator,
            observer: self.observer,
            hooks: self.hooks,
            cancel: self.cancel,
        }
    }
}

/// Drives exchanges against one provider. Construction fixes the provider
/// kind, so the normalizer and thread formatter always agree on the wire
/// dialect.
pub struct Engine {
    kind: ProviderKind,
    formatter: ThreadFormatter,
    factory: Arc<dyn ChunkStreamFactory>,
    tools: Arc<ToolRegistry>,
    validator: Arc<dyn ToolValidator>,
    observer: Arc<dyn ToolObserver>,
    hooks: Arc<HookRegistry>,
    cancel: CancelToken,
}

impl Engine {
    pub fn builder(kind: ProviderKind, factory: impl ChunkStreamFactory + 'static) -> EngineBuilder {
        EngineBuilder::new(kind, factory)
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Runs one exchange as a stream of canonical events.
    ///
    /// The loop: open a provider stream, normalize chunks, accumulate tool
    /// calls; once the provider signals the round finished, execute the
    /// accumulated calls strictly in order, append call/result pairs to the
    /// thread, and open the next stream. A stream that ends without a
    /// finish signal is a provider error; half-accumulated calls are never
    /// executed. The loop ends with `Done` when a round produces no tool
    /// calls or the exchange is cancelled, and with `ToolAbort` (no `Done`)
    /// when a validator aborts.
    ///
    /// Cancellation is never an error: in-flight tool calls run to
    /// completion, never-started calls settle as `Canceled`, and the final
    /// `Done` carries `cancelled: true`.
    pub fn stream_exchange(&self, mut context: ExchangeContext) -> ExchangeEventStream<'_> {
        let stream = try_stream! {
            let cancel = self.cancel.child();
            let mut exec_context = ToolExecutionContext::new(context.session_id.clone())
                .with_cancel(cancel.clone());
            if let Some(trace_id) = &context.trace_id {
                exec_context = exec_context.with_trace_id(trace_id.clone());
            }
            for (key, value) in &context.options.metadata {
                exec_context = exec_context.with_metadata(key.clone(), value.clone());
            }

            let mut normalizer = ChunkNormalizer::for_kind(self.kind);
            let mut accumulator = RoundAccumulator::new();
            let mut text = String::new();
            let mut reasoning = String::new();
            let mut usage = TokenUsage::default();
            let mut chunk_count: u64 = 0;
            let mut cancelled = false;

            'exchange: loop {
                let request = RequestInfo {
                    session_id: context.session_id.to_string(),
                    model: context.model.clone(),
                    round: context.round,
                    message_count: context.thread.len(),
                };
                self.hooks.run_before_request(&request, &cancel).await;
                if cancel.is_cancelled() {
                    cancelled = true;
                    break 'exchange;
                }

                let mut chunks = self.factory.open_stream(&context).await?;
                let mut finished = false;

                'round: while let Some(chunk) = chunks.next().await {
                    if cancel.is_cancelled() {
                        cancelled = true;
                        break 'round;
                    }
                    let chunk = chunk?;
                    for event in normalizer.normalize(&chunk) {
                        match event {
                            NormalizedEvent::ContentDelta(delta) => {
                                text.push_str(&delta);
                                chunk_count += 1;
                                yield EngineEvent::ContentDelta(delta.clone());
                                let info = ContentChunkInfo {
                                    delta,
                                    accumulated: text.clone(),
                                    chunk_count,
                                    output_tokens: usage.output_tokens,
                                };
                                self.hooks.run_content_chunk(&info, &cancel).await;
                            }
                            NormalizedEvent::ReasoningDelta(delta) => {
                                reasoning.push_str(&delta);
                                yield EngineEvent::ReasoningDelta(delta);
                            }
                            NormalizedEvent::Usage(snapshot) => {
                                usage.accumulate(snapshot);
                                yield EngineEvent::Usage(snapshot);
                            }
                            NormalizedEvent::ToolCallStart {
                                id,
                                name,
                                arguments,
                                metadata,
                            } => {
                                let detail = metadata.clone();
                                if accumulator.apply_start(id.clone(), name.clone(), arguments, metadata) {
                                    let mut lifecycle =
                                        ToolLifecycleEvent::new(id, name, ToolStage::Preparing);
                                    if let Some(detail) = detail {
                                        lifecycle = lifecycle.with_detail(detail);
                                    }
                                    yield EngineEvent::ToolLifecycle(lifecycle);
                                }
                            }
                            NormalizedEvent::ToolCallDelta { id, arguments } => {
                                accumulator.apply_delta(id.as_deref(), &arguments);
                            }
                            NormalizedEvent::Finished(_) => {
                                finished = true;
                            }
                        }
                    }
                    if cancel.is_cancelled() {
                        cancelled = true;
                        break 'round;
                    }
                }
                drop(chunks);

                let pending = accumulator.take();
                if cancelled {
                    for call in &pending {
                        yield EngineEvent::ToolLifecycle(ToolLifecycleEvent::new(
                            call.id.clone(),
                            call.name.clone(),
                            ToolStage::Canceled,
                        ));
                    }
                    break 'exchange;
                }
                if !finished {
                    Err(EngineError::provider(
                        "provider stream ended without a finish signal",
                    ))?;
                }
                if pending.is_empty() {
                    break 'exchange;
                }

                let mut pending = pending.into_iter();
                while let Some(call) = pending.next() {
                    if cancel.is_cancelled() {
                        cancelled = true;
                        yield EngineEvent::ToolLifecycle(ToolLifecycleEvent::new(
                            call.id.clone(),
                            call.name.clone(),
                            ToolStage::Canceled,
                        ));
                        for rest in pending.by_ref() {
                            yield EngineEvent::ToolLifecycle(ToolLifecycleEvent::new(
                                rest.id,
                                rest.name,
                                ToolStage::Canceled,
                            ));
                        }
                        break;
                    }

                    let arguments = parse_arguments(&call)?;

                    match self
                        .validator
                        .validate(&exec_context, &call.name, &arguments)
                        .await
                    {
                        ValidationDecision::Allow => {}
                        ValidationDecision::Deny { reason } => {
                            let result = denial_result(&reason);
                            yield EngineEvent::ToolLifecycle(
                                ToolLifecycleEvent::new(
                                    call.id.clone(),
                                    call.name.clone(),
                                    ToolStage::Canceled,
                                )
                                .with_detail(result.clone()),
                            );
                            record_result(
                                &mut context,
                                &self.formatter,
                                &self.hooks,
                                call.id,
                                call.name,
                                arguments,
                                result,
                            );
                            continue;
                        }
                        ValidationDecision::Abort { payload } => {
                            yield EngineEvent::ToolAbort {
                                tool_name: call.name,
                                arguments,
                                payload,
                            };
                            return;
                        }
                    }

                    let Some(tool) = self.tools.get(&call.name) else {
                        let result = unknown_tool_result(&call.name);
                        yield EngineEvent::ToolLifecycle(
                            ToolLifecycleEvent::new(
                                call.id.clone(),
                                call.name.clone(),
                                ToolStage::Completed,
                            )
                            .with_detail(result.clone()),
                        );
                        record_result(
                            &mut context,
                            &self.formatter,
                            &self.hooks,
                            call.id,
                            call.name,
                            arguments,
                            result,
                        );
                        continue;
                    };

                    yield EngineEvent::ToolLifecycle(
                        ToolLifecycleEvent::new(call.id.clone(), call.name.clone(), ToolStage::Running)
                            .with_detail(arguments.clone()),
                    );
                    self.observer
                        .on_execution_start(&call.id, &call.name, &exec_context);
                    let started = Instant::now();

                    let mut outcome: Option<Result<serde_json::Value, ToolError>> = None;
                    {
                        let mut tool_stream = tool.invoke(&arguments, &exec_context);
                        while let Some(item) = tool_stream.next().await {
                            match item {
                                Ok(ToolChunk::Status(status)) => {
                                    yield EngineEvent::ToolLifecycle(
                                        ToolLifecycleEvent::new(
                                            call.id.clone(),
                                            call.name.clone(),
                                            ToolStage::Running,
                                        )
                                        .with_detail(serde_json::Value::String(status)),
                                    );
                                }
                                Ok(ToolChunk::Value(value)) => {
                                    outcome = Some(Ok(value));
                                    break;
                                }
                                Err(error) => {
                                    outcome = Some(Err(error));
                                    break;
                                }
                            }
                        }
                    }

                    match outcome {
                        Some(Ok(value)) => {
                            self.observer.on_execution_success(
                                &call.id,
                                &call.name,
                                &exec_context,
                                started.elapsed(),
                            );
                            yield EngineEvent::ToolLifecycle(
                                ToolLifecycleEvent::new(
                                    call.id.clone(),
                                    call.name.clone(),
                                    ToolStage::Completed,
                                )
                                .with_detail(value.clone()),
                            );
                            record_result(
                                &mut context,
                                &self.formatter,
                                &self.hooks,
                                call.id,
                                call.name,
                                arguments,
                                value,
                            );
                        }
                        Some(Err(error)) => {
                            self.observer.on_execution_failure(
                                &call.id,
                                &call.name,
                                &exec_context,
                                &error,
                                started.elapsed(),
                            );
                            let result = failure_result(&error);
                            yield EngineEvent::ToolLifecycle(
                                ToolLifecycleEvent::new(
                                    call.id.clone(),
                                    call.name.clone(),
                                    ToolStage::Error,
                                )
                                .with_detail(result.clone()),
                            );
                            record_result(
                                &mut context,
                                &self.formatter,
                                &self.hooks,
                                call.id,
                                call.name,
                                arguments,
                                result,
                            );
                        }
                        None => {
                            let error = ToolError::execution("tool stream ended without a result")
                                .with_tool_name(call.name.clone())
                                .with_tool_call_id(call.id.clone());
                            self.observer.on_execution_failure(
                                &call.id,
                                &call.name,
                                &exec_context,
                                &error,
                                started.elapsed(),
                            );
                            let result = empty_result();
                            yield EngineEvent::ToolLifecycle(
                                ToolLifecycleEvent::new(
                                    call.id.clone(),
                                    call.name.clone(),
                                    ToolStage::Error,
                                )
                                .with_detail(result.clone()),
                            );
                            record_result(
                                &mut context,
                                &self.formatter,
                                &self.hooks,
                                call.id,
                                call.name,
                                arguments,
                                result,
                            );
                        }
                    }
                }
                if cancelled {
                    break 'exchange;
                }

                context.advance_round();
                normalizer.reset_round();
            }

            let summary = ExchangeSummary {
                text,
                reasoning,
                usage,
                history: context.history.clone(),
                rounds: context.round,
                cancelled,
            };
            if !cancelled {
                self.hooks.run_exchange_complete(&summary).await;
            }
            yield EngineEvent::Done(summary);
        };
        Box::pin(stream)
    }

    /// Drains [`Engine::stream_exchange`] and returns the final summary.
    /// A validator abort surfaces as an `Aborted` error carrying the
    /// validator payload.
    pub async fn run_exchange(
        &self,
        context: ExchangeContext,
    ) -> Result<ExchangeSummary, EngineError> {
        let mut stream = self.stream_exchange(context);
        while let Some(event) = stream.next().await {
            match event? {
                EngineEvent::ToolAbort {
                    tool_name, payload, ..
                } => {
                    let mut error = EngineError::aborted(
                        format!("validator aborted the exchange on tool '{tool_name}'"),
                        payload,
                    );
                    error.tool_name = Some(tool_name);
                    return Err(error);
                }
                EngineEvent::Done(summary) => return Ok(summary),
                _ => {}
            }
        }
        Err(EngineError::provider(
            "provider stream ended without completing the exchange",
        ))
    }
}

/// Settles one call: the tool-result hooks may rewrite the entry, then the
/// thread gains the call/result pair and the history records it.
fn record_result(
    context: &mut ExchangeContext,
    formatter: &ThreadFormatter,
    hooks: &HookRegistry,
    call_id: String,
    tool_name: String,
    arguments: serde_json::Value,
    result: serde_json::Value,
) {
    let mut entry = ToolHistoryEntry {
        call_id,
        tool_name,
        arguments,
        result,
        round: context.round,
    };
    hooks.run_tool_result(&mut entry);
    context.push_message(formatter.tool_call_message(
        &entry.call_id,
        &entry.tool_name,
        &entry.arguments,
    ));
    context.push_message(formatter.tool_result_message(
        &entry.call_id,
        &entry.tool_name,
        &entry.result,
    ));
    context.history.push(entry);
}

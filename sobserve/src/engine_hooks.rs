//! Pre-built exchange hooks wired into a [`HookRegistry`].

use sengine::{HookHandle, HookRegistry};

/// Registers tracing hooks for the request, content, and completion points.
/// Returns the handles so the caller can detach them later.
pub fn install_tracing_hooks(hooks: &HookRegistry) -> Vec<HookHandle> {
    let before_request = hooks.on_before_request(|request, _cancel| {
        Box::pin(async move {
            tracing::info!(
                phase = "exchange",
                event = "request_start",
                session_id = request.session_id,
                model = request.model,
                round = request.round,
                message_count = request.message_count
            );
        })
    });

    let content_chunk = hooks.on_content_chunk(|info, _cancel| {
        Box::pin(async move {
            tracing::trace!(
                phase = "exchange",
                event = "content_chunk",
                chunk_count = info.chunk_count,
                delta_len = info.delta.len(),
                accumulated_len = info.accumulated.len()
            );
        })
    });

    let tool_result = hooks.on_tool_result(|entry| {
        tracing::debug!(
            phase = "exchange",
            event = "tool_result",
            tool_name = entry.tool_name,
            tool_call_id = entry.call_id,
            round = entry.round
        );
    });

    let exchange_complete = hooks.on_exchange_complete(|summary| {
        Box::pin(async move {
            tracing::info!(
                phase = "exchange",
                event = "complete",
                rounds = summary.rounds,
                tool_calls = summary.history.len(),
                text_len = summary.text.len(),
                input_tokens = summary.usage.input_tokens,
                output_tokens = summary.usage.output_tokens,
                cancelled = summary.cancelled
            );
        })
    });

    vec![before_request, content_chunk, tool_result, exchange_complete]
}

/// Registers metrics hooks counting requests and recording per-exchange
/// round and token totals.
pub fn install_metrics_hooks(hooks: &HookRegistry) -> Vec<HookHandle> {
    let before_request = hooks.on_before_request(|request, _cancel| {
        Box::pin(async move {
            metrics::counter!(
                "skein_exchange_request_total",
                "model" => request.model
            )
            .increment(1);
        })
    });

    let exchange_complete = hooks.on_exchange_complete(|summary| {
        Box::pin(async move {
            metrics::counter!(
                "skein_exchange_complete_total",
                "cancelled" => summary.cancelled.to_string()
            )
            .increment(1);
            metrics::histogram!("skein_exchange_rounds").record(summary.rounds as f64);
            metrics::histogram!("skein_exchange_total_tokens")
                .record(summary.usage.total_tokens as f64);
        })
    });

    vec![before_request, exchange_complete]
}

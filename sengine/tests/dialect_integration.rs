use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use scommon::BoxFuture;
use sengine::prelude::*;
use serde_json::{Value, json};
use sprovider::{BoxedChunkStream, ProviderError, ToolDefinition, VecChunkStream};

/// Serves scripted chunks per round and snapshots the thread it was asked
/// to send, so tests can assert the provider-native rewrite shapes.
struct RecordingFactory {
    rounds: Mutex<VecDeque<Vec<Value>>>,
    threads: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl RecordingFactory {
    fn new(rounds: Vec<Vec<Value>>) -> Self {
        Self {
            rounds: Mutex::new(rounds.into()),
            threads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn thread_snapshots(&self) -> Arc<Mutex<Vec<Vec<Value>>>> {
        Arc::clone(&self.threads)
    }
}

impl ChunkStreamFactory for RecordingFactory {
    fn open_stream<'a>(
        &'a self,
        context: &'a ExchangeContext,
    ) -> BoxFuture<'a, Result<BoxedChunkStream<'static>, ProviderError>> {
        Box::pin(async move {
            self.threads
                .lock()
                .expect("snapshots poisoned")
                .push(context.thread.clone());
            let chunks = self
                .rounds
                .lock()
                .expect("script poisoned")
                .pop_front()
                .unwrap_or_default();
            Ok(Box::pin(VecChunkStream::from_values(chunks)) as BoxedChunkStream<'static>)
        })
    }
}

fn lookup_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register_sync_fn(
        ToolDefinition {
            name: "lookup".to_string(),
            description: "Looks up a query".to_string(),
            input_schema: "{\"type\":\"object\"}".to_string(),
        },
        |args, _ctx| Ok(json!({"hits": 1, "echo": args})),
    );
    registry
}

#[tokio::test]
async fn claude_dialect_round_trip_rewrites_the_thread_natively() {
    let tool_round = vec![
        json!({"type": "message_start", "message": {"usage": {"input_tokens": 12, "output_tokens": 1}}}),
        json!({"type": "content_block_delta", "index": 0, "delta": {"type": "thinking_delta", "thinking": "mull"}}),
        json!({"type": "content_block_start", "index": 1, "content_block": {"type": "tool_use", "id": "toolu_01", "name": "lookup"}}),
        json!({"type": "content_block_delta", "index": 1, "delta": {"type": "input_json_delta", "partial_json": "{\"q\":"}}),
        json!({"type": "content_block_delta", "index": 1, "delta": {"type": "input_json_delta", "partial_json": "\"rust\"}"}}),
        json!({"type": "message_delta", "delta": {"stop_reason": "tool_use"}, "usage": {"output_tokens": 7}}),
        json!({"type": "message_stop"}),
    ];
    let text_round = vec![
        json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "answer"}}),
        json!({"type": "message_delta", "delta": {"stop_reason": "end_turn"}, "usage": {"output_tokens": 3}}),
        json!({"type": "message_stop"}),
    ];

    let factory = RecordingFactory::new(vec![tool_round, text_round]);
    let snapshots = factory.thread_snapshots();
    let engine = Engine::builder(ProviderKind::Claude, factory)
        .with_tools(lookup_registry())
        .build();

    let context = ExchangeContext::new(
        "session-1",
        "claude-test",
        vec![json!({"role": "user", "content": "go"})],
    );
    let summary = engine.run_exchange(context).await.expect("should finish");

    assert_eq!(summary.text, "answer");
    assert_eq!(summary.reasoning, "mull");
    assert_eq!(summary.rounds, 1);
    assert_eq!(summary.history.len(), 1);
    assert_eq!(summary.history[0].call_id, "toolu_01");
    assert_eq!(summary.history[0].arguments, json!({"q": "rust"}));

    let snapshots = snapshots.lock().expect("snapshots poisoned");
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].len(), 1);

    let second_request = &snapshots[1];
    assert_eq!(second_request.len(), 3);
    assert_eq!(second_request[1]["role"], json!("assistant"));
    assert_eq!(second_request[1]["content"][0]["type"], json!("tool_use"));
    assert_eq!(second_request[1]["content"][0]["id"], json!("toolu_01"));
    assert_eq!(second_request[1]["content"][0]["input"], json!({"q": "rust"}));
    assert_eq!(second_request[2]["role"], json!("user"));
    assert_eq!(
        second_request[2]["content"][0]["type"],
        json!("tool_result")
    );
    assert_eq!(
        second_request[2]["content"][0]["tool_use_id"],
        json!("toolu_01")
    );
}

#[tokio::test]
async fn ollama_dialect_synthesizes_ids_and_accumulates_usage_across_rounds() {
    let tool_round = vec![
        json!({"message": {"tool_calls": [{"function": {"name": "lookup", "arguments": {"q": "rust"}}}]}, "done": false}),
        json!({"done": true, "prompt_eval_count": 20, "eval_count": 8}),
    ];
    let text_round = vec![
        json!({"message": {"content": "done"}, "done": false}),
        json!({"done": true, "prompt_eval_count": 30, "eval_count": 4}),
    ];

    let factory = RecordingFactory::new(vec![tool_round, text_round]);
    let snapshots = factory.thread_snapshots();
    let engine = Engine::builder(ProviderKind::Ollama, factory)
        .with_tools(lookup_registry())
        .build();

    let context = ExchangeContext::new(
        "session-1",
        "llama-test",
        vec![json!({"role": "user", "content": "go"})],
    );
    let summary = engine.run_exchange(context).await.expect("should finish");

    assert_eq!(summary.text, "done");
    assert_eq!(summary.history[0].call_id, "call_0");
    assert_eq!(summary.history[0].arguments, json!({"q": "rust"}));
    assert_eq!(summary.usage.input_tokens, 50);
    assert_eq!(summary.usage.output_tokens, 12);

    let snapshots = snapshots.lock().expect("snapshots poisoned");
    let second_request = &snapshots[1];
    assert_eq!(second_request[1]["role"], json!("assistant"));
    assert_eq!(
        second_request[1]["tool_calls"][0]["function"]["name"],
        json!("lookup")
    );
    assert_eq!(second_request[2]["role"], json!("tool"));
    assert_eq!(second_request[2]["tool_name"], json!("lookup"));
}

//! Tool trait contract for registry-managed capabilities.
//!
//! ```rust
//! use serde_json::json;
//! use sprovider::ToolDefinition;
//! use stooling::{FunctionTool, Tool};
//!
//! let tool = FunctionTool::new(
//!     ToolDefinition {
//!         name: "echo".to_string(),
//!         description: "Echoes input".to_string(),
//!         input_schema: r#"{"type":"object"}"#.to_string(),
//!     },
//!     |args, _ctx| async move { Ok(args) },
//! );
//!
//! assert_eq!(tool.definition().name, "echo");
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use futures_util::stream;
use scommon::BoxFuture;
use serde_json::Value;
use sprovider::ToolDefinition;

use crate::{ToolError, ToolExecutionContext};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// One item of a tool invocation: zero or more informational status lines
/// followed by exactly one final value.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolChunk {
    Status(String),
    Value(Value),
}

pub type ToolStream<'a> = Pin<Box<dyn Stream<Item = Result<ToolChunk, ToolError>> + Send + 'a>>;

pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn invoke<'a>(&'a self, args: &'a Value, context: &'a ToolExecutionContext) -> ToolStream<'a>;
}

type ToolHandler = dyn Fn(Value, ToolExecutionContext) -> ToolFuture<'static, Result<Value, ToolError>>
    + Send
    + Sync;

/// Adapts a plain async closure into the streaming [`Tool`] contract by
/// emitting its output as a single final value.
pub struct FunctionTool {
    definition: ToolDefinition,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(Value, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> =
            Arc::new(move |args, context| Box::pin(handler(args, context)));

        Self {
            definition,
            handler,
        }
    }
}

impl Tool for FunctionTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn invoke<'a>(&'a self, args: &'a Value, context: &'a ToolExecutionContext) -> ToolStream<'a> {
        let future = (self.handler)(args.clone(), context.clone());
        Box::pin(stream::once(async move {
            future.await.map(ToolChunk::Value)
        }))
    }
}

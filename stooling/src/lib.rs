//! Capability layer for registering and executing tools.

mod args;
mod error;
mod observer;
mod registry;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        FunctionTool, NoopToolObserver, Tool, ToolChunk, ToolError, ToolErrorKind,
        ToolExecutionContext, ToolObserver, ToolRegistry, ToolStream,
    };
}

pub use args::{parse_json_object, parse_json_value, required_string};
pub use error::{ToolError, ToolErrorKind};
pub use observer::{NoopToolObserver, ToolObserver};
pub use registry::ToolRegistry;
pub use tool::{FunctionTool, Tool, ToolChunk, ToolFuture, ToolStream};
pub use types::ToolExecutionContext;

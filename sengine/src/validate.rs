//! Validation gate consulted before every tool execution.
//!
//! ```rust
//! use scommon::BoxFuture;
//! use sengine::{ToolValidator, ValidationDecision};
//! use serde_json::Value;
//! use stooling::ToolExecutionContext;
//!
//! struct ReadOnly;
//!
//! impl ToolValidator for ReadOnly {
//!     fn validate<'a>(
//!         &'a self,
//!         _context: &'a ToolExecutionContext,
//!         tool_name: &'a str,
//!         _arguments: &'a Value,
//!     ) -> BoxFuture<'a, ValidationDecision> {
//!         let decision = if tool_name.starts_with("read_") {
//!             ValidationDecision::Allow
//!         } else {
//!             ValidationDecision::Deny {
//!                 reason: "read-only session".to_string(),
//!             }
//!         };
//!         Box::pin(async move { decision })
//!     }
//! }
//! ```

use scommon::BoxFuture;
use serde_json::Value;
use stooling::ToolExecutionContext;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationDecision {
    /// Execute the call.
    Allow,
    /// Skip the call; the reason is folded into a synthetic result so the
    /// model sees why and the round continues.
    Deny { reason: String },
    /// Stop the whole exchange. The payload reaches the caller verbatim.
    Abort { payload: Value },
}

pub trait ToolValidator: Send + Sync {
    fn validate<'a>(
        &'a self,
        context: &'a ToolExecutionContext,
        tool_name: &'a str,
        arguments: &'a Value,
    ) -> BoxFuture<'a, ValidationDecision>;
}

/// Default gate: every call passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllValidator;

impl ToolValidator for AllowAllValidator {
    fn validate<'a>(
        &'a self,
        _context: &'a ToolExecutionContext,
        _tool_name: &'a str,
        _arguments: &'a Value,
    ) -> BoxFuture<'a, ValidationDecision> {
        Box::pin(async move { ValidationDecision::Allow })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn allow_all_passes_every_call() {
        let validator = AllowAllValidator;
        let context = ToolExecutionContext::new("session-1");
        let decision = validator
            .validate(&context, "anything", &json!({}))
            .await;
        assert_eq!(decision, ValidationDecision::Allow);
    }
}

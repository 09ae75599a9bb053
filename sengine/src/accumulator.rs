//! Assembles partial tool calls from normalized deltas within one round.

use serde_json::Value;

use crate::PendingToolCall;

/// Collects tool calls announced by the normalizer in arrival order and
/// concatenates argument fragments onto them. Reset between rounds so
/// provider indexes cannot collide across requests.
#[derive(Debug, Default)]
pub struct RoundAccumulator {
    calls: Vec<PendingToolCall>,
}

impl RoundAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new call. Returns `false` when the id was already announced,
    /// in which case the start is ignored.
    pub fn apply_start(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
        metadata: Option<Value>,
    ) -> bool {
        let id = id.into();
        if self.calls.iter().any(|call| call.id == id) {
            return false;
        }
        self.calls.push(PendingToolCall {
            id,
            name: name.into(),
            arguments: arguments.into(),
            metadata,
        });
        true
    }

    /// Appends an argument fragment to the call with the given id, or to the
    /// most recently opened call when no id accompanies the delta. A delta
    /// that matches no open call is dropped.
    pub fn apply_delta(&mut self, id: Option<&str>, fragment: &str) {
        let target = match id {
            Some(id) => self.calls.iter_mut().find(|call| call.id == id),
            None => self.calls.last_mut(),
        };
        if let Some(call) = target {
            call.arguments.push_str(fragment);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Drains the accumulated calls in arrival order, leaving the
    /// accumulator ready for the next round.
    pub fn take(&mut self) -> Vec<PendingToolCall> {
        std::mem::take(&mut self.calls)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deltas_concatenate_onto_the_announced_call() {
        let mut accumulator = RoundAccumulator::new();
        assert!(accumulator.apply_start("call_1", "search", "", None));
        accumulator.apply_delta(Some("call_1"), "{\"que");
        accumulator.apply_delta(Some("call_1"), "ry\":\"rust\"}");

        let calls = accumulator.take();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arguments, "{\"query\":\"rust\"}");
        assert!(accumulator.is_empty());
    }

    #[test]
    fn unaddressed_delta_targets_the_most_recent_call() {
        let mut accumulator = RoundAccumulator::new();
        accumulator.apply_start("call_1", "first", "{}", None);
        accumulator.apply_start("call_2", "second", "", None);
        accumulator.apply_delta(None, "{\"a\":1}");

        let calls = accumulator.take();
        assert_eq!(calls[0].arguments, "{}");
        assert_eq!(calls[1].arguments, "{\"a\":1}");
    }

    #[test]
    fn duplicate_start_is_ignored() {
        let mut accumulator = RoundAccumulator::new();
        assert!(accumulator.apply_start("call_1", "search", "", None));
        assert!(!accumulator.apply_start("call_1", "search", "again", Some(json!({"x": 1}))));
        assert_eq!(accumulator.len(), 1);
        assert_eq!(accumulator.take()[0].arguments, "");
    }

    #[test]
    fn delta_with_no_open_call_is_dropped() {
        let mut accumulator = RoundAccumulator::new();
        accumulator.apply_delta(None, "{\"orphan\":true}");
        accumulator.apply_delta(Some("missing"), "{}");
        assert!(accumulator.is_empty());
    }

    #[test]
    fn calls_drain_in_arrival_order() {
        let mut accumulator = RoundAccumulator::new();
        accumulator.apply_start("b", "beta", "", None);
        accumulator.apply_start("a", "alpha", "", None);

        let ids: Vec<_> = accumulator.take().into_iter().map(|call| call.id).collect();
        assert_eq!(ids, vec!["b".to_string(), "a".to_string()]);
    }
}

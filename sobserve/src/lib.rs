//! Production-friendly observability for tool execution and exchange hooks.
//!
//! ```rust
//! use sobserve::{MetricsToolObserver, SafeToolObserver, TracingToolObserver};
//!
//! let _tracing = SafeToolObserver::new(TracingToolObserver);
//! let _metrics = MetricsToolObserver;
//! ```

mod engine_hooks;
mod metrics_observer;
mod safe_observer;
mod tracing_observer;

pub use engine_hooks::{install_metrics_hooks, install_tracing_hooks};
pub use metrics_observer::MetricsToolObserver;
pub use safe_observer::SafeToolObserver;
pub use tracing_observer::TracingToolObserver;

pub mod prelude {
    pub use crate::{
        MetricsToolObserver, SafeToolObserver, TracingToolObserver, install_metrics_hooks,
        install_tracing_hooks,
    };
}

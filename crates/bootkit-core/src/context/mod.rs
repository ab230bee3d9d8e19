//! Per-invocation runtime context
//!
//! [`RuntimeContext::bootstrap`] resolves paths, loads configuration, applies
//! path overrides, creates directories and opens the logger, in that order.
//! Command handlers receive the finished context by reference.

mod runtime;
mod stage;

pub use runtime::RuntimeContext;
pub use stage::Stage;

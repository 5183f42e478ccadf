//! `vitrine-observability` — process-level tracing/logging setup.

pub mod tracing;

pub use tracing::{init, init_with_default_filter};

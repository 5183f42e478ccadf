//! Ledger storage boundary.
//!
//! This module defines the storage contract for the ledger without making
//! backend assumptions, plus the two shipped backends: an in-memory store for
//! tests/dev and a Postgres store for production.

pub mod in_memory;
pub mod postgres;
pub mod schema;
pub mod r#trait;

pub use in_memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
pub use r#trait::LedgerStore;

use vitrine_catalog::{Color, DEFAULT_COLORS};
use vitrine_core::LedgerResult;

/// Idempotently seed the default colors.
///
/// Safe to run on every startup; existing colors are returned as-is.
pub async fn seed_default_colors<S>(store: &S) -> LedgerResult<Vec<Color>>
where
    S: LedgerStore + ?Sized,
{
    let mut colors = Vec::with_capacity(DEFAULT_COLORS.len());
    for name in DEFAULT_COLORS {
        colors.push(store.ensure_color(name).await?);
    }
    Ok(colors)
}

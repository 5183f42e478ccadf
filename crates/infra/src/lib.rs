//! `vitrine-infra` — storage backends and the transactional ledger engine.
//!
//! The domain crates stay pure; everything that talks to a store lives here:
//! the [`LedgerStore`] contract, its in-memory and Postgres backends, schema
//! bootstrap, environment configuration, and the [`LedgerEngine`] the
//! presentation layer calls.

pub mod config;
pub mod engine;
pub mod store;

pub use config::StoreConfig;
pub use engine::LedgerEngine;
pub use store::schema::ensure_schema;
pub use store::{InMemoryLedgerStore, LedgerStore, PostgresLedgerStore, seed_default_colors};

//! `vitrine-ledger` — stock table and sale log domain types.
//!
//! The mutable [`StockEntry`] quantities, the append-only [`SaleRecord`] log,
//! and the pure withdrawal check shared by every store backend. Transactional
//! coordination lives in `vitrine-infra`.

pub mod entry;
pub mod report;
pub mod sale;

pub use entry::StockEntry;
pub use report::StockLine;
pub use sale::{SaleRecord, SellRequest};

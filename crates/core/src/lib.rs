//! `vitrine-core` — ledger foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the ledger error taxonomy, and validated quantity values.

pub mod error;
pub mod id;
pub mod quantity;

pub use error::{LedgerError, LedgerResult};
pub use id::{ColorId, ProductId, SaleRecordId, StockEntryId};
pub use quantity::{Quantity, SaleQuantity};

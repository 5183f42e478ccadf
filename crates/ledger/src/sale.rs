use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vitrine_core::{ColorId, LedgerResult, ProductId, SaleQuantity, SaleRecordId, StockEntryId};

/// Append-only record of one withdrawal.
///
/// Carries the product and color of the entry it was drawn from, so the sale
/// log reconciles against stock deltas without another join. Never mutated or
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: SaleRecordId,
    pub product_id: ProductId,
    pub color_id: ColorId,
    pub quantity: SaleQuantity,
    pub sold_on: NaiveDate,
    pub note: String,
}

/// Typed sell request from the presentation boundary.
///
/// The raw quantity stays an `f64` here; [`SellRequest::amount`] is the
/// validation gate the engine runs before any storage access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellRequest {
    pub stock_entry_id: StockEntryId,
    pub quantity: f64,
    pub note: String,
}

impl SellRequest {
    pub fn new(stock_entry_id: StockEntryId, quantity: f64, note: impl Into<String>) -> Self {
        Self {
            stock_entry_id,
            quantity,
            note: note.into(),
        }
    }

    /// Validate the requested amount: strictly positive and finite.
    pub fn amount(&self) -> LedgerResult<SaleQuantity> {
        SaleQuantity::new(self.quantity)
    }
}

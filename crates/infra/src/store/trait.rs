use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use vitrine_catalog::{Color, NewProduct, Product};
use vitrine_core::{ColorId, LedgerResult, ProductId, Quantity, SaleQuantity, StockEntryId};
use vitrine_ledger::{SaleRecord, StockEntry, StockLine};

/// Storage contract for the inventory ledger.
///
/// ## Unit of work
///
/// `withdraw` is the transactional core. Implementations must run the
/// stock-table decrement and the sale-log append as **one atomic unit**: a
/// reader never observes the decrement without the sale record or vice versa,
/// and a failure leaves both untouched.
///
/// ## Decrement semantics
///
/// The sufficiency check happens *inside* the unit of work and must be
/// linearizable with respect to other withdrawals on the same entry: two
/// concurrent callers can never both pass the check and drive the quantity
/// past zero. Any quantity read outside `withdraw` is advisory only.
///
/// ## Implementation requirements
///
/// - Enforce the (product, color) uniqueness of stock entries.
/// - Keep quantities non-negative at every observable point.
/// - Convert unbounded lock waits into `Busy` rather than blocking forever.
/// - Fail closed: if the backend is unreachable, reads and writes error, never
///   silently succeed in part.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // --- catalog ---

    /// Register a product. Names are unique; duplicates are a `Conflict`.
    async fn create_product(&self, params: NewProduct) -> LedgerResult<Product>;

    /// Insert a color if its name is new, otherwise return the existing one.
    async fn ensure_color(&self, name: &str) -> LedgerResult<Color>;

    async fn get_product(&self, id: ProductId) -> LedgerResult<Product>;

    async fn get_color(&self, id: ColorId) -> LedgerResult<Color>;

    /// All products, ordered by name.
    async fn list_products(&self) -> LedgerResult<Vec<Product>>;

    // --- stock table ---

    async fn get_stock_entry(&self, id: StockEntryId) -> LedgerResult<StockEntry>;

    /// Stock entries joined with their product and color, ordered by product
    /// name.
    async fn list_stock(&self) -> LedgerResult<Vec<StockLine>>;

    /// Administrative restock: create the entry for a new (product, color)
    /// pair or add to the existing one. The referenced product and color must
    /// exist.
    async fn receive_stock(
        &self,
        product_id: ProductId,
        color_id: ColorId,
        amount: Quantity,
        as_of: NaiveDate,
    ) -> LedgerResult<StockEntry>;

    // --- sale log + unit of work ---

    /// Atomically decrement the entry and append the paired sale record.
    ///
    /// Returns `NotFound` if the entry does not exist, `InsufficientStock` if
    /// the amount exceeds what is on hand (no mutation in either case), and
    /// `Busy` when contention on the entry outlasts the configured bound.
    async fn withdraw(
        &self,
        entry_id: StockEntryId,
        amount: SaleQuantity,
        as_of: NaiveDate,
        note: &str,
    ) -> LedgerResult<SaleRecord>;

    /// Sale records drawn from one entry, in append order.
    async fn sales_for(&self, entry_id: StockEntryId) -> LedgerResult<Vec<SaleRecord>>;
}

#[async_trait]
impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    async fn create_product(&self, params: NewProduct) -> LedgerResult<Product> {
        (**self).create_product(params).await
    }

    async fn ensure_color(&self, name: &str) -> LedgerResult<Color> {
        (**self).ensure_color(name).await
    }

    async fn get_product(&self, id: ProductId) -> LedgerResult<Product> {
        (**self).get_product(id).await
    }

    async fn get_color(&self, id: ColorId) -> LedgerResult<Color> {
        (**self).get_color(id).await
    }

    async fn list_products(&self) -> LedgerResult<Vec<Product>> {
        (**self).list_products().await
    }

    async fn get_stock_entry(&self, id: StockEntryId) -> LedgerResult<StockEntry> {
        (**self).get_stock_entry(id).await
    }

    async fn list_stock(&self) -> LedgerResult<Vec<StockLine>> {
        (**self).list_stock().await
    }

    async fn receive_stock(
        &self,
        product_id: ProductId,
        color_id: ColorId,
        amount: Quantity,
        as_of: NaiveDate,
    ) -> LedgerResult<StockEntry> {
        (**self).receive_stock(product_id, color_id, amount, as_of).await
    }

    async fn withdraw(
        &self,
        entry_id: StockEntryId,
        amount: SaleQuantity,
        as_of: NaiveDate,
        note: &str,
    ) -> LedgerResult<SaleRecord> {
        (**self).withdraw(entry_id, amount, as_of, note).await
    }

    async fn sales_for(&self, entry_id: StockEntryId) -> LedgerResult<Vec<SaleRecord>> {
        (**self).sales_for(entry_id).await
    }
}

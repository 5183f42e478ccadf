//! The transactional core of the ledger.
//!
//! [`LedgerEngine`] is the narrow interface the presentation layer consumes.
//! It validates requests before they reach storage and delegates the
//! decrement + append pair to the store's unit of work, so a sell either
//! fully happens or leaves no trace.

use chrono::Utc;
use tracing::{info, instrument};

use vitrine_catalog::{Color, NewProduct, Product};
use vitrine_core::{ColorId, LedgerResult, ProductId, Quantity, StockEntryId};
use vitrine_ledger::{SaleRecord, SellRequest, StockEntry, StockLine};

use crate::store::LedgerStore;

/// Transactional ledger engine over a [`LedgerStore`] backend.
///
/// Stateless across calls: every `sell` is a single-shot transaction, and the
/// engine holds no identity or session state.
#[derive(Debug, Clone)]
pub struct LedgerEngine<S> {
    store: S,
}

impl<S> LedgerEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: LedgerStore> LedgerEngine<S> {
    /// Record a sale against a stock entry.
    ///
    /// Non-positive quantities are rejected before any storage access. The
    /// store then runs the sufficiency check, the decrement, and the sale
    /// append as one unit of work; on any failure nothing is persisted.
    #[instrument(
        skip(self, request),
        fields(stock_entry_id = %request.stock_entry_id, quantity = request.quantity),
        err
    )]
    pub async fn sell(&self, request: SellRequest) -> LedgerResult<SaleRecord> {
        let amount = request.amount()?;
        let today = Utc::now().date_naive();

        let record = self
            .store
            .withdraw(request.stock_entry_id, amount, today, &request.note)
            .await?;

        info!(sale_id = %record.id, "sale recorded");
        Ok(record)
    }

    /// Current stock joined with catalog data, ordered by product name.
    pub async fn list_stock(&self) -> LedgerResult<Vec<StockLine>> {
        self.store.list_stock().await
    }

    /// All products, ordered by name.
    pub async fn list_products(&self) -> LedgerResult<Vec<Product>> {
        self.store.list_products().await
    }

    /// Advisory read of a single entry (e.g. a UI hint before selling).
    /// The authoritative sufficiency check always happens inside `sell`.
    pub async fn stock_entry(&self, id: StockEntryId) -> LedgerResult<StockEntry> {
        self.store.get_stock_entry(id).await
    }

    /// Sale records drawn from one entry, in append order.
    pub async fn sales_for(&self, id: StockEntryId) -> LedgerResult<Vec<SaleRecord>> {
        self.store.sales_for(id).await
    }

    /// Conservation check for one entry: the quantity at tracking start must
    /// equal what is on hand now plus everything sold since.
    pub async fn reconcile(&self, id: StockEntryId, initial: Quantity) -> LedgerResult<bool> {
        let entry = self.store.get_stock_entry(id).await?;
        let sold: f64 = self
            .store
            .sales_for(id)
            .await?
            .iter()
            .map(|s| s.quantity.get())
            .sum();
        Ok((initial.get() - sold - entry.quantity.get()).abs() < 1e-9)
    }

    // --- administrative surface (outside the sell hot path) ---

    pub async fn create_product(&self, params: NewProduct) -> LedgerResult<Product> {
        self.store.create_product(params).await
    }

    pub async fn ensure_color(&self, name: &str) -> LedgerResult<Color> {
        self.store.ensure_color(name).await
    }

    /// Restock a (product, color) pair, creating its entry on first receipt.
    pub async fn receive_stock(
        &self,
        product_id: ProductId,
        color_id: ColorId,
        amount: Quantity,
    ) -> LedgerResult<StockEntry> {
        let today = Utc::now().date_naive();
        self.store
            .receive_stock(product_id, color_id, amount, today)
            .await
    }
}

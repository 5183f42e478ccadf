use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use vitrine_catalog::{Color, NewColor, NewProduct, Product};
use vitrine_core::{
    ColorId, LedgerError, LedgerResult, ProductId, Quantity, SaleQuantity, SaleRecordId,
    StockEntryId,
};
use vitrine_ledger::{SaleRecord, StockEntry, StockLine};

use super::r#trait::LedgerStore;

/// In-memory ledger store.
///
/// Intended for tests/dev. Not optimized for performance. A single `RwLock`
/// over the whole state makes the decrement + append pair in [`withdraw`]
/// one critical section; that lock section is this backend's unit of work,
/// so readers never observe a decrement without its paired sale record.
///
/// [`withdraw`]: LedgerStore::withdraw
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    products: HashMap<ProductId, Product>,
    colors: HashMap<ColorId, Color>,
    entries: HashMap<StockEntryId, StockEntry>,
    // (product, color) uniqueness index for stock entries.
    entry_by_pair: HashMap<(ProductId, ColorId), StockEntryId>,
    sales: Vec<SaleRecord>,
    next_product_id: i64,
    next_color_id: i64,
    next_entry_id: i64,
    next_sale_id: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| LedgerError::storage("lock poisoned"))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| LedgerError::storage("lock poisoned"))
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn create_product(&self, params: NewProduct) -> LedgerResult<Product> {
        let mut state = self.write()?;
        if state.products.values().any(|p| p.name == params.name) {
            return Err(LedgerError::conflict(format!(
                "product name '{}' already exists",
                params.name
            )));
        }
        let id = ProductId::new(next(&mut state.next_product_id));
        let product = Product::new(id, params)?;
        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn ensure_color(&self, name: &str) -> LedgerResult<Color> {
        let mut state = self.write()?;
        if let Some(existing) = state.colors.values().find(|c| c.name == name) {
            return Ok(existing.clone());
        }
        let id = ColorId::new(next(&mut state.next_color_id));
        let color = Color::new(
            id,
            NewColor {
                name: name.to_string(),
            },
        )?;
        state.colors.insert(id, color.clone());
        Ok(color)
    }

    async fn get_product(&self, id: ProductId) -> LedgerResult<Product> {
        self.read()?
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found("product"))
    }

    async fn get_color(&self, id: ColorId) -> LedgerResult<Color> {
        self.read()?
            .colors
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found("color"))
    }

    async fn list_products(&self) -> LedgerResult<Vec<Product>> {
        let state = self.read()?;
        let mut products: Vec<Product> = state.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn get_stock_entry(&self, id: StockEntryId) -> LedgerResult<StockEntry> {
        self.read()?
            .entries
            .get(&id)
            .copied()
            .ok_or_else(|| LedgerError::not_found("stock entry"))
    }

    async fn list_stock(&self) -> LedgerResult<Vec<StockLine>> {
        let state = self.read()?;
        let mut lines = Vec::with_capacity(state.entries.len());
        for entry in state.entries.values() {
            let product = state
                .products
                .get(&entry.product_id)
                .ok_or_else(|| LedgerError::storage("stock entry references missing product"))?;
            let color = state
                .colors
                .get(&entry.color_id)
                .ok_or_else(|| LedgerError::storage("stock entry references missing color"))?;
            lines.push(StockLine {
                id: entry.id,
                product_code: product.code.clone(),
                product_name: product.name.clone(),
                color_name: color.name.clone(),
                quantity: entry.quantity,
                unit: product.unit,
                last_updated: entry.updated_on,
            });
        }
        lines.sort_by(|a, b| {
            a.product_name
                .cmp(&b.product_name)
                .then_with(|| a.color_name.cmp(&b.color_name))
        });
        Ok(lines)
    }

    async fn receive_stock(
        &self,
        product_id: ProductId,
        color_id: ColorId,
        amount: Quantity,
        as_of: NaiveDate,
    ) -> LedgerResult<StockEntry> {
        let mut state = self.write()?;
        if !state.products.contains_key(&product_id) {
            return Err(LedgerError::not_found("product"));
        }
        if !state.colors.contains_key(&color_id) {
            return Err(LedgerError::not_found("color"));
        }

        match state.entry_by_pair.get(&(product_id, color_id)).copied() {
            Some(entry_id) => {
                let entry = state
                    .entries
                    .get(&entry_id)
                    .copied()
                    .ok_or_else(|| LedgerError::storage("stock entry index out of sync"))?;
                let updated = entry.receive(amount, as_of)?;
                state.entries.insert(entry_id, updated);
                Ok(updated)
            }
            None => {
                let id = StockEntryId::new(next(&mut state.next_entry_id));
                let entry = StockEntry {
                    id,
                    product_id,
                    color_id,
                    quantity: amount,
                    updated_on: as_of,
                };
                state.entries.insert(id, entry);
                state.entry_by_pair.insert((product_id, color_id), id);
                Ok(entry)
            }
        }
    }

    async fn withdraw(
        &self,
        entry_id: StockEntryId,
        amount: SaleQuantity,
        as_of: NaiveDate,
        note: &str,
    ) -> LedgerResult<SaleRecord> {
        // One write section covers check, decrement, and append.
        let mut state = self.write()?;

        let entry = state
            .entries
            .get(&entry_id)
            .copied()
            .ok_or_else(|| LedgerError::not_found("stock entry"))?;

        let updated = entry.withdraw(amount, as_of)?;

        let sale = SaleRecord {
            id: SaleRecordId::new(next(&mut state.next_sale_id)),
            product_id: entry.product_id,
            color_id: entry.color_id,
            quantity: amount,
            sold_on: as_of,
            note: note.to_string(),
        };

        state.entries.insert(entry_id, updated);
        state.sales.push(sale.clone());

        Ok(sale)
    }

    async fn sales_for(&self, entry_id: StockEntryId) -> LedgerResult<Vec<SaleRecord>> {
        let state = self.read()?;
        let entry = state
            .entries
            .get(&entry_id)
            .copied()
            .ok_or_else(|| LedgerError::not_found("stock entry"))?;
        Ok(state
            .sales
            .iter()
            .filter(|s| s.product_id == entry.product_id && s.color_id == entry.color_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_catalog::UnitOfMeasure;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn product_params(name: &str) -> NewProduct {
        NewProduct {
            code: None,
            name: name.to_string(),
            description: None,
            category: None,
            thickness: None,
            unit: UnitOfMeasure::Piece,
        }
    }

    #[tokio::test]
    async fn duplicate_product_name_is_a_conflict() {
        let store = InMemoryLedgerStore::new();
        store.create_product(product_params("Widget")).await.unwrap();
        let err = store
            .create_product(product_params("Widget"))
            .await
            .unwrap_err();
        match err {
            LedgerError::Conflict(_) => {}
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ensure_color_is_idempotent() {
        let store = InMemoryLedgerStore::new();
        let first = store.ensure_color("Natural").await.unwrap();
        let second = store.ensure_color("Natural").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn receive_stock_creates_one_entry_per_pair() {
        let store = InMemoryLedgerStore::new();
        let product = store.create_product(product_params("Widget")).await.unwrap();
        let color = store.ensure_color("White").await.unwrap();

        let created = store
            .receive_stock(product.id, color.id, Quantity::new(3.0).unwrap(), day(1))
            .await
            .unwrap();
        let accumulated = store
            .receive_stock(product.id, color.id, Quantity::new(2.0).unwrap(), day(2))
            .await
            .unwrap();

        // Same entry, accumulated quantity, fresh date.
        assert_eq!(accumulated.id, created.id);
        assert_eq!(accumulated.quantity.get(), 5.0);
        assert_eq!(accumulated.updated_on, day(2));

        let lines = store.list_stock().await.unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[tokio::test]
    async fn receive_stock_requires_existing_references() {
        let store = InMemoryLedgerStore::new();
        let err = store
            .receive_stock(
                ProductId::new(99),
                ColorId::new(99),
                Quantity::new(1.0).unwrap(),
                day(1),
            )
            .await
            .unwrap_err();
        match err {
            LedgerError::NotFound { .. } => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn withdraw_on_missing_entry_is_not_found() {
        let store = InMemoryLedgerStore::new();
        let err = store
            .withdraw(
                StockEntryId::new(404),
                SaleQuantity::new(1.0).unwrap(),
                day(1),
                "x",
            )
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::not_found("stock entry"));
    }
}

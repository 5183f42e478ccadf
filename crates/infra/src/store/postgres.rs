//! Postgres-backed ledger store.
//!
//! ## Atomicity
//!
//! `withdraw` runs one transaction per call. The decrement is a single
//! check-and-set statement (`UPDATE ... WHERE id = $1 AND quantity >= $2`),
//! so the sufficiency check and the mutation cannot be separated by a
//! concurrent writer: the row lock taken by the UPDATE serializes withdrawals
//! on the same entry. The paired sale insert joins the same transaction, and
//! the commit makes both durable together or not at all.
//!
//! ## Error mapping
//!
//! SQLx errors are mapped to `LedgerError` by PostgreSQL error code:
//!
//! | Code | Scenario | LedgerError |
//! |------|----------|-------------|
//! | `55P03` | lock wait exceeded `lock_timeout` | `Busy` |
//! | `23505` | unique violation (product name, product/color pair) | `Conflict` |
//! | `23503` | foreign key violation (missing product/color) | `NotFound` |
//! | other | connection loss, constraint, serialization | `Storage` |
//!
//! ## Thread safety
//!
//! The store is `Send + Sync`; all operations go through the SQLx connection
//! pool.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use vitrine_catalog::{Color, NewColor, NewProduct, Product, UnitOfMeasure};
use vitrine_core::{
    ColorId, LedgerError, LedgerResult, ProductId, Quantity, SaleQuantity, SaleRecordId,
    StockEntryId,
};
use vitrine_ledger::{SaleRecord, StockEntry, StockLine};

use super::r#trait::LedgerStore;
use crate::config::StoreConfig;

/// Postgres-backed ledger store.
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: Arc<PgPool>,
    lock_timeout: Duration,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self {
            pool: Arc::new(pool),
            lock_timeout,
        }
    }

    /// Build a connection pool from [`StoreConfig`] and verify the database
    /// is reachable.
    pub async fn connect(config: &StoreConfig) -> LedgerResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| LedgerError::storage(format!("failed to connect: {e}")))?;
        Ok(Self::new(pool, config.lock_timeout))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self, params), fields(name = %params.name), err)]
    async fn create_product(&self, params: NewProduct) -> LedgerResult<Product> {
        params.validate()?;

        let row = sqlx::query(
            r#"
            INSERT INTO products (code, name, description, category, thickness, unit_of_measure)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, code, name, description, category, thickness, unit_of_measure
            "#,
        )
        .bind(&params.code)
        .bind(&params.name)
        .bind(&params.description)
        .bind(&params.category)
        .bind(params.thickness)
        .bind(params.unit.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_product", e))?;

        ProductRow::from_row(&row)
            .map_err(|e| row_error("product", e))?
            .try_into()
    }

    #[instrument(skip(self), err)]
    async fn ensure_color(&self, name: &str) -> LedgerResult<Color> {
        NewColor {
            name: name.to_string(),
        }
        .validate()?;

        let inserted = sqlx::query(
            "INSERT INTO colors (name) VALUES ($1) ON CONFLICT (name) DO NOTHING RETURNING id, name",
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_color", e))?;

        let row = match inserted {
            Some(row) => row,
            // Insert was a no-op; the color already exists.
            None => sqlx::query("SELECT id, name FROM colors WHERE name = $1")
                .bind(name)
                .fetch_one(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_color", e))?,
        };

        ColorRow::from_row(&row)
            .map_err(|e| row_error("color", e))?
            .try_into()
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn get_product(&self, id: ProductId) -> LedgerResult<Product> {
        let row = sqlx::query(
            r#"
            SELECT id, code, name, description, category, thickness, unit_of_measure
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?
        .ok_or_else(|| LedgerError::not_found("product"))?;

        ProductRow::from_row(&row)
            .map_err(|e| row_error("product", e))?
            .try_into()
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn get_color(&self, id: ColorId) -> LedgerResult<Color> {
        let row = sqlx::query("SELECT id, name FROM colors WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_color", e))?
            .ok_or_else(|| LedgerError::not_found("color"))?;

        ColorRow::from_row(&row)
            .map_err(|e| row_error("color", e))?
            .try_into()
    }

    #[instrument(skip(self), err)]
    async fn list_products(&self) -> LedgerResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, code, name, description, category, thickness, unit_of_measure
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            products.push(
                ProductRow::from_row(&row)
                    .map_err(|e| row_error("product", e))?
                    .try_into()?,
            );
        }
        Ok(products)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn get_stock_entry(&self, id: StockEntryId) -> LedgerResult<StockEntry> {
        let row = sqlx::query(
            "SELECT id, product_id, color_id, quantity, updated_on FROM stock_entries WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_stock_entry", e))?
        .ok_or_else(|| LedgerError::not_found("stock entry"))?;

        StockEntryRow::from_row(&row)
            .map_err(|e| row_error("stock entry", e))?
            .try_into()
    }

    #[instrument(skip(self), err)]
    async fn list_stock(&self) -> LedgerResult<Vec<StockLine>> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, p.code AS product_code, p.name AS product_name,
                   c.name AS color_name, e.quantity, p.unit_of_measure, e.updated_on
            FROM stock_entries e
            JOIN products p ON e.product_id = p.id
            JOIN colors c ON e.color_id = c.id
            ORDER BY p.name, c.name
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_stock", e))?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            lines.push(
                StockLineRow::from_row(&row)
                    .map_err(|e| row_error("stock line", e))?
                    .try_into()?,
            );
        }
        Ok(lines)
    }

    #[instrument(
        skip(self),
        fields(product_id = %product_id, color_id = %color_id, amount = amount.get()),
        err
    )]
    async fn receive_stock(
        &self,
        product_id: ProductId,
        color_id: ColorId,
        amount: Quantity,
        as_of: NaiveDate,
    ) -> LedgerResult<StockEntry> {
        // Upsert keyed on the (product, color) uniqueness constraint; foreign
        // keys reject unknown product/color ids (mapped to NotFound).
        let row = sqlx::query(
            r#"
            INSERT INTO stock_entries (product_id, color_id, quantity, updated_on)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (product_id, color_id)
            DO UPDATE SET quantity = stock_entries.quantity + EXCLUDED.quantity,
                          updated_on = EXCLUDED.updated_on
            RETURNING id, product_id, color_id, quantity, updated_on
            "#,
        )
        .bind(product_id.as_i64())
        .bind(color_id.as_i64())
        .bind(amount.get())
        .bind(as_of)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("receive_stock", e))?;

        StockEntryRow::from_row(&row)
            .map_err(|e| row_error("stock entry", e))?
            .try_into()
    }

    #[instrument(
        skip(self, note),
        fields(entry_id = %entry_id, amount = amount.get()),
        err
    )]
    async fn withdraw(
        &self,
        entry_id: StockEntryId,
        amount: SaleQuantity,
        as_of: NaiveDate,
        note: &str,
    ) -> LedgerResult<SaleRecord> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        // Bounded lock wait: contention past this surfaces as Busy (55P03)
        // instead of blocking the caller indefinitely.
        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(self.lock_timeout.as_millis().to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_lock_timeout", e))?;

        // Check-and-set in one statement. The WHERE guard is the
        // authoritative sufficiency check; the row lock serializes
        // concurrent withdrawals of the same entry.
        let updated = sqlx::query(
            r#"
            UPDATE stock_entries
            SET quantity = quantity - $2, updated_on = $3
            WHERE id = $1 AND quantity >= $2
            RETURNING product_id, color_id
            "#,
        )
        .bind(entry_id.as_i64())
        .bind(amount.get())
        .bind(as_of)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("decrement_stock", e))?;

        let Some(row) = updated else {
            // Zero rows matched: either the entry is missing or the guard
            // rejected the amount. Disambiguate, then abort the transaction.
            let existing = sqlx::query("SELECT quantity FROM stock_entries WHERE id = $1")
                .bind(entry_id.as_i64())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("read_stock", e))?;

            let err = match existing {
                None => LedgerError::not_found("stock entry"),
                Some(row) => {
                    let available: f64 = row
                        .try_get("quantity")
                        .map_err(|e| row_error("stock entry", e))?;
                    LedgerError::insufficient(amount.get(), available)
                }
            };

            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(err);
        };

        let product_id: i64 = row
            .try_get("product_id")
            .map_err(|e| row_error("stock entry", e))?;
        let color_id: i64 = row
            .try_get("color_id")
            .map_err(|e| row_error("stock entry", e))?;

        let sale_row = sqlx::query(
            r#"
            INSERT INTO sale_records (product_id, color_id, quantity, sold_on, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(product_id)
        .bind(color_id)
        .bind(amount.get())
        .bind(as_of)
        .bind(note)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("append_sale", e))?;

        let sale_id: i64 = sale_row.try_get("id").map_err(|e| row_error("sale", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        Ok(SaleRecord {
            id: SaleRecordId::new(sale_id),
            product_id: ProductId::new(product_id),
            color_id: ColorId::new(color_id),
            quantity: amount,
            sold_on: as_of,
            note: note.to_string(),
        })
    }

    #[instrument(skip(self), fields(entry_id = %entry_id), err)]
    async fn sales_for(&self, entry_id: StockEntryId) -> LedgerResult<Vec<SaleRecord>> {
        let entry = self.get_stock_entry(entry_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT id, product_id, color_id, quantity, sold_on, note
            FROM sale_records
            WHERE product_id = $1 AND color_id = $2
            ORDER BY id
            "#,
        )
        .bind(entry.product_id.as_i64())
        .bind(entry.color_id.as_i64())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("sales_for", e))?;

        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            sales.push(
                SaleRecordRow::from_row(&row)
                    .map_err(|e| row_error("sale", e))?
                    .try_into()?,
            );
        }
        Ok(sales)
    }
}

/// Map SQLx errors to `LedgerError` (see module docs for the code table).
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> LedgerError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("55P03") => LedgerError::Busy,
                Some("23505") => LedgerError::conflict(msg),
                Some("23503") => LedgerError::not_found("referenced product or color"),
                _ => LedgerError::storage(msg),
            }
        }
        sqlx::Error::PoolTimedOut => LedgerError::Busy,
        sqlx::Error::PoolClosed => {
            LedgerError::storage(format!("connection pool closed in {operation}"))
        }
        other => LedgerError::storage(format!("sqlx error in {operation}: {other}")),
    }
}

fn row_error(what: &str, err: sqlx::Error) -> LedgerError {
    LedgerError::storage(format!("failed to read {what} row: {err}"))
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: i64,
    code: Option<String>,
    name: String,
    description: Option<String>,
    category: Option<String>,
    thickness: Option<f64>,
    unit_of_measure: String,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            thickness: row.try_get("thickness")?,
            unit_of_measure: row.try_get("unit_of_measure")?,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = LedgerError;

    fn try_from(row: ProductRow) -> LedgerResult<Self> {
        let unit: UnitOfMeasure = row
            .unit_of_measure
            .parse()
            .map_err(|_| LedgerError::storage(format!("corrupt unit of measure: {}", row.unit_of_measure)))?;
        Ok(Product {
            id: ProductId::new(row.id),
            code: row.code,
            name: row.name,
            description: row.description,
            category: row.category,
            thickness: row.thickness,
            unit,
        })
    }
}

#[derive(Debug)]
struct ColorRow {
    id: i64,
    name: String,
}

impl<'r> FromRow<'r, PgRow> for ColorRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ColorRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

impl TryFrom<ColorRow> for Color {
    type Error = LedgerError;

    fn try_from(row: ColorRow) -> LedgerResult<Self> {
        Ok(Color {
            id: ColorId::new(row.id),
            name: row.name,
        })
    }
}

#[derive(Debug)]
struct StockEntryRow {
    id: i64,
    product_id: i64,
    color_id: i64,
    quantity: f64,
    updated_on: NaiveDate,
}

impl<'r> FromRow<'r, PgRow> for StockEntryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(StockEntryRow {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            color_id: row.try_get("color_id")?,
            quantity: row.try_get("quantity")?,
            updated_on: row.try_get("updated_on")?,
        })
    }
}

impl TryFrom<StockEntryRow> for StockEntry {
    type Error = LedgerError;

    fn try_from(row: StockEntryRow) -> LedgerResult<Self> {
        // The CHECK constraint keeps stored quantities non-negative; a
        // violation here means corrupt storage, not caller error.
        let quantity = Quantity::new(row.quantity)
            .map_err(|_| LedgerError::storage(format!("corrupt stock quantity: {}", row.quantity)))?;
        Ok(StockEntry {
            id: StockEntryId::new(row.id),
            product_id: ProductId::new(row.product_id),
            color_id: ColorId::new(row.color_id),
            quantity,
            updated_on: row.updated_on,
        })
    }
}

#[derive(Debug)]
struct SaleRecordRow {
    id: i64,
    product_id: i64,
    color_id: i64,
    quantity: f64,
    sold_on: NaiveDate,
    note: String,
}

impl<'r> FromRow<'r, PgRow> for SaleRecordRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(SaleRecordRow {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            color_id: row.try_get("color_id")?,
            quantity: row.try_get("quantity")?,
            sold_on: row.try_get("sold_on")?,
            note: row.try_get("note")?,
        })
    }
}

impl TryFrom<SaleRecordRow> for SaleRecord {
    type Error = LedgerError;

    fn try_from(row: SaleRecordRow) -> LedgerResult<Self> {
        let quantity = SaleQuantity::new(row.quantity)
            .map_err(|_| LedgerError::storage(format!("corrupt sale quantity: {}", row.quantity)))?;
        Ok(SaleRecord {
            id: SaleRecordId::new(row.id),
            product_id: ProductId::new(row.product_id),
            color_id: ColorId::new(row.color_id),
            quantity,
            sold_on: row.sold_on,
            note: row.note,
        })
    }
}

#[derive(Debug)]
struct StockLineRow {
    id: i64,
    product_code: Option<String>,
    product_name: String,
    color_name: String,
    quantity: f64,
    unit_of_measure: String,
    updated_on: NaiveDate,
}

impl<'r> FromRow<'r, PgRow> for StockLineRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(StockLineRow {
            id: row.try_get("id")?,
            product_code: row.try_get("product_code")?,
            product_name: row.try_get("product_name")?,
            color_name: row.try_get("color_name")?,
            quantity: row.try_get("quantity")?,
            unit_of_measure: row.try_get("unit_of_measure")?,
            updated_on: row.try_get("updated_on")?,
        })
    }
}

impl TryFrom<StockLineRow> for StockLine {
    type Error = LedgerError;

    fn try_from(row: StockLineRow) -> LedgerResult<Self> {
        let unit: UnitOfMeasure = row
            .unit_of_measure
            .parse()
            .map_err(|_| LedgerError::storage(format!("corrupt unit of measure: {}", row.unit_of_measure)))?;
        let quantity = Quantity::new(row.quantity)
            .map_err(|_| LedgerError::storage(format!("corrupt stock quantity: {}", row.quantity)))?;
        Ok(StockLine {
            id: StockEntryId::new(row.id),
            product_code: row.product_code,
            product_name: row.product_name,
            color_name: row.color_name,
            quantity,
            unit,
            last_updated: row.updated_on,
        })
    }
}

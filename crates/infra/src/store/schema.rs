//! Schema bootstrap for the Postgres backend.
//!
//! Creates the four relations idempotently and seeds the default colors.
//! Safe to run on every startup. The CHECK constraints put the quantity
//! invariants into the storage layer itself: stock never below zero, sales
//! strictly positive.

use sqlx::PgPool;
use tracing::info;

use vitrine_catalog::DEFAULT_COLORS;
use vitrine_core::{LedgerError, LedgerResult};

const CREATE_PRODUCTS: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id BIGSERIAL PRIMARY KEY,
    code TEXT,
    name TEXT NOT NULL UNIQUE,
    description TEXT,
    category TEXT,
    thickness DOUBLE PRECISION,
    unit_of_measure TEXT NOT NULL
)
"#;

const CREATE_COLORS: &str = r#"
CREATE TABLE IF NOT EXISTS colors (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
)
"#;

const CREATE_STOCK_ENTRIES: &str = r#"
CREATE TABLE IF NOT EXISTS stock_entries (
    id BIGSERIAL PRIMARY KEY,
    product_id BIGINT NOT NULL REFERENCES products(id),
    color_id BIGINT NOT NULL REFERENCES colors(id),
    quantity DOUBLE PRECISION NOT NULL CHECK (quantity >= 0),
    updated_on DATE NOT NULL,
    UNIQUE (product_id, color_id)
)
"#;

const CREATE_SALE_RECORDS: &str = r#"
CREATE TABLE IF NOT EXISTS sale_records (
    id BIGSERIAL PRIMARY KEY,
    product_id BIGINT NOT NULL REFERENCES products(id),
    color_id BIGINT NOT NULL REFERENCES colors(id),
    quantity DOUBLE PRECISION NOT NULL CHECK (quantity > 0),
    sold_on DATE NOT NULL,
    note TEXT NOT NULL DEFAULT ''
)
"#;

/// Create all relations and seed the default colors. Idempotent.
pub async fn ensure_schema(pool: &PgPool) -> LedgerResult<()> {
    for ddl in [
        CREATE_PRODUCTS,
        CREATE_COLORS,
        CREATE_STOCK_ENTRIES,
        CREATE_SALE_RECORDS,
    ] {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| LedgerError::storage(format!("schema bootstrap failed: {e}")))?;
    }

    for name in DEFAULT_COLORS {
        sqlx::query("INSERT INTO colors (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(pool)
            .await
            .map_err(|e| LedgerError::storage(format!("color seeding failed: {e}")))?;
    }

    info!("schema ensured");
    Ok(())
}

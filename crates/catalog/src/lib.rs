//! `vitrine-catalog` — product and color reference data.
//!
//! Read-mostly master data the ledger validates against. Creation is
//! administrative and outside the sell hot path; entries are immutable after
//! creation as far as the ledger is concerned.

pub mod color;
pub mod product;

pub use color::{Color, DEFAULT_COLORS, NewColor};
pub use product::{NewProduct, Product, UnitOfMeasure};

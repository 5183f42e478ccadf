//! Quantity value objects.
//!
//! Stock quantities are non-negative reals; sale quantities are strictly
//! positive. Both reject NaN and infinite input at construction, so the rest
//! of the ledger can assume well-formed numbers and the non-negativity
//! invariant is carried by the type itself.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Non-negative on-hand quantity.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Quantity(f64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0.0);

    pub fn new(raw: f64) -> LedgerResult<Self> {
        if !raw.is_finite() || raw < 0.0 {
            return Err(LedgerError::invalid_quantity(raw));
        }
        Ok(Self(raw))
    }

    pub const fn get(self) -> f64 {
        self.0
    }

    /// Add received stock.
    pub fn plus(self, other: Quantity) -> LedgerResult<Self> {
        Self::new(self.0 + other.0)
    }

    /// Subtract a withdrawal. Fails with `InsufficientStock` if the amount
    /// exceeds what is on hand; the result is never negative.
    pub fn minus(self, amount: SaleQuantity) -> LedgerResult<Self> {
        if amount.get() > self.0 {
            return Err(LedgerError::insufficient(amount.get(), self.0));
        }
        Self::new(self.0 - amount.get())
    }
}

impl TryFrom<f64> for Quantity {
    type Error = LedgerError;

    fn try_from(raw: f64) -> LedgerResult<Self> {
        Self::new(raw)
    }
}

impl From<Quantity> for f64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Strictly positive withdrawal quantity.
///
/// Zero and negative requests never reach storage; they fail here first.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SaleQuantity(f64);

impl SaleQuantity {
    pub fn new(raw: f64) -> LedgerResult<Self> {
        if !raw.is_finite() || raw <= 0.0 {
            return Err(LedgerError::invalid_quantity(raw));
        }
        Ok(Self(raw))
    }

    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for SaleQuantity {
    type Error = LedgerError;

    fn try_from(raw: f64) -> LedgerResult<Self> {
        Self::new(raw)
    }
}

impl From<SaleQuantity> for f64 {
    fn from(value: SaleQuantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for SaleQuantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

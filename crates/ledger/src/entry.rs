use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vitrine_core::{ColorId, LedgerResult, ProductId, Quantity, SaleQuantity, StockEntryId};

/// One mutable on-hand quantity for a product/color pair.
///
/// At most one entry exists per pair. An entry is created when the pair first
/// receives stock; its quantity changes only through the receive and withdraw
/// paths and is never negative (carried by [`Quantity`]). Entries are never
/// deleted in normal operation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    pub id: StockEntryId,
    pub product_id: ProductId,
    pub color_id: ColorId,
    pub quantity: Quantity,
    /// Day-granularity date of the last quantity change.
    pub updated_on: NaiveDate,
}

impl StockEntry {
    /// Apply a withdrawal, returning the updated entry.
    ///
    /// Fails with `InsufficientStock` and leaves `self` untouched when the
    /// amount exceeds what is on hand. This is the single authoritative
    /// check; store backends run it inside their unit of work so the
    /// check-and-mutate is atomic with the paired sale append.
    pub fn withdraw(&self, amount: SaleQuantity, as_of: NaiveDate) -> LedgerResult<Self> {
        let remaining = self.quantity.minus(amount)?;
        Ok(Self {
            quantity: remaining,
            updated_on: as_of,
            ..*self
        })
    }

    /// Apply received stock, returning the updated entry.
    pub fn receive(&self, amount: Quantity, as_of: NaiveDate) -> LedgerResult<Self> {
        let total = self.quantity.plus(amount)?;
        Ok(Self {
            quantity: total,
            updated_on: as_of,
            ..*self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::LedgerError;

    fn entry(quantity: f64) -> StockEntry {
        StockEntry {
            id: StockEntryId::new(1),
            product_id: ProductId::new(10),
            color_id: ColorId::new(20),
            quantity: Quantity::new(quantity).unwrap(),
            updated_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[test]
    fn withdraw_decrements_and_stamps_date() {
        let updated = entry(10.0)
            .withdraw(SaleQuantity::new(3.0).unwrap(), day(5))
            .unwrap();
        assert_eq!(updated.quantity.get(), 7.0);
        assert_eq!(updated.updated_on, day(5));
    }

    #[test]
    fn withdraw_rejects_more_than_on_hand() {
        let e = entry(5.0);
        let err = e.withdraw(SaleQuantity::new(6.0).unwrap(), day(1)).unwrap_err();
        match err {
            LedgerError::InsufficientStock {
                requested,
                available,
            } => {
                assert_eq!(requested, 6.0);
                assert_eq!(available, 5.0);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        // The original entry is untouched.
        assert_eq!(e.quantity.get(), 5.0);
    }

    #[test]
    fn withdraw_to_exactly_zero_is_allowed() {
        let updated = entry(1.0)
            .withdraw(SaleQuantity::new(1.0).unwrap(), day(1))
            .unwrap();
        assert_eq!(updated.quantity, Quantity::ZERO);
    }

    #[test]
    fn receive_accumulates() {
        let updated = entry(2.5)
            .receive(Quantity::new(4.0).unwrap(), day(3))
            .unwrap();
        assert_eq!(updated.quantity.get(), 6.5);
        assert_eq!(updated.updated_on, day(3));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Properties over arbitrary withdrawal sequences: the quantity is
            /// never observed negative, and the initial quantity equals the
            /// current quantity plus everything successfully withdrawn
            /// (conservation).
            #[test]
            fn withdrawals_conserve_stock(
                initial in 0.0f64..1000.0,
                requests in proptest::collection::vec(0.01f64..100.0, 0..32)
            ) {
                let mut current = entry(initial);
                let mut withdrawn = 0.0f64;

                for (i, raw) in requests.iter().enumerate() {
                    let amount = SaleQuantity::new(*raw).unwrap();
                    match current.withdraw(amount, day(1 + (i as u32 % 28))) {
                        Ok(updated) => {
                            withdrawn += raw;
                            current = updated;
                        }
                        Err(LedgerError::InsufficientStock { .. }) => {
                            prop_assert!(*raw > current.quantity.get());
                        }
                        Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
                    }
                    prop_assert!(current.quantity.get() >= 0.0);
                }

                let drift = (initial - withdrawn - current.quantity.get()).abs();
                prop_assert!(drift < 1e-6, "conservation drift: {drift}");
            }
        }
    }
}

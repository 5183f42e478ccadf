use serde::{Deserialize, Serialize};

use vitrine_core::{LedgerError, LedgerResult, ProductId};

/// Unit in which a product's stock is counted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOfMeasure {
    Piece,
    Meter,
    SquareMeter,
    Sheet,
}

impl UnitOfMeasure {
    /// Canonical storage form; the inverse of [`FromStr`](core::str::FromStr).
    pub const fn as_str(self) -> &'static str {
        match self {
            UnitOfMeasure::Piece => "piece",
            UnitOfMeasure::Meter => "meter",
            UnitOfMeasure::SquareMeter => "square_meter",
            UnitOfMeasure::Sheet => "sheet",
        }
    }
}

impl core::fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for UnitOfMeasure {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "piece" => Ok(Self::Piece),
            "meter" => Ok(Self::Meter),
            "square_meter" => Ok(Self::SquareMeter),
            "sheet" => Ok(Self::Sheet),
            other => Err(LedgerError::validation(format!(
                "unknown unit of measure: {other}"
            ))),
        }
    }
}

/// Catalog entry: one sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Optional external code (supplier or internal shorthand).
    pub code: Option<String>,
    /// Unique display name.
    pub name: String,
    pub description: Option<String>,
    /// Free-form category tag (e.g. "tempered", "laminated").
    pub category: Option<String>,
    /// Material thickness in millimeters, where it applies.
    pub thickness: Option<f64>,
    pub unit: UnitOfMeasure,
}

/// Data required to register a new product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub code: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub thickness: Option<f64>,
    pub unit: UnitOfMeasure,
}

impl NewProduct {
    /// Validate everything that can be decided without the store.
    ///
    /// Name uniqueness is the store's job.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::validation("product name cannot be empty"));
        }
        if let Some(thickness) = self.thickness {
            if !thickness.is_finite() || thickness <= 0.0 {
                return Err(LedgerError::validation(format!(
                    "thickness must be a positive number, got {thickness}"
                )));
            }
        }
        Ok(())
    }
}

impl Product {
    /// Build a product from a storage-assigned id and creation params.
    pub fn new(id: ProductId, params: NewProduct) -> LedgerResult<Self> {
        params.validate()?;
        Ok(Self {
            id,
            code: params.code,
            name: params.name,
            description: params.description,
            category: params.category,
            thickness: params.thickness,
            unit: params.unit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glass_sheet() -> NewProduct {
        NewProduct {
            code: Some("VID-8".to_string()),
            name: "Clear glass 8mm".to_string(),
            description: None,
            category: Some("float".to_string()),
            thickness: Some(8.0),
            unit: UnitOfMeasure::SquareMeter,
        }
    }

    #[test]
    fn builds_product_from_params() {
        let product = Product::new(ProductId::new(1), glass_sheet()).unwrap();
        assert_eq!(product.name, "Clear glass 8mm");
        assert_eq!(product.unit, UnitOfMeasure::SquareMeter);
    }

    #[test]
    fn rejects_blank_name() {
        let params = NewProduct {
            name: "   ".to_string(),
            ..glass_sheet()
        };
        let err = Product::new(ProductId::new(1), params).unwrap_err();
        match err {
            LedgerError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_thickness() {
        let params = NewProduct {
            thickness: Some(0.0),
            ..glass_sheet()
        };
        assert!(Product::new(ProductId::new(1), params).is_err());
    }

    #[test]
    fn unit_of_measure_round_trips_through_storage_form() {
        for unit in [
            UnitOfMeasure::Piece,
            UnitOfMeasure::Meter,
            UnitOfMeasure::SquareMeter,
            UnitOfMeasure::Sheet,
        ] {
            assert_eq!(unit.as_str().parse::<UnitOfMeasure>().unwrap(), unit);
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any non-blank name with a positive thickness is accepted
            /// and carried through unchanged.
            #[test]
            fn accepts_well_formed_params(
                name in "[A-Za-z][A-Za-z0-9 ]{0,60}",
                thickness in 0.1f64..100.0
            ) {
                let params = NewProduct {
                    code: None,
                    name: name.clone(),
                    description: None,
                    category: None,
                    thickness: Some(thickness),
                    unit: UnitOfMeasure::Piece,
                };
                let product = Product::new(ProductId::new(1), params).unwrap();
                prop_assert_eq!(product.name, name);
                prop_assert_eq!(product.thickness, Some(thickness));
            }
        }
    }
}

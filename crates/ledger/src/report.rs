use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vitrine_catalog::UnitOfMeasure;
use vitrine_core::{Quantity, StockEntryId};

/// Read-side reporting row: a stock entry joined with its product and color.
///
/// This is the shape the presentation layer consumes from `list_stock`;
/// listings are ordered by product name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLine {
    pub id: StockEntryId,
    pub product_code: Option<String>,
    pub product_name: String,
    pub color_name: String,
    pub quantity: Quantity,
    pub unit: UnitOfMeasure,
    pub last_updated: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_to_the_boundary_shape() {
        let line = StockLine {
            id: StockEntryId::new(3),
            product_code: Some("VID-8".to_string()),
            product_name: "Clear glass 8mm".to_string(),
            color_name: "Natural".to_string(),
            quantity: Quantity::new(12.5).unwrap(),
            unit: UnitOfMeasure::SquareMeter,
            last_updated: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
        };

        assert_eq!(
            serde_json::to_value(&line).unwrap(),
            json!({
                "id": 3,
                "product_code": "VID-8",
                "product_name": "Clear glass 8mm",
                "color_name": "Natural",
                "quantity": 12.5,
                "unit": "square_meter",
                "last_updated": "2024-03-14",
            })
        );
    }
}

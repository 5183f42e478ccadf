use serde::{Deserialize, Serialize};

use vitrine_core::{ColorId, LedgerError, LedgerResult};

/// Colors seeded idempotently at first bootstrap.
pub const DEFAULT_COLORS: [&str; 3] = ["Natural", "White", "Black"];

/// Catalog entry: a stocked color variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub id: ColorId,
    /// Unique display name.
    pub name: String,
}

/// Data required to register a new color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewColor {
    pub name: String,
}

impl NewColor {
    pub fn validate(&self) -> LedgerResult<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::validation("color name cannot be empty"));
        }
        Ok(())
    }
}

impl Color {
    pub fn new(id: ColorId, params: NewColor) -> LedgerResult<Self> {
        params.validate()?;
        Ok(Self {
            id,
            name: params.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_color_from_params() {
        let color = Color::new(
            ColorId::new(1),
            NewColor {
                name: "Bronze".to_string(),
            },
        )
        .unwrap();
        assert_eq!(color.name, "Bronze");
    }

    #[test]
    fn rejects_blank_name() {
        let err = Color::new(
            ColorId::new(1),
            NewColor {
                name: String::new(),
            },
        )
        .unwrap_err();
        match err {
            LedgerError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn default_seed_covers_three_colors() {
        assert_eq!(DEFAULT_COLORS, ["Natural", "White", "Black"]);
    }
}

//! Measurement units used by recipe and shopping list items

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::result::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeUnit {
    #[default]
    Pcs,
    Grams,
    Kg,
    Cup,
    TeaSpoon,
    TableSpoon,
    Liter,
    Deciliter,
    Milliliter,
}

impl RecipeUnit {
    pub const ALL: [RecipeUnit; 9] = [
        RecipeUnit::Pcs,
        RecipeUnit::Grams,
        RecipeUnit::Kg,
        RecipeUnit::Cup,
        RecipeUnit::TeaSpoon,
        RecipeUnit::TableSpoon,
        RecipeUnit::Liter,
        RecipeUnit::Deciliter,
        RecipeUnit::Milliliter,
    ];

    /// Short label for display
    pub fn abbreviation(&self) -> &'static str {
        match self {
            RecipeUnit::Pcs => "pcs",
            RecipeUnit::Grams => "g",
            RecipeUnit::Kg => "kg",
            RecipeUnit::Cup => "cup",
            RecipeUnit::TeaSpoon => "tsp",
            RecipeUnit::TableSpoon => "tbsp",
            RecipeUnit::Liter => "l",
            RecipeUnit::Deciliter => "dl",
            RecipeUnit::Milliliter => "ml",
        }
    }
}

impl fmt::Display for RecipeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for RecipeUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit = match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "pcs" | "pc" | "piece" | "pieces" => RecipeUnit::Pcs,
            "g" | "gram" | "grams" => RecipeUnit::Grams,
            "kg" | "kilogram" | "kilograms" => RecipeUnit::Kg,
            "cup" | "cups" => RecipeUnit::Cup,
            "tsp" | "tea_spoon" | "teaspoon" => RecipeUnit::TeaSpoon,
            "tbsp" | "table_spoon" | "tablespoon" => RecipeUnit::TableSpoon,
            "l" | "liter" | "litre" => RecipeUnit::Liter,
            "dl" | "deciliter" | "decilitre" => RecipeUnit::Deciliter,
            "ml" | "milliliter" | "millilitre" => RecipeUnit::Milliliter,
            _ => return Err(Error::validation(format!("unknown unit '{}'", s))),
        };
        Ok(unit)
    }
}

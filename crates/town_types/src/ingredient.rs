//! The fixed ingredient vocabulary of the kitchen game.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One ingredient token. Recipes and assembled plates are sequences of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ingredient {
    Egg,
    Fries,
    Milk,
    Rice,
    Salad,
    Steak,
}

impl Ingredient {
    /// Every ingredient, in a stable order.
    pub const ALL: [Ingredient; 6] = [
        Ingredient::Egg,
        Ingredient::Fries,
        Ingredient::Milk,
        Ingredient::Rice,
        Ingredient::Salad,
        Ingredient::Steak,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Ingredient::Egg => "Egg",
            Ingredient::Fries => "Fries",
            Ingredient::Milk => "Milk",
            Ingredient::Rice => "Rice",
            Ingredient::Salad => "Salad",
            Ingredient::Steak => "Steak",
        }
    }
}

impl std::fmt::Display for Ingredient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown ingredient '{0}'")]
pub struct UnknownIngredient(pub String);

impl std::str::FromStr for Ingredient {
    type Err = UnknownIngredient;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ingredient::ALL
            .into_iter()
            .find(|ingredient| ingredient.as_str() == s)
            .ok_or_else(|| UnknownIngredient(s.to_string()))
    }
}

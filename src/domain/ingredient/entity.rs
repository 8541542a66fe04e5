use serde::{Deserialize, Serialize};

pub type IngredientId = String;

/// Ingredients have no identity besides their position in the meal
pub fn ingredient_id(meal_id: &str, index: usize) -> IngredientId {
    format!("{}:{}", meal_id, index)
}

/// One ingredient/measurement pair from a detail payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IngredientLine {
    pub id: IngredientId,
    pub ingredient: String,
    pub measurement: String,
    pub sort_order: i64,
}

/// A stored ingredient row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientRecord {
    pub id: IngredientId,
    pub meal_id: String,
    pub name: String,
    pub measurement: String,
    pub sort_order: i64,
}

impl IngredientRecord {
    pub fn from_line(meal_id: &str, line: &IngredientLine) -> Self {
        Self {
            id: line.id.clone(),
            meal_id: meal_id.to_string(),
            name: line.ingredient.clone(),
            measurement: line.measurement.clone(),
            sort_order: line.sort_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_id_format() {
        assert_eq!(ingredient_id("52772", 0), "52772:0");
        assert_eq!(ingredient_id("52772", 12), "52772:12");
    }
}

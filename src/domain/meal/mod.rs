pub mod entity;
pub mod invariants;

pub use entity::{MealDetail, MealId, MealRecord, MealSummary, MealWithIngredients};
pub use invariants::{validate_meal_detail, validate_meal_summary};

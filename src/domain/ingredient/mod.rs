pub mod entity;
pub mod invariants;

pub use entity::{ingredient_id, IngredientId, IngredientLine, IngredientRecord};
pub use invariants::validate_ingredient_line;

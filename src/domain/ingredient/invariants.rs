use super::entity::IngredientLine;
use crate::domain::{DomainError, DomainResult};

/// An ingredient line needs a name; the measurement may be blank
pub fn validate_ingredient_line(line: &IngredientLine) -> DomainResult<()> {
    if line.ingredient.trim().is_empty() {
        return Err(DomainError::InvariantViolation(format!(
            "Ingredient {} has an empty name",
            line.id
        )));
    }
    if line.sort_order < 0 {
        return Err(DomainError::InvariantViolation(format!(
            "Ingredient {} has a negative sort order",
            line.id
        )));
    }
    Ok(())
}

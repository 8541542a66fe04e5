use super::entity::{MealDetail, MealSummary};
use crate::domain::{DomainError, DomainResult};

pub fn validate_meal_summary(meal: &MealSummary) -> DomainResult<()> {
    validate_meal_id(&meal.id)
}

pub fn validate_meal_detail(meal: &MealDetail) -> DomainResult<()> {
    validate_meal_id(&meal.id)
}

fn validate_meal_id(id: &str) -> DomainResult<()> {
    if id.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Meal id cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Invariants that must hold true for stored meals:
///
/// 1. Ids are issued by the remote API and never change
/// 2. A meal may exist before its category is known
/// 3. `liked_at` is only written by the favorite toggle
/// 4. Ingredient rows are replaced as a whole on every detail save

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_meal_id_fails() {
        assert!(validate_meal_summary(&MealSummary::default()).is_err());
        assert!(validate_meal_detail(&MealDetail::new("   ")).is_err());
        assert!(validate_meal_detail(&MealDetail::new("52772")).is_ok());
    }
}

// src/domain/mod.rs
//
// Domain Root - records, remote payloads and their invariants
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod category;
pub mod ingredient;
pub mod meal;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Category
pub use category::{
    provisional_category_id, validate_category, validate_category_name, Category, CategoryId,
    CategoryName, CategoryRecord, CategoryWithMeals,
};

// Meal
pub use meal::{
    validate_meal_detail, validate_meal_summary, MealDetail, MealId, MealRecord, MealSummary,
    MealWithIngredients,
};

// Ingredient
pub use ingredient::{
    ingredient_id, validate_ingredient_line, IngredientId, IngredientLine, IngredientRecord,
};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent payloads that would break a stored invariant
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;

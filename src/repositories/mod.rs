// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic, NO invariant enforcement, NO change notification
// - They borrow a connection so a caller can group calls in one transaction
// - Write methods return the number of rows actually modified
// - Explicit SQL only

pub mod category_repository;
pub mod ingredient_repository;
pub mod meal_repository;

pub use category_repository::CategoryRepository;
pub use ingredient_repository::IngredientRepository;
pub use meal_repository::MealRepository;

use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339, so text order equals time order
pub(crate) fn timestamp_to_sql(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn timestamp_from_sql(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

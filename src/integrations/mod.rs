// src/integrations/mod.rs
//
// External Integrations Module
//
// Remote data sources. They return domain payloads and never touch the store.

pub mod mealdb;

pub use mealdb::{MealApi, MealDbClient};

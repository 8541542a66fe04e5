// src/integrations/mealdb/mod.rs

pub mod api;
pub mod client;
mod wire;

pub use api::MealApi;
#[cfg(test)]
pub use api::MockMealApi;
pub use client::MealDbClient;

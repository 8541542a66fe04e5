// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Sits above the store and services
// - Turns stored records into view projections
// - Owns the lifetime of live queries through view models

pub mod dto;
pub mod state;
pub mod view_models;

pub use dto::*;
pub use state::AppState;
pub use view_models::{CategoriesViewModel, CategoryDetailViewModel, MealDetailViewModel};

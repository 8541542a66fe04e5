// src/lib.rs
// Recipebook - offline-capable recipe catalog
//
// Architecture:
// - Record store: SQLite is the single source of truth
// - Single writer: every mutation is serialized and atomic
// - Live queries: committed changes re-run interested queries, and only
//   distinct projected values reach subscribers
// - Remote data only enters through the ingestion service

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;

// ============================================================================
// REACTIVE CORE
// ============================================================================

pub mod services;
pub mod store;
pub mod stream;

// ============================================================================
// EDGES
// ============================================================================

pub mod application;
pub mod integrations;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    Category, CategoryId, CategoryRecord, CategoryWithMeals, IngredientRecord, MealDetail,
    MealId, MealRecord, MealSummary, MealWithIngredients,
};

// ============================================================================
// PUBLIC API - Errors and configuration
// ============================================================================

pub use config::AppConfig;
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Store and live queries
// ============================================================================

pub use events::{ChangeNotifier, EntityKind, EntityKinds, StoreChange};
pub use store::{
    AllCategories, CategoryById, FavoriteMeals, MealById, MealsInCategory, Query, RecordStore,
};
pub use stream::{QueryStream, SubscriptionHandle};

// ============================================================================
// PUBLIC API - Services and application layer
// ============================================================================

pub use application::AppState;
pub use integrations::{MealApi, MealDbClient};
pub use services::{IngestionReport, IngestionService, TaskRegistry, WriteCoordinator};

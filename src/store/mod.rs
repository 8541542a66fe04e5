// src/store/mod.rs
//
// Record Store - the single source of truth
//
// CRITICAL RULES:
// - Reads go straight to the pool, one deferred read transaction per query
// - Every write goes through the WriteCoordinator
// - Live queries are driven by the ChangeNotifier the writer publishes to

pub mod operations;
pub mod query;

#[cfg(test)]
mod record_store_tests;

pub use query::{AllCategories, CategoryById, FavoriteMeals, MealById, MealsInCategory, Query};

use std::sync::Arc;

use chrono::Utc;

use crate::config::AppConfig;
use crate::db::{create_connection_pool, get_connection, initialize_database, ConnectionPool};
use crate::domain::{
    Category, CategoryRecord, CategoryWithMeals, MealDetail, MealRecord, MealSummary,
    MealWithIngredients,
};
use crate::error::AppResult;
use crate::events::{create_change_notifier, ChangeNotifier};
use crate::services::write_coordinator::{WriteContext, WriteCoordinator};
use crate::stream::{spawn_query_stream, QueryStream};

/// Evaluate `query` against one consistent snapshot
pub(crate) fn run_query<Q: Query + ?Sized>(pool: &ConnectionPool, query: &Q) -> AppResult<Q::Output> {
    let conn = get_connection(pool)?;
    let tx = conn.unchecked_transaction()?;
    let output = query.fetch(&tx)?;
    tx.commit()?;
    Ok(output)
}

pub struct RecordStore {
    pool: Arc<ConnectionPool>,
    writer: Arc<WriteCoordinator>,
    notifier: Arc<ChangeNotifier>,
}

impl RecordStore {
    pub fn new(pool: Arc<ConnectionPool>, notifier: Arc<ChangeNotifier>) -> Self {
        let writer = Arc::new(WriteCoordinator::new(Arc::clone(&pool), Arc::clone(&notifier)));
        Self {
            pool,
            writer,
            notifier,
        }
    }

    /// Open (and migrate) the database named by `config`
    pub fn open(config: &AppConfig) -> AppResult<Self> {
        let pool = create_connection_pool(&config.database_path, config.pool_size)?;
        {
            let conn = get_connection(&pool)?;
            initialize_database(&conn)?;
        }
        log::info!("Record store opened at {}", config.database_path.display());

        Ok(Self::new(Arc::new(pool), Arc::new(create_change_notifier())))
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    // ========================================================================
    // ONE-SHOT READS (blocking)
    // ========================================================================

    pub fn fetch<Q: Query>(&self, query: &Q) -> AppResult<Q::Output> {
        run_query(&self.pool, query)
    }

    pub fn categories(&self) -> AppResult<Vec<CategoryWithMeals>> {
        self.fetch(&AllCategories)
    }

    pub fn category(&self, id: &str) -> AppResult<Option<CategoryRecord>> {
        self.fetch(&CategoryById(id.to_string()))
    }

    pub fn meals_in_category(&self, category_id: &str) -> AppResult<Vec<MealRecord>> {
        self.fetch(&MealsInCategory(category_id.to_string()))
    }

    pub fn meal(&self, id: &str) -> AppResult<Option<MealWithIngredients>> {
        self.fetch(&MealById(id.to_string()))
    }

    pub fn favorite_meals(&self) -> AppResult<Vec<MealRecord>> {
        self.fetch(&FavoriteMeals)
    }

    // ========================================================================
    // LIVE QUERIES
    // ========================================================================

    /// Live query projected through `transform`.
    ///
    /// Yields the current value first, then every distinct value after a
    /// relevant commit. Must be called from within a tokio runtime.
    pub fn subscribe<Q, T, F>(&self, query: Q, transform: F) -> QueryStream<T>
    where
        Q: Query,
        T: PartialEq + Clone + Send + 'static,
        F: Fn(Q::Output) -> T + Send + Sync + 'static,
    {
        self.subscribe_from(query, None, transform)
    }

    /// Like `subscribe`, but the first emission is skipped if it equals
    /// `initial` (the value the caller already shows).
    pub fn subscribe_from<Q, T, F>(&self, query: Q, initial: Option<T>, transform: F) -> QueryStream<T>
    where
        Q: Query,
        T: PartialEq + Clone + Send + 'static,
        F: Fn(Q::Output) -> T + Send + Sync + 'static,
    {
        spawn_query_stream(
            Arc::clone(&self.pool),
            Arc::clone(&self.notifier),
            query,
            initial,
            transform,
        )
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Run several mutations as one atomic write with a single notification
    pub async fn perform<F, R>(&self, name: impl Into<String>, op: F) -> AppResult<R>
    where
        F: FnOnce(&mut WriteContext<'_>) -> AppResult<R> + Send + 'static,
        R: Send + 'static,
    {
        self.writer.perform(name, op).await
    }

    pub async fn upsert_categories(&self, categories: Vec<Category>) -> AppResult<usize> {
        let name = format!("Categories(count: {})", categories.len());
        self.writer
            .perform(name, move |ctx| operations::upsert_categories(ctx, &categories))
            .await
    }

    pub async fn upsert_meals(&self, meals: Vec<MealSummary>, category_name: String) -> AppResult<usize> {
        let name = format!("Meals(count: {}, category: {})", meals.len(), category_name);
        self.writer
            .perform(name, move |ctx| operations::upsert_meals(ctx, &meals, &category_name))
            .await
    }

    pub async fn upsert_meal_detail(&self, meal: MealDetail) -> AppResult<usize> {
        let name = format!("MealDetail(id: {})", meal.id);
        self.writer
            .perform(name, move |ctx| operations::upsert_meal_detail(ctx, &meal))
            .await
    }

    /// `Some(is_liked)` after the flip, `None` when the meal is unknown
    pub async fn toggle_favorite(&self, meal_id: String) -> AppResult<Option<bool>> {
        let name = format!("ToggleFavorite(id: {})", meal_id);
        self.writer
            .perform(name, move |ctx| operations::toggle_favorite(ctx, &meal_id, Utc::now()))
            .await
    }
}

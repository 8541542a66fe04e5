// src/services/ingestion_service.rs
//
// Ingestion Service - remote fetches into the record store
//
// CRITICAL RULES:
// - Fetches run concurrently; their writes all go through the store's
//   single writer
// - A failed category listing never rolls back the others
// - Fetch failures are logged and reported; cached data stays as it was

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::domain::CategoryName;
use crate::error::AppResult;
use crate::integrations::MealApi;
use crate::store::RecordStore;

/// Outcome of a full refresh
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub categories: usize,
    pub meals: usize,
    /// (category name, error message) per failed meal listing
    pub failed: Vec<(CategoryName, String)>,
}

impl IngestionReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct IngestionService {
    api: Arc<dyn MealApi>,
    store: Arc<RecordStore>,
}

impl IngestionService {
    pub fn new(api: Arc<dyn MealApi>, store: Arc<RecordStore>) -> Self {
        Self { api, store }
    }

    /// Fetch and store all categories, then every category's meal listing.
    ///
    /// Fails only when the category listing itself cannot be fetched or
    /// stored.
    pub async fn refresh_categories(&self) -> AppResult<IngestionReport> {
        let categories = self.api.categories().await?;
        let names: Vec<CategoryName> = categories.iter().map(|c| c.name.clone()).collect();
        self.store.upsert_categories(categories).await?;

        let mut report = IngestionReport {
            categories: names.len(),
            ..Default::default()
        };

        let mut tasks = JoinSet::new();
        for name in names {
            let api = Arc::clone(&self.api);
            let store = Arc::clone(&self.store);
            tasks.spawn(async move {
                let result = ingest_meals(api.as_ref(), &store, &name).await;
                (name, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(count))) => report.meals += count,
                Ok((name, Err(e))) => {
                    log::warn!("Meals for category '{}' not refreshed: {}", name, e);
                    report.failed.push((name, e.to_string()));
                }
                Err(e) => log::error!("Meal listing task failed: {}", e),
            }
        }

        log::info!(
            "Refreshed {} categories, {} meals ({} listings failed)",
            report.categories,
            report.meals,
            report.failed.len()
        );
        Ok(report)
    }

    /// Fetch and store one category's meal listing; returns the meal count
    pub async fn refresh_meals(&self, category_name: &str) -> AppResult<usize> {
        ingest_meals(self.api.as_ref(), &self.store, category_name).await
    }

    /// Fetch and store one meal's detail and ingredients
    pub async fn refresh_meal(&self, id: &str) -> AppResult<()> {
        let detail = self.api.meal_lookup(id).await?;
        self.store.upsert_meal_detail(detail).await?;
        Ok(())
    }
}

async fn ingest_meals(api: &dyn MealApi, store: &RecordStore, category_name: &str) -> AppResult<usize> {
    let meals = api.meals(category_name).await?;
    let count = meals.len();
    store.upsert_meals(meals, category_name.to_string()).await?;
    Ok(count)
}

// src/integrations/mealdb/api.rs
//
// Remote fetcher seam
//
// Services depend on this trait, never on the HTTP client, so tests can
// substitute a mock.

use async_trait::async_trait;

use crate::domain::{Category, MealDetail, MealSummary};
use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MealApi: Send + Sync {
    /// Every category. Fails with Network, Http or Decode.
    async fn categories(&self) -> AppResult<Vec<Category>>;

    /// Meal summaries of one category, looked up by category name.
    /// `ContentMissing` when the API knows no meals for it.
    async fn meals(&self, category_name: &str) -> AppResult<Vec<MealSummary>>;

    /// Full meal payload. `ContentMissing` when the id is unknown.
    async fn meal_lookup(&self, id: &str) -> AppResult<MealDetail>;
}

// src/application/state.rs

use std::sync::Arc;

use crate::application::view_models::CategoriesViewModel;
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::integrations::{MealApi, MealDbClient};
use crate::services::IngestionService;
use crate::store::RecordStore;

/// Everything a front end needs, wired once at startup.
/// All fields are Arc-wrapped for sharing across tasks.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<RecordStore>,
    pub api: Arc<dyn MealApi>,
    pub ingestion: Arc<IngestionService>,
}

impl AppState {
    /// Open the record store and build the HTTP client from `config`
    pub fn initialize(config: AppConfig) -> AppResult<Self> {
        let store = Arc::new(RecordStore::open(&config)?);
        let api: Arc<dyn MealApi> = Arc::new(MealDbClient::new(&config)?);
        Ok(Self::with_parts(config, store, api))
    }

    pub fn with_parts(config: AppConfig, store: Arc<RecordStore>, api: Arc<dyn MealApi>) -> Self {
        let ingestion = Arc::new(IngestionService::new(Arc::clone(&api), Arc::clone(&store)));
        Self {
            config,
            store,
            api,
            ingestion,
        }
    }

    /// Root view model; must be called from within a tokio runtime
    pub fn categories_view_model(&self) -> CategoriesViewModel {
        CategoriesViewModel::new(Arc::clone(&self.store), Arc::clone(&self.ingestion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            database_path: dir.path().join("nested").join("recipebook.db"),
            ..AppConfig::default()
        };

        let state = AppState::initialize(config).unwrap();
        assert!(state.config.database_path.exists());
        assert!(state.store.categories().unwrap().is_empty());

        let view_model = state.categories_view_model();
        assert_eq!(state.store.notifier().listener_count(), 2);
        view_model.cancel();
        assert_eq!(state.store.notifier().listener_count(), 0);
    }
}

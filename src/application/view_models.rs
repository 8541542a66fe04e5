// src/application/view_models.rs
//
// View models
//
// Each view model owns a TaskRegistry: its live queries and fetches die
// with it. Projections are published through watch channels, so a view
// only ever reads the latest value. Fetch and toggle failures are logged
// and swallowed; the view keeps showing what is cached.

use std::sync::Arc;

use tokio::sync::watch;

use crate::application::dto::{
    self, CategoryNameAndId, CategoryRowProps, MealDetailProps, MealRowProps,
};
use crate::domain::MealId;
use crate::services::{IngestionService, TaskRegistry};
use crate::store::{AllCategories, CategoryById, FavoriteMeals, MealById, MealsInCategory, RecordStore};

fn toggle_in_background(tasks: &TaskRegistry, store: &Arc<RecordStore>, meal_id: MealId) {
    let store = Arc::clone(store);
    tasks.spawn(async move {
        if let Err(e) = store.toggle_favorite(meal_id.clone()).await {
            log::warn!("Failed to like meal {}: {}", meal_id, e);
        }
    });
}

// ============================================================================
// CATEGORIES
// ============================================================================

pub struct CategoriesViewModel {
    store: Arc<RecordStore>,
    ingestion: Arc<IngestionService>,
    categories: watch::Receiver<Vec<CategoryRowProps>>,
    favorites: watch::Receiver<CategoryRowProps>,
    tasks: TaskRegistry,
}

impl CategoriesViewModel {
    /// Must be called from within a tokio runtime
    pub fn new(store: Arc<RecordStore>, ingestion: Arc<IngestionService>) -> Self {
        let tasks = TaskRegistry::new("CategoriesViewModel");

        let empty_favorites = CategoryRowProps::favorites(Vec::new());
        let (categories_tx, categories) = watch::channel(Vec::new());
        let (favorites_tx, favorites) = watch::channel(empty_favorites.clone());

        tasks.subscribe(
            store.subscribe_from(AllCategories, Some(Vec::new()), dto::category_rows),
            move |rows| {
                categories_tx.send_replace(rows);
            },
        );
        tasks.subscribe(
            store.subscribe_from(FavoriteMeals, Some(empty_favorites), dto::favorites_row),
            move |row| {
                favorites_tx.send_replace(row);
            },
        );

        Self {
            store,
            ingestion,
            categories,
            favorites,
            tasks,
        }
    }

    pub fn categories(&self) -> watch::Receiver<Vec<CategoryRowProps>> {
        self.categories.clone()
    }

    pub fn favorites(&self) -> watch::Receiver<CategoryRowProps> {
        self.favorites.clone()
    }

    pub fn category_detail(&self, category: CategoryNameAndId) -> CategoryDetailViewModel {
        CategoryDetailViewModel::new(category, Arc::clone(&self.store), Arc::clone(&self.ingestion))
    }

    pub fn meal_detail(&self, meal_id: MealId) -> MealDetailViewModel {
        MealDetailViewModel::new(meal_id, Arc::clone(&self.store), Arc::clone(&self.ingestion))
    }

    pub async fn fetch_categories(&self) {
        match self.ingestion.refresh_categories().await {
            Ok(report) if !report.is_complete() => {
                log::warn!("Fetch categories incomplete: {} listings failed", report.failed.len())
            }
            Ok(_) => {}
            Err(e) => log::warn!("Fetch categories failed: {}", e),
        }
    }

    pub fn cancel(&self) {
        self.tasks.cancel();
    }
}

// ============================================================================
// CATEGORY DETAIL
// ============================================================================

pub struct CategoryDetailViewModel {
    category: CategoryNameAndId,
    store: Arc<RecordStore>,
    ingestion: Arc<IngestionService>,
    body: watch::Receiver<String>,
    meals: watch::Receiver<Vec<MealRowProps>>,
    tasks: TaskRegistry,
}

impl CategoryDetailViewModel {
    pub fn new(
        category: CategoryNameAndId,
        store: Arc<RecordStore>,
        ingestion: Arc<IngestionService>,
    ) -> Self {
        let tasks = TaskRegistry::new(format!("CategoryDetailViewModel({})", category.id));

        let (body_tx, body) = watch::channel(String::new());
        let (meals_tx, meals) = watch::channel(Vec::new());

        tasks.subscribe(
            store.subscribe(CategoryById(category.id.clone()), dto::category_body),
            move |text| {
                body_tx.send_replace(text);
            },
        );
        tasks.subscribe(
            store.subscribe(MealsInCategory(category.id.clone()), dto::meal_rows),
            move |rows| {
                meals_tx.send_replace(rows);
            },
        );

        Self {
            category,
            store,
            ingestion,
            body,
            meals,
            tasks,
        }
    }

    pub fn category(&self) -> &CategoryNameAndId {
        &self.category
    }

    pub fn body(&self) -> watch::Receiver<String> {
        self.body.clone()
    }

    pub fn meals(&self) -> watch::Receiver<Vec<MealRowProps>> {
        self.meals.clone()
    }

    pub fn meal_detail(&self, meal_id: MealId) -> MealDetailViewModel {
        MealDetailViewModel::new(meal_id, Arc::clone(&self.store), Arc::clone(&self.ingestion))
    }

    pub async fn fetch_meals(&self) {
        if let Err(e) = self.ingestion.refresh_meals(&self.category.name).await {
            log::warn!("Fetch meals for '{}' failed: {}", self.category.name, e);
        }
    }

    pub fn toggle_like(&self, meal_id: MealId) {
        toggle_in_background(&self.tasks, &self.store, meal_id);
    }

    pub fn cancel(&self) {
        self.tasks.cancel();
    }
}

// ============================================================================
// MEAL DETAIL
// ============================================================================

pub struct MealDetailViewModel {
    meal_id: MealId,
    store: Arc<RecordStore>,
    ingestion: Arc<IngestionService>,
    props: watch::Receiver<MealDetailProps>,
    tasks: TaskRegistry,
}

impl MealDetailViewModel {
    pub fn new(meal_id: MealId, store: Arc<RecordStore>, ingestion: Arc<IngestionService>) -> Self {
        let tasks = TaskRegistry::new(format!("MealDetailViewModel({})", meal_id));
        let (props_tx, props) = watch::channel(MealDetailProps::default());

        tasks.subscribe(
            store.subscribe_from(
                MealById(meal_id.clone()),
                Some(MealDetailProps::default()),
                dto::meal_detail,
            ),
            move |value| {
                props_tx.send_replace(value);
            },
        );

        Self {
            meal_id,
            store,
            ingestion,
            props,
            tasks,
        }
    }

    pub fn meal_id(&self) -> &str {
        &self.meal_id
    }

    pub fn props(&self) -> watch::Receiver<MealDetailProps> {
        self.props.clone()
    }

    pub async fn fetch_meal(&self) {
        if let Err(e) = self.ingestion.refresh_meal(&self.meal_id).await {
            log::warn!("Fetch meal {} failed: {}", self.meal_id, e);
        }
    }

    pub fn toggle_like(&self) {
        toggle_in_background(&self.tasks, &self.store, self.meal_id.clone());
    }

    pub fn cancel(&self) {
        self.tasks.cancel();
    }
}

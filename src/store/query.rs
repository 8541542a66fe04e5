// src/store/query.rs
//
// Read-only queries over the record store
//
// A query declares which entity kinds can affect its result. Live
// subscriptions only re-run a query when a commit touches one of them.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::domain::{CategoryId, CategoryRecord, CategoryWithMeals, MealId, MealRecord, MealWithIngredients};
use crate::error::AppResult;
use crate::events::{EntityKind, EntityKinds};
use crate::repositories::{CategoryRepository, IngredientRepository, MealRepository};

pub trait Query: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Entity kinds whose changes may alter the result
    fn interest(&self) -> EntityKinds;

    /// Runs against one snapshot; the caller owns the read transaction
    fn fetch(&self, conn: &Connection) -> AppResult<Self::Output>;

    fn describe(&self) -> String;
}

/// Every category sorted by name, each with its meals sorted by name then id
#[derive(Debug, Clone, Copy, Default)]
pub struct AllCategories;

impl Query for AllCategories {
    type Output = Vec<CategoryWithMeals>;

    fn interest(&self) -> EntityKinds {
        EntityKinds::of(EntityKind::Category).with(EntityKind::Meal)
    }

    fn fetch(&self, conn: &Connection) -> AppResult<Self::Output> {
        let categories = CategoryRepository::new(conn).list_all()?;

        let mut by_category: HashMap<CategoryId, Vec<MealRecord>> = HashMap::new();
        for meal in MealRepository::new(conn).list_categorized()? {
            if let Some(category_id) = meal.category_id.clone() {
                by_category.entry(category_id).or_default().push(meal);
            }
        }

        Ok(categories
            .into_iter()
            .map(|category| {
                let meals = by_category.remove(&category.id).unwrap_or_default();
                CategoryWithMeals { category, meals }
            })
            .collect())
    }

    fn describe(&self) -> String {
        "AllCategories".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct CategoryById(pub CategoryId);

impl Query for CategoryById {
    type Output = Option<CategoryRecord>;

    fn interest(&self) -> EntityKinds {
        EntityKinds::of(EntityKind::Category)
    }

    fn fetch(&self, conn: &Connection) -> AppResult<Self::Output> {
        CategoryRepository::new(conn).get_by_id(&self.0)
    }

    fn describe(&self) -> String {
        format!("CategoryById({})", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct MealsInCategory(pub CategoryId);

impl Query for MealsInCategory {
    type Output = Vec<MealRecord>;

    fn interest(&self) -> EntityKinds {
        EntityKinds::of(EntityKind::Meal)
    }

    fn fetch(&self, conn: &Connection) -> AppResult<Self::Output> {
        MealRepository::new(conn).list_by_category(&self.0)
    }

    fn describe(&self) -> String {
        format!("MealsInCategory({})", self.0)
    }
}

/// One meal with its ingredients in sort order
#[derive(Debug, Clone)]
pub struct MealById(pub MealId);

impl Query for MealById {
    type Output = Option<MealWithIngredients>;

    fn interest(&self) -> EntityKinds {
        EntityKinds::of(EntityKind::Meal).with(EntityKind::Ingredient)
    }

    fn fetch(&self, conn: &Connection) -> AppResult<Self::Output> {
        let Some(meal) = MealRepository::new(conn).get_by_id(&self.0)? else {
            return Ok(None);
        };
        let ingredients = IngredientRepository::new(conn).list_by_meal(&meal.id)?;
        Ok(Some(MealWithIngredients { meal, ingredients }))
    }

    fn describe(&self) -> String {
        format!("MealById({})", self.0)
    }
}

/// Liked meals, most recently liked first
#[derive(Debug, Clone, Copy, Default)]
pub struct FavoriteMeals;

impl Query for FavoriteMeals {
    type Output = Vec<MealRecord>;

    fn interest(&self) -> EntityKinds {
        EntityKinds::of(EntityKind::Meal)
    }

    fn fetch(&self, conn: &Connection) -> AppResult<Self::Output> {
        MealRepository::new(conn).list_favorites()
    }

    fn describe(&self) -> String {
        "FavoriteMeals".to_string()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::category::CategoryId;
use crate::domain::ingredient::{ingredient_id, IngredientLine, IngredientRecord};

pub type MealId = String;

/// A meal as listed by the category filter endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealSummary {
    pub id: MealId,
    pub name: Option<String>,
    pub thumbnail: Option<String>,
}

/// Full meal payload from a detail lookup
///
/// `ingredients` and `measurements` are positional: entry `i` of one belongs
/// to entry `i` of the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealDetail {
    pub id: MealId,
    pub name: Option<String>,
    pub drink_alternate: Option<String>,
    /// Category name, as the API reports it
    pub category: Option<String>,
    pub area: Option<String>,
    pub instructions: Option<String>,
    pub thumbnail: Option<String>,
    pub tags: Option<String>,
    pub youtube: Option<String>,
    pub ingredients: Vec<String>,
    pub measurements: Vec<String>,
    pub source: Option<String>,
    pub image_source: Option<String>,
    pub creative_commons_confirmed: Option<String>,
    pub date_modified: Option<String>,
}

impl MealDetail {
    pub fn new(id: impl Into<MealId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Ingredient/measurement pairs in source order. Unpaired trailing
    /// entries are dropped.
    pub fn ingredient_lines(&self) -> Vec<IngredientLine> {
        self.ingredients
            .iter()
            .zip(self.measurements.iter())
            .enumerate()
            .map(|(index, (ingredient, measurement))| IngredientLine {
                id: ingredient_id(&self.id, index),
                ingredient: ingredient.clone(),
                measurement: measurement.clone(),
                sort_order: index as i64,
            })
            .collect()
    }
}

/// A stored meal row
///
/// Detail fields stay `None` until a detail lookup has been saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: MealId,
    pub name: Option<String>,
    pub thumbnail: Option<String>,
    pub drink_alternate: Option<String>,
    pub area: Option<String>,
    pub instructions: Option<String>,
    pub tags: Option<String>,
    pub youtube: Option<String>,
    pub source: Option<String>,
    pub image_source: Option<String>,
    pub creative_commons_confirmed: Option<String>,
    pub date_modified: Option<String>,

    /// Set when the user likes the meal; only the favorite toggle writes it
    pub liked_at: Option<DateTime<Utc>>,

    pub category_id: Option<CategoryId>,
}

impl MealRecord {
    pub fn new(id: impl Into<MealId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn is_liked(&self) -> bool {
        self.liked_at.is_some()
    }

    /// Flips the favorite state; returns the new state
    pub fn toggle_like(&mut self, now: DateTime<Utc>) -> bool {
        self.liked_at = match self.liked_at {
            Some(_) => None,
            None => Some(now),
        };
        self.is_liked()
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// A meal with its ingredient rows, sorted by sort order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealWithIngredients {
    pub meal: MealRecord,
    pub ingredients: Vec<IngredientRecord>,
}

// src/application/dto/mod.rs
//
// View projections
//
// CRITICAL PRINCIPLES:
// - Projections carry only what a view shows
// - They are Clone + PartialEq so live queries can drop redundant updates
// - Conversion FROM stored records only (never TO)

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::{
    CategoryId, CategoryName, CategoryRecord, CategoryWithMeals, IngredientRecord, MealId,
    MealRecord, MealWithIngredients,
};

pub const FAVORITES_ROW_ID: &str = "favorites";
pub const FAVORITES_ROW_TITLE: &str = "Favorites";

// ============================================================================
// CATEGORY ROWS
// ============================================================================

/// The API looks categories up by name, the store by id; views keep both
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CategoryNameAndId {
    pub id: CategoryId,
    pub name: CategoryName,
}

impl From<&CategoryRecord> for CategoryNameAndId {
    fn from(record: &CategoryRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CategoryRowCellProps {
    pub id: MealId,
    pub name: String,
    pub image_url: Option<String>,
}

impl Ord for CategoryRowCellProps {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.name, &self.id, &self.image_url).cmp(&(&other.name, &other.id, &other.image_url))
    }
}

impl PartialOrd for CategoryRowCellProps {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&MealRecord> for CategoryRowCellProps {
    fn from(record: &MealRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone().unwrap_or_default(),
            image_url: record.thumbnail_url().map(str::to_string),
        }
    }
}

/// One horizontal row: a category title and its meal cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CategoryRowProps {
    pub category: CategoryNameAndId,
    pub cells: Vec<CategoryRowCellProps>,
}

impl CategoryRowProps {
    /// Synthetic row of liked meals; cells keep the order given
    pub fn favorites(cells: Vec<CategoryRowCellProps>) -> Self {
        Self {
            category: CategoryNameAndId {
                id: FAVORITES_ROW_ID.to_string(),
                name: FAVORITES_ROW_TITLE.to_string(),
            },
            cells,
        }
    }

    pub fn id(&self) -> &str {
        &self.category.id
    }

    pub fn title(&self) -> &str {
        &self.category.name
    }

    pub fn is_favorites(&self) -> bool {
        self.id() == FAVORITES_ROW_ID
    }
}

impl From<&CategoryWithMeals> for CategoryRowProps {
    fn from(entry: &CategoryWithMeals) -> Self {
        let mut cells: Vec<CategoryRowCellProps> =
            entry.meals.iter().map(CategoryRowCellProps::from).collect();
        cells.sort();

        Self {
            category: CategoryNameAndId::from(&entry.category),
            cells,
        }
    }
}

// ============================================================================
// MEAL ROWS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct MealRowProps {
    pub id: MealId,
    pub name: String,
    pub image_url: Option<String>,
    pub is_liked: bool,
}

impl From<&MealRecord> for MealRowProps {
    fn from(record: &MealRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone().unwrap_or_default(),
            image_url: record.thumbnail_url().map(str::to_string),
            is_liked: record.is_liked(),
        }
    }
}

// ============================================================================
// MEAL DETAIL
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct IngredientRowProps {
    pub id: String,
    pub name: String,
    pub measurement: String,
}

impl From<&IngredientRecord> for IngredientRowProps {
    fn from(record: &IngredientRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            measurement: record.measurement.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct MealDetailProps {
    pub is_liked: bool,
    pub image_url: Option<String>,
    pub name: String,
    pub instructions: String,
    pub ingredients: Vec<IngredientRowProps>,
}

impl From<&MealWithIngredients> for MealDetailProps {
    fn from(entry: &MealWithIngredients) -> Self {
        let mut ingredients: Vec<&IngredientRecord> = entry.ingredients.iter().collect();
        ingredients.sort_by_key(|i| i.sort_order);

        Self {
            is_liked: entry.meal.is_liked(),
            image_url: entry.meal.thumbnail_url().map(str::to_string),
            name: entry.meal.name.clone().unwrap_or_default(),
            instructions: entry.meal.instructions.clone().unwrap_or_default(),
            ingredients: ingredients.into_iter().map(IngredientRowProps::from).collect(),
        }
    }
}

// ============================================================================
// TRANSFORMS
// ============================================================================
// Plain functions so they can be handed straight to RecordStore::subscribe

pub fn category_rows(categories: Vec<CategoryWithMeals>) -> Vec<CategoryRowProps> {
    categories.iter().map(CategoryRowProps::from).collect()
}

pub fn favorites_row(meals: Vec<MealRecord>) -> CategoryRowProps {
    CategoryRowProps::favorites(meals.iter().map(CategoryRowCellProps::from).collect())
}

pub fn meal_rows(meals: Vec<MealRecord>) -> Vec<MealRowProps> {
    meals.iter().map(MealRowProps::from).collect()
}

pub fn category_body(category: Option<CategoryRecord>) -> String {
    category.and_then(|c| c.body).unwrap_or_default()
}

pub fn meal_detail(meal: Option<MealWithIngredients>) -> MealDetailProps {
    meal.as_ref().map(MealDetailProps::from).unwrap_or_default()
}

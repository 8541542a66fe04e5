use serde::{Deserialize, Serialize};

use crate::domain::meal::MealRecord;

pub type CategoryId = String;
pub type CategoryName = String;

/// Prefix for ids of categories only known by name so far
const PROVISIONAL_PREFIX: &str = "provisional:";

/// A category as delivered by the category listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub thumbnail: Option<String>,
    pub body: Option<String>,
}

/// A stored category row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub name: CategoryName,
    pub thumbnail: Option<String>,
    pub body: Option<String>,

    /// True while the id is a placeholder. Meal listings only carry a
    /// category name; the real id arrives with the next category listing.
    pub provisional: bool,
}

impl CategoryRecord {
    /// Placeholder record for a category only known by name
    pub fn provisional(name: &str) -> Self {
        Self {
            id: provisional_category_id(name),
            name: name.to_string(),
            thumbnail: None,
            body: None,
            provisional: true,
        }
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail.as_deref().filter(|s| !s.trim().is_empty())
    }
}

impl From<&Category> for CategoryRecord {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
            thumbnail: category.thumbnail.clone(),
            body: category.body.clone(),
            provisional: false,
        }
    }
}

pub fn provisional_category_id(name: &str) -> CategoryId {
    format!("{}{}", PROVISIONAL_PREFIX, name)
}

/// A category together with the meals that reference it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWithMeals {
    pub category: CategoryRecord,
    /// Sorted by name, then id
    pub meals: Vec<MealRecord>,
}

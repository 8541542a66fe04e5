// src/integrations/mealdb/wire.rs
//
// TheMealDB JSON payloads and their mapping to domain payloads
//
// - Every endpoint wraps its list in a top-level object
// - `meals: null` means nothing was found
// - Lookups flatten ingredients into strIngredient1..N / strMeasure1..N

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::{Category, MealDetail, MealSummary};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub(crate) struct CategoriesResponse {
    categories: Option<Vec<CategoryWire>>,
}

#[derive(Debug, Deserialize)]
struct CategoryWire {
    #[serde(rename = "idCategory")]
    id: String,
    #[serde(rename = "strCategory")]
    name: String,
    #[serde(rename = "strCategoryThumb")]
    thumbnail: Option<String>,
    #[serde(rename = "strCategoryDescription")]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MealsResponse<T> {
    meals: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MealSummaryWire {
    #[serde(rename = "idMeal")]
    id: String,
    #[serde(rename = "strMeal")]
    name: Option<String>,
    #[serde(rename = "strMealThumb")]
    thumbnail: Option<String>,
}

/// Lookups are kept as raw objects; the numbered keys don't map to a struct
pub(crate) type MealLookupWire = Map<String, Value>;

impl CategoriesResponse {
    pub(crate) fn into_categories(self) -> Vec<Category> {
        self.categories
            .unwrap_or_default()
            .into_iter()
            .map(|c| Category {
                id: c.id,
                name: c.name,
                thumbnail: c.thumbnail,
                body: c.description,
            })
            .collect()
    }
}

impl<T> MealsResponse<T> {
    /// The list, or `ContentMissing` when the API answered `null`
    pub(crate) fn into_meals(self) -> AppResult<Vec<T>> {
        self.meals.ok_or(AppError::ContentMissing)
    }
}

impl From<MealSummaryWire> for MealSummary {
    fn from(wire: MealSummaryWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            thumbnail: wire.thumbnail,
        }
    }
}

fn text(object: &MealLookupWire, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

/// `{prefix}1`, `{prefix}2`, ... up to the first missing, null or blank entry
fn flattened(object: &MealLookupWire, prefix: &str) -> Vec<String> {
    (1..)
        .map(|index| text(object, &format!("{}{}", prefix, index)))
        .take_while(|item| item.as_deref().is_some_and(|s| !s.trim().is_empty()))
        .flatten()
        .collect()
}

pub(crate) fn meal_detail_from_wire(object: &MealLookupWire) -> AppResult<MealDetail> {
    let id = match object.get("idMeal") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => return Err(AppError::Decode("lookup without idMeal".to_string())),
    };

    Ok(MealDetail {
        id,
        name: text(object, "strMeal"),
        drink_alternate: text(object, "strDrinkAlternate"),
        category: text(object, "strCategory"),
        area: text(object, "strArea"),
        instructions: text(object, "strInstructions"),
        thumbnail: text(object, "strMealThumb"),
        tags: text(object, "strTags"),
        youtube: text(object, "strYoutube"),
        ingredients: flattened(object, "strIngredient"),
        measurements: flattened(object, "strMeasure"),
        source: text(object, "strSource"),
        image_source: text(object, "strImageSource"),
        creative_commons_confirmed: text(object, "strCreativeCommonsConfirmed"),
        date_modified: text(object, "dateModified"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOKUP: &str = r#"{"meals":[{
        "idMeal":"52772","strMeal":"Teriyaki Chicken Casserole","strDrinkAlternate":null,
        "strCategory":"Chicken","strArea":"Japanese","strInstructions":"Preheat oven to 350.",
        "strMealThumb":"https://www.themealdb.com/images/media/meals/wvpsxx1468256321.jpg",
        "strTags":"Meat,Casserole","strYoutube":"https://www.youtube.com/watch?v=4aZr5hZXP_s",
        "strIngredient1":"soy sauce","strIngredient2":"water","strIngredient3":"brown sugar",
        "strIngredient4":"","strIngredient5":"corn",
        "strMeasure1":"3/4 cup","strMeasure2":"1/2 cup","strMeasure3":"1/4 cup",
        "strMeasure4":" ","strMeasure5":"1 cup",
        "strSource":null,"strImageSource":null,"strCreativeCommonsConfirmed":null,"dateModified":null
    }]}"#;

    #[test]
    fn test_lookup_flattened_lists_stop_at_first_blank() {
        let response: MealsResponse<MealLookupWire> = serde_json::from_str(LOOKUP).unwrap();
        let meals = response.into_meals().unwrap();
        let detail = meal_detail_from_wire(&meals[0]).unwrap();

        assert_eq!(detail.id, "52772");
        assert_eq!(detail.area.as_deref(), Some("Japanese"));
        assert!(detail.drink_alternate.is_none());
        assert_eq!(detail.ingredients, vec!["soy sauce", "water", "brown sugar"]);
        assert_eq!(detail.measurements, vec!["3/4 cup", "1/2 cup", "1/4 cup"]);
        assert_eq!(detail.ingredient_lines()[2].id, "52772:2");
    }

    #[test]
    fn test_null_meals_is_content_missing() {
        let response: MealsResponse<MealSummaryWire> = serde_json::from_str(r#"{"meals":null}"#).unwrap();
        assert!(matches!(response.into_meals(), Err(AppError::ContentMissing)));
    }

    #[test]
    fn test_categories_mapping() {
        let json = r#"{"categories":[{"idCategory":"3","strCategory":"Dessert",
            "strCategoryThumb":"https://www.themealdb.com/images/category/dessert.png",
            "strCategoryDescription":"Dessert is a course that concludes a meal."}]}"#;
        let response: CategoriesResponse = serde_json::from_str(json).unwrap();
        let categories = response.into_categories();

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].id, "3");
        assert_eq!(categories[0].body.as_deref(), Some("Dessert is a course that concludes a meal."));
    }

    #[test]
    fn test_lookup_without_id_is_decode_error() {
        let object: MealLookupWire = serde_json::from_str(r#"{"strMeal":"Nameless"}"#).unwrap();
        assert!(matches!(meal_detail_from_wire(&object), Err(AppError::Decode(_))));
    }
}

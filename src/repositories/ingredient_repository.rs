// src/repositories/ingredient_repository.rs
//
// Ingredient persistence

use rusqlite::{params, Connection, Row};

use crate::domain::IngredientRecord;
use crate::error::AppResult;

pub struct IngredientRepository<'c> {
    conn: &'c Connection,
}

impl<'c> IngredientRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn row_to_ingredient(row: &Row) -> Result<IngredientRecord, rusqlite::Error> {
        Ok(IngredientRecord {
            id: row.get("id")?,
            meal_id: row.get("meal_id")?,
            name: row.get("name")?,
            measurement: row.get("measurement")?,
            sort_order: row.get("sort_order")?,
        })
    }

    /// Ingredients of one meal in source order
    pub fn list_by_meal(&self, meal_id: &str) -> AppResult<Vec<IngredientRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, meal_id, name, measurement, sort_order
             FROM meal_ingredients
             WHERE meal_id = ?1
             ORDER BY sort_order ASC, id ASC",
        )?;

        let ingredients = stmt
            .query_map(params![meal_id], Self::row_to_ingredient)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }

    pub fn delete_by_meal(&self, meal_id: &str) -> AppResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM meal_ingredients WHERE meal_id = ?1",
            params![meal_id],
        )?;

        Ok(changed)
    }

    pub fn insert(&self, ingredient: &IngredientRecord) -> AppResult<usize> {
        let changed = self.conn.execute(
            "INSERT INTO meal_ingredients (id, meal_id, name, measurement, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                ingredient.id,
                ingredient.meal_id,
                ingredient.name,
                ingredient.measurement,
                ingredient.sort_order,
            ],
        )?;

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_connection, initialize_database};
    use crate::domain::{ingredient_id, MealDetail};
    use crate::repositories::MealRepository;

    fn ingredient(meal_id: &str, index: usize, name: &str) -> IngredientRecord {
        IngredientRecord {
            id: ingredient_id(meal_id, index),
            meal_id: meal_id.to_string(),
            name: name.to_string(),
            measurement: "1".to_string(),
            sort_order: index as i64,
        }
    }

    #[test]
    fn test_insert_list_delete() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();
        MealRepository::new(&conn).upsert_detail(&MealDetail::new("52772")).unwrap();

        let repo = IngredientRepository::new(&conn);
        repo.insert(&ingredient("52772", 1, "Soy Sauce")).unwrap();
        repo.insert(&ingredient("52772", 0, "Chicken")).unwrap();

        let names: Vec<String> = repo
            .list_by_meal("52772")
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Chicken", "Soy Sauce"]);

        assert_eq!(repo.delete_by_meal("52772").unwrap(), 2);
        assert!(repo.list_by_meal("52772").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();
        MealRepository::new(&conn).upsert_detail(&MealDetail::new("52772")).unwrap();

        let repo = IngredientRepository::new(&conn);
        repo.insert(&ingredient("52772", 0, "Chicken")).unwrap();
        assert!(repo.insert(&ingredient("52772", 0, "Chicken")).is_err());
    }
}

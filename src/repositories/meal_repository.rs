// src/repositories/meal_repository.rs
//
// Meal persistence

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::domain::{MealDetail, MealRecord, MealSummary};
use crate::error::{AppError, AppResult};
use crate::repositories::{timestamp_from_sql, timestamp_to_sql};

const MEAL_COLUMNS: &str = "id, name, thumbnail, drink_alternate, area, instructions, tags,
    youtube, source, image_source, creative_commons_confirmed, date_modified,
    liked_at, category_id";

pub struct MealRepository<'c> {
    conn: &'c Connection,
}

impl<'c> MealRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn row_to_meal(row: &Row) -> Result<MealRecord, rusqlite::Error> {
        let liked_at: Option<String> = row.get("liked_at")?;
        let liked_at = liked_at
            .map(|s| timestamp_from_sql(12, &s))
            .transpose()?;

        Ok(MealRecord {
            id: row.get("id")?,
            name: row.get("name")?,
            thumbnail: row.get("thumbnail")?,
            drink_alternate: row.get("drink_alternate")?,
            area: row.get("area")?,
            instructions: row.get("instructions")?,
            tags: row.get("tags")?,
            youtube: row.get("youtube")?,
            source: row.get("source")?,
            image_source: row.get("image_source")?,
            creative_commons_confirmed: row.get("creative_commons_confirmed")?,
            date_modified: row.get("date_modified")?,
            liked_at,
            category_id: row.get("category_id")?,
        })
    }

    fn query_list(&self, sql: &str, params: impl rusqlite::Params) -> AppResult<Vec<MealRecord>> {
        let mut stmt = self.conn.prepare_cached(sql)?;

        let meals = stmt
            .query_map(params, Self::row_to_meal)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(meals)
    }

    pub fn get_by_id(&self, id: &str) -> AppResult<Option<MealRecord>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT {} FROM meals WHERE id = ?1", MEAL_COLUMNS))?;

        match stmt.query_row(params![id], Self::row_to_meal) {
            Ok(meal) => Ok(Some(meal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// Meals of one category, sorted by name then id
    pub fn list_by_category(&self, category_id: &str) -> AppResult<Vec<MealRecord>> {
        self.query_list(
            &format!(
                "SELECT {} FROM meals WHERE category_id = ?1 ORDER BY name ASC, id ASC",
                MEAL_COLUMNS
            ),
            params![category_id],
        )
    }

    /// Every meal linked to some category, sorted by name then id
    pub fn list_categorized(&self) -> AppResult<Vec<MealRecord>> {
        self.query_list(
            &format!(
                "SELECT {} FROM meals WHERE category_id IS NOT NULL ORDER BY name ASC, id ASC",
                MEAL_COLUMNS
            ),
            [],
        )
    }

    /// Liked meals, most recently liked first
    pub fn list_favorites(&self) -> AppResult<Vec<MealRecord>> {
        self.query_list(
            &format!(
                "SELECT {} FROM meals WHERE liked_at IS NOT NULL ORDER BY liked_at DESC, id ASC",
                MEAL_COLUMNS
            ),
            [],
        )
    }

    /// Insert or update the listing fields and the category link.
    /// Detail fields and the favorite timestamp are left untouched.
    pub fn upsert_summary(&self, meal: &MealSummary, category_id: &str) -> AppResult<usize> {
        let changed = self.conn.execute(
            "INSERT INTO meals (id, name, thumbnail, category_id)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                thumbnail = excluded.thumbnail,
                category_id = excluded.category_id
             WHERE (meals.name, meals.thumbnail, meals.category_id)
                IS NOT (excluded.name, excluded.thumbnail, excluded.category_id)",
            params![meal.id, meal.name, meal.thumbnail, category_id],
        )?;

        Ok(changed)
    }

    /// Insert or update every detail field.
    /// The category link and the favorite timestamp are left untouched.
    pub fn upsert_detail(&self, meal: &MealDetail) -> AppResult<usize> {
        let changed = self.conn.execute(
            "INSERT INTO meals (
                id, name, thumbnail, drink_alternate, area, instructions, tags,
                youtube, source, image_source, creative_commons_confirmed, date_modified
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                thumbnail = excluded.thumbnail,
                drink_alternate = excluded.drink_alternate,
                area = excluded.area,
                instructions = excluded.instructions,
                tags = excluded.tags,
                youtube = excluded.youtube,
                source = excluded.source,
                image_source = excluded.image_source,
                creative_commons_confirmed = excluded.creative_commons_confirmed,
                date_modified = excluded.date_modified
             WHERE (meals.name, meals.thumbnail, meals.drink_alternate, meals.area,
                    meals.instructions, meals.tags, meals.youtube, meals.source,
                    meals.image_source, meals.creative_commons_confirmed, meals.date_modified)
                IS NOT (excluded.name, excluded.thumbnail, excluded.drink_alternate, excluded.area,
                    excluded.instructions, excluded.tags, excluded.youtube, excluded.source,
                    excluded.image_source, excluded.creative_commons_confirmed, excluded.date_modified)",
            params![
                meal.id,
                meal.name,
                meal.thumbnail,
                meal.drink_alternate,
                meal.area,
                meal.instructions,
                meal.tags,
                meal.youtube,
                meal.source,
                meal.image_source,
                meal.creative_commons_confirmed,
                meal.date_modified,
            ],
        )?;

        Ok(changed)
    }

    pub fn set_liked_at(&self, id: &str, liked_at: Option<DateTime<Utc>>) -> AppResult<usize> {
        let changed = self.conn.execute(
            "UPDATE meals SET liked_at = ?2 WHERE id = ?1",
            params![id, liked_at.as_ref().map(timestamp_to_sql)],
        )?;

        Ok(changed)
    }

    /// Re-link every meal of one category to another
    pub fn move_category(&self, from_id: &str, to_id: &str) -> AppResult<usize> {
        let changed = self.conn.execute(
            "UPDATE meals SET category_id = ?2 WHERE category_id = ?1",
            params![from_id, to_id],
        )?;

        Ok(changed)
    }
}

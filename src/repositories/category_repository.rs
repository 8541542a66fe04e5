// src/repositories/category_repository.rs
//
// Category persistence

use rusqlite::{params, Connection, Row};

use crate::domain::CategoryRecord;
use crate::error::{AppError, AppResult};

const CATEGORY_COLUMNS: &str = "id, name, thumbnail, body, provisional";

pub struct CategoryRepository<'c> {
    conn: &'c Connection,
}

impl<'c> CategoryRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn row_to_category(row: &Row) -> Result<CategoryRecord, rusqlite::Error> {
        Ok(CategoryRecord {
            id: row.get("id")?,
            name: row.get("name")?,
            thumbnail: row.get("thumbnail")?,
            body: row.get("body")?,
            provisional: row.get("provisional")?,
        })
    }

    fn query_one(&self, sql: &str, params: impl rusqlite::Params) -> AppResult<Option<CategoryRecord>> {
        let mut stmt = self.conn.prepare_cached(sql)?;

        match stmt.query_row(params, Self::row_to_category) {
            Ok(category) => Ok(Some(category)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    pub fn get_by_id(&self, id: &str) -> AppResult<Option<CategoryRecord>> {
        self.query_one(
            &format!("SELECT {} FROM categories WHERE id = ?1", CATEGORY_COLUMNS),
            params![id],
        )
    }

    /// First category carrying `name`; real records win over provisional ones
    pub fn find_by_name(&self, name: &str) -> AppResult<Option<CategoryRecord>> {
        self.query_one(
            &format!(
                "SELECT {} FROM categories WHERE name = ?1
                 ORDER BY provisional ASC, id ASC LIMIT 1",
                CATEGORY_COLUMNS
            ),
            params![name],
        )
    }

    pub fn find_provisional_by_name(&self, name: &str) -> AppResult<Option<CategoryRecord>> {
        self.query_one(
            &format!(
                "SELECT {} FROM categories WHERE name = ?1 AND provisional = 1
                 ORDER BY id ASC LIMIT 1",
                CATEGORY_COLUMNS
            ),
            params![name],
        )
    }

    /// All categories, sorted by name
    pub fn list_all(&self) -> AppResult<Vec<CategoryRecord>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {} FROM categories ORDER BY name ASC, id ASC",
            CATEGORY_COLUMNS
        ))?;

        let categories = stmt
            .query_map([], Self::row_to_category)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Insert or update by id. Unchanged rows are left alone (returns 0).
    pub fn save(&self, category: &CategoryRecord) -> AppResult<usize> {
        let changed = self.conn.execute(
            "INSERT INTO categories (id, name, thumbnail, body, provisional)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                thumbnail = excluded.thumbnail,
                body = excluded.body,
                provisional = excluded.provisional
             WHERE (categories.name, categories.thumbnail, categories.body, categories.provisional)
                IS NOT (excluded.name, excluded.thumbnail, excluded.body, excluded.provisional)",
            params![
                category.id,
                category.name,
                category.thumbnail,
                category.body,
                category.provisional,
            ],
        )?;

        Ok(changed)
    }

    /// Replace a category id. Meals follow via ON UPDATE CASCADE.
    pub fn rekey(&self, old_id: &str, new_id: &str) -> AppResult<usize> {
        let changed = self.conn.execute(
            "UPDATE categories SET id = ?2 WHERE id = ?1",
            params![old_id, new_id],
        )?;

        Ok(changed)
    }

    /// Only used to fold a provisional record into its real counterpart
    pub(crate) fn delete(&self, id: &str) -> AppResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;

        Ok(changed)
    }

    pub fn count(&self) -> AppResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(count)
    }
}

//! Category catalog

use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{Category, SeedResult};

/// Default catalog as (name, emoji, color)
pub const DEFAULT_CATEGORIES: &[(&str, &str, &str)] = &[
    ("Food", "🍔", "#ffebee"),
    ("Travel", "🚕", "#e3f2fd"),
    ("Fun", "🎮", "#f3e5f5"),
    ("Shopping", "🛒", "#e8f5e8"),
    ("Health", "💊", "#fff3e0"),
    ("Education", "📚", "#fce4ec"),
    ("Bills", "💡", "#e1f5fe"),
    ("Salary", "💰", "#e8f5e8"),
    ("Investment", "📈", "#f1f8e9"),
    ("Gift", "🎁", "#fce4ec"),
];

impl Database {
    /// Seed the default categories (idempotent)
    ///
    /// Matches on name only; existing rows keep their emoji and color.
    pub fn seed_default_categories(&self) -> Result<SeedResult> {
        let mut result = SeedResult::default();

        for (name, emoji, color) in DEFAULT_CATEGORIES {
            if self.upsert_category(name, emoji, color)?.1 {
                debug!(category = name, "Created category");
                result.created += 1;
            } else {
                result.existing += 1;
            }
        }

        info!(
            created = result.created,
            existing = result.existing,
            "Category catalog seeded"
        );
        Ok(result)
    }

    /// Get-or-create a category by name. Returns the id and whether it was created.
    pub fn upsert_category(&self, name: &str, emoji: &str, color: &str) -> Result<(i64, bool)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData(
                "category name must not be empty".to_string(),
            ));
        }

        let conn = self.conn()?;
        let inserted = conn.execute(
            r#"
            INSERT INTO categories (name, emoji, color) VALUES (?, ?, ?)
            ON CONFLICT(name) DO NOTHING
            "#,
            params![name, emoji, color],
        )?;
        let id = conn.query_row(
            "SELECT id FROM categories WHERE name = ?",
            params![name],
            |row| row.get(0),
        )?;
        Ok((id, inserted > 0))
    }

    /// List the catalog ordered by id
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, emoji, color FROM categories ORDER BY id")?;
        let categories = stmt
            .query_map([], Self::row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    /// Get a category by ID
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id, name, emoji, color FROM categories WHERE id = ?",
                params![id],
                Self::row_to_category,
            )
            .optional()?)
    }

    /// Find a category by name (case-insensitive)
    pub fn get_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id, name, emoji, color FROM categories WHERE name = ? COLLATE NOCASE",
                params![name.trim()],
                Self::row_to_category,
            )
            .optional()?)
    }

    fn row_to_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            emoji: row.get(2)?,
            color: row.get(3)?,
        })
    }
}

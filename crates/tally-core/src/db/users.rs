//! User provisioning

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{datetime_column, format_datetime, Database};
use crate::error::{Error, Result};
use crate::models::User;

/// Default display name for an email: its local part
fn username_from_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, _)) if !local.is_empty() => local.to_string(),
        _ => email.to_string(),
    }
}

impl Database {
    /// Get or create the user for an authenticated email
    ///
    /// Idempotent: an existing user is returned unchanged.
    pub fn upsert_user(&self, email: &str, username: Option<&str>) -> Result<User> {
        self.upsert_user_at(email, username, Utc::now())
    }

    /// Get or create a user with an explicit creation timestamp
    pub fn upsert_user_at(
        &self,
        email: &str,
        username: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::InvalidData("email must not be empty".to_string()));
        }

        let username = username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| username_from_email(email));

        // Concurrent first requests for the same email race here; the loser inserts nothing
        let conn = self.conn()?;
        let inserted = conn.execute(
            r#"
            INSERT INTO users (email, username, created_at) VALUES (?, ?, ?)
            ON CONFLICT(email) DO NOTHING
            "#,
            params![email, username, format_datetime(&created_at)],
        )?;
        drop(conn);

        let user = self
            .get_user_by_email(email)?
            .ok_or_else(|| Error::NotFound(format!("user {}", email)))?;
        if inserted > 0 {
            tracing::info!(user = %email, id = user.id, "Provisioned user");
        }
        Ok(user)
    }

    /// Get a user by ID
    pub fn get_user(&self, id: i64) -> Result<User> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, email, username, created_at FROM users WHERE id = ?",
            params![id],
            Self::row_to_user,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }

    /// Find a user by email
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id, email, username, created_at FROM users WHERE email = ?",
                params![email.trim()],
                Self::row_to_user,
            )
            .optional()?)
    }

    /// List all users
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, email, username, created_at FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            username: row.get(2)?,
            created_at: datetime_column(row, 3)?,
        })
    }
}

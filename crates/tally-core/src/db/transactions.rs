//! Transaction operations

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;

use super::transaction_filter::TransactionFilter;
use super::{datetime_column, decimal_column, format_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Category, NewTransaction, Transaction, TransactionType};

/// Largest amount a single transaction may carry (one trillion)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

const SELECT_TRANSACTION: &str = r#"
    SELECT t.id, t.user_id, t.amount, t.description, t.transaction_type,
           t.transaction_date, t.created_at,
           c.id, c.name, c.emoji, c.color
    FROM transactions t
    JOIN categories c ON c.id = t.category_id
"#;

fn row_to_transaction(row: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let kind: String = row.get(4)?;
    let transaction_type = kind.parse::<TransactionType>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, e.into())
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: decimal_column(row, 2)?,
        description: row.get(3)?,
        transaction_type,
        transaction_date: datetime_column(row, 5)?,
        created_at: datetime_column(row, 6)?,
        category: Category {
            id: row.get(7)?,
            name: row.get(8)?,
            emoji: row.get(9)?,
            color: row.get(10)?,
        },
    })
}

impl Database {
    /// Insert a transaction for a user, stamped with the current time
    pub fn insert_transaction(&self, user_id: i64, tx: &NewTransaction) -> Result<Transaction> {
        self.insert_transaction_at(user_id, tx, Utc::now())
    }

    /// Insert a transaction with an explicit server clock
    ///
    /// `now` becomes `created_at`, and `transaction_date` when the caller gave none.
    pub fn insert_transaction_at(
        &self,
        user_id: i64,
        tx: &NewTransaction,
        now: DateTime<Utc>,
    ) -> Result<Transaction> {
        if tx.amount < Decimal::ZERO {
            return Err(Error::InvalidData(format!(
                "amount must not be negative (got {})",
                tx.amount
            )));
        }

        if tx.amount > MAX_AMOUNT {
            return Err(Error::InvalidData(format!(
                "amount must not exceed {} (got {})",
                MAX_AMOUNT, tx.amount
            )));
        }

        if self.get_category(tx.category_id)?.is_none() {
            return Err(Error::InvalidData(format!(
                "unknown category id {}",
                tx.category_id
            )));
        }

        let transaction_date = tx.transaction_date.unwrap_or(now);

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (user_id, amount, description, category_id, transaction_type, transaction_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                tx.amount.normalize().to_string(),
                tx.description,
                tx.category_id,
                tx.transaction_type.as_str(),
                format_datetime(&transaction_date),
                format_datetime(&now),
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        tracing::debug!(
            id,
            user_id,
            kind = %tx.transaction_type,
            amount = %tx.amount,
            "Inserted transaction"
        );

        self.get_transaction(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
    }

    /// Get a transaction owned by `user_id`
    pub fn get_transaction(&self, user_id: i64, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let sql = format!("{} WHERE t.id = ? AND t.user_id = ?", SELECT_TRANSACTION);
        Ok(conn
            .query_row(&sql, params![id, user_id], row_to_transaction)
            .optional()?)
    }

    /// List transactions matching a filter, newest `created_at` first
    pub fn list_transactions(&self, filter: TransactionFilter) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let built = filter.build();
        let sql = format!(
            "{} {} {} {}",
            SELECT_TRANSACTION, built.where_clause, built.order_clause, built.limit_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut transactions = stmt
            .query_map(built.params_refs().as_slice(), row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if built.has_amount_bounds() {
            transactions.retain(|tx| built.matches_amount(tx.amount));
            if let Some(limit) = built.limit {
                transactions.truncate(usize::try_from(limit).unwrap_or(0));
            }
        }

        Ok(transactions)
    }

    /// Count transactions matching a filter (ignores any limit)
    pub fn count_transactions(&self, filter: TransactionFilter) -> Result<i64> {
        let conn = self.conn()?;
        let built = filter.build();

        if !built.has_amount_bounds() {
            let count = conn.query_row(
                &built.build_count_query(),
                built.params_refs().as_slice(),
                |row| row.get(0),
            )?;
            return Ok(count);
        }

        let sql = format!("SELECT t.amount FROM transactions t {}", built.where_clause);
        let mut stmt = conn.prepare(&sql)?;
        let amounts = stmt
            .query_map(built.params_refs().as_slice(), |row| decimal_column(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let count = amounts
            .into_iter()
            .filter(|amount| built.matches_amount(*amount))
            .count();
        Ok(count as i64)
    }
}

//! SQLite-backed `TransactionStore`
//!
//! Amounts are stored as decimal text, so rows are fetched and summed in Rust
//! rather than with SQL `SUM()` (which would go through floating point).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;
use rust_decimal::Decimal;

use super::{datetime_column, decimal_column, format_datetime, Database};
use crate::analytics::{checked_sum, CategorySpending, DateField, DateRange, TransactionStore};
use crate::error::{Error, Result};
use crate::models::TransactionType;

/// WHERE fragment and parameters for a user/type/date-range query
fn range_predicate(
    user_id: i64,
    kind: TransactionType,
    field: DateField,
    range: DateRange,
) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let column = field.column();
    let mut sql = format!(
        "WHERE user_id = ? AND transaction_type = ? AND {} >= ?",
        column
    );
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![
        Box::new(user_id),
        Box::new(kind.as_str()),
        Box::new(format_datetime(&range.start)),
    ];

    if let Some(end) = range.end {
        sql.push_str(&format!(" AND {} < ?", column));
        params.push(Box::new(format_datetime(&end)));
    }

    (sql, params)
}

impl Database {
    fn sum_amounts(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Decimal> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let amounts = stmt
            .query_map(params, |row| decimal_column(row, 0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        checked_sum(amounts)
    }
}

impl TransactionStore for Database {
    fn sum(
        &self,
        user_id: i64,
        kind: TransactionType,
        field: DateField,
        range: DateRange,
    ) -> Result<Decimal> {
        let (predicate, params) = range_predicate(user_id, kind, field, range);
        let sql = format!("SELECT amount FROM transactions {}", predicate);
        let refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        self.sum_amounts(&sql, &refs)
    }

    fn count_in(
        &self,
        user_id: i64,
        kind: TransactionType,
        field: DateField,
        range: DateRange,
    ) -> Result<u64> {
        let (predicate, params) = range_predicate(user_id, kind, field, range);
        let sql = format!("SELECT COUNT(*) FROM transactions {}", predicate);
        let refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let conn = self.conn()?;
        let count: i64 = conn.query_row(&sql, refs.as_slice(), |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn exists_on(&self, user_id: i64, kind: TransactionType, day: NaiveDate) -> Result<bool> {
        let range = DateRange::day(day);
        let (predicate, params) =
            range_predicate(user_id, kind, DateField::TransactionDate, range);
        let sql = format!("SELECT EXISTS(SELECT 1 FROM transactions {})", predicate);
        let refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let conn = self.conn()?;
        let exists: bool = conn.query_row(&sql, refs.as_slice(), |row| row.get(0))?;
        Ok(exists)
    }

    fn group_by_category(
        &self,
        user_id: i64,
        kind: TransactionType,
    ) -> Result<Vec<CategorySpending>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT c.id, c.name, c.emoji, c.color, t.amount
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = ? AND t.transaction_type = ?
            "#,
        )?;

        let rows = stmt
            .query_map(params![user_id, kind.as_str()], |row| {
                Ok((
                    CategorySpending {
                        category_id: row.get(0)?,
                        name: row.get(1)?,
                        emoji: row.get(2)?,
                        color: row.get(3)?,
                        total: Decimal::ZERO,
                    },
                    decimal_column(row, 4)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut totals: BTreeMap<i64, CategorySpending> = BTreeMap::new();
        for (category, amount) in rows {
            let entry = totals.entry(category.category_id).or_insert(category);
            entry.total = entry.total.checked_add(amount).ok_or_else(|| {
                Error::Overflow(format!("category {} total", entry.category_id))
            })?;
        }

        Ok(totals.into_values().collect())
    }

    fn total_all_time(&self, user_id: i64, kind: TransactionType) -> Result<Decimal> {
        self.sum_amounts(
            "SELECT amount FROM transactions WHERE user_id = ? AND transaction_type = ?",
            params![user_id, kind.as_str()],
        )
    }

    fn earliest(&self, user_id: i64, kind: TransactionType) -> Result<Option<DateTime<Utc>>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT transaction_date FROM transactions
            WHERE user_id = ? AND transaction_type = ?
            ORDER BY transaction_date ASC
            LIMIT 1
            "#,
        )?;
        let mut rows = stmt.query_map(params![user_id, kind.as_str()], |row| {
            datetime_column(row, 0)
        })?;
        let first = rows.next().transpose()?;
        Ok(first)
    }
}

//! In-memory transaction store
//!
//! Holds transactions in a plain `Vec` and answers the same aggregate queries as
//! the SQLite store. Used for previews and for exercising the engine in tests
//! without a database.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::types::CategorySpending;
use super::{checked_sum, DateField, DateRange, TransactionStore};
use crate::error::{Error, Result};
use crate::models::{Category, TransactionType};

/// A transaction as the store sees it
#[derive(Debug, Clone)]
pub struct StoredTransaction {
    pub user_id: i64,
    pub amount: Decimal,
    pub category: Category,
    pub transaction_type: TransactionType,
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl StoredTransaction {
    fn date(&self, field: DateField) -> DateTime<Utc> {
        match field {
            DateField::TransactionDate => self.transaction_date,
            DateField::CreatedAt => self.created_at,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    records: Vec<StoredTransaction>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: StoredTransaction) {
        self.records.push(record);
    }

    /// Add a transaction whose `created_at` equals its `transaction_date`
    pub fn add(
        &mut self,
        user_id: i64,
        kind: TransactionType,
        amount: Decimal,
        category: &Category,
        at: DateTime<Utc>,
    ) {
        self.push(StoredTransaction {
            user_id,
            amount,
            category: category.clone(),
            transaction_type: kind,
            transaction_date: at,
            created_at: at,
        });
    }

    pub fn records(&self) -> &[StoredTransaction] {
        &self.records
    }

    fn matching(
        &self,
        user_id: i64,
        kind: TransactionType,
    ) -> impl Iterator<Item = &StoredTransaction> {
        self.records
            .iter()
            .filter(move |r| r.user_id == user_id && r.transaction_type == kind)
    }
}

impl TransactionStore for InMemoryStore {
    fn sum(
        &self,
        user_id: i64,
        kind: TransactionType,
        field: DateField,
        range: DateRange,
    ) -> Result<Decimal> {
        checked_sum(
            self.matching(user_id, kind)
                .filter(|r| range.contains(r.date(field)))
                .map(|r| r.amount),
        )
    }

    fn count_in(
        &self,
        user_id: i64,
        kind: TransactionType,
        field: DateField,
        range: DateRange,
    ) -> Result<u64> {
        Ok(self
            .matching(user_id, kind)
            .filter(|r| range.contains(r.date(field)))
            .count() as u64)
    }

    fn group_by_category(
        &self,
        user_id: i64,
        kind: TransactionType,
    ) -> Result<Vec<CategorySpending>> {
        let mut totals: BTreeMap<i64, CategorySpending> = BTreeMap::new();
        for record in self.matching(user_id, kind) {
            let entry = totals
                .entry(record.category.id)
                .or_insert_with(|| CategorySpending {
                    category_id: record.category.id,
                    name: record.category.name.clone(),
                    emoji: record.category.emoji.clone(),
                    color: record.category.color.clone(),
                    total: Decimal::ZERO,
                });
            entry.total = entry.total.checked_add(record.amount).ok_or_else(|| {
                Error::Overflow(format!("category {} total", record.category.id))
            })?;
        }
        Ok(totals.into_values().collect())
    }

    fn total_all_time(&self, user_id: i64, kind: TransactionType) -> Result<Decimal> {
        checked_sum(self.matching(user_id, kind).map(|r| r.amount))
    }

    fn earliest(&self, user_id: i64, kind: TransactionType) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .matching(user_id, kind)
            .map(|r| r.transaction_date)
            .min())
    }
}

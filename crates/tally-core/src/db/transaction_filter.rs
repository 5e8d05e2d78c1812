//! Transaction filter builder for constructing dynamic SQL queries
//!
//! Every filter is scoped to one user; the remaining predicates are optional
//! and combined with AND. All bounds are inclusive.
//!
//! Amounts are stored as decimal text, so amount bounds are not part of the
//! SQL. They are applied to the decoded rows with [`FilterResult::matches_amount`],
//! and the row limit moves out of SQL with them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::format_datetime;
use crate::models::TransactionType;

/// Builder for constructing transaction query filters
#[derive(Debug, Clone)]
pub struct TransactionFilter {
    pub user_id: i64,
    pub transaction_type: Option<TransactionType>,
    pub category_id: Option<i64>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub amount_min: Option<Decimal>,
    pub amount_max: Option<Decimal>,
    pub limit: Option<i64>,
}

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword
    pub where_clause: String,
    /// ORDER BY clause including "ORDER BY" keyword
    pub order_clause: String,
    /// LIMIT clause, empty when unbounded or when amount bounds are set
    pub limit_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
    /// Inclusive amount bounds, checked in Rust
    pub amount_min: Option<Decimal>,
    pub amount_max: Option<Decimal>,
    /// Row cap still to apply after amount filtering
    pub limit: Option<i64>,
}

impl TransactionFilter {
    /// Create a filter matching every transaction of one user
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id,
            transaction_type: None,
            category_id: None,
            date_from: None,
            date_to: None,
            amount_min: None,
            amount_max: None,
            limit: None,
        }
    }

    /// Set transaction type filter
    pub fn transaction_type(mut self, kind: Option<TransactionType>) -> Self {
        self.transaction_type = kind;
        self
    }

    /// Set category filter
    pub fn category_id(mut self, id: Option<i64>) -> Self {
        self.category_id = id;
        self
    }

    /// Set inclusive transaction_date bounds
    pub fn date_range(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    /// Set inclusive amount bounds
    pub fn amount_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.amount_min = min;
        self.amount_max = max;
        self
    }

    /// Cap the number of rows returned
    pub fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    /// Build the filter components
    pub fn build(self) -> FilterResult {
        let mut conditions = vec!["t.user_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(self.user_id)];

        if let Some(kind) = self.transaction_type {
            conditions.push("t.transaction_type = ?".to_string());
            params.push(Box::new(kind.as_str()));
        }

        if let Some(cid) = self.category_id {
            conditions.push("t.category_id = ?".to_string());
            params.push(Box::new(cid));
        }

        if let Some(from) = self.date_from {
            conditions.push("t.transaction_date >= ?".to_string());
            params.push(Box::new(format_datetime(&from)));
        }

        if let Some(to) = self.date_to {
            conditions.push("t.transaction_date <= ?".to_string());
            params.push(Box::new(format_datetime(&to)));
        }

        let has_amount_bounds = self.amount_min.is_some() || self.amount_max.is_some();

        // Integer literal, so the count query can share `params`
        let limit_clause = match self.limit {
            Some(limit) if !has_amount_bounds => format!("LIMIT {}", limit.max(0)),
            _ => String::new(),
        };

        FilterResult {
            where_clause: format!("WHERE {}", conditions.join(" AND ")),
            order_clause: "ORDER BY t.created_at DESC, t.id DESC".to_string(),
            limit_clause,
            params,
            amount_min: self.amount_min,
            amount_max: self.amount_max,
            limit: self.limit,
        }
    }
}

impl FilterResult {
    /// Whether rows must be decoded and checked against amount bounds
    pub fn has_amount_bounds(&self) -> bool {
        self.amount_min.is_some() || self.amount_max.is_some()
    }

    /// Exact decimal check against the inclusive amount bounds
    pub fn matches_amount(&self, amount: Decimal) -> bool {
        self.amount_min.map_or(true, |min| amount >= min)
            && self.amount_max.map_or(true, |max| amount <= max)
    }

    /// Build a COUNT query
    pub fn build_count_query(&self) -> String {
        format!("SELECT COUNT(*) FROM transactions t {}", self.where_clause)
    }

    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

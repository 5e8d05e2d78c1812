//! Domain models for Tally

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of money movement. Amounts are always non-negative; this carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user of the tracker. Provisioned on first authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Global category catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub emoji: String,
    pub color: String,
}

/// A stored transaction with its category resolved
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub category: Category,
    pub transaction_type: TransactionType,
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub description: String,
    pub category_id: i64,
    pub transaction_type: TransactionType,
    /// Defaults to the insert time when absent
    pub transaction_date: Option<DateTime<Utc>>,
}

/// Outcome of seeding the category catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    pub created: usize,
    pub existing: usize,
}

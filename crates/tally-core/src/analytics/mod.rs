//! Dashboard and analytics computation
//!
//! The engine is generic over a [`TransactionStore`], so the same aggregation
//! rules run against SQLite ([`crate::db::Database`]) and the in-memory store
//! used by tests and previews ([`memory::InMemoryStore`]).
//!
//! All instants are UTC. Amounts are summed as `Decimal`.

pub mod calendar;
mod engine;
pub mod memory;
pub mod mood;
pub mod types;

#[cfg(test)]
mod tests;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::models::TransactionType;

pub use engine::{spending_change, AnalyticsEngine, MAX_STREAK_LOOKBACK_DAYS};
pub use memory::InMemoryStore;
pub use mood::Mood;
pub use types::{
    AnalyticsReport, CategorySpending, DashboardStats, Direction, IncomeVsExpense,
    MonthlyTrendPoint, SpendingChange,
};

/// Which timestamp of a transaction a range applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    /// User-asserted economic date
    TransactionDate,
    /// Server-assigned insertion time
    CreatedAt,
}

impl DateField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::TransactionDate => "transaction_date",
            Self::CreatedAt => "created_at",
        }
    }
}

/// Half-open instant range `[start, end)`; no `end` means unbounded above
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Everything at or after `start`
    pub fn from(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// The whole calendar day
    pub fn day(date: NaiveDate) -> Self {
        let next = date + chrono::Duration::days(1);
        Self::between(calendar::start_of_day(date), calendar::start_of_day(next))
    }

    /// The whole calendar month starting at `month_start`
    pub fn month(month_start: NaiveDate) -> Self {
        Self::between(
            calendar::start_of_day(month_start),
            calendar::start_of_day(calendar::next_month_start(month_start)),
        )
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && self.end.map_or(true, |end| instant < end)
    }
}

/// Sum amounts, returning [`Error::Overflow`] instead of panicking
pub fn checked_sum<I>(amounts: I) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total
            .checked_add(amount)
            .ok_or_else(|| Error::Overflow("amount total exceeds the decimal range".to_string()))
    })
}

/// Read-only aggregate access to a user's transactions
///
/// Every query is scoped to a single user and a single transaction type.
pub trait TransactionStore {
    /// Sum of amounts whose `field` falls in `range` (zero when nothing matches)
    fn sum(
        &self,
        user_id: i64,
        kind: TransactionType,
        field: DateField,
        range: DateRange,
    ) -> Result<Decimal>;

    /// Whether any transaction's `transaction_date` falls on `day`
    fn exists_on(&self, user_id: i64, kind: TransactionType, day: NaiveDate) -> Result<bool> {
        let count = self.count_in(user_id, kind, DateField::TransactionDate, DateRange::day(day))?;
        Ok(count > 0)
    }

    /// Number of transactions whose `field` falls in `range`
    fn count_in(
        &self,
        user_id: i64,
        kind: TransactionType,
        field: DateField,
        range: DateRange,
    ) -> Result<u64>;

    /// All-time totals per category; categories with no matching rows are omitted
    fn group_by_category(&self, user_id: i64, kind: TransactionType)
        -> Result<Vec<CategorySpending>>;

    /// All-time total
    fn total_all_time(&self, user_id: i64, kind: TransactionType) -> Result<Decimal>;

    /// Earliest `transaction_date` among the user's transactions of `kind`
    fn earliest(&self, user_id: i64, kind: TransactionType) -> Result<Option<DateTime<Utc>>>;
}

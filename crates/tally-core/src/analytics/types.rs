//! Result types produced by the analytics engine

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::mood::Mood;

/// Month-over-month expense movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Same,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Same => "same",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expense change against the previous calendar month
///
/// When last month had no expenses there is no baseline: `has_comparison` is
/// false and `percentage` is 0. Consumers must check the flag before presenting
/// the percentage as a real change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpendingChange {
    /// Rounded to one decimal place
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
    pub direction: Direction,
    pub has_comparison: bool,
}

impl SpendingChange {
    pub fn no_comparison() -> Self {
        Self {
            percentage: Decimal::ZERO,
            direction: Direction::Same,
            has_comparison: false,
        }
    }
}

/// Dashboard payload for one user
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub message: String,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    /// This month's income minus this month's expenses
    #[serde(with = "rust_decimal::serde::float")]
    pub wallet_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub month_spending: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub month_income: Decimal,
    pub spending_change: SpendingChange,
    /// Consecutive expense-free days ending today
    pub streak: u32,
    pub mood: Mood,
}

/// Expense total for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySpending {
    pub category_id: i64,
    pub name: String,
    pub emoji: String,
    pub color: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// One bar of the six-month expense trend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTrendPoint {
    /// Three-letter month abbreviation ("Jan")
    pub month: String,
    /// First day of the aggregated month
    pub start: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// All-time totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IncomeVsExpense {
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expenses: Decimal,
}

/// Analytics payload for one user
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    /// Descending by total, ties by name
    pub category_spending: Vec<CategorySpending>,
    /// Oldest first, always six entries
    pub monthly_trend: Vec<MonthlyTrendPoint>,
    pub income_vs_expense: IncomeVsExpense,
}

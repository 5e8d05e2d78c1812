//! Analytics engine: dashboard and analytics reports over a transaction store

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use super::calendar::{first_of_month, previous_month_start, start_of_day, trend_month_starts};
use super::mood::Mood;
use super::types::{
    AnalyticsReport, DashboardStats, Direction, IncomeVsExpense, MonthlyTrendPoint,
    SpendingChange,
};
use super::{DateField, DateRange, TransactionStore};
use crate::error::{Error, Result};
use crate::models::{TransactionType, User};

/// Upper bound on how many days the streak walk inspects
pub const MAX_STREAK_LOOKBACK_DAYS: u32 = 3650;

/// Computes derived metrics for a single user at a supplied instant
pub struct AnalyticsEngine<'a, S: TransactionStore + ?Sized> {
    store: &'a S,
    max_streak_days: u32,
}

impl<'a, S: TransactionStore + ?Sized> AnalyticsEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            max_streak_days: MAX_STREAK_LOOKBACK_DAYS,
        }
    }

    /// Override the streak lookback cap (minimum 1 day)
    pub fn with_max_streak_days(mut self, days: u32) -> Self {
        self.max_streak_days = days.max(1);
        self
    }

    /// Current-month figures, month-over-month change, streak and mood
    pub fn compute_dashboard(&self, user: &User, now: DateTime<Utc>) -> Result<DashboardStats> {
        let today = now.date_naive();
        let month_start = first_of_month(today);
        let last_month_start = previous_month_start(month_start);

        // No upper bound: future-dated transactions count toward this month
        let this_month = DateRange::from(start_of_day(month_start));
        let last_month =
            DateRange::between(start_of_day(last_month_start), start_of_day(month_start));

        let month_income = self.month_sum(user.id, TransactionType::Income, this_month)?;
        let month_spending = self.month_sum(user.id, TransactionType::Expense, this_month)?;
        let last_month_spending =
            self.month_sum(user.id, TransactionType::Expense, last_month)?;

        let wallet_balance = month_income
            .checked_sub(month_spending)
            .ok_or_else(|| Error::Overflow("wallet balance".to_string()))?;
        let streak = self.streak(user, today)?;
        let mood = Mood::classify(month_income, month_spending);

        tracing::debug!(
            user_id = user.id,
            %month_income,
            %month_spending,
            %last_month_spending,
            streak,
            mood = mood.label(),
            "Computed dashboard"
        );

        Ok(DashboardStats {
            message: format!("Welcome {}!", user.username),
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            wallet_balance,
            month_spending,
            month_income,
            spending_change: spending_change(month_spending, last_month_spending),
            streak,
            mood,
        })
    }

    /// Category breakdown, six-month trend and all-time totals
    pub fn compute_analytics(&self, user: &User, now: DateTime<Utc>) -> Result<AnalyticsReport> {
        let mut category_spending = self
            .store
            .group_by_category(user.id, TransactionType::Expense)?;
        category_spending
            .sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

        let mut monthly_trend = trend_month_starts(now.date_naive())
            .into_iter()
            .map(|start| {
                let amount = self.store.sum(
                    user.id,
                    TransactionType::Expense,
                    DateField::CreatedAt,
                    DateRange::month(start),
                )?;
                Ok(MonthlyTrendPoint {
                    month: start.format("%b").to_string(),
                    start,
                    amount,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        monthly_trend.reverse();

        let income_vs_expense = IncomeVsExpense {
            income: self.store.total_all_time(user.id, TransactionType::Income)?,
            expenses: self.store.total_all_time(user.id, TransactionType::Expense)?,
        };

        tracing::debug!(
            user_id = user.id,
            categories = category_spending.len(),
            "Computed analytics"
        );

        Ok(AnalyticsReport {
            category_spending,
            monthly_trend,
            income_vs_expense,
        })
    }

    /// Consecutive expense-free days ending at `today`, inclusive
    ///
    /// The walk stops at the first day with an expense or after `max_streak_days`
    /// days. It also stops at the user's account creation date, unless expenses
    /// were backdated before it, in which case the earliest expense bounds it.
    pub fn streak(&self, user: &User, today: NaiveDate) -> Result<u32> {
        let cap_floor = today - Duration::days(i64::from(self.max_streak_days) - 1);
        let mut history_start = user.created_at.date_naive();
        if let Some(first) = self.store.earliest(user.id, TransactionType::Expense)? {
            history_start = history_start.min(first.date_naive());
        }
        let floor = cap_floor.max(history_start);

        let mut day = today;
        let mut streak = 0;
        while day >= floor {
            if self.store.exists_on(user.id, TransactionType::Expense, day)? {
                break;
            }
            streak += 1;
            day -= Duration::days(1);
        }

        Ok(streak)
    }

    fn month_sum(&self, user_id: i64, kind: TransactionType, range: DateRange) -> Result<Decimal> {
        self.store
            .sum(user_id, kind, DateField::TransactionDate, range)
    }
}

/// Month-over-month change of `current` against `previous`
///
/// No baseline (previous is zero) yields [`SpendingChange::no_comparison`].
pub fn spending_change(current: Decimal, previous: Decimal) -> SpendingChange {
    if previous <= Decimal::ZERO {
        return SpendingChange::no_comparison();
    }

    let change = current
        .checked_sub(previous)
        .and_then(|delta| delta.checked_div(previous))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        // Saturate when the change is too large to represent
        .unwrap_or(if current > previous {
            Decimal::MAX
        } else {
            Decimal::MIN
        });
    let direction = if change > Decimal::ZERO {
        Direction::Up
    } else if change < Decimal::ZERO {
        Direction::Down
    } else {
        Direction::Same
    };

    let rounded = change.round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven);
    SpendingChange {
        // Avoid a signed zero when a tiny change rounds away
        percentage: if rounded.is_zero() {
            Decimal::ZERO
        } else {
            rounded
        },
        direction,
        has_comparison: true,
    }
}

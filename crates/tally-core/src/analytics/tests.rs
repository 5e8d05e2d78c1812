use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::error::Error;
use crate::models::{Category, TransactionType, User};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn category(id: i64, name: &str) -> Category {
    Category {
        id,
        name: name.to_string(),
        emoji: "🏷️".to_string(),
        color: "#ffffff".to_string(),
    }
}

fn user(id: i64, created_at: DateTime<Utc>) -> User {
    User {
        id,
        email: format!("user{}@example.com", id),
        username: format!("user{}", id),
        created_at,
    }
}

/// 2025-03-15 12:00 UTC
fn now() -> DateTime<Utc> {
    at(2025, 3, 15, 12, 0)
}

fn long_time_user() -> User {
    user(1, at(2024, 1, 1, 0, 0))
}

#[test]
fn test_dashboard_reference_scenario() {
    let food = category(1, "Food");
    let salary = category(8, "Salary");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Income, dec!(1000), &salary, at(2025, 3, 1, 9, 0));
    store.add(1, TransactionType::Expense, dec!(300), &food, at(2025, 3, 10, 13, 0));
    store.add(1, TransactionType::Expense, dec!(200), &food, at(2025, 2, 10, 13, 0));

    let stats = AnalyticsEngine::new(&store)
        .compute_dashboard(&long_time_user(), now())
        .unwrap();

    assert_eq!(stats.month_income, dec!(1000));
    assert_eq!(stats.month_spending, dec!(300));
    assert_eq!(stats.wallet_balance, dec!(700));
    assert_eq!(stats.spending_change.percentage, dec!(50.0));
    assert_eq!(stats.spending_change.direction, Direction::Up);
    assert!(stats.spending_change.has_comparison);
    assert_eq!(stats.mood, Mood::Good);
    // Mar 15 back to Mar 11
    assert_eq!(stats.streak, 5);
    assert_eq!(stats.message, "Welcome user1!");
}

#[test]
fn test_balance_is_exact_difference() {
    let food = category(1, "Food");
    let salary = category(8, "Salary");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Income, dec!(0.1), &salary, at(2025, 3, 2, 0, 0));
    store.add(1, TransactionType::Income, dec!(0.2), &salary, at(2025, 3, 3, 0, 0));
    store.add(1, TransactionType::Expense, dec!(0.3), &food, at(2025, 3, 4, 0, 0));
    store.add(1, TransactionType::Expense, dec!(12.34), &food, at(2025, 3, 5, 0, 0));

    let stats = AnalyticsEngine::new(&store)
        .compute_dashboard(&long_time_user(), now())
        .unwrap();

    assert_eq!(stats.month_income, dec!(0.3));
    assert_eq!(stats.wallet_balance, stats.month_income - stats.month_spending);
    assert_eq!(stats.wallet_balance, dec!(-12.34));
}

#[test]
fn test_no_transactions() {
    let store = InMemoryStore::new();
    let subject = user(1, at(2025, 3, 1, 8, 0));
    let engine = AnalyticsEngine::new(&store);

    let stats = engine.compute_dashboard(&subject, now()).unwrap();
    assert_eq!(stats.month_income, Decimal::ZERO);
    assert_eq!(stats.month_spending, Decimal::ZERO);
    assert_eq!(stats.wallet_balance, Decimal::ZERO);
    assert_eq!(stats.mood, Mood::Dead);
    assert_eq!(stats.spending_change, SpendingChange::no_comparison());
    // Bounded by account creation: Mar 1 through Mar 15
    assert_eq!(stats.streak, 15);

    let report = engine.compute_analytics(&subject, now()).unwrap();
    assert!(report.category_spending.is_empty());
    assert_eq!(report.monthly_trend.len(), 6);
    assert!(report.monthly_trend.iter().all(|p| p.amount.is_zero()));
    assert_eq!(report.income_vs_expense.income, Decimal::ZERO);
    assert_eq!(report.income_vs_expense.expenses, Decimal::ZERO);
}

#[test]
fn test_no_comparison_without_last_month_expenses() {
    let food = category(1, "Food");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Expense, dec!(80), &food, at(2025, 3, 2, 0, 0));
    // Income last month does not form a baseline
    store.add(1, TransactionType::Income, dec!(500), &food, at(2025, 2, 2, 0, 0));

    let stats = AnalyticsEngine::new(&store)
        .compute_dashboard(&long_time_user(), now())
        .unwrap();

    assert!(!stats.spending_change.has_comparison);
    assert_eq!(stats.spending_change.percentage, Decimal::ZERO);
    assert_eq!(stats.spending_change.direction, Direction::Same);
}

#[test]
fn test_equal_months_are_same() {
    let food = category(1, "Food");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Expense, dec!(120), &food, at(2025, 3, 2, 0, 0));
    store.add(1, TransactionType::Expense, dec!(120), &food, at(2025, 2, 20, 0, 0));

    let stats = AnalyticsEngine::new(&store)
        .compute_dashboard(&long_time_user(), now())
        .unwrap();

    assert!(stats.spending_change.has_comparison);
    assert_eq!(stats.spending_change.percentage, Decimal::ZERO);
    assert_eq!(stats.spending_change.direction, Direction::Same);
}

#[test]
fn test_spending_change_down_and_rounding() {
    let change = spending_change(dec!(100), dec!(300));
    assert_eq!(change.direction, Direction::Down);
    assert_eq!(change.percentage, dec!(-66.7));

    // 0.25% rounds half to even
    let change = spending_change(dec!(401), dec!(400));
    assert_eq!(change.direction, Direction::Up);
    assert_eq!(change.percentage, dec!(0.2));

    // Direction comes from the unrounded change
    let change = spending_change(dec!(99999), dec!(100000));
    assert_eq!(change.percentage, Decimal::ZERO);
    assert_eq!(change.direction, Direction::Down);
}

#[test]
fn test_last_month_includes_its_final_day() {
    let food = category(1, "Food");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Expense, dec!(100), &food, at(2025, 2, 28, 23, 30));
    store.add(1, TransactionType::Expense, dec!(150), &food, at(2025, 3, 1, 0, 0));
    // Before last month, ignored
    store.add(1, TransactionType::Expense, dec!(999), &food, at(2025, 1, 31, 23, 59));

    let stats = AnalyticsEngine::new(&store)
        .compute_dashboard(&long_time_user(), now())
        .unwrap();

    assert_eq!(stats.month_spending, dec!(150));
    assert_eq!(stats.spending_change.percentage, dec!(50.0));
    assert_eq!(stats.spending_change.direction, Direction::Up);
}

#[test]
fn test_future_dated_transactions_count_this_month() {
    let food = category(1, "Food");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Expense, dec!(40), &food, at(2025, 3, 14, 0, 0));
    store.add(1, TransactionType::Expense, dec!(60), &food, at(2025, 4, 2, 0, 0));

    let stats = AnalyticsEngine::new(&store)
        .compute_dashboard(&long_time_user(), now())
        .unwrap();

    assert_eq!(stats.month_spending, dec!(100));
}

#[test]
fn test_dashboard_uses_transaction_date() {
    let food = category(1, "Food");
    let mut store = InMemoryStore::new();
    // Entered this month, backdated to last month
    store.push(memory::StoredTransaction {
        user_id: 1,
        amount: dec!(75),
        category: food,
        transaction_type: TransactionType::Expense,
        transaction_date: at(2025, 2, 5, 0, 0),
        created_at: at(2025, 3, 5, 0, 0),
    });

    let stats = AnalyticsEngine::new(&store)
        .compute_dashboard(&long_time_user(), now())
        .unwrap();

    assert_eq!(stats.month_spending, Decimal::ZERO);
    assert!(stats.spending_change.has_comparison);
    assert_eq!(stats.spending_change.percentage, dec!(-100));
    assert_eq!(stats.spending_change.direction, Direction::Down);
}

#[test]
fn test_mood_uses_month_ratio() {
    let food = category(1, "Food");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Income, dec!(1000), &food, at(2025, 3, 1, 0, 0));
    store.add(1, TransactionType::Expense, dec!(250), &food, at(2025, 3, 2, 0, 0));
    let stats = AnalyticsEngine::new(&store)
        .compute_dashboard(&long_time_user(), now())
        .unwrap();
    assert_eq!(stats.mood, Mood::Excellent);

    store.add(1, TransactionType::Expense, dec!(550), &food, at(2025, 3, 3, 0, 0));
    let stats = AnalyticsEngine::new(&store)
        .compute_dashboard(&long_time_user(), now())
        .unwrap();
    assert_eq!(stats.mood, Mood::Worried);
}

#[test]
fn test_streak_zero_with_expense_today() {
    let food = category(1, "Food");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Expense, dec!(5), &food, at(2025, 3, 15, 0, 1));

    let engine = AnalyticsEngine::new(&store);
    assert_eq!(engine.streak(&long_time_user(), now().date_naive()).unwrap(), 0);
}

#[test]
fn test_streak_counts_back_to_last_expense() {
    let food = category(1, "Food");
    let salary = category(8, "Salary");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Expense, dec!(5), &food, at(2025, 3, 12, 23, 59));
    // Income does not break a streak
    store.add(1, TransactionType::Income, dec!(5), &salary, at(2025, 3, 14, 10, 0));

    let engine = AnalyticsEngine::new(&store);
    assert_eq!(engine.streak(&long_time_user(), now().date_naive()).unwrap(), 3);
}

#[test]
fn test_streak_ignores_other_users() {
    let food = category(1, "Food");
    let mut store = InMemoryStore::new();
    store.add(2, TransactionType::Expense, dec!(5), &food, at(2025, 3, 15, 9, 0));

    let engine = AnalyticsEngine::new(&store);
    let subject = user(1, at(2025, 3, 10, 0, 0));
    assert_eq!(engine.streak(&subject, now().date_naive()).unwrap(), 6);
}

#[test]
fn test_streak_is_capped() {
    let store = InMemoryStore::new();
    let veteran = user(1, at(2000, 1, 1, 0, 0));

    let engine = AnalyticsEngine::new(&store);
    assert_eq!(
        engine.streak(&veteran, now().date_naive()).unwrap(),
        MAX_STREAK_LOOKBACK_DAYS
    );

    let engine = AnalyticsEngine::new(&store).with_max_streak_days(30);
    assert_eq!(engine.streak(&veteran, now().date_naive()).unwrap(), 30);
}

#[test]
fn test_streak_zero_before_account_exists() {
    let store = InMemoryStore::new();
    let newcomer = user(1, at(2025, 4, 1, 0, 0));

    let engine = AnalyticsEngine::new(&store);
    assert_eq!(engine.streak(&newcomer, now().date_naive()).unwrap(), 0);
}

#[test]
fn test_streak_reaches_expenses_backdated_before_signup() {
    let food = category(1, "Food");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Expense, dec!(10), &food, at(2025, 3, 12, 10, 0));

    // Account provisioned this morning, expense recorded with an earlier date
    let newcomer = user(1, at(2025, 3, 15, 8, 0));
    let engine = AnalyticsEngine::new(&store);
    assert_eq!(engine.streak(&newcomer, now().date_naive()).unwrap(), 3);
}

#[test]
fn test_streak_backdated_history_still_capped() {
    let food = category(1, "Food");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Expense, dec!(10), &food, at(2001, 6, 1, 10, 0));

    let newcomer = user(1, at(2025, 3, 15, 8, 0));
    let engine = AnalyticsEngine::new(&store).with_max_streak_days(30);
    assert_eq!(engine.streak(&newcomer, now().date_naive()).unwrap(), 30);
}

#[test]
fn test_dashboard_with_extreme_ratio() {
    let food = category(1, "Food");
    let salary = category(8, "Salary");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Income, dec!(0.01), &salary, at(2025, 3, 2, 9, 0));
    store.add(
        1,
        TransactionType::Expense,
        dec!(1000000000000000000000000000),
        &food,
        at(2025, 3, 3, 9, 0),
    );

    let stats = AnalyticsEngine::new(&store)
        .compute_dashboard(&long_time_user(), now())
        .unwrap();
    assert_eq!(stats.mood, Mood::Dead);
    assert!(!stats.spending_change.has_comparison);
    assert!(stats.wallet_balance < Decimal::ZERO);
}

#[test]
fn test_spending_change_saturates() {
    let change = spending_change(dec!(1000000000000000000000000000), dec!(0.01));
    assert!(change.has_comparison);
    assert_eq!(change.direction, Direction::Up);
    assert_eq!(change.percentage, Decimal::MAX);
}

#[test]
fn test_sum_overflow_is_an_error() {
    let food = category(1, "Food");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Expense, Decimal::MAX, &food, at(2025, 3, 2, 9, 0));
    store.add(1, TransactionType::Expense, Decimal::MAX, &food, at(2025, 3, 3, 9, 0));

    let engine = AnalyticsEngine::new(&store);
    assert!(matches!(
        engine.compute_dashboard(&long_time_user(), now()),
        Err(Error::Overflow(_))
    ));
    assert!(matches!(
        engine.compute_analytics(&long_time_user(), now()),
        Err(Error::Overflow(_))
    ));
    assert!(matches!(
        checked_sum([Decimal::MAX, Decimal::ONE]),
        Err(Error::Overflow(_))
    ));
    assert_eq!(checked_sum([dec!(1.5), dec!(2.25)]).unwrap(), dec!(3.75));
}

#[test]
fn test_category_spending_ranked_and_partitions_total() {
    let food = category(1, "Food");
    let travel = category(2, "Travel");
    let bills = category(7, "Bills");
    let salary = category(8, "Salary");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Expense, dec!(30), &travel, at(2025, 1, 4, 0, 0));
    store.add(1, TransactionType::Expense, dec!(20), &travel, at(2025, 2, 4, 0, 0));
    store.add(1, TransactionType::Expense, dec!(50), &food, at(2025, 3, 4, 0, 0));
    store.add(1, TransactionType::Expense, dec!(100.5), &bills, at(2024, 11, 4, 0, 0));
    store.add(1, TransactionType::Income, dec!(900), &salary, at(2025, 3, 1, 0, 0));

    let report = AnalyticsEngine::new(&store)
        .compute_analytics(&long_time_user(), now())
        .unwrap();

    let names: Vec<&str> = report
        .category_spending
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    // Food and Travel tie at 50; name breaks the tie; Salary has no expenses
    assert_eq!(names, vec!["Bills", "Food", "Travel"]);

    let total: Decimal = report.category_spending.iter().map(|c| c.total).sum();
    assert_eq!(total, report.income_vs_expense.expenses);
    assert_eq!(report.income_vs_expense.expenses, dec!(200.5));
    assert_eq!(report.income_vs_expense.income, dec!(900));
}

#[test]
fn test_monthly_trend_windows_and_order() {
    let food = category(1, "Food");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Expense, dec!(40), &food, at(2024, 12, 20, 0, 0));
    store.add(1, TransactionType::Expense, dec!(15), &food, at(2025, 1, 31, 23, 59));
    // February is skipped by the 30-day stepping
    store.add(1, TransactionType::Expense, dec!(70), &food, at(2025, 2, 10, 0, 0));
    store.add(1, TransactionType::Expense, dec!(5), &food, at(2025, 3, 2, 0, 0));
    store.add(1, TransactionType::Expense, dec!(8), &food, at(2024, 10, 1, 0, 0));

    let report = AnalyticsEngine::new(&store)
        .compute_analytics(&long_time_user(), now())
        .unwrap();

    let labels: Vec<&str> = report.monthly_trend.iter().map(|p| p.month.as_str()).collect();
    assert_eq!(labels, vec!["Oct", "Nov", "Dec", "Dec", "Jan", "Mar"]);

    let amounts: Vec<Decimal> = report.monthly_trend.iter().map(|p| p.amount).collect();
    assert_eq!(
        amounts,
        vec![dec!(8), dec!(0), dec!(40), dec!(40), dec!(15), dec!(5)]
    );
}

#[test]
fn test_monthly_trend_uses_created_at() {
    let food = category(1, "Food");
    let mut store = InMemoryStore::new();
    store.push(memory::StoredTransaction {
        user_id: 1,
        amount: dec!(25),
        category: food,
        transaction_type: TransactionType::Expense,
        transaction_date: at(2025, 1, 5, 0, 0),
        created_at: at(2025, 3, 5, 0, 0),
    });

    let report = AnalyticsEngine::new(&store)
        .compute_analytics(&long_time_user(), now())
        .unwrap();

    let last = report.monthly_trend.last().unwrap();
    assert_eq!(last.month, "Mar");
    assert_eq!(last.amount, dec!(25));
    assert!(report.monthly_trend[..5].iter().all(|p| p.amount.is_zero()));
}

#[test]
fn test_date_range_contains() {
    let range = DateRange::month(chrono::NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    assert!(range.contains(at(2025, 2, 1, 0, 0)));
    assert!(range.contains(at(2025, 2, 28, 23, 59)));
    assert!(!range.contains(at(2025, 3, 1, 0, 0)));

    let open = DateRange::from(at(2025, 3, 1, 0, 0));
    assert!(open.contains(at(2030, 1, 1, 0, 0)));
    assert!(!open.contains(at(2025, 2, 28, 23, 59)));
}

#[test]
fn test_dashboard_serializes_numbers() {
    let food = category(1, "Food");
    let mut store = InMemoryStore::new();
    store.add(1, TransactionType::Income, dec!(1000), &food, at(2025, 3, 1, 0, 0));
    store.add(1, TransactionType::Expense, dec!(300), &food, at(2025, 3, 2, 0, 0));
    store.add(1, TransactionType::Expense, dec!(200), &food, at(2025, 2, 2, 0, 0));

    let stats = AnalyticsEngine::new(&store)
        .compute_dashboard(&long_time_user(), now())
        .unwrap();
    let json = serde_json::to_value(&stats).unwrap();

    assert_eq!(json["wallet_balance"], 700.0);
    assert_eq!(json["month_spending"], 300.0);
    assert_eq!(json["spending_change"]["percentage"], 50.0);
    assert_eq!(json["spending_change"]["direction"], "up");
    assert_eq!(json["spending_change"]["has_comparison"], true);
    assert_eq!(json["mood"]["text"], "Good");
}

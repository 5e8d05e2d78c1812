//! Dashboard and analytics report commands

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use tally_core::db::Database;
use tally_core::{AnalyticsEngine, Direction};

use super::resolve_user;

/// Width of the longest bar in the trend chart
const BAR_WIDTH: u32 = 30;

fn bar(amount: Decimal, max: Decimal) -> String {
    if max <= Decimal::ZERO {
        return String::new();
    }
    let filled = (amount / max * Decimal::from(BAR_WIDTH))
        .round()
        .try_into()
        .unwrap_or(0u32);
    "█".repeat(filled as usize)
}

pub fn cmd_dashboard(db: &Database, email: &str, json: bool) -> Result<()> {
    let user = resolve_user(db, email)?;
    let now = Utc::now();
    tracing::debug!(user = %user.email, user_id = user.id, %now, "Computing dashboard");
    let stats = AnalyticsEngine::new(db).compute_dashboard(&user, now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let change = &stats.spending_change;
    let change_str = if !change.has_comparison {
        "no spending last month".to_string()
    } else {
        let arrow = match change.direction {
            Direction::Up => "▲",
            Direction::Down => "▼",
            Direction::Same => "=",
        };
        format!("{} {}% vs last month", arrow, change.percentage)
    };

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│           💰 Tally Dashboard            │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", stats.message);
    println!();
    println!("  Wallet balance:  {:.2}", stats.wallet_balance);
    println!("  Income:          {:.2}", stats.month_income);
    println!("  Spending:        {:.2}  ({})", stats.month_spending, change_str);
    println!();
    println!("  🔥 Spend-free streak: {} day(s)", stats.streak);
    println!("  Mood: {}", stats.mood);
    println!();

    Ok(())
}

pub fn cmd_analytics(db: &Database, email: &str, json: bool) -> Result<()> {
    let user = resolve_user(db, email)?;
    let now = Utc::now();
    tracing::debug!(user = %user.email, user_id = user.id, %now, "Computing analytics");
    let report = AnalyticsEngine::new(db).compute_analytics(&user, now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("📊 Spending by Category");
    println!("   ─────────────────────────────");
    if report.category_spending.is_empty() {
        println!("   No expenses recorded yet.");
    }
    for category in &report.category_spending {
        println!(
            "   {} {:<12} {:>12.2}",
            category.emoji, category.name, category.total
        );
    }

    let max = report
        .monthly_trend
        .iter()
        .map(|p| p.amount)
        .max()
        .unwrap_or(Decimal::ZERO);

    println!();
    println!("📈 Monthly Trend");
    println!("   ─────────────────────────────");
    for point in &report.monthly_trend {
        println!(
            "   {}  {:>10.2}  {}",
            point.month,
            point.amount,
            bar(point.amount, max)
        );
    }

    let totals = &report.income_vs_expense;
    println!();
    println!("💵 All Time");
    println!("   ─────────────────────────────");
    println!("   Income:   {:>12.2}", totals.income);
    println!("   Expenses: {:>12.2}", totals.expenses);
    println!("   Net:      {:>12.2}", totals.income - totals.expenses);
    println!();

    Ok(())
}

//! Transaction command implementations

use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveTime;
use rust_decimal::Decimal;
use tally_core::db::{Database, TransactionFilter};
use tally_core::models::{NewTransaction, TransactionType};

use super::{parse_date, resolve_user, truncate};

/// Filters for `tally transactions list`, as given on the command line
#[derive(Debug, Default)]
pub struct ListQuery {
    pub kind: Option<String>,
    pub category: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub limit: i64,
}

fn parse_kind(kind: &str) -> Result<TransactionType> {
    kind.parse::<TransactionType>().map_err(|e| anyhow!(e))
}

fn parse_amount(value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim()).with_context(|| format!("Invalid amount '{}'", value))
}

fn category_id(db: &Database, name: &str) -> Result<i64> {
    db.get_category_by_name(name)?
        .map(|c| c.id)
        .with_context(|| format!("Unknown category '{}' (see 'tally categories')", name))
}

/// Translate command-line filters into a store filter for one user
pub fn build_filter(db: &Database, user_id: i64, query: &ListQuery) -> Result<TransactionFilter> {
    let kind = query.kind.as_deref().map(parse_kind).transpose()?;
    let category = query
        .category
        .as_deref()
        .map(|name| category_id(db, name))
        .transpose()?;

    let from = query
        .from
        .as_deref()
        .map(|s| parse_date(s, "--from"))
        .transpose()?
        .map(|d| d.and_time(NaiveTime::MIN).and_utc());
    let to = query
        .to
        .as_deref()
        .map(|s| parse_date(s, "--to"))
        .transpose()?
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|dt| dt.and_utc());

    let min = query.min.as_deref().map(parse_amount).transpose()?;
    let max = query.max.as_deref().map(parse_amount).transpose()?;

    Ok(TransactionFilter::for_user(user_id)
        .transaction_type(kind)
        .category_id(category)
        .date_range(from, to)
        .amount_range(min, max)
        .limit(Some(query.limit.max(1))))
}

pub fn cmd_transactions_list(db: &Database, email: &str, query: &ListQuery) -> Result<()> {
    let user = resolve_user(db, email)?;
    let filter = build_filter(db, user.id, query)?;
    tracing::debug!(user = %user.email, ?filter, "Listing transactions");
    let transactions = db.list_transactions(filter.clone())?;

    if transactions.is_empty() {
        println!("No transactions found. Record one with:");
        println!(
            "  tally transactions add 12.50 --user {} --category Food",
            user.email
        );
        return Ok(());
    }

    let total = db.count_transactions(filter)?;

    println!();
    println!(
        "📝 Transactions for {} ({} of {})",
        user.username,
        transactions.len(),
        total
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = match tx.transaction_type {
            TransactionType::Expense => format!("\x1b[31m-{:.2}\x1b[0m", tx.amount), // Red
            TransactionType::Income => format!("\x1b[32m+{:.2}\x1b[0m", tx.amount), // Green
        };

        println!(
            "   {} │ {:>12} │ {} {:<10} │ {}",
            tx.transaction_date.format("%Y-%m-%d"),
            amount_str,
            tx.category.emoji,
            tx.category.name,
            truncate(&tx.description, 40)
        );
    }

    Ok(())
}

pub fn cmd_transactions_add(
    db: &Database,
    email: &str,
    amount: &str,
    category: &str,
    kind: &str,
    description: &str,
    date: Option<&str>,
) -> Result<()> {
    let user = resolve_user(db, email)?;

    let amount = parse_amount(amount)?;
    if amount < Decimal::ZERO {
        bail!("Amount must not be negative; use --type income or expense for direction");
    }

    let transaction_date = date
        .map(|s| parse_date(s, "--date"))
        .transpose()?
        .map(|d| d.and_time(NaiveTime::MIN).and_utc());

    let tx = NewTransaction {
        amount,
        description: description.trim().to_string(),
        category_id: category_id(db, category)?,
        transaction_type: parse_kind(kind)?,
        transaction_date,
    };

    let stored = db.insert_transaction(user.id, &tx)?;
    tracing::debug!(user = %user.email, id = stored.id, "Recorded transaction");

    println!(
        "✅ Recorded {} of {:.2} in {} {} (id {})",
        stored.transaction_type, stored.amount, stored.category.emoji, stored.category.name, stored.id
    );

    Ok(())
}

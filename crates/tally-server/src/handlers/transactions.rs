//! Transaction handlers

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::current_user;
use crate::{AppError, AppState, MAX_PAGE_LIMIT};
use tally_core::db::TransactionFilter;
use tally_core::models::{NewTransaction, Transaction, TransactionType};

/// Maximum accepted request body for a create
const MAX_BODY_SIZE: usize = 16 * 1024;

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// income or expense
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Category ID
    pub category: Option<String>,
    /// Lower bound on transaction_date (YYYY-MM-DD or RFC 3339)
    pub date_from: Option<String>,
    /// Upper bound on transaction_date; a bare date covers the whole day
    pub date_to: Option<String>,
    pub amount_min: Option<String>,
    pub amount_max: Option<String>,
}

fn default_limit() -> i64 {
    100
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub transactions: Vec<Transaction>,
    pub total: i64,
    pub limit: i64,
}

/// Request body for creating a transaction
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub amount: Decimal,
    pub category_id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
    /// YYYY-MM-DD or RFC 3339; defaults to now
    pub transaction_date: Option<String>,
}

/// Treat empty query values the same as absent ones
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a date filter value into an instant
///
/// A bare date means the start of that day, or its last second when `end_of_day`.
pub fn parse_date_bound(value: &str, end_of_day: bool) -> Result<DateTime<Utc>, AppError> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let time = if end_of_day {
            NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
        } else {
            NaiveTime::MIN
        };
        return Ok(date.and_time(time).and_utc());
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            AppError::bad_request(&format!(
                "Invalid date: {} (use YYYY-MM-DD or RFC 3339)",
                value
            ))
        })
}

fn parse_amount(name: &str, value: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(value)
        .map_err(|_| AppError::bad_request(&format!("Invalid {}: {}", name, value)))
}

/// Translate query parameters into a store filter for one user
pub fn build_filter(user_id: i64, params: &TransactionQuery) -> Result<TransactionFilter, AppError> {
    let transaction_type = present(&params.transaction_type)
        .map(|s| s.parse::<TransactionType>())
        .transpose()
        .map_err(|e| AppError::bad_request(&e))?;

    let category_id = present(&params.category)
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::bad_request(&format!("Invalid category: {}", s)))
        })
        .transpose()?;

    let date_from = present(&params.date_from)
        .map(|s| parse_date_bound(s, false))
        .transpose()?;
    let date_to = present(&params.date_to)
        .map(|s| parse_date_bound(s, true))
        .transpose()?;

    let amount_min = present(&params.amount_min)
        .map(|s| parse_amount("amount_min", s))
        .transpose()?;
    let amount_max = present(&params.amount_max)
        .map(|s| parse_amount("amount_max", s))
        .transpose()?;

    // Input validation: clamp pagination parameters
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);

    Ok(TransactionFilter::for_user(user_id)
        .transaction_type(transaction_type)
        .category_id(category_id)
        .date_range(date_from, date_to)
        .amount_range(amount_min, amount_max)
        .limit(Some(limit)))
}

/// GET /api/transactions - List the caller's transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionQuery>,
    request: Request,
) -> Result<Json<TransactionResponse>, AppError> {
    let (identity, user) = current_user(&state, &request)?;

    let filter = build_filter(user.id, &params)?;
    let limit = filter.limit.unwrap_or(MAX_PAGE_LIMIT);

    let transactions = state.db.list_transactions(filter.clone())?;
    let total = state.db.count_transactions(filter)?;

    // Audit log - read access
    state.db.log_audit(
        &identity.email,
        "list",
        Some("transaction"),
        None,
        Some(&format!(
            "limit={}, type={:?}, category={:?}, date_from={:?}, date_to={:?}, amount_min={:?}, amount_max={:?}, returned={}",
            limit,
            params.transaction_type,
            params.category,
            params.date_from,
            params.date_to,
            params.amount_min,
            params.amount_max,
            transactions.len()
        )),
    )?;

    Ok(Json(TransactionResponse {
        transactions,
        total,
        limit,
    }))
}

/// POST /api/transactions - Record a transaction for the caller
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let (identity, user) = current_user(&state, &request)?;

    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    let req: CreateTransactionRequest = serde_json::from_slice(&bytes)
        .map_err(|e| AppError::bad_request(&format!("Invalid transaction: {}", e)))?;

    let transaction_date = present(&req.transaction_date)
        .map(|s| parse_date_bound(s, false))
        .transpose()?;

    let new_tx = NewTransaction {
        amount: req.amount,
        description: req.description.trim().to_string(),
        category_id: req.category_id,
        transaction_type: req.transaction_type.unwrap_or(TransactionType::Expense),
        transaction_date,
    };

    let tx = state.db.insert_transaction(user.id, &new_tx)?;

    state.db.log_audit(
        &identity.email,
        "create",
        Some("transaction"),
        Some(tx.id),
        Some(&format!("{} {}", tx.transaction_type, tx.amount)),
    )?;

    Ok((StatusCode::CREATED, Json(tx)))
}

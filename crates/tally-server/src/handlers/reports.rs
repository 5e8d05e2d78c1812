//! Dashboard and analytics handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use chrono::Utc;

use super::current_user;
use crate::{AppError, AppState};
use tally_core::{AnalyticsEngine, AnalyticsReport, DashboardStats};

/// GET /api/dashboard - Current-month summary for the caller
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<DashboardStats>, AppError> {
    let (identity, user) = current_user(&state, &request)?;

    let stats = AnalyticsEngine::new(&state.db).compute_dashboard(&user, Utc::now())?;

    // Audit log - read access
    state
        .db
        .log_audit(&identity.email, "view", Some("dashboard"), None, None)?;

    Ok(Json(stats))
}

/// GET /api/analytics - Category breakdown, trend and totals for the caller
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<AnalyticsReport>, AppError> {
    let (identity, user) = current_user(&state, &request)?;

    let report = AnalyticsEngine::new(&state.db).compute_analytics(&user, Utc::now())?;

    state.db.log_audit(
        &identity.email,
        "view",
        Some("analytics"),
        None,
        Some(&format!("categories={}", report.category_spending.len())),
    )?;

    Ok(Json(report))
}

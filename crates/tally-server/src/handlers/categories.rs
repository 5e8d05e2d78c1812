//! Category catalog handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};

use super::identity;
use crate::{AppError, AppState};
use tally_core::models::Category;

/// GET /api/categories - List the category catalog
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Category>>, AppError> {
    let identity = identity(&request)?;

    let categories = state.db.list_categories()?;

    state.db.log_audit(
        &identity.email,
        "list",
        Some("category"),
        None,
        Some(&format!("returned={}", categories.len())),
    )?;

    Ok(Json(categories))
}

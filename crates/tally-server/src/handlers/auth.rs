//! Authentication-related handlers

use axum::extract::Request;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use super::current_user;
use crate::{AppError, AppState};
use tally_core::models::User;

/// Response for the /api/me endpoint
#[derive(Serialize)]
pub struct MeResponse {
    /// The authenticated user, provisioned on first request
    pub user: User,
    /// How the user was authenticated
    pub auth_method: String,
}

/// Get the currently authenticated user
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<MeResponse>, AppError> {
    let (identity, user) = current_user(&state, &request)?;

    Ok(Json(MeResponse {
        user,
        auth_method: identity.method.as_str().to_string(),
    }))
}

//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod auth;
pub mod categories;
pub mod reports;
pub mod transactions;

// Re-export all handlers for use in router
pub use auth::*;
pub use categories::*;
pub use reports::*;
pub use transactions::*;

use axum::extract::Request;
use tally_core::models::User;

use crate::{AppError, AppState, Identity};

/// Identity attached by the auth middleware
pub(crate) fn identity(request: &Request) -> Result<Identity, AppError> {
    request
        .extensions()
        .get::<Identity>()
        .cloned()
        .ok_or_else(|| AppError::from(anyhow::anyhow!("request reached a handler without identity")))
}

/// Resolve the caller and provision their user row on first use
pub(crate) fn current_user(state: &AppState, request: &Request) -> Result<(Identity, User), AppError> {
    let identity = identity(request)?;
    let user = state.db.upsert_user(&identity.email, None)?;
    Ok((identity, user))
}

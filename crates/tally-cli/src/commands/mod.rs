//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `audit` - API access audit log
//! - `core` - Core commands (init, categories) and shared utilities (open_db, resolve_user)
//! - `reports` - Dashboard and analytics reports
//! - `serve` - Web server command
//! - `transactions` - Transaction commands (list, add)
//! - `users` - User management commands

pub mod audit;
pub mod core;
pub mod reports;
pub mod serve;
pub mod transactions;
pub mod users;

// Re-export command functions for main.rs
pub use audit::*;
pub use core::*;
pub use reports::*;
pub use serve::*;
pub use transactions::*;
pub use users::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

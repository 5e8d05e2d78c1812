//! Tally Core Library
//!
//! Shared functionality for the Tally personal finance tracker:
//! - Domain models (users, categories, income/expense transactions)
//! - Database access and migrations (SQLCipher via rusqlite)
//! - Analytics engine for the dashboard and spending reports

pub mod analytics;
pub mod db;
pub mod error;
pub mod models;

pub use analytics::{
    AnalyticsEngine, AnalyticsReport, CategorySpending, DashboardStats, Direction, InMemoryStore,
    Mood, SpendingChange, TransactionStore,
};
pub use db::{AuditEntry, Database, TransactionFilter};
pub use error::{Error, Result};

//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Track income and spending, see where the month is going
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Self-hosted personal finance tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set TALLY_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed default categories
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (local development only)
        #[arg(long)]
        no_auth: bool,

        /// Directory with a built frontend to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        action: Option<UsersAction>,
    },

    /// List the category catalog
    Categories,

    /// List or record transactions
    Transactions {
        #[command(subcommand)]
        action: TransactionsAction,
    },

    /// Show the monthly dashboard for a user
    Dashboard {
        /// User email
        #[arg(short, long)]
        user: String,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show spending analytics for a user
    Analytics {
        /// User email
        #[arg(short, long)]
        user: String,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show the API access audit log
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// Add a user (no-op if the email exists)
    Add {
        /// Email address
        email: String,

        /// Display name (defaults to the email's local part)
        #[arg(long)]
        username: Option<String>,
    },

    /// List users
    List,
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List a user's transactions, newest first
    List {
        /// User email
        #[arg(short, long)]
        user: String,

        /// income or expense
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// Category name
        #[arg(short, long)]
        category: Option<String>,

        /// Earliest transaction date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Latest transaction date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Minimum amount
        #[arg(long)]
        min: Option<String>,

        /// Maximum amount
        #[arg(long)]
        max: Option<String>,

        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Record a transaction
    Add {
        /// User email
        #[arg(short, long)]
        user: String,

        /// Amount (non-negative)
        amount: String,

        /// Category name
        #[arg(short, long)]
        category: String,

        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: String,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Transaction date (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },
}

//! Tally CLI - Personal finance tracker
//!
//! Usage:
//!   tally init                                 Initialize database
//!   tally transactions add 12.50 -u me@x -c Food   Record an expense
//!   tally dashboard --user me@x                Show this month's dashboard
//!   tally serve --port 3000                    Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
        Commands::Users { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(UsersAction::List) => commands::cmd_users_list(&db),
                Some(UsersAction::Add { email, username }) => {
                    commands::cmd_users_add(&db, &email, username.as_deref())
                }
            }
        }
        Commands::Categories => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_categories(&db)
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                TransactionsAction::List {
                    user,
                    kind,
                    category,
                    from,
                    to,
                    min,
                    max,
                    limit,
                } => {
                    let query = commands::ListQuery {
                        kind,
                        category,
                        from,
                        to,
                        min,
                        max,
                        limit,
                    };
                    commands::cmd_transactions_list(&db, &user, &query)
                }
                TransactionsAction::Add {
                    user,
                    amount,
                    category,
                    kind,
                    description,
                    date,
                } => commands::cmd_transactions_add(
                    &db,
                    &user,
                    &amount,
                    &category,
                    &kind,
                    &description,
                    date.as_deref(),
                ),
            }
        }
        Commands::Dashboard { user, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_dashboard(&db, &user, json)
        }
        Commands::Analytics { user, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_analytics(&db, &user, json)
        }
        Commands::Audit { limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_audit(&db, limit)
        }
    }
}

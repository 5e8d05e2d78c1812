//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `resolve_user` - Look up a user by email
//! - `cmd_init` - Initialize the database
//! - `cmd_categories` - List the category catalog

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tally_core::db::Database;
use tally_core::models::User;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Find an existing user by email
pub fn resolve_user(db: &Database, email: &str) -> Result<User> {
    db.get_user_by_email(email)?.with_context(|| {
        format!(
            "Unknown user: {} (add one with 'tally users add {}')",
            email, email
        )
    })
}

/// Parse a YYYY-MM-DD command-line date
pub fn parse_date(value: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date '{}' (use YYYY-MM-DD)", flag, value))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    let seeded = db
        .seed_default_categories()
        .context("Failed to seed categories")?;
    println!(
        "   Seeded categories ({} new, {} existing)",
        seeded.created, seeded.existing
    );

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add a user: tally users add you@example.com");
    println!("  2. Record spending: tally transactions add 12.50 --user you@example.com --category Food");
    println!("  3. Start web UI: tally serve");

    Ok(())
}

pub fn cmd_categories(db: &Database) -> Result<()> {
    let categories = db.list_categories()?;

    if categories.is_empty() {
        println!("No categories found. Seed the defaults with:");
        println!("  tally init");
        return Ok(());
    }

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────");

    for category in categories {
        println!(
            "   {:>3}  {} {:<12} {}",
            category.id, category.emoji, category.name, category.color
        );
    }

    Ok(())
}

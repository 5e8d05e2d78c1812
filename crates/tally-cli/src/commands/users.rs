//! User management commands

use anyhow::Result;
use tally_core::db::Database;

pub fn cmd_users_add(db: &Database, email: &str, username: Option<&str>) -> Result<()> {
    let existed = db.get_user_by_email(email)?.is_some();
    let user = db.upsert_user(email, username)?;

    if existed {
        println!("User {} already exists (id {})", user.email, user.id);
    } else {
        println!("✅ Added user {} as '{}' (id {})", user.email, user.username, user.id);
    }

    Ok(())
}

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Add one with:");
        println!("  tally users add you@example.com");
        return Ok(());
    }

    println!();
    println!("👤 Users");
    println!("   ─────────────────────────────────────────────");

    for user in users {
        println!(
            "   {:>3}  {:<30} {:<16} since {}",
            user.id,
            user.email,
            user.username,
            user.created_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}

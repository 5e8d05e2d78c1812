//! Audit log command

use anyhow::Result;
use tally_core::db::Database;

use super::truncate;

pub fn cmd_audit(db: &Database, limit: i64) -> Result<()> {
    let entries = db.list_audit_log(limit.max(1))?;

    if entries.is_empty() {
        println!("No API access recorded yet.");
        return Ok(());
    }

    println!();
    println!("🔎 Audit Log (most recent {})", entries.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for entry in entries {
        let target = match (&entry.entity_type, entry.entity_id) {
            (Some(kind), Some(id)) => format!("{} #{}", kind, id),
            (Some(kind), None) => kind.clone(),
            _ => "-".to_string(),
        };
        println!(
            "   {} │ {:<24} │ {:<6} │ {:<16} │ {}",
            entry.timestamp,
            truncate(&entry.user_email, 24),
            entry.action,
            target,
            truncate(entry.details.as_deref().unwrap_or(""), 40)
        );
    }

    Ok(())
}

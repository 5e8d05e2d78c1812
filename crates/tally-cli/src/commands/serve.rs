//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use tally_server::{ServerConfig, ALLOWED_ORIGINS_ENV, API_KEYS_ENV};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Tally web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let config = ServerConfig::from_env(!no_auth);

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!("   🔒 Authentication: access proxy header");
        if !config.api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured ({})",
                config.api_keys.len(),
                API_KEYS_ENV
            );
        }
    }
    if !config.allowed_origins.is_empty() {
        println!(
            "   🌐 CORS origins: {} ({})",
            config.allowed_origins.join(", "),
            ALLOWED_ORIGINS_ENV
        );
    }

    let db = open_db(db_path, no_encrypt)?;

    let static_dir = static_dir
        .map(|dir| {
            dir.to_str()
                .with_context(|| format!("Static dir is not valid UTF-8: {}", dir.display()))
        })
        .transpose()?;

    tally_server::serve_with_config(db, host, port, static_dir, config).await
}

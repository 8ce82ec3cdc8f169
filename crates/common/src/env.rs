//! Environment/runtime helpers
//!
//! Startup checks run before the database pool is opened.

use std::path::Path;

use tracing::{info, warn};

/// For `sqlite:` URLs, make sure the directory holding the database file exists.
/// Other URLs (and in-memory SQLite) are left alone.
pub async fn ensure_database_dir(db_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_file_path(db_url) else {
        return Ok(());
    };
    if let Some(parent) = Path::new(path).parent() {
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
        info!(dir = %parent.display(), "sqlite data directory ready");
    }
    Ok(())
}

/// Warn when the URL points at a backend other than postgres or sqlite.
pub fn check_database_scheme(db_url: &str) {
    let lower = db_url.to_ascii_lowercase();
    if !(lower.starts_with("postgres://") || lower.starts_with("postgresql://") || lower.starts_with("sqlite:")) {
        warn!(url_scheme = %lower.split(':').next().unwrap_or_default(), "unrecognised database scheme");
    }
}

fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let rest = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(path.strip_prefix("file:").unwrap_or(path))
}

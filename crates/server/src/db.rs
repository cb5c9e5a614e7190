use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

const COMMUNITY_DB_FILENAME: &str = "community.db";

/// Open the community database under `COMMUNITY_DB_PATH`, running migrations as needed.
pub async fn init_pool() -> Result<SqlitePool> {
    let db_root = std::env::var("COMMUNITY_DB_PATH")
        .context("COMMUNITY_DB_PATH environment variable must be set")?;

    let db_root_path = normalize_path(db_root)?;
    std::fs::create_dir_all(&db_root_path)
        .with_context(|| format!("failed to create DB path: {}", db_root_path.display()))?;

    let db_path = db_root_path.join(COMMUNITY_DB_FILENAME);
    tracing::info!("Opening community database at {}", db_path.display());

    let db_uri = format!("sqlite://{}", db_path.to_string_lossy());
    let connect_options = SqliteConnectOptions::from_str(&db_uri)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run community migrations")?;

    Ok(pool)
}

pub(crate) fn normalize_path<P: Into<PathBuf>>(path: P) -> Result<PathBuf> {
    let path = path.into();
    if path.is_absolute() {
        return Ok(path);
    }

    let cwd = std::env::current_dir().context("failed to read current working directory")?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_absolute_path_is_unchanged() {
        let path = normalize_path("/var/lib/community").unwrap();
        assert_eq!(path, PathBuf::from("/var/lib/community"));
    }

    #[test]
    fn test_normalize_relative_path_joins_cwd() {
        let path = normalize_path("data").unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("data"));
    }
}

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

use crate::auth::User;
use crate::graphql::{AppSchema, build_schema};
use crate::telemetry::{TelemetryEvent, TelemetryQueue};
use crate::validation::ReservedSlugs;

/// Creates an in-memory SQLite pool for testing
pub async fn create_test_pool() -> Result<SqlitePool> {
    let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")?
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1) // In-memory databases should use a single connection
        .connect_with(connect_options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Telemetry queue that keeps every event in memory.
#[derive(Default)]
pub struct RecordingTelemetryQueue {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingTelemetryQueue {
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl TelemetryQueue for RecordingTelemetryQueue {
    fn enqueue(&self, event: TelemetryEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// A user that satisfies every precondition of community creation.
pub fn test_user(id: &str) -> User {
    User::new(id).with_email(format!("{id}@example.com"))
}

/// Schema over a fresh in-memory database with the built-in reserved slugs.
pub async fn create_test_schema() -> Result<(AppSchema, SqlitePool, Arc<RecordingTelemetryQueue>)> {
    let pool = create_test_pool().await?;
    let telemetry = Arc::new(RecordingTelemetryQueue::default());
    let schema = build_schema(pool.clone(), ReservedSlugs::builtin(), telemetry.clone());
    Ok((schema, pool, telemetry))
}

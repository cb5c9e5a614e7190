use anyhow::{Context, Result};
use metrics::counter;
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{TelemetryEvent, TelemetryQueue};

/// Queue backed by an unbounded tokio channel.
#[derive(Clone)]
pub struct ChannelTelemetryQueue {
    sender: mpsc::UnboundedSender<TelemetryEvent>,
}

impl ChannelTelemetryQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TelemetryEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl TelemetryQueue for ChannelTelemetryQueue {
    fn enqueue(&self, event: TelemetryEvent) {
        if let Err(err) = self.sender.send(event) {
            tracing::warn!(
                user_id = %err.0.user_id,
                event = err.0.event.as_str(),
                "telemetry worker stopped, dropping event"
            );
        }
    }
}

/// Drains the telemetry channel, counting every event and optionally
/// persisting it to `telemetry_events`.
pub struct TelemetryWorker {
    receiver: mpsc::UnboundedReceiver<TelemetryEvent>,
    pool: Option<SqlitePool>,
}

impl TelemetryWorker {
    pub fn new(receiver: mpsc::UnboundedReceiver<TelemetryEvent>, pool: Option<SqlitePool>) -> Self {
        Self { receiver, pool }
    }

    pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = self.receiver.recv() => match event {
                    Some(event) => record(self.pool.as_ref(), event).await,
                    None => break,
                },
            }
        }

        // Flush whatever was enqueued before shutdown.
        self.receiver.close();
        while let Some(event) = self.receiver.recv().await {
            record(self.pool.as_ref(), event).await;
        }

        tracing::info!("telemetry worker stopped");
        Ok(())
    }
}

async fn record(pool: Option<&SqlitePool>, event: TelemetryEvent) {
    tracing::debug!(
        user_id = %event.user_id,
        event = event.event.as_str(),
        reason = %event.properties.reason,
        "telemetry event"
    );
    counter!("telemetry_events_total", "event" => event.event.as_str()).increment(1);

    if let Some(pool) = pool {
        if let Err(err) = insert_event(pool, &event).await {
            tracing::warn!("failed to persist telemetry event: {:#}", err);
        }
    }
}

pub async fn insert_event(pool: &SqlitePool, event: &TelemetryEvent) -> Result<()> {
    let properties =
        serde_json::to_string(&event.properties).context("failed to encode event properties")?;

    sqlx::query("INSERT INTO telemetry_events (user_id, event, properties) VALUES (?, ?, ?)")
        .bind(&event.user_id)
        .bind(event.event.as_str())
        .bind(properties)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::AnalyticsEvent;
    use crate::test_helpers;

    #[tokio::test]
    async fn test_worker_persists_enqueued_events() {
        let pool = test_helpers::create_test_pool().await.unwrap();
        let (queue, receiver) = ChannelTelemetryQueue::new();
        let worker = TelemetryWorker::new(receiver, Some(pool.clone()));

        queue.enqueue(TelemetryEvent::new(
            "user-1",
            AnalyticsEvent::CommunityCreatedFailed,
            "url taken",
        ));
        queue.enqueue(TelemetryEvent::new(
            "user-2",
            AnalyticsEvent::CommunityCreatedFailed,
            "no slug",
        ));
        drop(queue);

        worker.run(CancellationToken::new()).await.unwrap();

        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT user_id, event, properties FROM telemetry_events ORDER BY id",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "user-1");
        assert_eq!(rows[0].1, "COMMUNITY_CREATED_FAILED");
        assert_eq!(rows[0].2, r#"{"reason":"url taken"}"#);
        assert_eq!(rows[1].0, "user-2");
    }

    #[tokio::test]
    async fn test_worker_flushes_on_shutdown() {
        let pool = test_helpers::create_test_pool().await.unwrap();
        let (queue, receiver) = ChannelTelemetryQueue::new();
        let worker = TelemetryWorker::new(receiver, Some(pool.clone()));

        queue.enqueue(TelemetryEvent::new(
            "user-1",
            AnalyticsEvent::CommunityCreatedFailed,
            "no email address",
        ));

        let shutdown = CancellationToken::new();
        shutdown.cancel();
        worker.run(shutdown).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM telemetry_events")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_enqueue_after_worker_stops_does_not_panic() {
        let (queue, receiver) = ChannelTelemetryQueue::new();
        drop(receiver);

        queue.enqueue(TelemetryEvent::new(
            "user-1",
            AnalyticsEvent::CommunityCreatedFailed,
            "no slug",
        ));
    }

    #[tokio::test]
    async fn test_worker_without_pool_only_drains() {
        let (queue, receiver) = ChannelTelemetryQueue::new();
        let worker = TelemetryWorker::new(receiver, None);

        queue.enqueue(TelemetryEvent::new(
            "user-1",
            AnalyticsEvent::CommunityCreatedFailed,
            "community already exists",
        ));
        drop(queue);

        worker.run(CancellationToken::new()).await.unwrap();
    }
}

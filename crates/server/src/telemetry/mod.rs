//! Analytics events emitted by the community workflows
//!
//! Producers hold a [`TelemetryQueue`] and enqueue events without waiting on
//! them. In the server the queue is a [`ChannelTelemetryQueue`] drained by a
//! supervised [`TelemetryWorker`].

pub mod queue;

pub use queue::{ChannelTelemetryQueue, TelemetryWorker};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalyticsEvent {
    CommunityCreatedFailed,
}

impl AnalyticsEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsEvent::CommunityCreatedFailed => "COMMUNITY_CREATED_FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventProperties {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    pub user_id: String,
    pub event: AnalyticsEvent,
    pub properties: EventProperties,
}

impl TelemetryEvent {
    pub fn new(user_id: impl Into<String>, event: AnalyticsEvent, reason: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            event,
            properties: EventProperties {
                reason: reason.into(),
            },
        }
    }
}

/// Fire-and-forget sink for analytics events.
pub trait TelemetryQueue: Send + Sync {
    fn enqueue(&self, event: TelemetryEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_in_queue_shape() {
        let event = TelemetryEvent::new("user-1", AnalyticsEvent::CommunityCreatedFailed, "no slug");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["event"], "COMMUNITY_CREATED_FAILED");
        assert_eq!(json["properties"]["reason"], "no slug");
    }

    #[test]
    fn test_as_str_matches_serialized_name() {
        let json = serde_json::to_value(AnalyticsEvent::CommunityCreatedFailed).unwrap();
        assert_eq!(json, AnalyticsEvent::CommunityCreatedFailed.as_str());
    }
}

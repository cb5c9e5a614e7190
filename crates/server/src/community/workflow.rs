//! Community creation
//!
//! [`CreateCommunityWorkflow`] validates a request, normalizes its slug,
//! rejects reserved and duplicate slugs, then persists the community together
//! with its owner relationship and default channel. User-facing rejections are
//! returned as [`CreateCommunityOutcome::Rejected`]; only data-access faults
//! travel through the error channel.
//!
//! Every rejection enqueues one `COMMUNITY_CREATED_FAILED` telemetry event.
//! Successful creations emit none.

use std::collections::BTreeSet;

use anyhow::Result;
use metrics::counter;
use thiserror::Error;

use super::models::{CommunityRecord, CreateCommunityRequest, NewCommunity};
use super::store::CommunityStore;
use crate::auth::User;
use crate::telemetry::{AnalyticsEvent, TelemetryEvent, TelemetryQueue};
use crate::validation::{ReservedSlugs, sanitize_slug};

/// Why a community could not be created. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreationFailure {
    #[error(
        "You must have a working email address to create communities. Add an email address in your settings."
    )]
    MissingEmail,

    #[error("Communities must have a valid url so people can find it!")]
    MissingSlug,

    #[error("This url is already taken - feel free to change it if you're set on the name {name}!")]
    BlacklistedSlug { name: String },

    #[error("A community with this slug already exists.")]
    DuplicateSlug,
}

impl CreationFailure {
    /// Stable machine-readable code, exposed as the GraphQL `reason` extension.
    pub fn code(&self) -> &'static str {
        match self {
            CreationFailure::MissingEmail => "MISSING_EMAIL",
            CreationFailure::MissingSlug => "MISSING_SLUG",
            CreationFailure::BlacklistedSlug { .. } => "BLACKLISTED_SLUG",
            CreationFailure::DuplicateSlug => "DUPLICATE_SLUG",
        }
    }

    /// Reason string carried in the telemetry event properties.
    pub fn telemetry_reason(&self) -> &'static str {
        match self {
            CreationFailure::MissingEmail => "no email address",
            CreationFailure::MissingSlug => "no slug",
            CreationFailure::BlacklistedSlug { .. } => "url taken",
            CreationFailure::DuplicateSlug => "community already exists",
        }
    }
}

#[derive(Debug, Clone)]
pub enum CreateCommunityOutcome {
    Created(CommunityRecord),
    Rejected(CreationFailure),
}

impl CreateCommunityOutcome {
    pub fn created(self) -> Option<CommunityRecord> {
        match self {
            CreateCommunityOutcome::Created(community) => Some(community),
            CreateCommunityOutcome::Rejected(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&CreationFailure> {
        match self {
            CreateCommunityOutcome::Created(_) => None,
            CreateCommunityOutcome::Rejected(failure) => Some(failure),
        }
    }
}

pub struct CreateCommunityWorkflow<'a> {
    store: &'a dyn CommunityStore,
    reserved: &'a ReservedSlugs,
    telemetry: &'a dyn TelemetryQueue,
}

impl<'a> CreateCommunityWorkflow<'a> {
    pub fn new(
        store: &'a dyn CommunityStore,
        reserved: &'a ReservedSlugs,
        telemetry: &'a dyn TelemetryQueue,
    ) -> Self {
        Self {
            store,
            reserved,
            telemetry,
        }
    }

    /// Create a community owned by `user`.
    ///
    /// The caller is responsible for authenticating `user`. Once the community
    /// row exists, the owner relationship and the general channel (with its
    /// owner relationship) are written concurrently and both awaited. A failure
    /// in either branch is returned as an error without undoing earlier writes.
    ///
    /// A slug claimed between the duplicate lookup and the insert is rejected
    /// as a duplicate.
    pub async fn run(
        &self,
        input: CreateCommunityRequest,
        user: &User,
    ) -> Result<CreateCommunityOutcome> {
        let request = match self.check(input, user).await? {
            Ok(request) => request,
            Err(failure) => return Ok(self.reject(user, failure)),
        };

        let Some(community) = self.store.create_community(&request, user).await? else {
            return Ok(self.reject(user, CreationFailure::DuplicateSlug));
        };

        let (_owner, (channel, _channel_owner)) = tokio::try_join!(
            self.store.create_owner_in_community(&community.id, &user.id),
            async {
                let channel = self
                    .store
                    .create_general_channel(&community.id, &user.id)
                    .await?;
                let owner = self
                    .store
                    .create_owner_in_channel(&channel.id, &user.id)
                    .await?;
                Ok::<_, anyhow::Error>((channel, owner))
            },
        )?;

        counter!("community_created_total").increment(1);
        tracing::info!(
            user_id = %user.id,
            community_id = %community.id,
            slug = %community.slug,
            general_channel_id = %channel.id,
            "community created"
        );

        Ok(CreateCommunityOutcome::Created(community))
    }

    /// Run the validation phase, producing the sanitized request or the first failure.
    async fn check(
        &self,
        input: CreateCommunityRequest,
        user: &User,
    ) -> Result<Result<NewCommunity, CreationFailure>> {
        if !user.has_email() {
            return Ok(Err(CreationFailure::MissingEmail));
        }

        let Some(requested_slug) = input.slug.as_deref().filter(|slug| !slug.is_empty()) else {
            return Ok(Err(CreationFailure::MissingSlug));
        };

        let slug = sanitize_slug(requested_slug);

        if self.reserved.is_blacklisted(&slug) {
            return Ok(Err(CreationFailure::BlacklistedSlug { name: input.name }));
        }

        let existing = self
            .store
            .find_communities_by_slug(&BTreeSet::from([slug.clone()]))
            .await?;
        if !existing.is_empty() {
            return Ok(Err(CreationFailure::DuplicateSlug));
        }

        Ok(Ok(NewCommunity {
            name: input.name,
            slug,
            description: input.description,
            website: input.website,
        }))
    }

    fn reject(&self, user: &User, failure: CreationFailure) -> CreateCommunityOutcome {
        self.track_failure(user, &failure);
        CreateCommunityOutcome::Rejected(failure)
    }

    fn track_failure(&self, user: &User, failure: &CreationFailure) {
        tracing::info!(
            user_id = %user.id,
            reason = failure.telemetry_reason(),
            "community creation rejected"
        );
        counter!(
            "community_created_failed_total",
            "reason" => failure.telemetry_reason()
        )
        .increment(1);
        self.telemetry.enqueue(TelemetryEvent::new(
            user.id.clone(),
            AnalyticsEvent::CommunityCreatedFailed,
            failure.telemetry_reason(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::channel::{ChannelMembershipRecord, ChannelRecord};
    use crate::community::CommunityMembershipRecord;
    use crate::test_helpers::RecordingTelemetryQueue;

    #[derive(Default)]
    struct FakeState {
        communities: Vec<CommunityRecord>,
        lookups: Vec<BTreeSet<String>>,
        community_owners: Vec<CommunityMembershipRecord>,
        channels: Vec<ChannelRecord>,
        channel_owners: Vec<ChannelMembershipRecord>,
        writes: usize,
    }

    #[derive(Default)]
    struct FakeStore {
        state: Mutex<FakeState>,
        fail_channel_owner: bool,
        /// Lookups miss every existing community, as when a concurrent
        /// request inserts between the lookup and the insert.
        stale_lookups: bool,
    }

    impl FakeStore {
        fn with_existing(slug: &str) -> Self {
            let store = FakeStore::default();
            store.state.lock().unwrap().communities.push(CommunityRecord {
                id: "existing".to_string(),
                name: "Existing".to_string(),
                slug: slug.to_string(),
                description: None,
                website: None,
                creator_id: "someone-else".to_string(),
                created_at: "2024-01-01T00:00:00Z".to_string(),
            });
            store
        }

        fn writes(&self) -> usize {
            self.state.lock().unwrap().writes
        }
    }

    #[async_trait]
    impl CommunityStore for FakeStore {
        async fn find_communities_by_slug(
            &self,
            slugs: &BTreeSet<String>,
        ) -> Result<Vec<CommunityRecord>> {
            let mut state = self.state.lock().unwrap();
            state.lookups.push(slugs.clone());
            if self.stale_lookups {
                return Ok(Vec::new());
            }
            Ok(state
                .communities
                .iter()
                .filter(|c| slugs.contains(&c.slug))
                .cloned()
                .collect())
        }

        async fn create_community(
            &self,
            community: &NewCommunity,
            creator: &User,
        ) -> Result<Option<CommunityRecord>> {
            let mut state = self.state.lock().unwrap();
            if state.communities.iter().any(|c| c.slug == community.slug) {
                return Ok(None);
            }
            state.writes += 1;
            let record = CommunityRecord {
                id: format!("community-{}", state.communities.len() + 1),
                name: community.name.clone(),
                slug: community.slug.clone(),
                description: community.description.clone(),
                website: community.website.clone(),
                creator_id: creator.id.clone(),
                created_at: "2024-01-01T00:00:00Z".to_string(),
            };
            state.communities.push(record.clone());
            Ok(Some(record))
        }

        async fn create_owner_in_community(
            &self,
            community_id: &str,
            user_id: &str,
        ) -> Result<CommunityMembershipRecord> {
            let mut state = self.state.lock().unwrap();
            state.writes += 1;
            let record = CommunityMembershipRecord {
                id: "uc-1".to_string(),
                user_id: user_id.to_string(),
                community_id: community_id.to_string(),
                is_owner: true,
                is_moderator: false,
                is_member: true,
                is_blocked: false,
                is_pending: false,
                receive_notifications: true,
                reputation: 0,
                created_at: "2024-01-01T00:00:00Z".to_string(),
            };
            state.community_owners.push(record.clone());
            Ok(record)
        }

        async fn create_general_channel(
            &self,
            community_id: &str,
            _user_id: &str,
        ) -> Result<ChannelRecord> {
            let mut state = self.state.lock().unwrap();
            state.writes += 1;
            let record = ChannelRecord {
                id: "channel-1".to_string(),
                community_id: community_id.to_string(),
                name: "General".to_string(),
                slug: "general".to_string(),
                description: Some("General chatter".to_string()),
                is_private: false,
                is_default: true,
                created_at: "2024-01-01T00:00:00Z".to_string(),
            };
            state.channels.push(record.clone());
            Ok(record)
        }

        async fn create_owner_in_channel(
            &self,
            channel_id: &str,
            user_id: &str,
        ) -> Result<ChannelMembershipRecord> {
            if self.fail_channel_owner {
                anyhow::bail!("users_channels is unavailable");
            }
            let mut state = self.state.lock().unwrap();
            state.writes += 1;
            let record = ChannelMembershipRecord {
                id: "uch-1".to_string(),
                user_id: user_id.to_string(),
                channel_id: channel_id.to_string(),
                is_owner: true,
                is_moderator: false,
                is_member: true,
                is_blocked: false,
                is_pending: false,
                receive_notifications: true,
                created_at: "2024-01-01T00:00:00Z".to_string(),
            };
            state.channel_owners.push(record.clone());
            Ok(record)
        }
    }

    fn user() -> User {
        User::new("user-1").with_email("owner@example.com")
    }

    fn input(slug: Option<&str>, name: &str) -> CreateCommunityRequest {
        CreateCommunityRequest {
            name: name.to_string(),
            slug: slug.map(String::from),
            description: None,
            website: None,
        }
    }

    async fn run(
        store: &FakeStore,
        telemetry: &RecordingTelemetryQueue,
        input: CreateCommunityRequest,
        user: &User,
    ) -> CreateCommunityOutcome {
        let reserved = ReservedSlugs::builtin();
        CreateCommunityWorkflow::new(store, &reserved, telemetry)
            .run(input, user)
            .await
            .unwrap()
    }

    fn assert_single_failure_event(telemetry: &RecordingTelemetryQueue, reason: &str) {
        let events = telemetry.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user_id, "user-1");
        assert_eq!(events[0].event, AnalyticsEvent::CommunityCreatedFailed);
        assert_eq!(events[0].properties.reason, reason);
    }

    #[tokio::test]
    async fn test_missing_email_is_rejected() {
        for user in [User::new("user-1"), User::new("user-1").with_email("")] {
            let store = FakeStore::default();
            let telemetry = RecordingTelemetryQueue::default();

            let outcome = run(&store, &telemetry, input(Some("acme-corp"), "Acme"), &user).await;

            assert_eq!(outcome.failure(), Some(&CreationFailure::MissingEmail));
            assert_eq!(store.writes(), 0);
            assert!(store.state.lock().unwrap().lookups.is_empty());
            assert_single_failure_event(&telemetry, "no email address");
        }
    }

    #[tokio::test]
    async fn test_missing_slug_is_rejected() {
        for slug in [None, Some("")] {
            let store = FakeStore::default();
            let telemetry = RecordingTelemetryQueue::default();

            let outcome = run(&store, &telemetry, input(slug, "Acme"), &user()).await;

            assert_eq!(outcome.failure(), Some(&CreationFailure::MissingSlug));
            assert_eq!(store.writes(), 0);
            assert_single_failure_event(&telemetry, "no slug");
        }
    }

    #[tokio::test]
    async fn test_email_is_checked_before_slug() {
        let store = FakeStore::default();
        let telemetry = RecordingTelemetryQueue::default();

        let outcome = run(&store, &telemetry, input(None, "Acme"), &User::new("user-1")).await;

        assert_eq!(outcome.failure(), Some(&CreationFailure::MissingEmail));
        assert_single_failure_event(&telemetry, "no email address");
    }

    #[tokio::test]
    async fn test_blacklisted_slug_is_rejected_with_name() {
        let store = FakeStore::default();
        let telemetry = RecordingTelemetryQueue::default();

        let outcome = run(&store, &telemetry, input(Some("Settings"), "My Settings"), &user()).await;

        let failure = outcome.failure().cloned().unwrap();
        assert_eq!(
            failure,
            CreationFailure::BlacklistedSlug {
                name: "My Settings".to_string()
            }
        );
        assert!(failure.to_string().contains("My Settings"));
        assert_eq!(store.writes(), 0);
        assert!(store.state.lock().unwrap().lookups.is_empty());
        assert_single_failure_event(&telemetry, "url taken");
    }

    #[tokio::test]
    async fn test_blacklist_matches_sanitized_slug() {
        let store = FakeStore::default();
        let telemetry = RecordingTelemetryQueue::default();

        let outcome = run(&store, &telemetry, input(Some("code of conduct"), "CoC"), &user()).await;

        assert!(matches!(
            outcome.failure(),
            Some(CreationFailure::BlacklistedSlug { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected() {
        let store = FakeStore::with_existing("acme-corp");
        let telemetry = RecordingTelemetryQueue::default();

        let outcome = run(&store, &telemetry, input(Some("acme  corp"), "Acme"), &user()).await;

        assert_eq!(outcome.failure(), Some(&CreationFailure::DuplicateSlug));
        assert_eq!(store.writes(), 0);
        let lookups = store.state.lock().unwrap().lookups.clone();
        assert_eq!(lookups, vec![BTreeSet::from(["acme-corp".to_string()])]);
        assert_single_failure_event(&telemetry, "community already exists");
    }

    #[tokio::test]
    async fn test_slug_claimed_after_lookup_is_rejected_as_duplicate() {
        let store = FakeStore {
            stale_lookups: true,
            ..FakeStore::with_existing("acme-corp")
        };
        let telemetry = RecordingTelemetryQueue::default();

        let outcome = run(&store, &telemetry, input(Some("acme-corp"), "Acme"), &user()).await;

        assert_eq!(outcome.failure(), Some(&CreationFailure::DuplicateSlug));
        let state = store.state.lock().unwrap();
        assert_eq!(state.communities.len(), 1);
        assert!(state.community_owners.is_empty());
        assert!(state.channels.is_empty());
        drop(state);
        assert_single_failure_event(&telemetry, "community already exists");
    }

    #[tokio::test]
    async fn test_creates_community_with_owner_and_general_channel() {
        let store = FakeStore::default();
        let telemetry = RecordingTelemetryQueue::default();
        let user = user();

        let outcome = run(&store, &telemetry, input(Some("acme-corp"), "Acme"), &user).await;

        let community = outcome.created().unwrap();
        assert_eq!(community.slug, "acme-corp");
        assert_eq!(community.name, "Acme");
        assert_eq!(community.creator_id, "user-1");

        let state = store.state.lock().unwrap();
        assert_eq!(state.communities.len(), 1);

        assert_eq!(state.community_owners.len(), 1);
        assert_eq!(state.community_owners[0].community_id, community.id);
        assert_eq!(state.community_owners[0].user_id, "user-1");

        assert_eq!(state.channels.len(), 1);
        assert_eq!(state.channels[0].community_id, community.id);
        assert_eq!(state.channels[0].slug, "general");
        assert!(state.channels[0].is_default);

        assert_eq!(state.channel_owners.len(), 1);
        assert_eq!(state.channel_owners[0].channel_id, state.channels[0].id);
        assert_eq!(state.channel_owners[0].user_id, "user-1");

        assert!(telemetry.events().is_empty());
    }

    #[tokio::test]
    async fn test_persists_sanitized_slug() {
        let store = FakeStore::default();
        let telemetry = RecordingTelemetryQueue::default();

        let outcome = run(
            &store,
            &telemetry,
            input(Some("My Cool Community!!"), "My Cool Community"),
            &user(),
        )
        .await;

        assert_eq!(outcome.created().unwrap().slug, "My-Cool-Community-");
    }

    #[tokio::test]
    async fn test_relationship_failure_propagates_without_rollback() {
        let store = FakeStore {
            fail_channel_owner: true,
            ..FakeStore::default()
        };
        let telemetry = RecordingTelemetryQueue::default();
        let reserved = ReservedSlugs::builtin();

        let result = CreateCommunityWorkflow::new(&store, &reserved, &telemetry)
            .run(input(Some("acme-corp"), "Acme"), &user())
            .await;

        assert!(result.is_err());
        let state = store.state.lock().unwrap();
        assert_eq!(state.communities.len(), 1);
        assert_eq!(state.channels.len(), 1);
        assert!(state.channel_owners.is_empty());
        assert!(telemetry.events().is_empty());
    }

    #[test]
    fn test_failure_codes_and_reasons() {
        let cases = [
            (CreationFailure::MissingEmail, "MISSING_EMAIL", "no email address"),
            (CreationFailure::MissingSlug, "MISSING_SLUG", "no slug"),
            (
                CreationFailure::BlacklistedSlug {
                    name: "x".to_string(),
                },
                "BLACKLISTED_SLUG",
                "url taken",
            ),
            (
                CreationFailure::DuplicateSlug,
                "DUPLICATE_SLUG",
                "community already exists",
            ),
        ];

        for (failure, code, reason) in cases {
            assert_eq!(failure.code(), code);
            assert_eq!(failure.telemetry_reason(), reason);
        }
    }
}

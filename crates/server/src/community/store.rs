use std::collections::BTreeSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::db;
use super::models::{CommunityMembershipRecord, CommunityRecord, NewCommunity};
use crate::auth::User;
use crate::channel::db as channel_db;
use crate::channel::{ChannelMembershipRecord, ChannelRecord};

/// Data access used by the community workflows.
#[async_trait]
pub trait CommunityStore: Send + Sync {
    async fn find_communities_by_slug(
        &self,
        slugs: &BTreeSet<String>,
    ) -> Result<Vec<CommunityRecord>>;

    /// Returns `None` when another community already holds the slug.
    async fn create_community(
        &self,
        community: &NewCommunity,
        creator: &User,
    ) -> Result<Option<CommunityRecord>>;

    async fn create_owner_in_community(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> Result<CommunityMembershipRecord>;

    async fn create_general_channel(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> Result<ChannelRecord>;

    async fn create_owner_in_channel(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<ChannelMembershipRecord>;
}

#[derive(Clone)]
pub struct SqliteCommunityStore {
    pool: SqlitePool,
}

impl SqliteCommunityStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommunityStore for SqliteCommunityStore {
    async fn find_communities_by_slug(
        &self,
        slugs: &BTreeSet<String>,
    ) -> Result<Vec<CommunityRecord>> {
        db::fetch_communities_by_slug(&self.pool, slugs)
            .await
            .context("failed to look up communities by slug")
    }

    async fn create_community(
        &self,
        community: &NewCommunity,
        creator: &User,
    ) -> Result<Option<CommunityRecord>> {
        match db::insert_community(&self.pool, community, &creator.id).await {
            Ok(record) => Ok(Some(record)),
            Err(err) if db::is_slug_conflict(&err) => {
                tracing::debug!(slug = %community.slug, "community slug claimed concurrently");
                Ok(None)
            }
            Err(err) => Err(anyhow::Error::new(err)
                .context(format!("failed to create community `{}`", community.slug))),
        }
    }

    async fn create_owner_in_community(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> Result<CommunityMembershipRecord> {
        db::insert_owner_in_community(&self.pool, community_id, user_id)
            .await
            .context("failed to create community owner relationship")
    }

    async fn create_general_channel(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> Result<ChannelRecord> {
        channel_db::insert_general_channel(&self.pool, community_id, user_id)
            .await
            .context("failed to create general channel")
    }

    async fn create_owner_in_channel(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<ChannelMembershipRecord> {
        channel_db::insert_owner_in_channel(&self.pool, channel_id, user_id)
            .await
            .context("failed to create channel owner relationship")
    }
}

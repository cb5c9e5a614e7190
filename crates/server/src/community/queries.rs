use async_graphql::{Context, ID, Object};
use sqlx::SqlitePool;

use super::db::{community_owner_ids, fetch_all_communities, fetch_community_by_slug};
use super::models::CommunityNode;
use crate::channel::ChannelNode;
use crate::channel::db::channels_for_community;
use crate::graphql::errors::internal_error;

#[Object]
impl CommunityNode {
    async fn id(&self) -> ID {
        ID::from(self.0.id.clone())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn slug(&self) -> &str {
        &self.0.slug
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn website(&self) -> Option<&str> {
        self.0.website.as_deref()
    }

    #[graphql(name = "creatorId")]
    async fn creator_id(&self) -> ID {
        ID::from(self.0.creator_id.clone())
    }

    #[graphql(name = "createdAt")]
    async fn created_at(&self) -> &str {
        &self.0.created_at
    }

    async fn channels(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<ChannelNode>> {
        let pool = ctx.data::<SqlitePool>()?;
        let channels = channels_for_community(pool, &self.0.id)
            .await
            .map_err(internal_error)?;
        Ok(channels.into_iter().map(ChannelNode::from).collect())
    }

    async fn owners(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<ID>> {
        let pool = ctx.data::<SqlitePool>()?;
        let owners = community_owner_ids(pool, &self.0.id)
            .await
            .map_err(internal_error)?;
        Ok(owners.into_iter().map(ID::from).collect())
    }
}

pub async fn get_community(
    ctx: &Context<'_>,
    slug: String,
) -> async_graphql::Result<Option<CommunityNode>> {
    let pool = ctx.data::<SqlitePool>()?;
    let record = fetch_community_by_slug(pool, &slug)
        .await
        .map_err(internal_error)?;
    Ok(record.map(CommunityNode::from))
}

pub async fn get_all_communities(ctx: &Context<'_>) -> async_graphql::Result<Vec<CommunityNode>> {
    let pool = ctx.data::<SqlitePool>()?;
    let records = fetch_all_communities(pool).await.map_err(internal_error)?;
    Ok(records.into_iter().map(CommunityNode::from).collect())
}

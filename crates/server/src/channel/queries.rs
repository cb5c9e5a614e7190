use async_graphql::{Context, ID, Object};
use sqlx::SqlitePool;

use super::db::channel_owner_ids;
use super::models::ChannelNode;
use crate::community::CommunityNode;
use crate::community::db::fetch_community_by_id;
use crate::graphql::errors::internal_error;

#[Object]
impl ChannelNode {
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

    #[graphql(name = "isDefault")]
    async fn is_default(&self) -> bool {
        self.0.is_default
    }

    #[graphql(name = "isPrivate")]
    async fn is_private(&self) -> bool {
        self.0.is_private
    }

    #[graphql(name = "createdAt")]
    async fn created_at(&self) -> &str {
        &self.0.created_at
    }

    async fn community(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<CommunityNode>> {
        let pool = ctx.data::<SqlitePool>()?;
        let community = fetch_community_by_id(pool, &self.0.community_id)
            .await
            .map_err(internal_error)?;
        Ok(community.map(CommunityNode::from))
    }

    async fn owners(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<ID>> {
        let pool = ctx.data::<SqlitePool>()?;
        let owners = channel_owner_ids(pool, &self.0.id)
            .await
            .map_err(internal_error)?;
        Ok(owners.into_iter().map(ID::from).collect())
    }
}

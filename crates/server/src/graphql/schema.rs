use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, ID, Object, Schema, SimpleObject};
use sqlx::SqlitePool;

use crate::auth::guard::current_user;
use crate::community::{CommunityNode, CreateCommunityInput};
use crate::telemetry::TelemetryQueue;
use crate::validation::ReservedSlugs;

/// The signed-in user as seen by the API.
#[derive(SimpleObject)]
pub struct ViewerNode {
    pub id: ID,
    pub email: Option<String>,
    pub username: Option<String>,
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn community(
        &self,
        ctx: &Context<'_>,
        slug: String,
    ) -> async_graphql::Result<Option<CommunityNode>> {
        crate::community::queries::get_community(ctx, slug).await
    }

    async fn communities(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<CommunityNode>> {
        crate::community::queries::get_all_communities(ctx).await
    }

    async fn viewer(&self, ctx: &Context<'_>) -> Option<ViewerNode> {
        current_user(ctx).map(|user| ViewerNode {
            id: ID::from(user.id.clone()),
            email: user.email.clone(),
            username: user.username.clone(),
        })
    }
}

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    #[graphql(name = "createCommunity")]
    async fn create_community(
        &self,
        ctx: &Context<'_>,
        input: CreateCommunityInput,
    ) -> async_graphql::Result<CommunityNode> {
        crate::community::mutations::create_community(ctx, input).await
    }
}

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(
    pool: SqlitePool,
    reserved: ReservedSlugs,
    telemetry: Arc<dyn TelemetryQueue>,
) -> AppSchema {
    tracing::debug!(reserved_slugs = reserved.len(), "building GraphQL schema");

    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(pool)
    .data(reserved)
    .data(telemetry)
    .finish()
}

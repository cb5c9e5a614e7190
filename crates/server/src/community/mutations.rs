use std::sync::Arc;

use async_graphql::{Context, InputObject};
use sqlx::SqlitePool;

use super::models::{CommunityNode, CreateCommunityRequest};
use super::store::SqliteCommunityStore;
use super::workflow::{CreateCommunityOutcome, CreateCommunityWorkflow};
use crate::auth::require_auth;
use crate::graphql::errors::{internal_error, rejected};
use crate::telemetry::TelemetryQueue;
use crate::validation::ReservedSlugs;

#[derive(InputObject, Clone, Debug)]
pub struct CreateCommunityInput {
    pub name: String,
    /// Requested url slug; sanitized before use.
    pub slug: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
}

impl From<CreateCommunityInput> for CreateCommunityRequest {
    fn from(input: CreateCommunityInput) -> Self {
        Self {
            name: input.name,
            slug: input.slug,
            description: input.description,
            website: input.website,
        }
    }
}

pub async fn create_community(
    ctx: &Context<'_>,
    input: CreateCommunityInput,
) -> async_graphql::Result<CommunityNode> {
    let authed = require_auth(ctx)?;

    let pool = ctx.data::<SqlitePool>()?;
    let reserved = ctx.data::<ReservedSlugs>()?;
    let telemetry = ctx.data::<Arc<dyn TelemetryQueue>>()?;

    let store = SqliteCommunityStore::new(pool.clone());
    let workflow = CreateCommunityWorkflow::new(&store, reserved, telemetry.as_ref());

    match workflow.run(input.into(), authed.user).await.map_err(|err| {
        tracing::error!("community creation failed: {:#}", err);
        internal_error(err)
    })? {
        CreateCommunityOutcome::Created(record) => Ok(CommunityNode::from(record)),
        CreateCommunityOutcome::Rejected(failure) => Err(rejected(&failure)),
    }
}

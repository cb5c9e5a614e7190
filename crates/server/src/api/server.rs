use std::sync::Arc;

use anyhow::{Context, Result};
use async_graphql::http::{GraphQLPlaygroundConfig, playground_source};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::Html;
use axum::routing::{get, post};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::{TokenService, Viewer};
use crate::graphql::AppSchema;
use crate::metrics_exporter::render_metrics;

#[derive(Clone)]
pub struct ApiState {
    pub schema: AppSchema,
    pub tokens: Arc<TokenService>,
}

/// Execute a GraphQL request as the viewer named by its bearer token.
pub async fn graphql_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let viewer = Viewer(state.tokens.user_from_headers(&headers));
    state.schema.execute(req.into_inner().data(viewer)).await.into()
}

pub async fn graphql_options() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn graphql_playground() -> Html<String> {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

pub async fn metrics_handler() -> String {
    render_metrics()
}

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(graphql_playground))
        .route("/graphql", post(graphql_handler).options(graphql_options))
        .route("/metrics", get(metrics_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS]),
        )
        .with_state(state)
}

pub async fn run_api(state: ApiState, bind_address: String, shutdown: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    tracing::info!("GraphQL API listening on http://{}/graphql", bind_address);

    axum::serve(listener, build_api_router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}

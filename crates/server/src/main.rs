use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use community_server::api::{ApiState, run_api};
use community_server::auth::{TokenService, User};
use community_server::config::{self, Config};
use community_server::graphql::build_schema;
use community_server::supervisor::Supervisor;
use community_server::telemetry::{ChannelTelemetryQueue, TelemetryWorker};
use community_server::{db, metrics_exporter};

#[derive(Parser)]
#[command(name = "community-server")]
#[command(about = "Community GraphQL server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the GraphQL API (default)
    Serve,
    /// Mint a bearer token signed with the configured secret
    Token {
        /// User id placed in the `sub` claim
        user_id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
        /// Token lifetime in hours
        #[arg(long, default_value_t = 24)]
        ttl_hours: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = config::loader::load_with_discovery()?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Token {
            user_id,
            email,
            username,
            ttl_hours,
        } => {
            let tokens = TokenService::from_settings(&config.auth)?;
            let user = User {
                id: user_id,
                email,
                username,
            };
            let token = tokens.issue(&user, Duration::from_secs(ttl_hours * 3600))?;
            println!("{token}");
            Ok(())
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    metrics_exporter::init_metrics()?;

    let pool = db::init_pool().await?;
    let tokens = Arc::new(
        TokenService::from_settings(&config.auth).context("failed to configure authentication")?,
    );

    let reserved = config.communities.reserved_slugs();
    if reserved.is_empty() {
        tracing::warn!("no community slugs reserved; every route name can be claimed");
    } else {
        tracing::info!("{} community slugs reserved", reserved.len());
    }

    let (queue, receiver) = ChannelTelemetryQueue::new();
    let schema = build_schema(pool.clone(), reserved, Arc::new(queue));

    let persisted = config.telemetry.persist_events.then(|| pool.clone());
    let worker = TelemetryWorker::new(receiver, persisted);

    let state = ApiState { schema, tokens };
    let bind_address = config.server.bind_address.clone();

    let mut supervisor = Supervisor::new();
    supervisor.spawn("telemetry", move |shutdown| worker.run(shutdown));
    supervisor.spawn("api", move |shutdown| run_api(state, bind_address, shutdown));
    supervisor.run().await
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const DEFAULT_GRAPHQL_ENDPOINT: &str = "http://localhost:8000/graphql";

#[derive(Parser)]
#[command(name = "community")]
#[command(about = "Community CLI - manage communities via the GraphQL API", long_about = None)]
struct Cli {
    /// GraphQL API endpoint URL
    #[arg(long, default_value = DEFAULT_GRAPHQL_ENDPOINT)]
    api_url: String,

    /// Bearer token used to authenticate mutations
    #[arg(long, env = "COMMUNITY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new community with a default general channel
    Create {
        /// Requested url slug (non-alphanumeric runs become hyphens)
        slug: String,
        /// Display name
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        website: Option<String>,
    },
    /// Show a community and its channels
    Show { slug: String },
}

#[derive(Serialize)]
struct GraphQLRequest<T> {
    query: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<T>,
}

#[derive(Deserialize, Debug)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct GraphQLResponse<T> {
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQLError>,
}

#[derive(Deserialize, Debug)]
struct GraphQLError {
    message: String,
}

#[derive(Serialize)]
struct CreateCommunityVariables {
    input: CreateCommunityInput,
}

#[derive(Serialize)]
struct CreateCommunityInput {
    slug: String,
    name: String,
    description: Option<String>,
    website: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CreateCommunityResponse {
    #[serde(rename = "createCommunity")]
    create_community: CommunityNode,
}

#[derive(Serialize)]
struct ShowCommunityVariables {
    slug: String,
}

#[derive(Deserialize, Debug)]
struct ShowCommunityResponse {
    community: Option<CommunityNode>,
}

#[derive(Deserialize, Debug)]
struct CommunityNode {
    id: String,
    name: String,
    slug: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    channels: Vec<ChannelNode>,
}

#[derive(Deserialize, Debug)]
struct ChannelNode {
    name: String,
    slug: String,
    #[serde(rename = "isDefault")]
    is_default: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Create {
            slug,
            name,
            description,
            website,
        } => {
            let input = CreateCommunityInput {
                slug,
                name,
                description,
                website,
            };
            create_community(&cli.api_url, cli.token.as_deref(), input).await?
        }
        Commands::Show { slug } => show_community(&cli.api_url, cli.token.as_deref(), slug).await?,
    }

    Ok(())
}

async fn execute<V: Serialize, T: DeserializeOwned>(
    api_url: &str,
    token: Option<&str>,
    query: &'static str,
    variables: V,
) -> Result<T> {
    let request = GraphQLRequest {
        query,
        variables: Some(variables),
    };

    let client = reqwest::Client::new();
    let mut builder = client
        .post(api_url)
        .header("Content-Type", "application/json")
        .json(&request);
    if let Some(token) = token {
        builder = builder.bearer_auth(token);
    }

    let response = builder
        .send()
        .await
        .context("Failed to send request to GraphQL API")?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "GraphQL request failed with status: {}",
            response.status()
        ));
    }

    let graphql_response: GraphQLResponse<T> = response
        .json()
        .await
        .context("Failed to parse GraphQL response")?;

    if !graphql_response.errors.is_empty() {
        let error_messages: Vec<String> = graphql_response
            .errors
            .iter()
            .map(|e| e.message.clone())
            .collect();
        return Err(anyhow::anyhow!("{}", error_messages.join(", ")));
    }

    graphql_response
        .data
        .context("No data returned from GraphQL")
}

async fn create_community(
    api_url: &str,
    token: Option<&str>,
    input: CreateCommunityInput,
) -> Result<()> {
    if token.is_none() {
        return Err(anyhow::anyhow!(
            "creating a community requires --token or COMMUNITY_TOKEN"
        ));
    }

    let query = r#"
        mutation CreateCommunity($input: CreateCommunityInput!) {
            createCommunity(input: $input) {
                id
                name
                slug
                description
                channels {
                    name
                    slug
                    isDefault
                }
            }
        }
    "#;

    let data: CreateCommunityResponse =
        execute(api_url, token, query, CreateCommunityVariables { input }).await?;

    println!("✓ Community created successfully!");
    print_community(&data.create_community);

    Ok(())
}

async fn show_community(api_url: &str, token: Option<&str>, slug: String) -> Result<()> {
    let query = r#"
        query Community($slug: String!) {
            community(slug: $slug) {
                id
                name
                slug
                description
                channels {
                    name
                    slug
                    isDefault
                }
            }
        }
    "#;

    let data: ShowCommunityResponse =
        execute(api_url, token, query, ShowCommunityVariables { slug: slug.clone() }).await?;

    match data.community {
        Some(community) => print_community(&community),
        None => println!("No community with slug `{slug}`"),
    }

    Ok(())
}

fn print_community(community: &CommunityNode) {
    println!("  ID:   {}", community.id);
    println!("  Name: {}", community.name);
    println!("  Slug: {}", community.slug);
    if let Some(description) = &community.description {
        println!("  Description: {}", description);
    }
    for channel in &community.channels {
        let marker = if channel.is_default { " (default)" } else { "" };
        println!("  Channel: {} [{}]{}", channel.name, channel.slug, marker);
    }
}

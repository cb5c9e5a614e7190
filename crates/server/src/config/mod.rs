//! Configuration management for the community server
//!
//! Settings are stored in RON. Every section is optional; a missing file
//! yields [`Config::default`]. Secrets are never stored in the file itself,
//! only the name of the environment variable that holds them.

pub mod loader;

use serde::{Deserialize, Serialize};

use crate::validation::{ReservedSlugs, sanitize_slug};

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub communities: CommunitySettings,

    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        self.auth.validate()?;
        self.communities.validate()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerSettings {
    /// Address the GraphQL API binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AuthSettings {
    /// Environment variable holding the HS256 signing secret
    #[serde(default = "default_secret_env")]
    pub secret_env: String,

    /// Expected `iss` claim
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

impl AuthSettings {
    /// Read the signing secret from the environment.
    pub fn resolve_secret(&self) -> Option<String> {
        std::env::var(&self.secret_env)
            .ok()
            .filter(|secret| !secret.is_empty())
    }

    fn validate(&self) -> Result<(), String> {
        if self.secret_env.is_empty() {
            return Err("auth.secret_env cannot be empty".to_string());
        }
        if self.issuer.is_empty() {
            return Err("auth.issuer cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            secret_env: default_secret_env(),
            issuer: default_issuer(),
        }
    }
}

fn default_secret_env() -> String {
    "COMMUNITY_JWT_SECRET".to_string()
}

fn default_issuer() -> String {
    "community-server".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CommunitySettings {
    /// Extra slugs that can never be claimed by a community
    #[serde(default)]
    pub reserved_slugs: Vec<String>,

    /// Whether the built-in list of route names is reserved as well
    #[serde(default = "default_true")]
    pub use_builtin_reserved: bool,
}

impl CommunitySettings {
    pub fn reserved_slugs(&self) -> ReservedSlugs {
        let base = if self.use_builtin_reserved {
            ReservedSlugs::builtin()
        } else {
            ReservedSlugs::from_slugs(Vec::<String>::new())
        };
        base.with_extra(&self.reserved_slugs)
    }

    /// Reserved slugs are compared after sanitization, so they must already be sanitized.
    fn validate(&self) -> Result<(), String> {
        for slug in &self.reserved_slugs {
            if slug.is_empty() {
                return Err("Reserved slug cannot be empty".to_string());
            }
            if sanitize_slug(slug) != *slug {
                return Err(format!(
                    "Reserved slug '{}' can never match; use '{}' instead",
                    slug,
                    sanitize_slug(slug)
                ));
            }
        }
        Ok(())
    }
}

impl Default for CommunitySettings {
    fn default() -> Self {
        Self {
            reserved_slugs: Vec::new(),
            use_builtin_reserved: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TelemetrySettings {
    /// If true, the telemetry worker stores events in `telemetry_events`
    #[serde(default = "default_true")]
    pub persist_events: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            persist_events: true,
        }
    }
}

fn default_true() -> bool {
    true
}

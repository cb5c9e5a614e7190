//! Configuration file loading and parsing
//!
//! Loads the community server configuration from RON, searching the standard
//! locations when no explicit path is given.

use super::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Standard config file names to search for
const CONFIG_FILENAMES: &[&str] = &["community.ron", ".community/config.ron"];

/// Load configuration from a specific file path
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_ron(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration with automatic file discovery
///
/// Searches, in order: the path in `COMMUNITY_CONFIG_PATH`, `community.ron`,
/// then `.community/config.ron` relative to the current directory. Falls back
/// to the default configuration when nothing is found.
pub fn load_with_discovery() -> Result<Config> {
    if let Ok(env_path) = std::env::var("COMMUNITY_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            tracing::info!("Loading config from COMMUNITY_CONFIG_PATH: {}", path.display());
            return load_from_file(&path);
        }
        tracing::warn!(
            "COMMUNITY_CONFIG_PATH specified but file not found: {}",
            path.display()
        );
    }

    for filename in CONFIG_FILENAMES {
        let path = PathBuf::from(filename);
        if path.exists() {
            tracing::info!("Loading config from: {}", path.display());
            return load_from_file(&path);
        }
    }

    tracing::info!("No config file found, using defaults");
    Ok(Config::default())
}

fn parse_ron(content: &str) -> Result<Config> {
    ron::from_str(content).context("Failed to parse RON configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_ron("Config()").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_full_config() {
        let ron = r#"
Config(
    server: ServerSettings(
        bind_address: "127.0.0.1:9000",
    ),
    auth: AuthSettings(
        secret_env: "MY_SECRET",
        issuer: "accounts.example.com",
    ),
    communities: CommunitySettings(
        reserved_slugs: ["staff", "internal"],
        use_builtin_reserved: false,
    ),
    telemetry: TelemetrySettings(
        persist_events: false,
    ),
)
        "#;

        let config = parse_ron(ron).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert_eq!(config.auth.secret_env, "MY_SECRET");
        assert_eq!(config.auth.issuer, "accounts.example.com");
        assert_eq!(config.communities.reserved_slugs, vec!["staff", "internal"]);
        assert!(!config.communities.use_builtin_reserved);
        assert!(!config.telemetry.persist_events);
    }

    #[test]
    fn test_parse_partial_section_fills_defaults() {
        let ron = r#"
Config(
    communities: CommunitySettings(
        reserved_slugs: ["staff"],
    ),
)
        "#;

        let config = parse_ron(ron).unwrap();
        assert!(config.communities.use_builtin_reserved);
        assert_eq!(config.server.bind_address, "0.0.0.0:8000");
        assert!(config.telemetry.persist_events);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("community.ron");
        std::fs::write(
            &config_path,
            r#"Config(server: ServerSettings(bind_address: "0.0.0.0:7000"))"#,
        )
        .unwrap();

        let config = load_from_file(&config_path).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:7000");
    }

    #[test]
    fn test_load_from_nonexistent_file() {
        let result = load_from_file("/nonexistent/path/community.ron");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_invalid_ron() {
        assert!(parse_ron("This is not valid RON").is_err());
    }
}

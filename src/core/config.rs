//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.banter/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! Endpoints can be given explicitly, or derived from an Nhost project's
//! subdomain and region the way the hosted backend lays them out.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BanterConfig {
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub subdomain: Option<String>,
    pub region: Option<String>,
    pub graphql_url: Option<String>,
    pub ws_url: Option<String>,
    pub auth_url: Option<String>,
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// HTTP endpoint for queries and mutations.
    pub graphql_url: String,
    /// WebSocket endpoint for the live message feed.
    pub ws_url: String,
    /// Base URL of the auth service (no trailing slash).
    pub auth_url: String,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    /// No explicit endpoints and no subdomain/region to derive them from.
    MissingBackend,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::MissingBackend => write!(
                f,
                "no backend configured: set graphql_url/ws_url/auth_url or subdomain+region \
                 in ~/.banter/config.toml (or BANTER_* / NHOST_* env vars)"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.banter/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".banter").join("config.toml"))
}

/// Load config from `~/.banter/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `BanterConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<BanterConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(BanterConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(BanterConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: BanterConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Banter Configuration
# All settings are optional in the file, but the app needs either explicit
# endpoint URLs or a subdomain+region pair to derive them from.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [backend]
# subdomain = "myproject"            # Or set NHOST_SUBDOMAIN env var
# region = "eu-central-1"            # Or set NHOST_REGION env var

# Explicit endpoints win over subdomain/region derivation:
# graphql_url = "https://myproject.hasura.eu-central-1.nhost.run/v1/graphql"
# ws_url = "wss://myproject.hasura.eu-central-1.nhost.run/v1/graphql"
# auth_url = "https://myproject.auth.eu-central-1.nhost.run/v1"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// CLI overrides passed through from clap (None = not specified).
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub subdomain: Option<String>,
    pub region: Option<String>,
    pub graphql_url: Option<String>,
}

/// Resolve the final config by collapsing: config file → env vars → CLI.
///
/// Each endpoint resolves independently: explicit URL (CLI → env → file)
/// wins, otherwise it is derived from subdomain+region.
pub fn resolve(config: &BanterConfig, cli: &CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    // Subdomain/region: CLI → env → config
    let subdomain = cli
        .subdomain
        .clone()
        .or_else(|| std::env::var("NHOST_SUBDOMAIN").ok())
        .or_else(|| config.backend.subdomain.clone());
    let region = cli
        .region
        .clone()
        .or_else(|| std::env::var("NHOST_REGION").ok())
        .or_else(|| config.backend.region.clone());

    let derived = match (&subdomain, &region) {
        (Some(s), Some(r)) => Some((
            format!("https://{s}.hasura.{r}.nhost.run/v1/graphql"),
            format!("wss://{s}.hasura.{r}.nhost.run/v1/graphql"),
            format!("https://{s}.auth.{r}.nhost.run/v1"),
        )),
        _ => None,
    };

    let graphql_url = cli
        .graphql_url
        .clone()
        .or_else(|| std::env::var("BANTER_GRAPHQL_URL").ok())
        .or_else(|| config.backend.graphql_url.clone())
        .or_else(|| derived.as_ref().map(|(g, _, _)| g.clone()));

    let ws_url = std::env::var("BANTER_WS_URL")
        .ok()
        .or_else(|| config.backend.ws_url.clone())
        // No explicit ws endpoint: the subscription endpoint is the graphql
        // one with the scheme swapped.
        .or_else(|| graphql_url.as_deref().map(http_to_ws))
        .or_else(|| derived.as_ref().map(|(_, w, _)| w.clone()));

    let auth_url = std::env::var("BANTER_AUTH_URL")
        .ok()
        .or_else(|| config.backend.auth_url.clone())
        .or_else(|| derived.as_ref().map(|(_, _, a)| a.clone()));

    match (graphql_url, ws_url, auth_url) {
        (Some(graphql_url), Some(ws_url), Some(auth_url)) => Ok(ResolvedConfig {
            graphql_url,
            ws_url,
            auth_url: auth_url.trim_end_matches('/').to_string(),
        }),
        _ => Err(ConfigError::MissingBackend),
    }
}

fn http_to_ws(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        url.to_string()
    }
}

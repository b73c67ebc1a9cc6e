//! CLI command implementations.

pub mod config;
pub mod index;
pub mod ingest;
pub mod init;
pub mod search;
pub mod setup;

use anyhow::{Context, Result};
use sorot_auth::TokenProvider;
use sorot_config::{AppPaths, Config};
use std::sync::Arc;

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Could not determine home directory")
}

/// Load the configuration and require the values the pipeline needs.
pub fn load_validated_config() -> Result<Config> {
    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration is incomplete. Run 'sorot init' and edit config.toml")?;
    Ok(config)
}

/// Build the token provider shared by all Google API clients.
pub fn token_provider() -> Result<Arc<TokenProvider>> {
    let provider = TokenProvider::new().context("Failed to set up Google Cloud credentials")?;
    Ok(Arc::new(provider))
}

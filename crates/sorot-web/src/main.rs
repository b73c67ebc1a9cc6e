//! sorot-web entry point.

use anyhow::{Context, Result};
use sorot_auth::TokenProvider;
use sorot_config::Config;
use sorot_discovery::DiscoveryClient;
use sorot_web::{build_router, AppState};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded .env from {}", path.display()),
        Err(_) => debug!("No .env file found"),
    }

    let config = Config::load().context("Failed to load configuration")?;
    if let Err(e) = config.validate_search() {
        warn!("Search is not fully configured: {}", e);
        warn!("/api/search will return errors until config.toml is filled in");
    }

    let auth = Arc::new(
        TokenProvider::new().context("Failed to set up Google Cloud credentials")?,
    );
    let search = DiscoveryClient::from_config(&config.gcp, &config.search, auth)
        .context("Failed to create search client")?;

    let state = Arc::new(AppState {
        search,
        config: config.clone(),
    });
    let app = build_router(state);

    // PORT wins over config for platform runtimes that inject it
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(config.web.port);
    let addr = format!("{}:{}", config.web.host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("sorot-web listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

//! Create the search data store.

use super::{load_validated_config, token_provider};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sorot_discovery::DiscoveryClient;
use std::time::Duration;
use tokio::runtime::Runtime;

pub fn run() -> Result<()> {
    let config = load_validated_config()?;
    let auth = token_provider()?;
    let client = DiscoveryClient::from_config(&config.gcp, &config.search, auth)
        .context("Failed to create search client")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!(
        "Creating data store '{}'...",
        config.search.data_store_id
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    let rt = Runtime::new().context("Failed to create async runtime")?;
    let created = rt.block_on(client.create_data_store())?;
    pb.finish_and_clear();

    if created {
        println!(
            "{} Created data store '{}'",
            "✓".green(),
            config.search.data_store_id
        );
    } else {
        println!(
            "{} Data store '{}' already exists.",
            "Note:".yellow().bold(),
            config.search.data_store_id
        );
    }

    println!();
    println!("Next steps:");
    println!(
        "  1. Ingest videos:  {}",
        "sorot ingest --playlist <id>".cyan()
    );
    println!("  2. Index them:     {}", "sorot index --all".cyan());

    Ok(())
}

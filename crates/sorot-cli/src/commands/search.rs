//! One-shot search against the indexed videos.

use super::token_provider;
use anyhow::{Context, Result};
use colored::Colorize;
use sorot_config::Config;
use sorot_discovery::DiscoveryClient;
use std::collections::BTreeMap;
use tokio::runtime::Runtime;

pub fn run(query: &str, limit: Option<u32>) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    config
        .validate_search()
        .context("Configuration is incomplete. Set gcp.project_id and search.engine_id")?;
    if let Some(limit) = limit {
        config.search.page_size = limit;
    }

    let auth = token_provider()?;
    let client = DiscoveryClient::from_config(&config.gcp, &config.search, auth)
        .context("Failed to create search client")?;

    println!("{} \"{}\"", "Searching for:".cyan().bold(), query);
    println!("{}", "─".repeat(70));

    let rt = Runtime::new().context("Failed to create async runtime")?;
    let page = rt.block_on(client.search(query, &BTreeMap::new()))?;

    if page.results.is_empty() {
        println!();
        println!("{}", "No results found.".dimmed());
        println!();
        println!("Tips:");
        println!("  • Try different keywords");
        println!("  • Make sure videos have been indexed with 'sorot index'");
        println!("  • Imports can take a few minutes to become searchable");
        return Ok(());
    }

    if let Some(summary) = &page.summary {
        if !summary.summary_text.is_empty() {
            println!();
            println!("{}", summary.summary_text);
        }
    }

    println!();
    println!(
        "Found {} result{} (showing {})",
        page.total_size.to_string().green(),
        if page.total_size == 1 { "" } else { "s" },
        page.results.len()
    );
    println!();

    for result in &page.results {
        let document = match &result.document {
            Some(document) => document,
            None => continue,
        };
        let data = &document.struct_data;

        let title = data
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("Untitled Video");
        let description = data
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let uri = data.get("uri").and_then(|v| v.as_str()).unwrap_or("");

        println!("{} {}", "•".cyan(), title.white().bold());
        if !description.is_empty() {
            println!("  {}", truncate(description, 150).dimmed());
        }
        if !uri.is_empty() {
            println!("  {}", uri.blue());
        }
        println!();
    }

    Ok(())
}

/// Truncate a string to a maximum length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

//! Initialize sorot.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use sorot_config::Config;

pub fn run(force: bool) -> Result<()> {
    let paths = get_paths()?;

    if paths.is_initialized() && !force {
        println!(
            "{} sorot is already initialized.",
            "Note:".yellow().bold()
        );
        println!("  Config: {}", paths.config_file.display());
        println!("  Use {} to overwrite the config file.", "--force".cyan());
        return Ok(());
    }

    println!("{}", "Initializing sorot...".cyan().bold());
    println!();

    paths
        .ensure_dirs()
        .context("Failed to create application directories")?;
    println!("  {} Created directories", "✓".green());

    Config::create_default_file(&paths.config_file)
        .context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    println!();
    println!("{}", "sorot initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  1. Set your project:    {}",
        "sorot config set gcp.project_id <project>".cyan()
    );
    println!(
        "  2. Set your bucket:     {}",
        "sorot config set storage.bucket <bucket>".cyan()
    );
    println!(
        "  3. Create the store:    {}",
        "sorot setup".cyan()
    );
    println!(
        "  4. Ingest a playlist:   {}",
        "sorot ingest --playlist <id>".cyan()
    );

    Ok(())
}

//! Sorot CLI entry point.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sorot")]
#[command(version)]
#[command(about = "Index broadcast video into a searchable media library", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize sorot (config directory and default config file)
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Create the search data store
    Setup,

    /// Download playlist videos and upload them to Cloud Storage
    Ingest {
        /// Playlist ID (defaults to ingest.playlist_id from config)
        #[arg(short, long)]
        playlist: Option<String>,

        /// Number of videos to ingest (defaults to ingest.num_videos)
        #[arg(short, long)]
        count: Option<u32>,
    },

    /// Segment, analyze and publish stored videos
    Index {
        /// Index a single video (gs://bucket/videos/name.mp4)
        #[arg(long, conflicts_with = "all")]
        video_uri: Option<String>,

        /// Index every video under the configured video prefix
        #[arg(long)]
        all: bool,
    },

    /// Search the indexed videos
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the current configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., gcp.project_id)
        key: String,

        /// New value
        value: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sorot=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sorot=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init { force } => commands::init::run(force),
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value),
        },
        Commands::Setup => commands::setup::run(),
        Commands::Ingest { playlist, count } => commands::ingest::run(playlist, count),
        Commands::Index { video_uri, all } => commands::index::run(video_uri, all),
        Commands::Search { query, limit } => commands::search::run(&query, limit),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

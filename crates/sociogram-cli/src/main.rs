//! Sociogram CLI - Command-line interface for Sociogram
//!
//! Loads a `USER` / `FRIEND` dataset into a network and runs the
//! friendship analytics over it.

use clap::{Parser, Subcommand};
use colored::Colorize;
use sociogram_graph::{IngestPolicy, TraversalStrategy, UserId};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "sociogram")]
#[command(author = "Sociogram Contributors")]
#[command(version)]
#[command(about = "Friendship graph analytics over an ordered user directory", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Dataset to load (defaults to the configured dataset)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Config file (defaults to .sociogram/config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fail on malformed lines and unresolved edges instead of skipping them
    #[arg(long, global = true)]
    strict: bool,

    /// Use explicit-stack traversals instead of recursion
    #[arg(long, global = true)]
    iterative: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config in the given directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Load the dataset and show the ingestion report
    Load {
        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// List users reported at exactly the given depth
    Reach {
        /// Starting user id
        user: UserId,

        /// Depth to report (defaults to the configured depth)
        #[arg(short = 'n', long)]
        depth: Option<usize>,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// List friends shared by two users
    Common {
        a: UserId,
        b: UserId,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// List connected components of the friendship graph
    Communities {
        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Count the users reachable from a user
    Influence {
        user: UserId,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Run every analysis for a pair of users
    Report {
        /// Primary user (defaults to the configured report user)
        #[arg(short, long)]
        user: Option<UserId>,

        /// User compared against for common friends
        #[arg(short, long)]
        other: Option<UserId>,

        /// Reachability depth
        #[arg(short = 'n', long)]
        depth: Option<usize>,
    },

    /// Show directory and graph statistics
    Stats {
        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Verify the directory's red-black invariants
    #[command(hide = true)]
    Check,
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Load { json } => commands::load(&config, json),
        Commands::Reach { user, depth, json } => commands::reach(&config, user, depth, json),
        Commands::Common { a, b, json } => commands::common(&config, a, b, json),
        Commands::Communities { json } => commands::communities(&config, json),
        Commands::Influence { user, json } => commands::influence(&config, user, json),
        Commands::Report { user, other, depth } => commands::report(&config, user, other, depth),
        Commands::Stats { json } => commands::stats(&config, json),
        Commands::Check => commands::check(&config),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Reads the config file and applies command-line overrides.
fn load_config(cli: &Cli) -> Result<Config, config::ConfigError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut config = Config::load(cli.config.as_deref(), &cwd)?;

    if let Some(data) = &cli.data {
        config.dataset = data.clone();
    }
    if cli.strict {
        config.policy = IngestPolicy::Strict;
    }
    if cli.iterative {
        config.traversal = TraversalStrategy::Iterative;
    }

    Ok(config)
}

//! Entur departure board CLI
//!
//! Search stops and show upcoming departures from the command line.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use integration_entur::{
    DepartureBoard, EnturConfig, EnturError, HttpEnturTransport, MAX_RESULTS, format_departures,
    format_stop_list,
};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Entur departure board CLI
#[derive(Debug, Parser)]
#[command(name = "entur-cli")]
#[command(author, version, about = "Norwegian public transit departures from Entur", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML configuration file (default: ./entur.toml if present)
    #[arg(short, long, global = true, env = "ENTUR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for stops by name
    ///
    /// Example: entur-cli stops "Oslo S" --limit 3
    Stops {
        /// Search text
        query: String,

        /// Maximum number of stops to return
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RESULTS)))]
        limit: Option<u32>,
    },

    /// Show upcoming departures from a stop id
    ///
    /// Example: entur-cli departures NSR:StopPlace:58366
    Departures {
        /// Stop id (NSR:StopPlace:<digits>)
        stop_id: String,

        /// Number of departures to show
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RESULTS)))]
        count: Option<u32>,
    },

    /// Find a stop by name and show its upcoming departures
    ///
    /// Example: entur-cli departures-by-name Jernbanetorget -n 10
    DeparturesByName {
        /// Stop name to search for
        stop_name: String,

        /// Number of departures to show
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RESULTS)))]
        count: Option<u32>,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Execute a command and render its result as text
async fn run(command: Commands, config: &EnturConfig) -> Result<String, EnturError> {
    let transport = Arc::new(HttpEnturTransport::new(config)?);
    let board = DepartureBoard::new(transport);

    match command {
        Commands::Stops { query, limit } => {
            let limit = limit.unwrap_or(config.default_search_limit);
            let stops = board.resolver().search_stops(&query, limit).await?;
            Ok(format_stop_list(&query, &stops))
        },

        Commands::Departures { stop_id, count } => {
            let count = count.unwrap_or(config.default_departures);
            let departures = board.get_departures(&stop_id, count).await?;
            Ok(format_departures(&departures))
        },

        Commands::DeparturesByName { stop_name, count } => {
            let count = count.unwrap_or(config.default_departures);
            let departures = board.find_and_get_departures(&stop_name, count).await?;
            Ok(format_departures(&departures))
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::load_config(cli.config.as_deref())?;

    match run(cli.command, &config).await {
        Ok(text) => println!("{text}"),
        Err(e) => {
            error!(error = ?e, "Command failed");
            eprintln!("❌ {e}");
            std::process::exit(1);
        },
    }

    Ok(())
}

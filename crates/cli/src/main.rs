//! Contrail meter CLI
//!
//! Runs the floating IP and switch port meters once against live
//! Contrail analytics and Neutron endpoints and prints the samples.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{meters, poll};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Contrail meter CLI
#[derive(Parser)]
#[command(name = "contrail-poll")]
#[command(author, version, about = "CLI for Contrail traffic meters", long_about = None)]
pub struct Cli {
    /// Path to the config file (defaults to ~/.config/contrail-meter/config.toml)
    #[arg(long, env = "CONTRAIL_METER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll a meter once
    Poll {
        /// Meter name (e.g. ip.floating.receive.bytes)
        meter: String,

        /// Resource URLs, e.g. contrail://analytics:8081/ or
        /// opencontrail://analytics:8081/?resource=if_stats_list
        #[arg(required = true)]
        resources: Vec<String>,

        /// Token sent to the analytics API and Neutron
        #[arg(long, env = "OS_AUTH_TOKEN")]
        auth_token: Option<String>,

        /// Neutron endpoint URL
        #[arg(long, env = "NEUTRON_URL")]
        directory_url: Option<String>,

        /// Dump analytics HTTP requests and responses
        #[arg(long)]
        debug_http: bool,

        /// Print Prometheus metrics after polling
        #[arg(long)]
        show_metrics: bool,
    },

    /// List the available meters
    Meters,
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose
        || matches!(
            cli.command,
            Commands::Poll {
                debug_http: true,
                ..
            }
        );
    init_tracing(verbose, cli.json_logs);

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Poll {
            meter,
            resources,
            auth_token,
            directory_url,
            debug_http,
            show_metrics,
        } => {
            let config = config::load(
                cli.config.as_deref(),
                config::Overrides {
                    auth_token,
                    directory_url,
                    debug_http,
                },
            )?;
            poll::poll_meter(&config, &meter, &resources, show_metrics, cli.format).await?;
        }
        Commands::Meters => {
            meters::list_meters(cli.format)?;
        }
    }

    Ok(())
}

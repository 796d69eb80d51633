//! vperf - virtualization performance telemetry CLI
//!
//! A command-line companion to the exporter for inspecting the remote
//! endpoint: counter catalogs, inventory entities, available instances,
//! sampling intervals, and one-off performance queries.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, counters, entities, perf};
use vperf_lib::SessionConfig;

/// Virtualization performance telemetry CLI
#[derive(Parser)]
#[command(name = "vperf")]
#[command(author, version, about = "Inspect performance telemetry endpoints", long_about = None)]
pub struct Cli {
    /// Endpoint URL of the virtualization management API
    #[arg(long, env = "VPERF_URL")]
    pub url: String,

    /// Login username
    #[arg(long, env = "VPERF_USERNAME")]
    pub user: String,

    /// Login password
    #[arg(long, env = "VPERF_PASSWORD")]
    pub password: String,

    /// Skip certificate verification on the endpoint
    #[arg(long, env = "VPERF_INSECURE")]
    pub no_verify_ssl: bool,

    /// Per-call timeout for remote operations in seconds
    #[arg(long, env = "VPERF_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout: u64,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the effective scrape-selection configuration
    Config {
        /// Path to a scrape-selection YAML file (defaults otherwise)
        #[arg(long, short)]
        file: Option<String>,
    },

    /// List the endpoint's performance counter catalog
    Counters,

    /// List discoverable inventory entities
    Entities {
        /// Entity types to resolve (repeatable; defaults to HostSystem
        /// and VirtualMachine)
        #[arg(long = "entity-type", short = 't')]
        entity_types: Vec<String>,

        /// Treat the entity with this exact name as the root and list
        /// everything beneath it
        #[arg(long = "entity-name", short = 'n')]
        entity_name: Option<String>,
    },

    /// List available counter instances per entity
    Instances {
        /// Entity types to enumerate (repeatable)
        #[arg(long = "entity-type", short = 't')]
        entity_types: Vec<String>,
    },

    /// Show sampling intervals supported by one entity
    Intervals {
        /// Entity type
        #[arg(long = "entity-type", short = 't')]
        entity_type: String,

        /// Entity identifier
        #[arg(long = "entity-id", short = 'i')]
        entity_id: String,
    },

    /// Query one counter on one entity
    Perf {
        /// Entity type
        #[arg(long = "entity-type", short = 't')]
        entity_type: String,

        /// Entity identifier
        #[arg(long = "entity-id", short = 'i')]
        entity_id: String,

        /// Counter id from the catalog
        #[arg(long)]
        counter: i32,

        /// Interval id to query at
        #[arg(long)]
        interval: i32,
    },
}

impl Cli {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            url: self.url.clone(),
            username: self.user.clone(),
            password: self.password.clone(),
            insecure: self.no_verify_ssl,
            timeout_secs: self.timeout,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let session_config = cli.session_config();

    match &cli.command {
        Commands::Config { file } => {
            config::show_config(file.as_deref(), cli.format)?;
        }
        Commands::Counters => {
            counters::list_counters(&session_config, cli.format).await?;
        }
        Commands::Entities {
            entity_types,
            entity_name,
        } => {
            entities::list_entities(
                &session_config,
                entity_types,
                entity_name.as_deref(),
                cli.format,
            )
            .await?;
        }
        Commands::Instances { entity_types } => {
            entities::list_instances(&session_config, entity_types, cli.format).await?;
        }
        Commands::Intervals {
            entity_type,
            entity_id,
        } => {
            perf::show_intervals(&session_config, entity_type, entity_id, cli.format).await?;
        }
        Commands::Perf {
            entity_type,
            entity_id,
            counter,
            interval,
        } => {
            perf::query_perf(
                &session_config,
                entity_type,
                entity_id,
                *counter,
                *interval,
                cli.format,
            )
            .await?;
        }
    }

    Ok(())
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use octoblox::{
    config::ProviderConfig, provider::InfobloxProvider, records::Change, records::Zone, zone_id,
};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "octoblox", version, about = "Reconcile DNS records against an Infoblox grid")]
struct Cli {
    /// Provider configuration file (YAML)
    #[arg(short = 'c', long, value_name = "FILE", env = "OCTOBLOX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a zone from the grid and print its records
    Dump {
        #[arg(short, long)]
        zone: String,
        /// Read as current state (flags drifted ALIAS records)
        #[arg(long)]
        target: bool,
        /// Relax record validation
        #[arg(long)]
        lenient: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
    /// Apply planned changes from a YAML or JSON file
    Apply {
        #[arg(short, long)]
        zone: String,
        #[arg(long, value_name = "FILE")]
        changes: PathBuf,
    },
    /// Print the WAPI identifier of a zone name
    ZoneId { zone: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("octoblox")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Respects RUST_LOG (default: info) and RUST_LOG_FORMAT (json or text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact()
                .init();
        }
    }

    let cli = Cli::parse();
    debug!(command = ?cli.command, "Parsed command line");

    match cli.command {
        Command::ZoneId { zone } => {
            let resolved = zone_id::resolve(&zone)?;
            println!("{}", resolved.identifier);
        }
        Command::Dump {
            zone,
            target,
            lenient,
            format,
        } => {
            let provider = connect(cli.config).await?;
            let mut zone = Zone::new(&zone);
            let exists = provider.populate(&mut zone, target, lenient).await?;
            if !exists {
                anyhow::bail!("Zone {} does not exist in Infoblox", zone.name);
            }
            let output = match format {
                OutputFormat::Yaml => serde_yaml::to_string(&zone)?,
                OutputFormat::Json => serde_json::to_string_pretty(&zone)?,
            };
            println!("{output}");
        }
        Command::Apply { zone, changes } => {
            let text = std::fs::read_to_string(&changes)
                .with_context(|| format!("Failed to read {}", changes.display()))?;
            let planned: Vec<Change> = serde_yaml::from_str(&text)
                .with_context(|| format!("Failed to parse changes in {}", changes.display()))?;

            let provider = connect(cli.config).await?;
            let applied = provider.apply(&zone, &planned).await?;
            info!(zone = %zone, applied = applied, "Done");
        }
    }

    Ok(())
}

async fn connect(config: Option<PathBuf>) -> Result<InfobloxProvider> {
    let path = config.context("--config is required for this command")?;
    let config = ProviderConfig::load(&path)?;
    let provider = InfobloxProvider::connect("infoblox", config)
        .await
        .context("Failed to initialize Infoblox provider")?;
    Ok(provider)
}

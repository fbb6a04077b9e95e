//! kafka-init - Main entry point
//!
//! Runs once per container start: resolves the configuration, reads the
//! node and secrets it needs, writes the enabled files and exits non-zero
//! if any enabled file could not be produced.

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kafka_init::cli::{Cli, Commands};
use kafka_init::config::describe_parameters;
use kafka_init::{ClusterClient, FileEmitter, InitConfig, InitWriter};

/// Initialize the logger; `RUST_LOG` overrides the default `info` level
fn init_logger() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logger();
    let cli = Cli::parse_args();
    info!(version = env!("CARGO_PKG_VERSION"), "Init-kafka is starting");

    if cli.command() == Commands::Params {
        print!("{}", describe_parameters());
        return Ok(());
    }

    let config = InitConfig::from_env().context("Failed to resolve configuration")?;

    if cli.command() == Commands::Validate {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!(config = %config, "Init-kafka started");

    let client = ClusterClient::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let emitter = FileEmitter::new(&config.init_folder).dry_run(cli.dry_run);
    let writer = InitWriter::new(&config, emitter);

    if !writer.run(&client).await {
        error!("One or more init files could not be produced");
        std::process::exit(1);
    }

    info!("Init-kafka finished");
    Ok(())
}

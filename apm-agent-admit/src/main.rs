use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn, Level};

use apm_agent_admit::{
    config::{Config, ConfigTable},
    server::webhook_task,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "apm-agent-admit")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// The path to the TLS certificate.
    #[arg(long, default_value = "/opt/webhook/certs/cert.pem")]
    cert_file: PathBuf,
    /// The path to the TLS key.
    #[arg(long, default_value = "/opt/webhook/certs/key.pem")]
    key_file: PathBuf,
    #[arg(short, long, default_value = "/opt/webhook/config/webhook.yaml")]
    /// Path to the agent configuration file.
    config: PathBuf,
    /// The port to listen on.
    #[arg(short, long, default_value = "8443")]
    port: u16,
    /// Maximum log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse the CLI arguments
    let args = Args::try_parse()?;

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Parsed CLI arguments: {:?}", args);

    // The table is read by every request and never reloaded.
    let config = Config::from_file(&args.config).context("Failed to load configuration file")?;
    let table = Arc::new(ConfigTable::from(config));

    if table.is_empty() {
        warn!("No agents configured, every pod will pass through unmodified");
    }

    info!(
        "Loaded {} agent configuration(s): {:?}",
        table.len(),
        table.agent_names().collect::<Vec<_>>()
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    webhook_task(&args.cert_file, &args.key_file, addr, table).await;

    info!("Exiting admission server");

    Ok(())
}

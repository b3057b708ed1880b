//! MCP Agent - demo client for the message coordination hub
//!
//! Registers with the hub, then sends heartbeats, sensor data and status
//! commands until the configured duration has elapsed.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mcp_agent::cli::Cli;
use mcp_agent::config::AgentConfig;
use mcp_agent::demo::run_demo;
use mcp_agent::ClientSession;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .init();

    let config = AgentConfig::load(cli.config.as_deref())
        .await
        .context("Failed to load agent configuration")?;
    let config = cli.apply_to(config);

    info!(server = %config.server_url, "Starting MCP Client Demo");

    let mut session = ClientSession::from_config(&config);
    match run_demo(&mut session, config.demo.duration(), config.demo.interval()).await {
        Ok(report) => {
            info!(
                iterations = report.iterations,
                failed_sends = report.failed_sends,
                "Demo finished"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Demo aborted. Exiting.");
            std::process::exit(1);
        }
    }
}

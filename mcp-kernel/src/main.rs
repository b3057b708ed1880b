/**
 * MCP KERNEL - Point d'entrée du hub de coordination
 *
 * RÔLE : Charge la config (.env + kernel.yaml + env), initialise le logging,
 * crée le hub, démarre le monitoring optionnel et sert l'API HTTP.
 */

use std::time::Duration;

use anyhow::Context;
use mcp_kernel::config::load_config;
use mcp_kernel::http::{self, AppState};
use mcp_kernel::CoordinationHub;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    let cfg = load_config().await;

    let default_level = if cfg.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let hub = CoordinationHub::new();

    if cfg.inactive_after_secs > 0 {
        let inactive_after = Duration::from_secs(cfg.inactive_after_secs);
        let check_every = Duration::from_secs(cfg.inactive_after_secs.clamp(1, 60));
        CoordinationHub::start_status_monitoring(hub.clone(), inactive_after, check_every);
    }

    let listener = TcpListener::bind(cfg.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr()))?;
    info!(addr = %listener.local_addr()?, debug = cfg.debug, "listening");

    http::serve(listener, AppState::new(hub))
        .await
        .context("HTTP server failed")?;
    Ok(())
}

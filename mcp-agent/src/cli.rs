//! CLI argument parsing using clap v4

use std::path::PathBuf;

use clap::Parser;

use crate::config::AgentConfig;

/// MCP client demo - registers with the hub and streams sample messages
#[derive(Parser, Debug)]
#[command(name = "mcp-agent")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// MCP server URL (default: http://localhost:5000)
    #[arg(short, long, env = "MCP_SERVER_URL")]
    pub server: Option<String>,

    /// Demo duration in seconds (default: 60)
    #[arg(short, long)]
    pub duration: Option<u64>,

    /// Interval between messages in seconds (default: 5)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Path to configuration file
    #[arg(short, long, env = "MCP_AGENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Client id to register with (random UUID when omitted)
    #[arg(long)]
    pub client_id: Option<String>,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// CLI flags win over the config file
    pub fn apply_to(&self, mut config: AgentConfig) -> AgentConfig {
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(duration) = self.duration {
            config.demo.duration_secs = duration;
        }
        if let Some(interval) = self.interval {
            config.demo.interval_secs = interval;
        }
        if let Some(client_id) = &self.client_id {
            config.client_id = Some(client_id.clone());
        }
        config
    }

    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

//! MCP Agent - client side of the message coordination hub
//!
//! - [`session::ClientSession`]: register / send with ensure-registered fallback
//! - [`demo::run_demo`]: fixed-interval demo driver
//! - [`config::AgentConfig`]: TOML config, overridden by [`cli::Cli`]

pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod session;

pub use error::SessionError;
pub use session::ClientSession;

//! MCP kernel - hub de coordination de messages
//!
//! Registre des clients, historique append-only et dispatch typé des messages,
//! exposés en HTTP par `http::build_router`.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod http;
pub mod hub;
pub mod models;
pub mod state;

pub use error::HubError;
pub use hub::{CoordinationHub, BROADCAST};
pub use models::{Acknowledgment, ClientRecord, ClientStatus, Envelope, Message, MessageType};

use serde::{Deserialize, Serialize};
use serde::ser::SerializeMap;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: String,
    pub status: ClientStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub last_seen: OffsetDateTime,
    pub capabilities: BTreeSet<String>,
}

/// Type de message : heartbeat, data, command, ou n'importe quelle autre chaîne
/// (le protocole reste ouvert aux types inconnus)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    Heartbeat,
    Data,
    Command,
    Other(String),
}

impl MessageType {
    pub fn as_str(&self) -> &str {
        match self {
            MessageType::Heartbeat => "heartbeat",
            MessageType::Data => "data",
            MessageType::Command => "command",
            MessageType::Other(other) => other,
        }
    }
}

impl From<String> for MessageType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "heartbeat" => MessageType::Heartbeat,
            "data" => MessageType::Data,
            "command" => MessageType::Command,
            _ => MessageType::Other(value),
        }
    }
}

impl From<&str> for MessageType {
    fn from(value: &str) -> Self {
        MessageType::from(value.to_string())
    }
}

impl From<MessageType> for String {
    fn from(value: MessageType) -> Self {
        match value {
            MessageType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message stocké dans l'historique. Immuable une fois créé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub sender: String,
    pub recipient: String,
    pub message_type: MessageType,
    pub content: serde_json::Value,
}

// Enveloppe entrante (POST /api/message) - sender et message_type sont validés par le hub
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    pub sender: Option<String>,
    #[serde(alias = "messageType")]
    pub message_type: Option<MessageType>,
    pub recipient: Option<String>,
    pub content: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(alias = "clientId")]
    pub client_id: Option<String>,
    pub capabilities: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub command_id: String,
    pub status: &'static str,
    pub result: &'static str,
}

/// Accusé de réception renvoyé par le hub, un par type de message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgment {
    Heartbeat,
    Data,
    Command(CommandResult),
    Received,
}

impl Acknowledgment {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Acknowledgment::Heartbeat => Some("Heartbeat acknowledged"),
            Acknowledgment::Data => Some("Data received and processed"),
            Acknowledgment::Command(_) => None,
            Acknowledgment::Received => Some("Message received"),
        }
    }

    pub fn command_result(&self) -> Option<&CommandResult> {
        match self {
            Acknowledgment::Command(result) => Some(result),
            _ => None,
        }
    }
}

impl Serialize for Acknowledgment {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("status", "success")?;
        match self {
            Acknowledgment::Command(result) => map.serialize_entry("result", result)?,
            other => map.serialize_entry("message", &other.message())?,
        }
        map.end()
    }
}

pub type ClientsMap = BTreeMap<String, ClientRecord>;

//! Client session with the coordination hub
//!
//! One participant's local view: identity, declared capabilities and whether
//! the hub has acknowledged its registration. Sends go through
//! [`ClientSession::send_message`], which registers first when needed. That
//! single ensure-registered step is the only fallback: no retry loop, no backoff.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::AgentConfig;
use crate::error::{Result, SessionError};

const REGISTER_PATH: &str = "/api/register";
const MESSAGE_PATH: &str = "/api/message";

/// Registration request (matches the hub's register endpoint)
#[derive(Debug, Serialize)]
struct RegistrationRequest<'a> {
    client_id: &'a str,
    capabilities: &'a [String],
}

/// Registration acknowledgment returned by the hub
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationAck {
    pub status: String,
    pub client_id: String,
    pub message: String,
}

/// Outgoing message envelope
#[derive(Debug, Serialize)]
struct OutgoingEnvelope<'a> {
    sender: &'a str,
    message_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<Value>,
}

pub struct ClientSession {
    server_url: String,
    client_id: String,
    capabilities: Vec<String>,
    registered: bool,
    timeout: Duration,
    http: reqwest::Client,
}

impl ClientSession {
    pub fn new(
        server_url: impl Into<String>,
        client_id: Option<String>,
        capabilities: Option<Vec<String>>,
    ) -> Self {
        let client_id = client_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let capabilities = capabilities
            .unwrap_or_else(|| vec!["messaging".to_string(), "heartbeat".to_string()]);

        info!(client_id = %client_id, "Initializing MCP client session");

        let mut session = Self {
            server_url: server_url.into().trim_end_matches('/').to_string(),
            client_id,
            capabilities,
            registered: false,
            timeout: Duration::ZERO,
            http: reqwest::Client::new(),
        };
        session.set_timeout(Duration::from_secs(10));
        session
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(
            config.server_url.clone(),
            config.client_id.clone(),
            Some(config.capabilities.clone()),
        )
        .with_timeout(config.request_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.set_timeout(timeout);
        self
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
        self.http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Register with the hub. Failure leaves the session unregistered;
    /// retrying is the caller's call.
    pub async fn register(&mut self) -> Result<RegistrationAck> {
        let request = RegistrationRequest {
            client_id: &self.client_id,
            capabilities: &self.capabilities,
        };

        let outcome = match self.post_json(REGISTER_PATH, &request).await {
            Ok(resp) => resp.json::<RegistrationAck>().await.map_err(|e| SessionError::Decode {
                endpoint: REGISTER_PATH.to_string(),
                message: e.to_string(),
            }),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(ack) => {
                self.registered = true;
                info!(client_id = %ack.client_id, "Client registered successfully");
                Ok(ack)
            }
            Err(e) => {
                self.registered = false;
                if e.is_timeout() {
                    error!(client_id = %self.client_id, "Timeout while registering client");
                } else {
                    error!(client_id = %self.client_id, error = %e, "Failed to register client");
                }
                Err(e)
            }
        }
    }

    /// Send one message, registering first if needed. Returns the hub's acknowledgment.
    pub async fn send_message(
        &mut self,
        message_type: &str,
        content: Option<Value>,
        recipient: Option<&str>,
    ) -> Result<Value> {
        if !self.registered {
            warn!("Client not registered. Attempting to register...");
            self.register().await?;
        }

        let envelope = OutgoingEnvelope {
            sender: &self.client_id,
            message_type,
            recipient: recipient.filter(|r| !r.is_empty()),
            content: content.filter(|c| !is_empty_payload(c)),
        };

        let outcome = match self.post_json(MESSAGE_PATH, &envelope).await {
            Ok(resp) => resp.json::<Value>().await.map_err(|e| SessionError::Decode {
                endpoint: MESSAGE_PATH.to_string(),
                message: e.to_string(),
            }),
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(ack) => {
                info!(message_type, "Message sent successfully");
                debug!(response = %ack, "Hub acknowledgment");
            }
            Err(e) if e.is_timeout() => {
                error!(message_type, "Timeout while sending message");
            }
            Err(e) => {
                error!(message_type, error = %e, "Failed to send message");
            }
        }
        outcome
    }

    pub async fn send_heartbeat(&mut self) -> Result<Value> {
        let content = serde_json::json!({
            "status": "active",
            "timestamp": Utc::now().to_rfc3339(),
        });
        self.send_message("heartbeat", Some(content), None).await
    }

    pub async fn send_data(&mut self, payload: Value, recipient: Option<&str>) -> Result<Value> {
        self.send_message("data", Some(payload), recipient).await
    }

    pub async fn send_command(
        &mut self,
        command: &str,
        params: Option<Value>,
        recipient: Option<&str>,
    ) -> Result<Value> {
        self.send_message("command", Some(command_content(command, params)), recipient)
            .await
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.server_url, path);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| SessionError::from_reqwest(path, self.timeout.as_secs(), e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SessionError::Rejected {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

fn command_content(command: &str, params: Option<Value>) -> Value {
    let mut content = serde_json::json!({ "command": command });
    if let Some(params) = params.filter(|p| !is_empty_payload(p)) {
        content["params"] = params;
    }
    content
}

/// null, {}, [] and "" are sent as "no content"
fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_session_defaults() {
        let session = ClientSession::new("http://localhost:5000/", None, None);
        assert!(Uuid::parse_str(session.client_id()).is_ok());
        assert_eq!(session.capabilities(), ["messaging", "heartbeat"]);
        assert_eq!(session.server_url(), "http://localhost:5000");
        assert!(!session.is_registered());
    }

    #[test]
    fn test_from_config_uses_identity() {
        let config = AgentConfig {
            client_id: Some("sensor-7".into()),
            capabilities: vec!["telemetry".into()],
            ..Default::default()
        };
        let session = ClientSession::from_config(&config);
        assert_eq!(session.client_id(), "sensor-7");
        assert_eq!(session.capabilities(), ["telemetry"]);
    }

    #[test]
    fn test_command_content_shape() {
        assert_eq!(command_content("reboot", None), json!({"command": "reboot"}));
        assert_eq!(command_content("reboot", Some(json!({}))), json!({"command": "reboot"}));
        assert_eq!(
            command_content("check_status", Some(json!({"verbose": true}))),
            json!({"command": "check_status", "params": {"verbose": true}})
        );
    }

    #[test]
    fn test_envelope_omits_empty_fields() {
        let envelope = OutgoingEnvelope {
            sender: "client-1",
            message_type: "data",
            recipient: None,
            content: Some(json!({})).filter(|c| !is_empty_payload(c)),
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"sender": "client-1", "message_type": "data"})
        );
    }

    #[test]
    fn test_empty_payloads() {
        assert!(is_empty_payload(&Value::Null));
        assert!(is_empty_payload(&json!({})));
        assert!(is_empty_payload(&json!([])));
        assert!(is_empty_payload(&json!("")));
        assert!(!is_empty_payload(&json!({"a": 1})));
        assert!(!is_empty_payload(&json!(0)));
    }
}

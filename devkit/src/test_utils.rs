/*!
Test Harness pour le hub MCP

Facilite l'écriture de tests client/serveur avec:
- Un hub réel servi sur un port éphémère (127.0.0.1:0)
- Des endpoints qui simulent les pannes transport (connexion refusée, serveur muet)
- Des assertions sur le registre et l'historique
*/

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use mcp_kernel::http::{self, AppState};
use mcp_kernel::{ClientStatus, CoordinationHub, Message};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Hub réel servi en tâche de fond, arrêté au drop
pub struct TestHarness {
    hub: CoordinationHub,
    addr: SocketAddr,
    http: reqwest::Client,
    server: JoinHandle<()>,
}

impl TestHarness {
    /// Démarre un hub neuf sur un port éphémère
    pub async fn start() -> Result<Self> {
        init_test_logging();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;
        let hub = CoordinationHub::new();
        let state = AppState::new(hub.clone());

        let server = tokio::spawn(async move {
            if let Err(e) = http::serve(listener, state).await {
                tracing::error!(error = %e, "test hub stopped");
            }
        });
        tracing::info!(%addr, "test hub started");

        Ok(Self {
            hub,
            addr,
            http: reqwest::Client::new(),
            server,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Accès direct au hub (mêmes données que celles servies en HTTP)
    pub fn hub(&self) -> &CoordinationHub {
        &self.hub
    }

    pub fn messages(&self) -> Vec<Message> {
        self.hub.list_messages()
    }

    /// Poste une enveloppe brute, retourne (status HTTP, corps JSON)
    pub async fn post_envelope(&self, envelope: &Value) -> Result<(u16, Value)> {
        let resp = self
            .http
            .post(format!("{}/api/message", self.base_url()))
            .json(envelope)
            .send()
            .await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    /// Types des messages de l'historique, en ordre d'arrivée
    pub fn message_types(&self) -> Vec<String> {
        self.messages()
            .iter()
            .map(|m| m.message_type.to_string())
            .collect()
    }

    pub fn assert_message_count(&self, expected: usize) -> Result<()> {
        let actual = self.hub.message_count();
        if actual != expected {
            anyhow::bail!("expected {} messages in history, got {}", expected, actual);
        }
        Ok(())
    }

    pub fn assert_client_active(&self, client_id: &str) -> Result<()> {
        match self.hub.get_client(client_id) {
            Some(record) if record.status == ClientStatus::Active => Ok(()),
            Some(record) => anyhow::bail!("client '{}' is {:?}", client_id, record.status),
            None => anyhow::bail!("client '{}' not registered", client_id),
        }
    }

    /// Valeur d'un champ imbriqué (ex: "content.command") du message n°`index`
    pub fn message_field(&self, index: usize, field_path: &str) -> Option<Value> {
        let message = self.messages().into_iter().nth(index)?;
        let value = serde_json::to_value(message).ok()?;
        get_nested_field(&value, field_path).cloned()
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// URL sur laquelle rien n'écoute : connexion refusée
pub async fn dead_endpoint() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

/// Serveur qui accepte les connexions mais ne répond jamais (pour tester les timeouts)
pub struct SilentEndpoint {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl SilentEndpoint {
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let task = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                // on garde la socket ouverte sans jamais répondre
                held.push(stream);
            }
        });

        Ok(Self { addr, task })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for SilentEndpoint {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Attend qu'une condition sur le hub devienne vraie
pub async fn wait_until<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    while start.elapsed() < Duration::from_millis(timeout_ms) {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

fn get_nested_field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(obj) => current = obj.get(part)?,
            _ => return None,
        }
    }
    Some(current)
}

fn init_test_logging() {
    // plusieurs harness par binaire de test : seul le premier init compte
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

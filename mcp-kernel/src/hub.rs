/**
 * COORDINATION HUB - Registre des clients + historique des messages
 *
 * RÔLE : Registration idempotente des clients, validation et dispatch des enveloppes,
 * tenue du last_seen et de l'historique append-only.
 *
 * ARCHITECTURE : Deux ressources partagées indépendantes (registre, historique),
 * chacune derrière son propre RwLock. Jamais les deux verrous tenus en même temps.
 * UTILITÉ : Cœur du protocole MCP, appelé par la couche HTTP et directement par les tests.
 */

use std::collections::BTreeSet;
use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::HubError;
use crate::models::{
    Acknowledgment, ClientRecord, ClientStatus, ClientsMap, CommandResult, Envelope, Message,
    MessageType,
};
use crate::state::{new_state, Shared};

/// Destinataire par défaut : aucun client ciblé
pub const BROADCAST: &str = "broadcast";

#[derive(Clone, Default)]
pub struct CoordinationHub {
    clients: Shared<ClientsMap>,
    history: Shared<Vec<Message>>,
}

impl CoordinationHub {
    pub fn new() -> Self {
        Self {
            clients: new_state(ClientsMap::new()),
            history: new_state(Vec::new()),
        }
    }

    /// Upsert d'un client. Un id absent ou vide est remplacé par un UUID v4.
    /// Retourne l'id effectif.
    pub fn register<I>(&self, client_id: Option<String>, capabilities: I) -> String
    where
        I: IntoIterator<Item = String>,
    {
        let client_id = client_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let capabilities: BTreeSet<String> = capabilities.into_iter().collect();

        let created = {
            let mut clients = self.clients.write();
            let now = OffsetDateTime::now_utc();
            match clients.get_mut(&client_id) {
                Some(record) => {
                    record.capabilities = capabilities;
                    record.last_seen = record.last_seen.max(now);
                    record.status = ClientStatus::Active;
                    false
                }
                None => {
                    clients.insert(
                        client_id.clone(),
                        ClientRecord {
                            id: client_id.clone(),
                            status: ClientStatus::Active,
                            last_seen: now,
                            capabilities,
                        },
                    );
                    true
                }
            }
        };

        info!(client_id = %client_id, created, "client registered");
        client_id
    }

    /// Valide l'enveloppe, l'ajoute à l'historique et produit l'accusé de réception.
    /// Une enveloppe invalide n'a aucun effet de bord.
    pub fn dispatch(&self, envelope: Envelope) -> Result<Acknowledgment, HubError> {
        let sender = envelope.sender.ok_or(HubError::MissingField("sender"))?;
        let message_type = envelope
            .message_type
            .ok_or(HubError::MissingField("message_type"))?;

        let recipient = envelope.recipient.unwrap_or_else(|| BROADCAST.to_string());
        let content = match envelope.content {
            Some(serde_json::Value::Null) | None => serde_json::json!({}),
            Some(content) => content,
        };

        // horodatage pris sous le verrou : l'ordre d'arrivée suit l'ordre des timestamps
        let message = {
            let mut history = self.history.write();
            let now = OffsetDateTime::now_utc();
            let message = Message {
                id: Uuid::new_v4().to_string(),
                timestamp: history.last().map_or(now, |last| last.timestamp.max(now)),
                sender,
                recipient,
                message_type,
                content,
            };
            history.push(message.clone());
            message
        };

        if !self.touch(&message.sender, message.timestamp) {
            warn!(sender = %message.sender, message_id = %message.id, "message from unregistered sender");
        }

        let ack = acknowledge(&message);
        info!(
            message_id = %message.id,
            message_type = %message.message_type,
            sender = %message.sender,
            recipient = %message.recipient,
            "message received"
        );

        Ok(ack)
    }

    /// Rafraîchit last_seen/status d'un client connu. false si le sender est inconnu.
    fn touch(&self, client_id: &str, seen_at: OffsetDateTime) -> bool {
        let mut clients = self.clients.write();
        match clients.get_mut(client_id) {
            Some(record) => {
                record.last_seen = record.last_seen.max(seen_at);
                record.status = ClientStatus::Active;
                true
            }
            None => false,
        }
    }

    /// Snapshot du registre
    pub fn list_clients(&self) -> ClientsMap {
        self.clients.read().clone()
    }

    /// Snapshot de l'historique, en ordre d'arrivée
    pub fn list_messages(&self) -> Vec<Message> {
        self.history.read().clone()
    }

    pub fn get_client(&self, client_id: &str) -> Option<ClientRecord> {
        self.clients.read().get(client_id).cloned()
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    pub fn active_client_count(&self) -> usize {
        self.clients
            .read()
            .values()
            .filter(|c| c.status == ClientStatus::Active)
            .count()
    }

    pub fn message_count(&self) -> usize {
        self.history.read().len()
    }

    /// Marque inactive les clients dont le last_seen est antérieur à `cutoff`.
    /// Les enregistrements ne sont jamais supprimés.
    pub fn mark_inactive_before(&self, cutoff: OffsetDateTime) -> Vec<String> {
        let mut clients = self.clients.write();
        let mut marked = Vec::new();
        for (client_id, record) in clients.iter_mut() {
            if record.status == ClientStatus::Active && record.last_seen < cutoff {
                record.status = ClientStatus::Inactive;
                marked.push(client_id.clone());
            }
        }
        marked
    }

    /// Surveille périodiquement les clients et marque inactifs ceux silencieux depuis `inactive_after`
    pub fn start_status_monitoring(hub: CoordinationHub, inactive_after: Duration, check_every: Duration) {
        info!(
            inactive_after_secs = inactive_after.as_secs(),
            "starting client status monitoring"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(check_every);

            loop {
                interval.tick().await;

                let cutoff = OffsetDateTime::now_utc() - inactive_after;
                for client_id in hub.mark_inactive_before(cutoff) {
                    info!(client_id = %client_id, "client marked inactive");
                }
            }
        });
    }
}

fn acknowledge(message: &Message) -> Acknowledgment {
    match &message.message_type {
        MessageType::Heartbeat => Acknowledgment::Heartbeat,
        MessageType::Data => {
            info!(message_id = %message.id, content = %message.content, "data message");
            Acknowledgment::Data
        }
        MessageType::Command => {
            // exécution simulée : rien n'est lancé
            info!(message_id = %message.id, content = %message.content, "command message");
            Acknowledgment::Command(CommandResult {
                command_id: message.id.clone(),
                status: "executed",
                result: "Command executed successfully",
            })
        }
        MessageType::Other(other) => {
            debug!(message_type = %other, "unknown message type, default acknowledgment");
            Acknowledgment::Received
        }
    }
}

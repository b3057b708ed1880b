/*!
Construction d'enveloppes MCP pour les tests

Builder fluide sur un payload JSON brut : permet aussi de construire des
enveloppes invalides (champ requis absent) pour tester la validation du hub.
*/

use serde_json::{Map, Value};

#[derive(Debug, Clone, Default)]
pub struct EnvelopeBuilder {
    payload: Map<String, Value>,
}

impl EnvelopeBuilder {
    /// Enveloppe vide (ni sender ni message_type)
    pub fn new() -> Self {
        Self::default()
    }

    /// Enveloppe valide minimale
    pub fn message<S: Into<String>, T: Into<String>>(sender: S, message_type: T) -> Self {
        Self::new()
            .set_string("sender", sender)
            .set_string("message_type", message_type)
    }

    pub fn heartbeat<S: Into<String>>(sender: S) -> Self {
        Self::message(sender, "heartbeat").content(serde_json::json!({"status": "active"}))
    }

    pub fn data<S: Into<String>>(sender: S, payload: Value) -> Self {
        Self::message(sender, "data").content(payload)
    }

    pub fn command<S: Into<String>>(sender: S, command: &str) -> Self {
        Self::message(sender, "command").content(serde_json::json!({ "command": command }))
    }

    /// Définit un champ de l'enveloppe
    pub fn set_field<S: Into<String>>(mut self, field: S, value: Value) -> Self {
        self.payload.insert(field.into(), value);
        self
    }

    pub fn set_string<S: Into<String>, V: Into<String>>(self, field: S, value: V) -> Self {
        self.set_field(field, Value::String(value.into()))
    }

    /// Retire un champ (pour tester la validation)
    pub fn without(mut self, field: &str) -> Self {
        self.payload.remove(field);
        self
    }

    pub fn recipient<S: Into<String>>(self, recipient: S) -> Self {
        self.set_string("recipient", recipient)
    }

    pub fn content(self, content: Value) -> Self {
        self.set_field("content", content)
    }

    /// Ajoute content.timestamp (format ISO)
    pub fn with_timestamp(mut self) -> Self {
        let ts = Value::String(chrono::Utc::now().to_rfc3339());
        match self.payload.get_mut("content") {
            Some(Value::Object(content)) => {
                content.insert("timestamp".into(), ts);
            }
            _ => {
                self.payload.insert("content".into(), serde_json::json!({ "timestamp": ts }));
            }
        }
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.payload)
    }
}

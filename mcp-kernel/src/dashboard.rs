/**
 * DASHBOARD - Vue HTML lecture seule du registre et de l'historique
 *
 * Rendu pur à partir des deux snapshots (clients, messages) via un gabarit askama,
 * auto-refresh 5s.
 * Aucune logique métier ici.
 */

use askama::Template;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::models::{ClientStatus, ClientsMap, Message};

/// Gabarit `templates/dashboard.html`, échappement HTML assuré par askama
#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate<'a> {
    clients: Vec<ClientRow<'a>>,
    messages: Vec<MessageRow<'a>>,
}

struct ClientRow<'a> {
    id: &'a str,
    last_seen: String,
    status: &'static str,
}

struct MessageRow<'a> {
    time: String,
    sender: &'a str,
    recipient: &'a str,
    message_type: &'a str,
    content: String,
}

pub fn render(clients: &ClientsMap, messages: &[Message]) -> askama::Result<String> {
    let page = DashboardTemplate {
        clients: clients
            .iter()
            .map(|(client_id, client)| ClientRow {
                id: client_id,
                last_seen: format_ts(client.last_seen),
                status: match client.status {
                    ClientStatus::Active => "active",
                    ClientStatus::Inactive => "inactive",
                },
            })
            .collect(),
        messages: messages
            .iter()
            .map(|msg| MessageRow {
                time: format_ts(msg.timestamp),
                sender: &msg.sender,
                recipient: &msg.recipient,
                message_type: msg.message_type.as_str(),
                content: msg.content.to_string(),
            })
            .collect(),
    };
    page.render()
}

fn format_ts(ts: OffsetDateTime) -> String {
    ts.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::CoordinationHub;
    use crate::models::{Envelope, MessageType};

    #[test]
    fn test_render_lists_clients_and_messages() {
        let hub = CoordinationHub::new();
        hub.register(Some("client-1".into()), Vec::new());
        hub.dispatch(Envelope {
            sender: Some("client-1".into()),
            message_type: Some(MessageType::Data),
            content: Some(serde_json::json!({"temperature": 22})),
            ..Default::default()
        })
        .unwrap();

        let html = render(&hub.list_clients(), &hub.list_messages()).unwrap();
        assert!(html.contains("Active Clients (1)"));
        assert!(html.contains("Client: client-1"));
        assert!(html.contains("Status: active"));
        assert!(html.contains("Message History (1)"));
        assert!(html.contains("<td>broadcast</td>"));
        assert!(html.contains("temperature"));
    }

    #[test]
    fn test_render_escapes_user_input() {
        let hub = CoordinationHub::new();
        hub.dispatch(Envelope {
            sender: Some("<script>alert(1)</script>".into()),
            message_type: Some(MessageType::Data),
            ..Default::default()
        })
        .unwrap();

        let html = render(&hub.list_clients(), &hub.list_messages()).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_timestamp_format() {
        let ts = time::macros::datetime!(2024-03-05 07:08:09 UTC);
        assert_eq!(format_ts(ts), "2024-03-05 07:08:09");
    }
}

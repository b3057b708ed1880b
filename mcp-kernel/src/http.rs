/**
 * API REST MCP - Serveur HTTP du hub
 *
 * RÔLE :
 * Binding HTTP du CoordinationHub. Aucune logique métier ici : chaque handler
 * décode la requête, appelle le hub, sérialise la réponse.
 *
 * ROUTES :
 * - POST /api/register   : registration (upsert) d'un client
 * - POST /api/message    : dispatch d'une enveloppe (400 si champ requis manquant)
 * - GET  /api/clients    : snapshot du registre
 * - GET  /api/messages   : historique complet en ordre d'arrivée
 * - GET  /api/health     : compteurs + uptime
 * - GET  /health         : liveness
 * - GET  /               : dashboard HTML
 *
 * Les corps JSON invalides donnent un 400 structuré, jamais un crash.
 */

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::HubError;
use crate::health::{HealthTracker, KernelHealth};
use crate::hub::CoordinationHub;
use crate::models::{Acknowledgment, ClientsMap, Envelope, Message, RegisterRequest};

#[derive(Clone)]
pub struct AppState {
    pub hub: CoordinationHub,
    pub health_tracker: HealthTracker,
}

impl AppState {
    pub fn new(hub: CoordinationHub) -> Self {
        Self {
            hub,
            health_tracker: HealthTracker::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub status: &'static str,
    pub client_id: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ClientsResponse {
    pub status: &'static str,
    pub clients: ClientsMap,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub status: &'static str,
    pub messages: Vec<Message>,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(|| async { "ok" }))
        .route("/api/health", get(get_health))
        .route("/api/register", post(register_client))
        .route("/api/message", post(process_message))
        .route("/api/clients", get(get_clients))
        .route("/api/messages", get(get_messages))
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Sert le router sur un listener déjà bindé (port éphémère possible pour les tests)
pub async fn serve(listener: TcpListener, app_state: AppState) -> std::io::Result<()> {
    axum::serve(listener, build_router(app_state)).await
}

fn decode_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, HubError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| HubError::InvalidBody(e.to_string()))
}

// POST /api/register
async fn register_client(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<RegisterResponse>, HubError> {
    let req: RegisterRequest = decode_body(&body)?;
    let client_id = app
        .hub
        .register(req.client_id, req.capabilities.unwrap_or_default());

    Ok(Json(RegisterResponse {
        status: "success",
        client_id,
        message: "Client registered successfully",
    }))
}

// POST /api/message
async fn process_message(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<Acknowledgment>, HubError> {
    let envelope: Envelope = decode_body(&body)?;
    app.hub.dispatch(envelope).map(Json)
}

// GET /api/clients
async fn get_clients(State(app): State<AppState>) -> Json<ClientsResponse> {
    Json(ClientsResponse {
        status: "success",
        clients: app.hub.list_clients(),
    })
}

// GET /api/messages
async fn get_messages(State(app): State<AppState>) -> Json<MessagesResponse> {
    Json(MessagesResponse {
        status: "success",
        messages: app.hub.list_messages(),
    })
}

// GET /api/health
async fn get_health(State(app): State<AppState>) -> Json<KernelHealth> {
    Json(app.health_tracker.get_health(&app.hub))
}

// GET /
async fn dashboard(State(app): State<AppState>) -> Result<Html<String>, StatusCode> {
    let clients = app.hub.list_clients();
    let messages = app.hub.list_messages();
    crate::dashboard::render(&clients, &messages)
        .map(Html)
        .map_err(|e| {
            tracing::error!(error = %e, "dashboard render failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

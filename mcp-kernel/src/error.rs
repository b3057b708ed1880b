use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Erreurs renvoyées à l'appelant sous forme structurée (jamais de crash)
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// Reports whether privileged operations are available, never reveals the credential
pub async fn service_role_exists(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({"exists": state.config().service_role_configured}))
}

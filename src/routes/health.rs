use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let backend = if state.bridge.remote_ready() { "remote" } else { "local" };
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "backend": backend,
            "remoteConfigured": state.bridge.remote().is_some(),
        })),
    )
}

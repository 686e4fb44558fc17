use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;

use crate::{
    error::AppError,
    middleware::auth::require_admin,
    models::{auth::AuthenticatedUser, waste::LogWasteRequest},
    routes::records_json,
    services::waste::WasteService,
    AppState,
};

/// GET /api/waste — admins only
pub async fn list_waste(State(state): State<AppState>, user: AuthenticatedUser) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    Ok(records_json(WasteService::list(&state.bridge).await))
}

/// POST /api/waste — admins only
pub async fn log_waste(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<LogWasteRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&user)?;
    let entry = WasteService::log(&state.bridge, body).await?;
    let body = serde_json::to_value(entry).map_err(anyhow::Error::from)?;
    Ok((StatusCode::CREATED, Json(body)))
}

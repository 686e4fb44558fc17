use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    error::AppError,
    middleware::auth::require_admin,
    models::{auth::AuthenticatedUser, event::CreateEventRequest},
    routes::records_json,
    services::events::EventService,
    AppState,
};

/// GET /api/events
pub async fn list_events(State(state): State<AppState>, _user: AuthenticatedUser) -> Json<Value> {
    records_json(EventService::list(&state.bridge).await)
}

/// POST /api/events — admins only
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&user)?;
    let event = EventService::create(&state.bridge, body).await?;
    let body = serde_json::to_value(event).map_err(anyhow::Error::from)?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// POST /api/events/{id}/vote
pub async fn vote_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let record = EventService::vote(&state.bridge, &id, &user.user_id).await?;
    Ok(Json(Value::Object(record)))
}

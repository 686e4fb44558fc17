use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    error::AppError,
    middleware::auth::require_admin,
    models::{auth::AuthenticatedUser, complaint::SubmitComplaintRequest},
    routes::records_json,
    services::complaints::ComplaintService,
    AppState,
};

/// GET /api/complaints — admins only
pub async fn list_complaints(State(state): State<AppState>, user: AuthenticatedUser) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    Ok(records_json(ComplaintService::list(&state.bridge).await))
}

/// POST /api/complaints
pub async fn submit_complaint(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<SubmitComplaintRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let complaint = ComplaintService::submit(&state.bridge, &user.user_id, body).await?;
    let body = serde_json::to_value(complaint).map_err(anyhow::Error::from)?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// PUT /api/complaints/{id}/resolve — admins only
pub async fn resolve_complaint(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let record = ComplaintService::resolve(&state.bridge, &id).await?;
    Ok(Json(Value::Object(record)))
}

use axum::{extract::State, Json};
use serde_json::Value;

use crate::{
    error::AppError,
    models::{attendance::MarkAttendanceRequest, auth::AuthenticatedUser},
    services::attendance::AttendanceService,
    AppState,
};

/// POST /api/attendance — mark a meal as eaten by the caller
pub async fn mark_eaten(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<MarkAttendanceRequest>,
) -> Result<Json<Value>, AppError> {
    let entry = AttendanceService::mark(&state.bridge, &user.user_id, body).await?;
    Ok(Json(serde_json::to_value(entry).map_err(anyhow::Error::from)?))
}

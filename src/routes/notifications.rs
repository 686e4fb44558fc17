use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;

use crate::{
    error::AppError,
    middleware::auth::require_admin,
    models::{auth::AuthenticatedUser, notification::PostNotificationRequest},
    routes::records_json,
    services::notifications::NotificationService,
    AppState,
};

/// GET /api/notifications
pub async fn list_notifications(State(state): State<AppState>, _user: AuthenticatedUser) -> Json<Value> {
    records_json(NotificationService::list(&state.bridge).await)
}

/// POST /api/notifications — admins only
pub async fn post_notification(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<PostNotificationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&user)?;
    let notification = NotificationService::post(&state.bridge, body).await?;
    let body = serde_json::to_value(notification).map_err(anyhow::Error::from)?;
    Ok((StatusCode::CREATED, Json(body)))
}

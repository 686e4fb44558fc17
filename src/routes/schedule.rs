use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::auth::require_admin,
    models::{auth::AuthenticatedUser, menu::MenuWeekQuery, schedule::PublishWeekRequest},
    services::schedule::ScheduleService,
    AppState,
};

/// GET /api/schedule?week_start=YYYY-MM-DD — the resolved week grid
pub async fn get_week(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<MenuWeekQuery>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let view = ScheduleService::load_week(&state.bridge, params.week_start).await;
    Ok(Json(serde_json::to_value(view).map_err(anyhow::Error::from)?))
}

/// POST /api/schedule/publish — replace and publish a whole week
pub async fn publish_week(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<PublishWeekRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let report = ScheduleService::publish_week(&state.bridge, body).await?;
    Ok(Json(json!({
        "message": "Menu saved",
        "committedDates": report.committed,
    })))
}

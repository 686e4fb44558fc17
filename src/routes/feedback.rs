use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;

use crate::{
    error::AppError,
    models::{auth::AuthenticatedUser, feedback::SubmitFeedbackRequest},
    routes::records_json,
    services::feedback::FeedbackService,
    AppState,
};

/// GET /api/feedback
pub async fn list_feedback(State(state): State<AppState>) -> Json<Value> {
    records_json(FeedbackService::list(&state.bridge).await)
}

/// POST /api/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let feedback = FeedbackService::submit(&state.bridge, &user.user_id, body).await?;
    let body = serde_json::to_value(feedback).map_err(anyhow::Error::from)?;
    Ok((StatusCode::CREATED, Json(body)))
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::auth::require_admin,
    models::{
        auth::AuthenticatedUser,
        meal::{CreateMealRequest, UpdateMealRequest},
    },
    routes::records_json,
    services::meals::MealService,
    AppState,
};

/// GET /api/meals
pub async fn list_meals(State(state): State<AppState>) -> Json<Value> {
    records_json(MealService::list(&state.bridge).await)
}

/// POST /api/meals — admins only
pub async fn create_meal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&user)?;
    let meal = MealService::create(&state.bridge, body).await?;
    Ok((StatusCode::CREATED, Json(Value::Object(meal.to_record()))))
}

/// PUT /api/meals/{id} — admins only
pub async fn update_meal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateMealRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let record = MealService::update(&state.bridge, &id, body).await?;
    Ok(Json(Value::Object(record)))
}

/// DELETE /api/meals/{id} — admins only
pub async fn delete_meal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    MealService::delete(&state.bridge, &id).await?;
    Ok(Json(json!({ "msg": "Meal removed" })))
}

use axum::{extract::State, Json};
use serde_json::Value;

use crate::{
    error::AppError,
    middleware::auth::require_admin,
    models::{auth::AuthenticatedUser, menu::UpsertMenuRequest},
    routes::records_json,
    services::menu::MenuService,
    AppState,
};

/// GET /api/menu — every stored daily menu
pub async fn list_menus(State(state): State<AppState>) -> Json<Value> {
    records_json(MenuService::list(&state.bridge).await)
}

/// POST /api/menu — create or replace the menu for one date, admins only
pub async fn upsert_menu(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<UpsertMenuRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let menu = MenuService::upsert_request(&state.bridge, body).await?;
    Ok(Json(Value::Object(menu.to_record())))
}

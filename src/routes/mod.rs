pub mod attendance;
pub mod complaints;
pub mod events;
pub mod feedback;
pub mod health;
pub mod meals;
pub mod menu;
pub mod metrics;
pub mod notifications;
pub mod schedule;
pub mod waste;

use axum::Json;
use serde_json::Value;

use crate::db::Record;

/// Renders a collection as a JSON array.
pub(crate) fn records_json(records: Vec<Record>) -> Json<Value> {
    Json(Value::Array(records.into_iter().map(Value::Object).collect()))
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Food thrown away on one day, in kilograms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WasteEntry {
    pub id: String,
    pub date: NaiveDate,
    pub amount: f64,
}

/// Body for POST /api/waste. `amount` may arrive as a number or as numeric
/// text; `date` defaults to today.
#[derive(Debug, Deserialize)]
pub struct LogWasteRequest {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub amount: Value,
}

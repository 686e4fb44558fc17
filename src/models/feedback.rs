use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::menu::Slot;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub student_id: String,
    pub date_str: NaiveDate,
    pub meal_type: Slot,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Body for POST /api/feedback.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    pub meal_type: Slot,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub meal_name: Option<String>,
}

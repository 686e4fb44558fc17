use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::menu::Slot;

/// A student marking one meal of one day as eaten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: String,
    pub student_id: String,
    pub meal_type: Slot,
    pub date_str: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Body for POST /api/attendance.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    pub meal_type: Slot,
    pub date_str: NaiveDate,
}

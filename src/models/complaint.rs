use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintStatus {
    Pending,
    Resolved,
}

/// A student's complaint about the mess ("Cold Food", "Hygiene", ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: String,
    pub student_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}

/// Body for POST /api/complaints.
#[derive(Debug, Deserialize)]
pub struct SubmitComplaintRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub description: String,
}

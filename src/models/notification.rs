use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
}

/// Body for POST /api/notifications.
#[derive(Debug, Deserialize)]
pub struct PostNotificationRequest {
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
}

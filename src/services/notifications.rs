use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{to_record, Bridge, Record},
    error::AppError,
    models::notification::{Notification, PostNotificationRequest},
};

/// Older notifications are dropped once this many are stored.
pub const MAX_NOTIFICATIONS: usize = 50;

pub struct NotificationService;

impl NotificationService {
    pub async fn list(bridge: &Bridge) -> Vec<Record> {
        bridge.get_notifications().await
    }

    pub async fn post(bridge: &Bridge, req: PostNotificationRequest) -> Result<Notification, AppError> {
        let message = req.message.trim();
        if message.is_empty() {
            return Err(AppError::validation("Message is required"));
        }
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            message: message.to_string(),
            kind: req.kind,
            created_at: Utc::now(),
        };

        let mut notifications = bridge.get_notifications().await;
        notifications.insert(0, to_record(&notification)?);
        notifications.truncate(MAX_NOTIFICATIONS);
        if !bridge.save_notifications(&notifications).await.is_committed() {
            return Err(AppError::StorageUnavailable("notification".into()));
        }
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::local::LocalSnapshot;
    use crate::models::notification::NotificationKind;
    use tempfile::TempDir;

    fn req(message: &str) -> PostNotificationRequest {
        PostNotificationRequest {
            message: message.into(),
            kind: NotificationKind::default(),
        }
    }

    #[tokio::test]
    async fn test_newest_first_and_capped() {
        let dir = TempDir::new().unwrap();
        let bridge = Bridge::local_only(LocalSnapshot::new(dir.path().join("db.json")));

        assert!(matches!(NotificationService::post(&bridge, req(" ")).await, Err(AppError::Validation(_))));

        for i in 0..MAX_NOTIFICATIONS + 2 {
            NotificationService::post(&bridge, req(&format!("notice {i}"))).await.unwrap();
        }
        let stored = NotificationService::list(&bridge).await;
        assert_eq!(stored.len(), MAX_NOTIFICATIONS);
        assert_eq!(stored[0]["message"], format!("notice {}", MAX_NOTIFICATIONS + 1));
        assert_eq!(stored[0]["type"], "info");
        assert_eq!(stored[MAX_NOTIFICATIONS - 1]["message"], "notice 2");
    }
}

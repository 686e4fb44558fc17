use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{to_record, Bridge, Record},
    error::AppError,
    models::feedback::{Feedback, SubmitFeedbackRequest},
};

pub struct FeedbackService;

impl FeedbackService {
    pub async fn list(bridge: &Bridge) -> Vec<Record> {
        bridge.get_feedbacks().await
    }

    pub async fn submit(bridge: &Bridge, student_id: &str, req: SubmitFeedbackRequest) -> Result<Feedback, AppError> {
        if !(1..=5).contains(&req.rating) {
            return Err(AppError::validation("rating must be between 1 and 5"));
        }

        let now = Utc::now();
        let feedback = Feedback {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            date_str: now.date_naive(),
            meal_type: req.meal_type,
            rating: req.rating,
            comment: req.comment.trim().to_string(),
            meal_name: req.meal_name,
            timestamp: now,
        };

        let mut feedbacks = bridge.get_feedbacks().await;
        feedbacks.insert(0, to_record(&feedback)?);
        if !bridge.save_feedbacks(&feedbacks).await.is_committed() {
            return Err(AppError::StorageUnavailable("feedback".into()));
        }
        Ok(feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::local::LocalSnapshot;
    use crate::models::menu::Slot;
    use tempfile::TempDir;

    fn req(rating: u8) -> SubmitFeedbackRequest {
        SubmitFeedbackRequest {
            meal_type: Slot::Breakfast,
            rating,
            comment: " tasty ".into(),
            meal_name: Some("Idli".into()),
        }
    }

    #[tokio::test]
    async fn test_submit_prepends_and_validates_rating() {
        let dir = TempDir::new().unwrap();
        let bridge = Bridge::local_only(LocalSnapshot::new(dir.path().join("db.json")));

        assert!(matches!(FeedbackService::submit(&bridge, "s1", req(0)).await, Err(AppError::Validation(_))));
        assert!(matches!(FeedbackService::submit(&bridge, "s1", req(6)).await, Err(AppError::Validation(_))));

        FeedbackService::submit(&bridge, "s1", req(4)).await.unwrap();
        let second = FeedbackService::submit(&bridge, "s2", req(2)).await.unwrap();
        assert_eq!(second.comment, "tasty");

        let stored = FeedbackService::list(&bridge).await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0]["studentId"], "s2");
    }
}

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{to_record, Bridge},
    error::AppError,
    models::attendance::{Attendance, MarkAttendanceRequest},
};

pub struct AttendanceService;

impl AttendanceService {
    /// Records that `student_id` ate `meal_type` on `date_str`. Each
    /// (student, day, meal) can be marked once; newest entries come first.
    pub async fn mark(bridge: &Bridge, student_id: &str, req: MarkAttendanceRequest) -> Result<Attendance, AppError> {
        let mut entries = bridge.get_attendance().await;
        let already = entries
            .iter()
            .filter_map(|r| serde_json::from_value::<Attendance>(r.clone().into()).ok())
            .any(|a| a.student_id == student_id && a.date_str == req.date_str && a.meal_type == req.meal_type);
        if already {
            return Err(AppError::validation("Already marked as eaten"));
        }

        let entry = Attendance {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            meal_type: req.meal_type,
            date_str: req.date_str,
            created_at: Utc::now(),
        };
        entries.insert(0, to_record(&entry)?);
        if !bridge.save_attendance(&entries).await.is_committed() {
            return Err(AppError::StorageUnavailable("attendance".into()));
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::local::LocalSnapshot;
    use crate::models::menu::Slot;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_second_mark_for_same_meal_is_rejected() {
        let dir = TempDir::new().unwrap();
        let bridge = Bridge::local_only(LocalSnapshot::new(dir.path().join("db.json")));
        let req = || MarkAttendanceRequest {
            meal_type: Slot::Lunch,
            date_str: "2024-03-04".parse().unwrap(),
        };

        AttendanceService::mark(&bridge, "s1", req()).await.unwrap();
        let err = AttendanceService::mark(&bridge, "s1", req()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // another student, or another meal, is fine
        AttendanceService::mark(&bridge, "s2", req()).await.unwrap();
        let dinner = MarkAttendanceRequest { meal_type: Slot::Dinner, ..req() };
        let latest = AttendanceService::mark(&bridge, "s1", dinner).await.unwrap();

        let stored = bridge.get_attendance().await;
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0]["id"], latest.id.as_str());
        assert_eq!(stored[0]["mealType"], "dinner");
    }
}

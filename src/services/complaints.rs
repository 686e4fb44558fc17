use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    db::{record_id, to_record, Bridge, Record},
    error::AppError,
    models::complaint::{Complaint, ComplaintStatus, SubmitComplaintRequest},
};

pub struct ComplaintService;

impl ComplaintService {
    pub async fn list(bridge: &Bridge) -> Vec<Record> {
        bridge.get_complaints().await
    }

    pub async fn submit(bridge: &Bridge, student_id: &str, req: SubmitComplaintRequest) -> Result<Complaint, AppError> {
        let description = req.description.trim();
        if description.is_empty() {
            return Err(AppError::validation("Description is required"));
        }
        let complaint = Complaint {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            kind: req.kind.trim().to_string(),
            description: description.to_string(),
            status: ComplaintStatus::Pending,
            created_at: Utc::now(),
        };

        let mut complaints = bridge.get_complaints().await;
        complaints.insert(0, to_record(&complaint)?);
        if !bridge.save_complaints(&complaints).await.is_committed() {
            return Err(AppError::StorageUnavailable("complaint".into()));
        }
        Ok(complaint)
    }

    /// Marks a complaint resolved. Resolving twice is harmless.
    pub async fn resolve(bridge: &Bridge, id: &str) -> Result<Record, AppError> {
        let mut complaints = bridge.get_complaints().await;
        let record = complaints
            .iter_mut()
            .find(|r| record_id(r).as_deref() == Some(id))
            .ok_or_else(|| AppError::NotFound(format!("Complaint {id}")))?;
        record.insert("status".into(), Value::String("resolved".into()));

        let resolved = record.clone();
        if !bridge.save_complaints(&complaints).await.is_committed() {
            return Err(AppError::StorageUnavailable(format!("complaint {id}")));
        }
        Ok(resolved)
    }
}

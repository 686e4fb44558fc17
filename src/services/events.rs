use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    db::{record_id, to_record, Bridge, Record},
    error::AppError,
    models::event::{CreateEventRequest, EventStatus, MessEvent},
};

pub struct EventService;

impl EventService {
    pub async fn list(bridge: &Bridge) -> Vec<Record> {
        bridge.get_events().await
    }

    pub async fn create(bridge: &Bridge, req: CreateEventRequest) -> Result<MessEvent, AppError> {
        let title = req.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("Title is required"));
        }
        let event = MessEvent {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: req.description.trim().to_string(),
            votes: Vec::new(),
            status: EventStatus::Open,
            created_at: Utc::now(),
        };

        let mut events = bridge.get_events().await;
        events.insert(0, to_record(&event)?);
        if !bridge.save_events(&events).await.is_committed() {
            return Err(AppError::StorageUnavailable("event".into()));
        }
        Ok(event)
    }

    /// Adds `student_id` to the event's votes. Each student votes once.
    pub async fn vote(bridge: &Bridge, id: &str, student_id: &str) -> Result<Record, AppError> {
        let mut events = bridge.get_events().await;
        let record = events
            .iter_mut()
            .find(|r| record_id(r).as_deref() == Some(id))
            .ok_or_else(|| AppError::NotFound(format!("Event {id}")))?;

        let votes = record
            .entry("votes")
            .or_insert_with(|| Value::Array(Vec::new()));
        if !votes.is_array() {
            *votes = Value::Array(Vec::new());
        }
        if let Value::Array(votes) = votes {
            if votes.iter().any(|v| v.as_str() == Some(student_id)) {
                return Err(AppError::validation("Already voted"));
            }
            votes.push(Value::String(student_id.to_string()));
        }

        let updated = record.clone();
        if !bridge.save_events(&events).await.is_committed() {
            return Err(AppError::StorageUnavailable(format!("event {id}")));
        }
        Ok(updated)
    }
}

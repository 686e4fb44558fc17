use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;

/// Errors surfaced to API callers. Backend outages never show up here: the
/// bridge absorbs them.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Access denied")]
    Forbidden,

    #[error("Failed to publish menu for {}", join_dates(.failed))]
    PartialPublish {
        committed: Vec<NaiveDate>,
        failed: Vec<NaiveDate>,
    },

    #[error("Could not persist {0}")]
    StorageUnavailable(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

fn join_dates(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::PartialPublish { .. } => StatusCode::BAD_GATEWAY,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        }
        let body = match &self {
            AppError::PartialPublish { committed, failed } => json!({
                "error": self.to_string(),
                "failedDates": failed,
                "committedDates": committed,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_publish_names_failed_dates() {
        let d = |s: &str| s.parse::<NaiveDate>().unwrap();
        let err = AppError::PartialPublish {
            committed: vec![d("2024-03-04")],
            failed: vec![d("2024-03-05"), d("2024-03-07")],
        };
        assert_eq!(err.to_string(), "Failed to publish menu for 2024-03-05, 2024-03-07");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("Meal".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::validation("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
    }
}

use chrono::Utc;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::{
    db::{to_record, Bridge, Record},
    error::AppError,
    models::waste::{LogWasteRequest, WasteEntry},
};

pub struct WasteService;

impl WasteService {
    pub async fn list(bridge: &Bridge) -> Vec<Record> {
        bridge.get_waste().await
    }

    /// Appends one day's waste figure. Entries keep arrival order.
    pub async fn log(bridge: &Bridge, req: LogWasteRequest) -> Result<WasteEntry, AppError> {
        let amount = parse_amount(&req.amount)?;
        let entry = WasteEntry {
            id: Uuid::new_v4().to_string(),
            date: req.date.unwrap_or_else(|| Utc::now().date_naive()),
            amount,
        };

        let mut entries = bridge.get_waste().await;
        entries.push(to_record(&entry)?);
        if !bridge.save_waste(&entries).await.is_committed() {
            return Err(AppError::StorageUnavailable("waste entry".into()));
        }
        info!("Logged {} kg of waste on {}", entry.amount, entry.date);
        Ok(entry)
    }
}

fn parse_amount(value: &Value) -> Result<f64, AppError> {
    let parsed = match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::Number(n) => Some(n.as_f64()),
        Value::String(s) => Some(s.trim().parse::<f64>().ok()),
        _ => Some(None),
    };
    match parsed {
        None => Err(AppError::validation("Amount is required")),
        Some(None) => Err(AppError::validation("Amount must be a number")),
        Some(Some(a)) if a == 0.0 => Err(AppError::validation("Amount is required")),
        Some(Some(a)) if !a.is_finite() || a < 0.0 => {
            Err(AppError::validation("Amount must be a positive number"))
        }
        Some(Some(a)) => Ok(a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::local::LocalSnapshot;
    use serde_json::json;
    use tempfile::TempDir;

    fn req(amount: Value) -> LogWasteRequest {
        LogWasteRequest {
            date: Some("2024-03-04".parse().unwrap()),
            amount,
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(&json!(12.5)).unwrap(), 12.5);
        assert_eq!(parse_amount(&json!(" 3 ")).unwrap(), 3.0);
        for bad in [json!(null), json!(""), json!(0), json!("abc"), json!(-2), json!([1]), json!("NaN")] {
            assert!(matches!(parse_amount(&bad), Err(AppError::Validation(_))), "{bad}");
        }
    }

    #[tokio::test]
    async fn test_log_appends_in_arrival_order() {
        let dir = TempDir::new().unwrap();
        let bridge = Bridge::local_only(LocalSnapshot::new(dir.path().join("db.json")));

        WasteService::log(&bridge, req(json!(4))).await.unwrap();
        let today = WasteService::log(&bridge, LogWasteRequest { date: None, amount: json!("1.5") })
            .await
            .unwrap();
        assert_eq!(today.date, Utc::now().date_naive());
        assert!(WasteService::log(&bridge, req(json!(null))).await.is_err());

        let stored = WasteService::list(&bridge).await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0]["date"], "2024-03-04");
        assert_eq!(stored[0]["amount"], 4.0);
        assert_eq!(stored[1]["amount"], 1.5);
    }
}

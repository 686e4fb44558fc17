use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    db::{record_id, Bridge, Record},
    error::AppError,
    models::meal::{
        is_valid_clock_time, CreateMealRequest, DietType, Meal, MealCategory, Nutrition, RatingWindow,
        UpdateMealRequest,
    },
};

pub struct MealService;

impl MealService {
    pub async fn list(bridge: &Bridge) -> Vec<Record> {
        bridge.get_meals().await
    }

    pub async fn create(bridge: &Bridge, req: CreateMealRequest) -> Result<Meal, AppError> {
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Meal name is required"));
        }
        let category = parse_category(&req.category)?;
        let diet_type = parse_diet_type(&req.diet_type)?;
        check_amount("calories", req.calories)?;
        check_amount("protein", req.protein)?;
        check_time("startTime", req.start_time.as_deref())?;
        check_time("endTime", req.end_time.as_deref())?;

        let defaults = RatingWindow::default();
        let meal = Meal {
            id: Uuid::new_v4().to_string(),
            name: req.name.trim().to_string(),
            category,
            diet_type,
            image_url: req.image_url.unwrap_or_default(),
            nutrition: Nutrition {
                calories: req.calories.unwrap_or(0.0),
                protein: req.protein.unwrap_or(0.0),
            },
            rating_window: RatingWindow {
                start_time: req.start_time.unwrap_or(defaults.start_time),
                end_time: req.end_time.unwrap_or(defaults.end_time),
            },
        };

        let mut meals = bridge.get_meals().await;
        meals.push(meal.to_record());
        if !bridge.save_meals(&meals).await.is_committed() {
            return Err(AppError::StorageUnavailable("meal".into()));
        }
        Ok(meal)
    }

    /// Merges the given fields into the stored record. Fields the request
    /// leaves out, and fields this service does not know about, are kept.
    pub async fn update(bridge: &Bridge, id: &str, req: UpdateMealRequest) -> Result<Record, AppError> {
        if let Some(category) = &req.category {
            parse_category(category)?;
        }
        if let Some(diet_type) = &req.diet_type {
            parse_diet_type(diet_type)?;
        }
        if matches!(&req.name, Some(n) if n.trim().is_empty()) {
            return Err(AppError::validation("Meal name cannot be empty"));
        }
        check_amount("calories", req.calories)?;
        check_amount("protein", req.protein)?;
        check_time("startTime", req.start_time.as_deref())?;
        check_time("endTime", req.end_time.as_deref())?;

        let mut meals = bridge.get_meals().await;
        let record = meals
            .iter_mut()
            .find(|r| record_id(r).as_deref() == Some(id))
            .ok_or_else(|| AppError::NotFound(format!("Meal {id}")))?;

        if let Some(name) = req.name {
            record.insert("name".into(), Value::String(name.trim().to_string()));
        }
        if let Some(category) = req.category {
            record.insert("category".into(), Value::String(category));
        }
        if let Some(diet_type) = req.diet_type {
            record.insert("type".into(), Value::String(diet_type));
        }
        if let Some(url) = req.image_url {
            record.insert("imageUrl".into(), Value::String(url));
        }
        merge_nested(record, "nutritionalInfo", "calories", req.calories.map(|v| json!(v)));
        merge_nested(record, "nutritionalInfo", "protein", req.protein.map(|v| json!(v)));
        merge_nested(record, "ratingWindow", "startTime", req.start_time.map(Value::String));
        merge_nested(record, "ratingWindow", "endTime", req.end_time.map(Value::String));

        let updated = record.clone();
        if !bridge.save_meals(&meals).await.is_committed() {
            return Err(AppError::StorageUnavailable(format!("meal {id}")));
        }
        Ok(updated)
    }

    /// Removes a meal from the catalogue. Menus that still reference it are
    /// left alone; the dangling ids are skipped when a week is loaded.
    pub async fn delete(bridge: &Bridge, id: &str) -> Result<(), AppError> {
        let mut meals = bridge.get_meals().await;
        let before = meals.len();
        meals.retain(|r| record_id(r).as_deref() != Some(id));
        if meals.len() == before {
            return Err(AppError::NotFound(format!("Meal {id}")));
        }
        if !bridge.save_meals(&meals).await.is_committed() {
            return Err(AppError::StorageUnavailable(format!("meal {id}")));
        }
        Ok(())
    }
}

fn parse_category(s: &str) -> Result<MealCategory, AppError> {
    s.parse().map_err(|e: anyhow::Error| AppError::validation(e.to_string()))
}

fn parse_diet_type(s: &str) -> Result<DietType, AppError> {
    s.parse().map_err(|e: anyhow::Error| AppError::validation(e.to_string()))
}

fn check_amount(field: &str, value: Option<f64>) -> Result<(), AppError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            Err(AppError::validation(format!("{field} must be a non-negative number")))
        }
        _ => Ok(()),
    }
}

fn check_time(field: &str, value: Option<&str>) -> Result<(), AppError> {
    match value {
        Some(t) if !is_valid_clock_time(t) => {
            Err(AppError::validation(format!("{field} must be HH:MM, got {t}")))
        }
        _ => Ok(()),
    }
}

fn merge_nested(record: &mut Record, object: &str, field: &str, value: Option<Value>) {
    let Some(value) = value else {
        return;
    };
    let entry = record
        .entry(object.to_string())
        .or_insert_with(|| Value::Object(Record::new()));
    if !entry.is_object() {
        *entry = Value::Object(Record::new());
    }
    if let Value::Object(inner) = entry {
        inner.insert(field.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::local::LocalSnapshot;
    use tempfile::TempDir;

    fn create_request(name: &str) -> CreateMealRequest {
        CreateMealRequest {
            name: name.into(),
            category: "Main Course".into(),
            diet_type: "Veg".into(),
            image_url: None,
            calories: Some(150.0),
            protein: Some(4.0),
            start_time: Some("07:00".into()),
            end_time: None,
        }
    }

    fn bridge(dir: &TempDir) -> Bridge {
        Bridge::local_only(LocalSnapshot::new(dir.path().join("db.json")))
    }

    #[tokio::test]
    async fn test_create_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge(&dir);
        let meal = MealService::create(&bridge, create_request("Idli & Sambar")).await.unwrap();
        assert_eq!(meal.rating_window.start_time, "07:00");
        assert_eq!(meal.rating_window.end_time, "14:00");

        let stored = MealService::list(&bridge).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(Meal::from_record(&stored[0]), Some(meal));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input_without_writing() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge(&dir);

        let mut req = create_request("Idli");
        req.category = "Breakfast".into();
        assert!(matches!(MealService::create(&bridge, req).await, Err(AppError::Validation(_))));

        let mut req = create_request("Idli");
        req.end_time = Some("2pm".into());
        assert!(matches!(MealService::create(&bridge, req).await, Err(AppError::Validation(_))));

        assert!(matches!(
            MealService::create(&bridge, create_request("  ")).await,
            Err(AppError::Validation(_))
        ));
        assert!(MealService::list(&bridge).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_partial_fields() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge(&dir);
        let meal = MealService::create(&bridge, create_request("Poha")).await.unwrap();

        let req = UpdateMealRequest {
            protein: Some(9.0),
            end_time: Some("10:30".into()),
            ..UpdateMealRequest::default()
        };
        let updated = MealService::update(&bridge, &meal.id, req).await.unwrap();
        assert_eq!(updated["name"], "Poha");
        assert_eq!(updated["nutritionalInfo"]["calories"], 150.0);
        assert_eq!(updated["nutritionalInfo"]["protein"], 9.0);
        assert_eq!(updated["ratingWindow"]["startTime"], "07:00");
        assert_eq!(updated["ratingWindow"]["endTime"], "10:30");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_meal_is_not_found() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge(&dir);
        let err = MealService::update(&bridge, "nope", UpdateMealRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(matches!(MealService::delete(&bridge, "nope").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_leaves_menus_untouched() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge(&dir);
        let meal = MealService::create(&bridge, create_request("Upma")).await.unwrap();
        let menu = serde_json::json!({ "_id": "x", "date": "2024-03-04", "meals": { "lunch": [meal.id] } });
        bridge.save_menus(&[menu.as_object().cloned().unwrap()]).await;

        MealService::delete(&bridge, &meal.id).await.unwrap();
        assert!(MealService::list(&bridge).await.is_empty());
        assert_eq!(bridge.get_menus().await[0]["meals"]["lunch"][0], meal.id.as_str());
    }
}

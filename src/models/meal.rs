use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::{record_id, Record};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MealCategory {
    #[serde(rename = "Main Course")]
    MainCourse,
    #[serde(rename = "Side Dish")]
    SideDish,
    Starter,
    Beverage,
}

impl std::str::FromStr for MealCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Main Course" => Ok(MealCategory::MainCourse),
            "Side Dish" => Ok(MealCategory::SideDish),
            "Starter" => Ok(MealCategory::Starter),
            "Beverage" => Ok(MealCategory::Beverage),
            _ => Err(anyhow::anyhow!("Unknown meal category: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DietType {
    Veg,
    #[serde(rename = "Non-Veg")]
    NonVeg,
    Egg,
}

impl std::str::FromStr for DietType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Veg" => Ok(DietType::Veg),
            "Non-Veg" => Ok(DietType::NonVeg),
            "Egg" => Ok(DietType::Egg),
            _ => Err(anyhow::anyhow!("Unknown diet type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Nutrition {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
}

/// Time of day during which students may rate the meal ("HH:MM").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingWindow {
    pub start_time: String,
    pub end_time: String,
}

impl Default for RatingWindow {
    fn default() -> Self {
        Self {
            start_time: "12:00".into(),
            end_time: "14:00".into(),
        }
    }
}

/// A dish in the catalogue. Menus reference meals by `id` only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub category: MealCategory,
    #[serde(rename = "type")]
    pub diet_type: DietType,
    #[serde(default)]
    pub image_url: String,
    #[serde(rename = "nutritionalInfo", default)]
    pub nutrition: Nutrition,
    #[serde(default)]
    pub rating_window: RatingWindow,
}

impl Meal {
    /// Reads a meal out of a stored record, whichever id field it carries.
    /// Returns `None` for records that are not valid meals.
    pub fn from_record(record: &Record) -> Option<Meal> {
        let id = record_id(record)?;
        let mut record = record.clone();
        record.remove("id");
        record.insert("_id".into(), Value::String(id));
        serde_json::from_value(Value::Object(record)).ok()
    }

    pub fn to_record(&self) -> Record {
        match serde_json::to_value(self) {
            Ok(Value::Object(record)) => record,
            _ => Record::new(),
        }
    }
}

/// A catalogue record as the weekly planner holds it: its id plus every other
/// field, unvalidated. Any record in `meals` that carries an id has one.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MealEntry {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Record,
}

impl MealEntry {
    pub fn from_record(record: &Record) -> Option<MealEntry> {
        let id = record_id(record)?;
        let mut fields = record.clone();
        fields.remove("_id");
        fields.remove("id");
        Some(MealEntry { id, fields })
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }
}

/// Body for POST /api/meals. Enum and time fields arrive as plain strings
/// and are checked by `validate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    pub name: String,
    pub category: String,
    #[serde(rename = "type")]
    pub diet_type: String,
    pub image_url: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Body for PUT /api/meals/{id}. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMealRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub diet_type: Option<String>,
    pub image_url: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Accepts "HH:MM" on a 24-hour clock.
pub fn is_valid_clock_time(s: &str) -> bool {
    s.len() == 5 && NaiveTime::parse_from_str(s, "%H:%M").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_record_accepts_either_id_field() {
        let with_plain_id = json!({
            "id": "7",
            "name": "Chicken Biryani",
            "category": "Main Course",
            "type": "Non-Veg",
            "nutritionalInfo": { "calories": 450, "protein": 25 },
            "avgRating": 4.2
        });
        let meal = Meal::from_record(with_plain_id.as_object().unwrap()).unwrap();
        assert_eq!(meal.id, "7");
        assert_eq!(meal.diet_type, DietType::NonVeg);
        assert_eq!(meal.nutrition.calories, 450.0);
        assert_eq!(meal.rating_window, RatingWindow::default());

        let record = meal.to_record();
        assert_eq!(record["_id"], "7");
        assert_eq!(record["type"], "Non-Veg");
        assert_eq!(record["ratingWindow"]["startTime"], "12:00");
    }

    #[test]
    fn test_from_record_rejects_unknown_category() {
        let rec = json!({ "_id": "1", "name": "Idli", "category": "Breakfast", "type": "Veg" });
        assert!(Meal::from_record(rec.as_object().unwrap()).is_none());
    }

    #[test]
    fn test_entry_keeps_records_that_are_not_valid_meals() {
        let rec = json!({
            "id": 3,
            "name": "Poha",
            "category": "Breakfast",
            "nutritionalInfo": { "calories": "150" }
        });
        let entry = MealEntry::from_record(rec.as_object().unwrap()).unwrap();
        assert_eq!(entry.id, "3");
        assert_eq!(entry.name(), Some("Poha"));
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "_id": "3",
                "name": "Poha",
                "category": "Breakfast",
                "nutritionalInfo": { "calories": "150" }
            })
        );
        assert!(MealEntry::from_record(json!({ "name": "no id" }).as_object().unwrap()).is_none());
    }

    #[test]
    fn test_clock_time() {
        assert!(is_valid_clock_time("07:30"));
        assert!(!is_valid_clock_time("7:30"));
        assert!(!is_valid_clock_time("25:00"));
    }
}

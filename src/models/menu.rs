use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::{record_id, Record};

/// The four meal slots of a day, in serving order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Breakfast,
    Lunch,
    Snacks,
    Dinner,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Breakfast, Slot::Lunch, Slot::Snacks, Slot::Dinner];

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Breakfast => "breakfast",
            Slot::Lunch => "lunch",
            Slot::Snacks => "snacks",
            Slot::Dinner => "dinner",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Slot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown meal slot: {s}"))
    }
}

/// Ordered meal ids per slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MenuSlots {
    #[serde(default)]
    pub breakfast: Vec<String>,
    #[serde(default)]
    pub lunch: Vec<String>,
    #[serde(default)]
    pub snacks: Vec<String>,
    #[serde(default)]
    pub dinner: Vec<String>,
}

impl MenuSlots {
    pub fn get(&self, slot: Slot) -> &[String] {
        match slot {
            Slot::Breakfast => &self.breakfast,
            Slot::Lunch => &self.lunch,
            Slot::Snacks => &self.snacks,
            Slot::Dinner => &self.dinner,
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut Vec<String> {
        match slot {
            Slot::Breakfast => &mut self.breakfast,
            Slot::Lunch => &mut self.lunch,
            Slot::Snacks => &mut self.snacks,
            Slot::Dinner => &mut self.dinner,
        }
    }
}

/// One day's menu. At most one record per `date` string exists in the
/// `menus` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyMenu {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// "YYYY-MM-DD" for records written by this service; older records may
    /// carry a full timestamp.
    pub date: String,
    #[serde(default)]
    pub day_of_week: String,
    #[serde(default)]
    pub meals: MenuSlots,
}

impl DailyMenu {
    pub fn for_date(date: NaiveDate, meals: MenuSlots) -> Self {
        Self {
            id: None,
            date: date.format("%Y-%m-%d").to_string(),
            day_of_week: day_name(date.weekday()).to_string(),
            meals,
        }
    }

    /// Reads a stored menu. Only a missing or non-string `date` rejects the
    /// record; slots are read element by element and anything that is not an
    /// id is skipped.
    pub fn from_record(record: &Record) -> Option<DailyMenu> {
        let date = record.get("date")?.as_str()?.to_string();
        let mut meals = MenuSlots::default();
        if let Some(stored) = record.get("meals").and_then(Value::as_object) {
            for slot in Slot::ALL {
                *meals.get_mut(slot) = slot_ids(stored.get(slot.as_str()));
            }
        }
        Some(DailyMenu {
            id: record_id(record),
            date,
            day_of_week: record
                .get("dayOfWeek")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            meals,
        })
    }

    pub fn to_record(&self) -> Record {
        match serde_json::to_value(self) {
            Ok(Value::Object(record)) => record,
            _ => Record::new(),
        }
    }
}

/// Numeric ids come back as their decimal text.
fn slot_ids(slot: Option<&Value>) -> Vec<String> {
    let Some(items) = slot.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Body for POST /api/menu (create or replace the menu for a date).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertMenuRequest {
    pub date: NaiveDate,
    pub day_of_week: Option<String>,
    #[serde(default)]
    pub meals: MenuSlots,
}

/// Query params for GET /api/schedule.
#[derive(Debug, Deserialize)]
pub struct MenuWeekQuery {
    /// First day of the displayed week (ISO 8601 date, e.g. "2024-03-04").
    pub week_start: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_for_date_fills_day_name() {
        let menu = DailyMenu::for_date("2024-03-04".parse().unwrap(), MenuSlots::default());
        assert_eq!(menu.date, "2024-03-04");
        assert_eq!(menu.day_of_week, "Monday");
    }

    #[test]
    fn test_wire_shape() {
        let mut slots = MenuSlots::default();
        slots.get_mut(Slot::Breakfast).push("m1".into());
        let record = DailyMenu::for_date("2024-03-10".parse().unwrap(), slots).to_record();
        assert_eq!(
            serde_json::Value::Object(record),
            json!({
                "date": "2024-03-10",
                "dayOfWeek": "Sunday",
                "meals": { "breakfast": ["m1"], "lunch": [], "snacks": [], "dinner": [] }
            })
        );
    }

    #[test]
    fn test_from_record_tolerates_missing_slots() {
        let rec = json!({ "id": "9", "date": "2024-03-04T00:00:00.000Z", "dayOfWeek": "Monday", "meals": { "lunch": ["a"] } });
        let menu = DailyMenu::from_record(rec.as_object().unwrap()).unwrap();
        assert_eq!(menu.id.as_deref(), Some("9"));
        assert_eq!(menu.meals.get(Slot::Lunch), ["a".to_string()]);
        assert!(menu.meals.get(Slot::Dinner).is_empty());
    }

    #[test]
    fn test_from_record_reads_slots_element_by_element() {
        let rec = json!({
            "_id": "x",
            "date": "2024-03-05",
            "meals": { "breakfast": [7, "m2", null, { "id": "m3" }], "lunch": "m1", "dinner": null }
        });
        let menu = DailyMenu::from_record(rec.as_object().unwrap()).unwrap();
        assert_eq!(menu.meals.breakfast, vec!["7".to_string(), "m2".to_string()]);
        assert!(menu.meals.lunch.is_empty());
        assert!(menu.meals.dinner.is_empty());
        assert_eq!(menu.day_of_week, "");

        let no_meals = json!({ "date": "2024-03-06", "meals": null });
        let menu = DailyMenu::from_record(no_meals.as_object().unwrap()).unwrap();
        assert_eq!(menu.meals, MenuSlots::default());

        assert!(DailyMenu::from_record(json!({ "date": 20240306 }).as_object().unwrap()).is_none());
    }
}

use chrono::Datelike;
use uuid::Uuid;

use crate::{
    db::{record_id, Bridge, Record},
    error::AppError,
    models::menu::{day_name, DailyMenu, UpsertMenuRequest},
};

pub struct MenuService;

impl MenuService {
    pub async fn list(bridge: &Bridge) -> Vec<Record> {
        bridge.get_menus().await
    }

    /// Validates a menu submitted over the API and upserts it.
    pub async fn upsert_request(bridge: &Bridge, req: UpsertMenuRequest) -> Result<DailyMenu, AppError> {
        let expected = day_name(req.date.weekday());
        if let Some(day) = &req.day_of_week {
            if day != expected {
                return Err(AppError::validation(format!(
                    "{} is a {expected}, not a {day}",
                    req.date
                )));
            }
        }
        Self::upsert(bridge, DailyMenu::for_date(req.date, req.meals)).await
    }

    /// Creates the menu for `menu.date` or replaces the record with exactly
    /// the same date string. A replaced record keeps its id; its slots are
    /// overwritten, not merged.
    pub async fn upsert(bridge: &Bridge, mut menu: DailyMenu) -> Result<DailyMenu, AppError> {
        let mut menus = bridge.get_menus().await;
        let existing = menus
            .iter()
            .position(|r| r.get("date").and_then(|d| d.as_str()) == Some(menu.date.as_str()));

        match existing {
            Some(index) => {
                menu.id = record_id(&menus[index]).or(menu.id);
                menus[index] = menu.to_record();
            }
            None => {
                menu.id = menu.id.or_else(|| Some(Uuid::new_v4().to_string()));
                menus.push(menu.to_record());
            }
        }

        if !bridge.save_menus(&menus).await.is_committed() {
            return Err(AppError::StorageUnavailable(format!("menu for {}", menu.date)));
        }
        Ok(menu)
    }
}

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    db::{Bridge, Record},
    error::AppError,
    models::{
        meal::MealEntry,
        menu::{day_name, DailyMenu, MenuSlots, Slot},
        schedule::PublishWeekRequest,
    },
    services::{menu::MenuService, metrics::PUBLISHES_COUNTER},
};

pub const DAYS_PER_WEEK: i64 = 7;

/// One cell of the weekly grid, written "YYYY-MM-DD|slot" on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub date: NaiveDate,
    pub slot: Slot,
}

impl CellKey {
    pub fn new(date: NaiveDate, slot: Slot) -> Self {
        Self { date, slot }
    }
}

impl std::fmt::Display for CellKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.date.format("%Y-%m-%d"), self.slot)
    }
}

impl std::str::FromStr for CellKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (date, slot) = s
            .split_once('|')
            .ok_or_else(|| anyhow::anyhow!("Invalid cell key: {s}"))?;
        Ok(CellKey::new(date.parse()?, slot.parse()?))
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GridError {
    #[error("{date} is outside the week starting {week_start}")]
    OutsideWeek { date: NaiveDate, week_start: NaiveDate },
    #[error("index {index} is out of range for {cell} ({len} meals)")]
    IndexOutOfRange { cell: CellKey, index: usize, len: usize },
    #[error("Meal {0} does not exist")]
    UnknownMeal(String),
}

impl From<GridError> for AppError {
    fn from(e: GridError) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// The 7-day × 4-slot view of one week, holding resolved meals.
///
/// Built from the `menus` and `meals` collections and edited in memory; it is
/// never stored itself. `to_menus` turns it back into one menu per day.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleGrid {
    week_start: NaiveDate,
    cells: BTreeMap<CellKey, Vec<MealEntry>>,
}

impl ScheduleGrid {
    pub fn empty(week_start: NaiveDate) -> Self {
        Self {
            week_start,
            cells: BTreeMap::new(),
        }
    }

    /// Resolves each day's menu against the meal catalogue.
    ///
    /// A menu belongs to a day when its stored date starts with the day's
    /// "YYYY-MM-DD", so full timestamps match too. Ids with no meal behind
    /// them are dropped and a cell is only created when something is left.
    pub fn build(week_start: NaiveDate, menus: &[Record], catalogue: &HashMap<String, MealEntry>) -> Self {
        let menus: Vec<DailyMenu> = menus.iter().filter_map(DailyMenu::from_record).collect();
        let mut grid = Self::empty(week_start);

        for date in grid.dates() {
            let prefix = date.format("%Y-%m-%d").to_string();
            let Some(menu) = menus.iter().find(|m| m.date.starts_with(&prefix)) else {
                continue;
            };
            for slot in Slot::ALL {
                let resolved: Vec<MealEntry> = menu
                    .meals
                    .get(slot)
                    .iter()
                    .filter_map(|id| catalogue.get(id).cloned())
                    .collect();
                if !resolved.is_empty() {
                    grid.cells.insert(CellKey::new(date, slot), resolved);
                }
            }
        }
        grid
    }

    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.week_start;
        (0..DAYS_PER_WEEK).map(move |i| start + Duration::days(i))
    }

    pub fn cell(&self, key: CellKey) -> &[MealEntry] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty cells in date then slot order.
    pub fn populated(&self) -> impl Iterator<Item = (&CellKey, &Vec<MealEntry>)> {
        self.cells.iter().filter(|(_, meals)| !meals.is_empty())
    }

    fn check_in_week(&self, key: CellKey) -> Result<(), GridError> {
        let offset = (key.date - self.week_start).num_days();
        if (0..DAYS_PER_WEEK).contains(&offset) {
            Ok(())
        } else {
            Err(GridError::OutsideWeek {
                date: key.date,
                week_start: self.week_start,
            })
        }
    }

    fn check_index(&self, key: CellKey, index: usize, len: usize) -> Result<(), GridError> {
        if index < len {
            Ok(())
        } else {
            Err(GridError::IndexOutOfRange { cell: key, index, len })
        }
    }

    /// Moves the meal at `from` to position `to` inside the same cell.
    pub fn reorder(&mut self, key: CellKey, from: usize, to: usize) -> Result<(), GridError> {
        self.check_in_week(key)?;
        let len = self.cell(key).len();
        self.check_index(key, from, len)?;
        self.check_index(key, to, len)?;

        if let Some(meals) = self.cells.get_mut(&key) {
            let moved = meals.remove(from);
            meals.insert(to, moved);
        }
        Ok(())
    }

    /// Inserts a duplicate of `src[from]` at `dst[to]`. The source cell is
    /// left as it was.
    pub fn copy(&mut self, src: CellKey, from: usize, dst: CellKey, to: usize) -> Result<(), GridError> {
        self.check_in_week(src)?;
        self.check_in_week(dst)?;
        let meal = self
            .cell(src)
            .get(from)
            .cloned()
            .ok_or(GridError::IndexOutOfRange {
                cell: src,
                index: from,
                len: self.cell(src).len(),
            })?;
        let dst_len = self.cell(dst).len();
        self.check_index(dst, to, dst_len + 1)?;

        self.cells.entry(dst).or_default().insert(to, meal);
        Ok(())
    }

    /// Drag-and-drop: within one cell it reorders, across cells it copies.
    pub fn drag(&mut self, src: CellKey, from: usize, dst: CellKey, to: usize) -> Result<(), GridError> {
        if src == dst {
            self.reorder(src, from, to)
        } else {
            self.copy(src, from, dst, to)
        }
    }

    /// Appends a meal. The same meal may appear more than once in a cell.
    pub fn add(&mut self, key: CellKey, meal: MealEntry) -> Result<(), GridError> {
        self.check_in_week(key)?;
        self.cells.entry(key).or_default().push(meal);
        Ok(())
    }

    pub fn remove(&mut self, key: CellKey, index: usize) -> Result<MealEntry, GridError> {
        self.check_in_week(key)?;
        self.check_index(key, index, self.cell(key).len())?;

        let meals = self.cells.entry(key).or_default();
        let removed = meals.remove(index);
        if meals.is_empty() {
            self.cells.remove(&key);
        }
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// One menu per day of the week, every slot listed even when empty.
    pub fn to_menus(&self) -> Vec<DailyMenu> {
        self.dates()
            .map(|date| {
                let mut slots = MenuSlots::default();
                for slot in Slot::ALL {
                    *slots.get_mut(slot) = self
                        .cell(CellKey::new(date, slot))
                        .iter()
                        .map(|m| m.id.clone())
                        .collect();
                }
                DailyMenu::for_date(date, slots)
            })
            .collect()
    }

    pub fn to_view(&self) -> WeekView {
        WeekView {
            week_start: self.week_start,
            days: self
                .dates()
                .map(|date| DayView {
                    date,
                    day_of_week: day_name(date.weekday()),
                    meals: Slot::ALL
                        .into_iter()
                        .map(|slot| (slot, self.cell(CellKey::new(date, slot)).to_vec()))
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekView {
    pub week_start: NaiveDate,
    pub days: Vec<DayView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub date: NaiveDate,
    pub day_of_week: &'static str,
    pub meals: BTreeMap<Slot, Vec<MealEntry>>,
}

/// Where an editing session stands. Loading happens inside
/// `ScheduleSession::load`; bridge reads cannot fail, so a session value
/// always starts out `Ready` and there is no load-failure state to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Ready,
    Editing,
    Publishing,
    PublishFailed,
}

/// Outcome of publishing a week: each day is upserted on its own, so some
/// days can commit while others fail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishReport {
    pub committed: Vec<NaiveDate>,
    pub failed: Vec<NaiveDate>,
}

impl PublishReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn into_result(self) -> Result<PublishReport, AppError> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(AppError::PartialPublish {
                committed: self.committed,
                failed: self.failed,
            })
        }
    }
}

/// One editor's working copy of a week. Sessions share nothing; when two
/// editors publish the same day the later write wins.
pub struct ScheduleSession {
    grid: ScheduleGrid,
    catalogue: HashMap<String, MealEntry>,
    state: SessionState,
}

impl ScheduleSession {
    pub async fn load(bridge: &Bridge, week_start: NaiveDate) -> Self {
        let (menus, meals) = tokio::join!(bridge.get_menus(), bridge.get_meals());
        let catalogue = meal_catalogue(&meals);
        let grid = ScheduleGrid::build(week_start, &menus, &catalogue);
        Self {
            grid,
            catalogue,
            state: SessionState::Ready,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn grid(&self) -> &ScheduleGrid {
        &self.grid
    }

    /// Applies one edit. A rejected edit leaves both grid and state as they
    /// were.
    pub fn edit<T>(&mut self, f: impl FnOnce(&mut ScheduleGrid) -> Result<T, GridError>) -> Result<T, GridError> {
        let out = f(&mut self.grid)?;
        self.state = SessionState::Editing;
        Ok(out)
    }

    pub fn reorder(&mut self, key: CellKey, from: usize, to: usize) -> Result<(), GridError> {
        self.edit(|grid| grid.reorder(key, from, to))
    }

    pub fn drag(&mut self, src: CellKey, from: usize, dst: CellKey, to: usize) -> Result<(), GridError> {
        self.edit(|grid| grid.drag(src, from, dst, to))
    }

    pub fn remove(&mut self, key: CellKey, index: usize) -> Result<MealEntry, GridError> {
        self.edit(|grid| grid.remove(key, index))
    }

    /// Appends the catalogue meal with this id to a cell.
    pub fn add_meal(&mut self, key: CellKey, meal_id: &str) -> Result<(), GridError> {
        let meal = self
            .catalogue
            .get(meal_id)
            .cloned()
            .ok_or_else(|| GridError::UnknownMeal(meal_id.to_string()))?;
        self.edit(|grid| grid.add(key, meal))
    }

    /// Upserts every day of the week, one independent write per day.
    pub async fn publish(&mut self, bridge: &Bridge) -> PublishReport {
        self.state = SessionState::Publishing;
        let mut report = PublishReport::default();

        for (date, menu) in self.grid.dates().zip(self.grid.to_menus()) {
            match MenuService::upsert(bridge, menu).await {
                Ok(_) => report.committed.push(date),
                Err(e) => {
                    warn!("Publishing menu for {date} failed: {e}");
                    report.failed.push(date);
                }
            }
        }

        if report.is_complete() {
            self.state = SessionState::Ready;
            PUBLISHES_COUNTER.with_label_values(&["ok"]).inc();
            info!("Published week starting {}", self.grid.week_start());
        } else {
            self.state = SessionState::PublishFailed;
            PUBLISHES_COUNTER.with_label_values(&["failed"]).inc();
        }
        report
    }
}

/// Every meal record indexed by its id. Only records without any id are
/// left out.
pub fn meal_catalogue(records: &[Record]) -> HashMap<String, MealEntry> {
    records
        .iter()
        .filter_map(MealEntry::from_record)
        .map(|m| (m.id.clone(), m))
        .collect()
}

pub struct ScheduleService;

impl ScheduleService {
    pub async fn load_week(bridge: &Bridge, week_start: NaiveDate) -> WeekView {
        ScheduleSession::load(bridge, week_start).await.grid().to_view()
    }

    /// Replaces the week with the submitted cells and publishes it. Every
    /// cell key and meal id is checked before the first write.
    pub async fn publish_week(bridge: &Bridge, req: PublishWeekRequest) -> Result<PublishReport, AppError> {
        let mut cells = Vec::with_capacity(req.cells.len());
        for (key, ids) in req.cells {
            let key: CellKey = key
                .parse()
                .map_err(|e: anyhow::Error| AppError::validation(e.to_string()))?;
            cells.push((key, ids));
        }

        let mut session = ScheduleSession::load(bridge, req.week_start).await;
        session.edit(|grid| {
            grid.clear();
            Ok(())
        })?;
        for (key, ids) in cells {
            for id in ids {
                session.add_meal(key, &id)?;
            }
        }

        session.publish(bridge).await.into_result()
    }
}

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

/// Body for POST /api/schedule/publish: the edited week as cell key
/// ("YYYY-MM-DD|slot") to ordered meal ids. Cells left out are published
/// empty.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishWeekRequest {
    pub week_start: NaiveDate,
    #[serde(default)]
    pub cells: BTreeMap<String, Vec<String>>,
}

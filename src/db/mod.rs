pub mod bridge;
pub mod collections;
pub mod local;
pub mod remote;
#[cfg(test)]
pub(crate) mod testing;

use serde_json::{Map, Value};

pub use bridge::Bridge;

/// One schema-free document inside a collection.
pub type Record = Map<String, Value>;

/// The fixed, case-sensitive collection names shared by both backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Waste,
    Menus,
    Feedbacks,
    Meals,
    Notifications,
    Complaints,
    Events,
    Attendance,
}

impl Collection {
    pub const ALL: [Collection; 9] = [
        Collection::Users,
        Collection::Waste,
        Collection::Menus,
        Collection::Feedbacks,
        Collection::Meals,
        Collection::Notifications,
        Collection::Complaints,
        Collection::Events,
        Collection::Attendance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Waste => "waste",
            Collection::Menus => "menus",
            Collection::Feedbacks => "feedbacks",
            Collection::Meals => "meals",
            Collection::Notifications => "notifications",
            Collection::Complaints => "complaints",
            Collection::Events => "events",
            Collection::Attendance => "attendance",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Collection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown collection: {s}"))
    }
}

/// Which store answered a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Remote,
    Local,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Remote => "remote",
            Backend::Local => "local",
        }
    }
}

/// Result of a read, tagged with the backend that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Served<T> {
    pub value: T,
    pub backend: Backend,
}

/// Where a write ended up. `Dropped` means the remote write (if any) failed
/// and the local fallback could not be written either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Remote,
    Local,
    Dropped,
}

impl WriteOutcome {
    pub fn is_committed(self) -> bool {
        !matches!(self, WriteOutcome::Dropped)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WriteOutcome::Remote => "remote",
            WriteOutcome::Local => "local",
            WriteOutcome::Dropped => "dropped",
        }
    }
}

/// Backend failures. These never leave the bridge; they are logged and
/// turned into a fallback.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("remote store unavailable: {0}")]
    BackendUnavailable(String),
    #[error("remote store rejected {collection}: HTTP {status}")]
    RemoteStatus { collection: String, status: u16 },
    #[error("local snapshot I/O failed: {0}")]
    LocalIo(#[from] std::io::Error),
    #[error("local snapshot is not valid JSON: {0}")]
    LocalFormat(#[from] serde_json::Error),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::BackendUnavailable(e.to_string())
    }
}

/// Returns the identifier of a record, checking `_id` then `id`.
/// Numeric ids are rendered as strings.
pub fn record_id(record: &Record) -> Option<String> {
    ["_id", "id"].iter().find_map(|key| match record.get(*key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Serializes a typed value into a record.
pub fn to_record<T: serde::Serialize>(value: &T) -> anyhow::Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(record) => Ok(record),
        other => Err(anyhow::anyhow!("expected a JSON object, got {other}")),
    }
}

/// Turns a stored collection, as the remote store returns it or as the
/// snapshot holds it, into an ordered list of records. Every read path goes
/// through here.
///
/// - `null` (collection never written) becomes an empty list.
/// - An object keyed by store keys becomes a list in key order; records
///   lacking `_id`/`id` get the store key as `_id`.
/// - An array (the snapshot layout, or remote dense integer keys) keeps its
///   order, skips `null` holes and uses the index as the key.
///
/// Non-object entries are dropped.
pub fn normalize(value: Value) -> Vec<Record> {
    let keyed: Vec<(String, Value)> = match value {
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => return Vec::new(),
    };

    keyed
        .into_iter()
        .filter_map(|(key, v)| match v {
            Value::Object(mut record) => {
                if record_id(&record).is_none() {
                    record.insert("_id".into(), Value::String(key));
                }
                Some(record)
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_null_is_empty() {
        assert!(normalize(Value::Null).is_empty());
    }

    #[test]
    fn test_normalize_keyed_object_synthesizes_ids_in_key_order() {
        let raw = json!({
            "-Nb1": { "name": "Idli" },
            "-Nb2": { "_id": "own", "name": "Dosa" },
            "-Nb3": { "id": 42, "name": "Poha" }
        });
        let records = normalize(raw);
        let ids: Vec<_> = records.iter().filter_map(record_id).collect();
        assert_eq!(ids, vec!["-Nb1", "own", "42"]);
        assert_eq!(records[0]["name"], "Idli");
        // an explicit id is never overwritten
        assert!(records[1].get("id").is_none());
    }

    #[test]
    fn test_normalize_array_skips_holes() {
        let raw = json!([{ "name": "a" }, null, { "name": "c" }, 7]);
        let records = normalize(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(record_id(&records[0]).as_deref(), Some("0"));
        assert_eq!(record_id(&records[1]).as_deref(), Some("2"));
    }

    #[test]
    fn test_collection_names_round_trip() {
        for c in Collection::ALL {
            assert_eq!(c.as_str().parse::<Collection>().unwrap(), c);
        }
        assert!("Meals".parse::<Collection>().is_err());
    }
}

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::{normalize, Collection, Record, StoreError};

/// The on-disk fallback: a single JSON object whose keys are the collection
/// names, each holding an array of records.
///
/// All access goes through `lock`, so reads and read-modify-write cycles
/// from this process never interleave. Another process writing the same
/// file is not guarded against.
pub struct LocalSnapshot {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directory and an all-empty snapshot if the file
    /// does not exist yet.
    pub async fn ensure_initialized(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }
        self.write_document(empty_document()).await
    }

    /// Reads one collection. Any I/O or parse error is logged and yields an
    /// empty list.
    pub async fn read(&self, collection: Collection) -> Vec<Record> {
        let _guard = self.lock.lock().await;
        match self.read_document().await {
            Ok(doc) => records_of(&doc, collection),
            Err(e) => {
                tracing::error!("Error reading local snapshot {:?}: {e}", self.path);
                Vec::new()
            }
        }
    }

    /// Replaces one collection inside the snapshot, leaving the others as
    /// they are.
    pub async fn write(&self, collection: Collection, records: &[Record]) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = match self.read_document().await {
            Ok(doc) => doc,
            Err(StoreError::LocalIo(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                empty_document()
            }
            Err(e) => return Err(e),
        };
        let array = records.iter().cloned().map(Value::Object).collect();
        doc.insert(collection.as_str().to_string(), Value::Array(array));
        self.write_document(doc).await
    }

    async fn read_document(&self) -> Result<Map<String, Value>, StoreError> {
        let content = tokio::fs::read(&self.path).await?;
        match serde_json::from_slice::<Value>(&content)? {
            Value::Object(doc) => Ok(doc),
            _ => Ok(empty_document()),
        }
    }

    async fn write_document(&self, mut doc: Map<String, Value>) -> Result<(), StoreError> {
        for c in Collection::ALL {
            doc.entry(c.as_str().to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(&Value::Object(doc))?;
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn empty_document() -> Map<String, Value> {
    Collection::ALL
        .into_iter()
        .map(|c| (c.as_str().to_string(), Value::Array(Vec::new())))
        .collect()
}

/// Records missing an id get their array index, the same rule remote reads
/// follow for store keys.
fn records_of(doc: &Map<String, Value>, collection: Collection) -> Vec<Record> {
    normalize(doc.get(collection.as_str()).cloned().unwrap_or(Value::Null))
}

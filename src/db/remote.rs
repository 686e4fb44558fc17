use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::{normalize, Collection, Record, StoreError};

/// Client for a realtime-database style REST document store, where each
/// collection lives at `{base_url}/{name}.json` and is read or replaced as a
/// whole.
pub struct RemoteStore {
    client: Client,
    base_url: String,
    auth: Option<String>,
}

impl RemoteStore {
    /// Every request made through this client is bounded by `timeout`.
    pub fn new(base_url: &str, auth: Option<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn url(&self, path: &str) -> String {
        match &self.auth {
            Some(token) => format!("{}/{path}.json?auth={token}", self.base_url),
            None => format!("{}/{path}.json", self.base_url),
        }
    }

    /// Cheap reachability check used at startup and on lazy re-probes.
    /// `shallow=true` keeps the store from sending the whole tree back.
    pub async fn probe(&self) -> Result<(), StoreError> {
        let url = self.url("");
        let sep = if url.contains('?') { '&' } else { '?' };
        let response = self
            .client
            .get(format!("{url}{sep}shallow=true"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(StoreError::RemoteStatus {
                collection: "/".into(),
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    pub async fn fetch(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        let response = self.client.get(self.url(collection.as_str())).send().await?;
        if !response.status().is_success() {
            return Err(StoreError::RemoteStatus {
                collection: collection.to_string(),
                status: response.status().as_u16(),
            });
        }
        let body: Value = response.json().await?;
        Ok(normalize(body))
    }

    /// Full-replace write of the collection with exactly `records`.
    pub async fn replace(&self, collection: Collection, records: &[Record]) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.url(collection.as_str()))
            .json(records)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("Remote store error {status} writing {collection}: {text}");
            return Err(StoreError::RemoteStatus {
                collection: collection.to_string(),
                status,
            });
        }
        Ok(())
    }
}

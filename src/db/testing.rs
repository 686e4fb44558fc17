//! An in-process document store speaking the same REST shape as the remote
//! store (`GET`/`PUT {base}/{name}.json`), served by axum on a loopback port.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;

#[derive(Clone, Default)]
struct Documents {
    docs: Arc<Mutex<HashMap<String, Value>>>,
    puts_left: Arc<AtomicUsize>,
}

pub(crate) struct FakeStore {
    pub url: String,
    state: Documents,
}

impl FakeStore {
    /// Starts a store that accepts `puts_allowed` writes and answers 503 to
    /// every write after that. Reads always succeed.
    pub async fn start(puts_allowed: usize) -> Self {
        let state = Documents::default();
        state.puts_left.store(puts_allowed, Ordering::SeqCst);

        let app = Router::new()
            .route("/{file}", get(read_doc).put(write_doc))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url, state }
    }

    pub fn set(&self, name: &str, value: Value) {
        self.state.docs.lock().unwrap().insert(name.to_string(), value);
    }

    pub fn doc(&self, name: &str) -> Value {
        self.state.docs.lock().unwrap().get(name).cloned().unwrap_or(Value::Null)
    }
}

async fn read_doc(State(state): State<Documents>, Path(file): Path<String>) -> Json<Value> {
    let name = file.trim_end_matches(".json");
    let docs = state.docs.lock().unwrap();
    Json(docs.get(name).cloned().unwrap_or(Value::Null))
}

async fn write_doc(
    State(state): State<Documents>,
    Path(file): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    let accepted = state
        .puts_left
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if !accepted {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    let name = file.trim_end_matches(".json").to_string();
    state.docs.lock().unwrap().insert(name, body);
    StatusCode::OK
}

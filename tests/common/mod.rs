// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers: an in-process stand-in for the hosted backend
//! and a test app wired to it.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::{Json, Router};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use nestbox::config::Config;
use nestbox::routes::create_router;
use nestbox::AppState;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// One request received by the mock backend.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: HeaderMap,
    pub body: Value,
}

#[allow(dead_code)]
impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

type Responder = dyn Fn(&RecordedRequest) -> (StatusCode, Value) + Send + Sync;

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responder: Arc<Responder>,
}

/// HTTP server answering every path through `responder` and recording
/// what it was sent.
pub struct MockBackend {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[allow(dead_code)]
impl MockBackend {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (StatusCode, Value) + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            requests: requests.clone(),
            responder: Arc::new(responder),
        };

        let app = Router::new().fallback(record).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose path ends with `suffix`.
    pub fn requests_to(&self, suffix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with(suffix))
            .collect()
    }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let request = RecordedRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().unwrap_or("").to_string(),
        headers,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };

    let (status, body) = (state.responder)(&request);
    state.requests.lock().unwrap().push(request);
    (status, Json(body))
}

/// URL of a port nothing is listening on.
#[allow(dead_code)]
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Create a test app whose backend is `backend_url`.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(backend_url: &str) -> (axum::Router, Arc<AppState>) {
    let config = Config {
        supabase_url: backend_url.to_string(),
        ..Config::test_default()
    };
    let state = Arc::new(AppState::new(config));
    (create_router(state.clone()), state)
}

/// Access token for `user_id`, signed with the test config's JWT secret.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str) -> String {
    let secret = Config::test_default()
        .supabase_jwt_secret
        .expect("test config has a JWT secret");
    let claims = serde_json::json!({
        "sub": user_id,
        "exp": chrono::Utc::now().timestamp() + 3600,
        "aud": "authenticated",
        "role": "authenticated",
        "email": format!("{}@example.org", user_id),
    });

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&secret),
    )
    .unwrap()
}

/// Profile row as the backend would return it.
#[allow(dead_code)]
pub fn profile_row(id: &str, role: &str) -> Value {
    serde_json::json!({
        "id": id,
        "email": format!("{}@example.org", id),
        "full_name": id,
        "role": role,
        "total_observations": 2,
        "total_maintenance_tasks": 0,
    })
}

/// Nest box row as the backend would return it.
#[allow(dead_code)]
pub fn nest_box_row(id: &str, name: &str, status: &str) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "latitude": 37.3861,
        "longitude": -122.0839,
        "box_type": "bluebird",
        "target_species": ["Western Bluebird"],
        "status": status,
        "qr_code": null,
    })
}

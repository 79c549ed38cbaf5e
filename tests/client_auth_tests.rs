// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth client tests against a mock auth API.

use axum::http::{Method, StatusCode};
use nestbox::client::{
    AuthChangeEvent, ClientError, Credentials, NestboxClient, Session, SessionStore,
};
use serde_json::{json, Value};

mod common;
use common::{unreachable_url, MockBackend, RecordedRequest};

fn credentials(email: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: "correct horse".to_string(),
    }
}

fn token_response(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh-1",
        "user": {"id": "u1", "email": "a@b.com", "aud": "authenticated"},
    })
}

/// Minimal auth API: signup without auto-confirm, password and refresh
/// grants, logout and user lookup. REST calls echo their body.
fn auth_api(req: &RecordedRequest) -> (StatusCode, Value) {
    match (req.method.as_str(), req.path.as_str(), req.query.as_str()) {
        ("POST", "/auth/v1/signup", _) => (
            StatusCode::OK,
            json!({"id": "u1", "email": req.body["email"]}),
        ),
        ("POST", "/auth/v1/token", "grant_type=password") => {
            if req.body["password"] == "correct horse" {
                (StatusCode::OK, token_response("access-1"))
            } else {
                (
                    StatusCode::BAD_REQUEST,
                    json!({"error": "invalid_grant", "error_description": "Invalid login credentials"}),
                )
            }
        }
        ("POST", "/auth/v1/token", "grant_type=refresh_token") => {
            (StatusCode::OK, token_response("access-2"))
        }
        ("POST", "/auth/v1/logout", _) => (StatusCode::NO_CONTENT, Value::Null),
        ("GET", "/auth/v1/user", _) => (
            StatusCode::OK,
            json!({"id": "u1", "email": "a@b.com", "role": "authenticated"}),
        ),
        ("POST", path, _) if path.starts_with("/rest/v1/") => {
            (StatusCode::CREATED, json!([req.body.clone()]))
        }
        _ => (StatusCode::NOT_FOUND, json!({"message": "not found"})),
    }
}

#[tokio::test]
async fn test_sign_up_creates_volunteer_profile() {
    let backend = MockBackend::start(auth_api).await;
    let client = NestboxClient::new(&backend.url, "anon-key");

    let response = client.auth().sign_up(&credentials("a@b.com")).await.unwrap();
    assert_eq!(response.user.unwrap().id, "u1");
    assert!(response.session.is_none());
    assert!(client.auth().get_session().is_none());

    let inserts = backend.requests_to("/rest/v1/profiles");
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0].method, Method::POST);
    assert_eq!(
        inserts[0].body,
        json!({"id": "u1", "email": "a@b.com", "full_name": "a", "role": "volunteer"})
    );
}

#[tokio::test]
async fn test_sign_up_succeeds_when_profile_insert_fails() {
    let backend = MockBackend::start(|req| {
        if req.path.starts_with("/rest/v1/") {
            (
                StatusCode::CONFLICT,
                json!({"code": "23505", "message": "duplicate key value"}),
            )
        } else {
            auth_api(req)
        }
    })
    .await;
    let client = NestboxClient::new(&backend.url, "anon-key");

    let response = client.auth().sign_up(&credentials("jane@example.org")).await;
    assert!(response.is_ok());
    assert_eq!(backend.requests_to("/rest/v1/profiles").len(), 1);
}

#[tokio::test]
async fn test_sign_in_stores_session_and_uses_it() {
    let backend = MockBackend::start(auth_api).await;
    let client = NestboxClient::new(&backend.url, "anon-key");

    let response = client
        .auth()
        .sign_in_with_password(&credentials("a@b.com"))
        .await
        .unwrap();
    assert_eq!(response.session.unwrap().access_token, "access-1");

    let session = client.auth().get_session().unwrap();
    assert_eq!(session.access_token, "access-1");
    assert!(session.expires_at.is_some());

    let user = client.auth().get_user().await.unwrap().unwrap();
    assert_eq!(user.id, "u1");

    let lookup = backend.requests_to("/auth/v1/user");
    assert_eq!(lookup[0].header("authorization"), Some("Bearer access-1"));
}

#[tokio::test]
async fn test_sign_in_rejected() {
    let backend = MockBackend::start(auth_api).await;
    let client = NestboxClient::new(&backend.url, "anon-key");

    let mut creds = credentials("a@b.com");
    creds.password = "wrong password".to_string();
    let err = client.auth().sign_in_with_password(&creds).await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.message(), "Invalid login credentials");
    assert!(client.auth().get_session().is_none());
}

#[tokio::test]
async fn test_get_user_without_session_makes_no_request() {
    let backend = MockBackend::start(auth_api).await;
    let client = NestboxClient::new(&backend.url, "anon-key");

    assert!(client.auth().get_user().await.unwrap().is_none());
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_sign_out_clears_session_even_if_logout_fails() {
    let client = NestboxClient::new(unreachable_url().await, "anon-key")
        .with_session(Session::from_access_token("stale"));

    client.auth().sign_out().await;
    assert!(client.auth().get_session().is_none());
}

#[tokio::test]
async fn test_sign_out_revokes_with_bearer() {
    let backend = MockBackend::start(auth_api).await;
    let client = NestboxClient::new(&backend.url, "anon-key");
    client
        .auth()
        .sign_in_with_password(&credentials("a@b.com"))
        .await
        .unwrap();

    client.auth().sign_out().await;

    let logout = backend.requests_to("/auth/v1/logout");
    assert_eq!(logout.len(), 1);
    assert_eq!(logout[0].header("authorization"), Some("Bearer access-1"));
    assert!(client.auth().get_session().is_none());
}

#[tokio::test]
async fn test_refresh_session() {
    let backend = MockBackend::start(auth_api).await;
    let client = NestboxClient::new(&backend.url, "anon-key");

    let err = client.auth().refresh_session().await.unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));

    client
        .auth()
        .sign_in_with_password(&credentials("a@b.com"))
        .await
        .unwrap();
    let session = client.auth().refresh_session().await.unwrap();
    assert_eq!(session.access_token, "access-2");
    assert_eq!(
        client.session_store().access_token().as_deref(),
        Some("access-2")
    );

    let refresh = backend.requests_to("/auth/v1/token");
    assert_eq!(refresh[1].body, json!({"refresh_token": "refresh-1"}));
}

#[tokio::test]
async fn test_network_failure_is_error_not_panic() {
    let client = NestboxClient::new(unreachable_url().await, "anon-key");

    let err = client
        .auth()
        .sign_in_with_password(&credentials("a@b.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Network { .. }));
}

#[tokio::test]
async fn test_auth_events_are_delivered() {
    let backend = MockBackend::start(auth_api).await;
    let store = SessionStore::new();
    let client = NestboxClient::with_session_store(&backend.url, "anon-key", store.clone());

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let subscription = client.auth().on_auth_state_change(move |event, session| {
        let _ = tx.send((event, session.map(|s| s.access_token)));
    });

    let (event, token) = rx.recv().await.unwrap();
    assert_eq!(event, AuthChangeEvent::InitialSession);
    assert!(token.is_none());

    client
        .auth()
        .sign_in_with_password(&credentials("a@b.com"))
        .await
        .unwrap();
    let (event, token) = rx.recv().await.unwrap();
    assert_eq!(event, AuthChangeEvent::SignedIn);
    assert_eq!(token.as_deref(), Some("access-1"));

    // The injected store sees the same session
    assert_eq!(store.access_token().as_deref(), Some("access-1"));

    client.auth().sign_out().await;
    let (event, token) = rx.recv().await.unwrap();
    assert_eq!(event, AuthChangeEvent::SignedOut);
    assert!(token.is_none());

    subscription.unsubscribe();
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data-access adapter for the hosted backend.
//!
//! Translates a small query-builder surface into PostgREST requests and
//! wraps the auth API. This is the only path the rest of the crate uses
//! to reach the backend.

pub mod auth;
pub mod error;
pub mod query;
pub mod session;

pub use auth::{AuthClient, AuthResponse, Credentials};
pub use error::{ClientError, ClientResult};
pub use query::{OrderOptions, QueryBuilder};
pub use session::{AuthChangeEvent, AuthStateChange, Session, SessionStore, Subscription, User};

use crate::config::{ANON_KEY_ENV, BASE_URL_ENV};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

struct Inner {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Backend client: REST query builders plus auth, sharing one session holder.
///
/// Cloning is cheap and clones share both the connection pool and the
/// session holder.
#[derive(Clone)]
pub struct NestboxClient {
    inner: Arc<Inner>,
    session: SessionStore,
}

impl NestboxClient {
    /// Create a client with an empty session holder.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_session_store(base_url, api_key, SessionStore::new())
    }

    /// Create a client around an injected session holder.
    pub fn with_session_store(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        session: SessionStore,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            inner: Arc::new(Inner {
                http: reqwest::Client::new(),
                base_url,
                api_key: api_key.into(),
            }),
            session,
        }
    }

    /// Sibling client sharing the connection pool, with its own holder
    /// seeded with `session`.
    pub fn with_session(&self, session: Session) -> Self {
        Self {
            inner: self.inner.clone(),
            session: SessionStore::with_session(session),
        }
    }

    /// Sibling client sharing the connection pool, with its own empty holder.
    pub fn detached(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            session: SessionStore::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.session
    }

    /// Start a query against `table`.
    pub fn from(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new(self.clone(), table)
    }

    /// Auth operations bound to this client's session holder.
    pub fn auth(&self) -> AuthClient<'_> {
        AuthClient::new(self)
    }

    /// Request with the `apikey` header and, when signed in, a bearer token.
    pub(crate) fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self
            .inner
            .http
            .request(method, url)
            .header("apikey", &self.inner.api_key);

        match self.session.access_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.inner.base_url, path)
    }

    fn rest_url(&self, table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{}", self.inner.base_url, table)
        } else {
            format!("{}/rest/v1/{}?{}", self.inner.base_url, table, query)
        }
    }

    /// Send a PostgREST request and decode the body.
    pub(crate) async fn send_rest(
        &self,
        method: Method,
        table: &str,
        query: &str,
        body: Option<&Value>,
        representation: bool,
    ) -> ClientResult<Value> {
        let url = self.rest_url(table, query);
        tracing::debug!(method = %method, table, query, "PostgREST request");

        let mut builder = self.request(method, &url);
        if representation {
            builder = builder.header("Prefer", "return=representation");
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        send(builder).await
    }
}

/// Send a request and turn the response into a decoded body or an error.
///
/// Transport failures become [`ClientError::Network`]; any non-2xx status
/// becomes [`ClientError::Api`] with the body passed through.
pub(crate) async fn send(builder: reqwest::RequestBuilder) -> ClientResult<Value> {
    let response = builder.send().await.map_err(|e| {
        tracing::warn!(error = %e, "Backend request failed");
        ClientError::network(e)
    })?;

    let status = response.status();
    let text = response.text().await.map_err(ClientError::network)?;
    let parsed = if text.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str::<Value>(&text)
    };

    if status.is_success() {
        return parsed.map_err(ClientError::decode);
    }

    let body = parsed.unwrap_or_else(|_| serde_json::json!({ "message": text }));
    tracing::debug!(status = status.as_u16(), body = %body, "Backend returned error");
    Err(ClientError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Build a client from `SUPABASE_URL` and `SUPABASE_ANON_KEY`.
///
/// Returns `None` (after logging) when either variable is missing or empty.
pub fn create_client() -> Option<NestboxClient> {
    let url = std::env::var(BASE_URL_ENV).ok().filter(|v| !v.is_empty());
    let key = std::env::var(ANON_KEY_ENV).ok().filter(|v| !v.is_empty());

    match (url, key) {
        (Some(url), Some(key)) => Some(NestboxClient::new(url, key)),
        _ => {
            tracing::error!(
                url_var = BASE_URL_ENV,
                key_var = ANON_KEY_ENV,
                "Missing backend environment variables, no client created"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let client = NestboxClient::new("https://project.example.co/", "key");
        assert_eq!(client.base_url(), "https://project.example.co");
        assert_eq!(
            client.rest_url("nest_boxes", "select=%2A"),
            "https://project.example.co/rest/v1/nest_boxes?select=%2A"
        );
        assert_eq!(
            client.rest_url("profiles", ""),
            "https://project.example.co/rest/v1/profiles"
        );
        assert_eq!(
            client.auth_url("token?grant_type=password"),
            "https://project.example.co/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn test_siblings_have_independent_sessions() {
        let client = NestboxClient::new("http://localhost", "key");
        let user_client = client.with_session(Session::from_access_token("user-token"));

        assert!(client.session_store().get().is_none());
        assert_eq!(
            user_client.session_store().access_token().as_deref(),
            Some("user-token")
        );
        assert!(user_client.detached().session_store().get().is_none());

        // Plain clones share the holder
        let same = user_client.clone();
        same.session_store().clear();
        assert!(user_client.session_store().get().is_none());
    }
}

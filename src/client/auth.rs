// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth API wrapper.
//!
//! Handles:
//! - Email/password signup (plus a best-effort `profiles` row)
//! - Password sign-in and token refresh
//! - Sign-out, which always clears the local session
//! - Auth state subscriptions

use super::error::{ClientError, ClientResult};
use super::session::{AuthChangeEvent, Session, Subscription, User};
use super::NestboxClient;
use crate::db::tables;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Email/password pair.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
}

/// Result of signup or sign-in.
///
/// Signup with email confirmation enabled yields a user and no session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthResponse {
    pub user: Option<User>,
    pub session: Option<Session>,
}

/// Auth operations bound to a client's session holder.
pub struct AuthClient<'a> {
    client: &'a NestboxClient,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(client: &'a NestboxClient) -> Self {
        Self { client }
    }

    /// Register a new account.
    ///
    /// On success a `profiles` row is inserted with role `volunteer` and a
    /// name taken from the email local-part. That insert is best-effort: a
    /// failure is logged and the account is left without a profile.
    pub async fn sign_up(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        let builder = self
            .client
            .request(Method::POST, &self.client.auth_url("signup"))
            .json(credentials);
        let body = super::send(builder).await?;

        let response = parse_signup_response(body)?;
        if let Some(session) = &response.session {
            self.client
                .session_store()
                .set(session.clone(), AuthChangeEvent::SignedIn);
        }

        match &response.user {
            Some(user) => self.insert_default_profile(user, &credentials.email).await,
            None => tracing::warn!("Signup response had no user, skipping profile creation"),
        }

        Ok(response)
    }

    async fn insert_default_profile(&self, user: &User, email: &str) {
        let row = serde_json::json!({
            "id": user.id,
            "email": email,
            "full_name": email_local_part(email),
            "role": "volunteer",
        });

        if let Err(e) = self.client.from(tables::PROFILES).insert(&row).execute().await {
            tracing::warn!(
                user_id = %user.id,
                error = %e,
                "Failed to create profile after signup, continuing anyway"
            );
        }
    }

    /// Exchange email/password for a session and keep it in memory.
    pub async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> ClientResult<AuthResponse> {
        let builder = self
            .client
            .request(
                Method::POST,
                &self.client.auth_url("token?grant_type=password"),
            )
            .json(credentials);
        let session = decode_session(super::send(builder).await?)?;

        self.client
            .session_store()
            .set(session.clone(), AuthChangeEvent::SignedIn);
        tracing::info!(email = %credentials.email, "Signed in");

        Ok(AuthResponse {
            user: session.user.clone(),
            session: Some(session),
        })
    }

    /// Revoke the session on the server and clear it locally.
    ///
    /// The local session is cleared even if the logout call fails; the
    /// failure is only logged.
    pub async fn sign_out(&self) {
        let store = self.client.session_store();
        if store.access_token().is_none() {
            return;
        }

        let builder = self
            .client
            .request(Method::POST, &self.client.auth_url("logout"));
        if let Err(e) = super::send(builder).await {
            tracing::warn!(error = %e, "Logout request failed, clearing session anyway");
        }

        store.clear();
    }

    /// Fetch the user for the current session.
    ///
    /// Returns `Ok(None)` without any request when there is no session.
    pub async fn get_user(&self) -> ClientResult<Option<User>> {
        if self.client.session_store().access_token().is_none() {
            return Ok(None);
        }

        let builder = self
            .client
            .request(Method::GET, &self.client.auth_url("user"));
        let body = super::send(builder).await?;
        serde_json::from_value(body)
            .map(Some)
            .map_err(ClientError::decode)
    }

    /// Current in-memory session. Never contacts the server.
    pub fn get_session(&self) -> Option<Session> {
        self.client.session_store().get()
    }

    /// Trade the refresh token for a new session.
    pub async fn refresh_session(&self) -> ClientResult<Session> {
        let refresh_token = self
            .get_session()
            .and_then(|s| s.refresh_token)
            .ok_or(ClientError::NotAuthenticated)?;

        let builder = self
            .client
            .request(
                Method::POST,
                &self.client.auth_url("token?grant_type=refresh_token"),
            )
            .json(&serde_json::json!({ "refresh_token": refresh_token }));
        let session = decode_session(super::send(builder).await?)?;

        self.client
            .session_store()
            .set(session.clone(), AuthChangeEvent::TokenRefreshed);
        tracing::debug!("Session refreshed");

        Ok(session)
    }

    /// Call `callback` with the initial session and on every later
    /// sign-in, sign-out and refresh.
    pub fn on_auth_state_change<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(AuthChangeEvent, Option<Session>) + Send + 'static,
    {
        self.client.session_store().on_change(callback)
    }
}

fn decode_session(body: Value) -> ClientResult<Session> {
    serde_json::from_value::<Session>(body)
        .map(Session::with_computed_expiry)
        .map_err(ClientError::decode)
}

/// Signup returns a full session when auto-confirm is on, otherwise the
/// bare user (sometimes nested under `user`).
fn parse_signup_response(body: Value) -> ClientResult<AuthResponse> {
    if body.get("access_token").is_some() {
        let session = decode_session(body)?;
        return Ok(AuthResponse {
            user: session.user.clone(),
            session: Some(session),
        });
    }

    let user_value = match body.get("user") {
        Some(user) if !user.is_null() => user.clone(),
        _ => body,
    };
    if user_value.get("id").is_none() {
        return Ok(AuthResponse::default());
    }

    let user = serde_json::from_value(user_value).map_err(ClientError::decode)?;
    Ok(AuthResponse {
        user: Some(user),
        session: None,
    })
}

/// Part of an email address before the `@`.
pub fn email_local_part(email: &str) -> &str {
    email.split_once('@').map_or(email, |(local, _)| local)
}

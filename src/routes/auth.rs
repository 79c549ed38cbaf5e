// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password authentication routes.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

use crate::client::{AuthResponse, Credentials, Session, User};
use crate::error::{AppError, Result};
use crate::middleware::auth::{extract_token, SESSION_COOKIE};
use crate::AppState;

/// Cookie lifetime when the auth service does not report one.
const DEFAULT_SESSION_SECS: i64 = 60 * 60;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Create an account. A volunteer profile is created alongside it.
async fn signup(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    credentials.validate()?;

    let client = state.client.detached();
    let response = client.auth().sign_up(&credentials).await?;

    tracing::info!(
        user_id = response.user.as_ref().map(|u| u.id.as_str()).unwrap_or("unknown"),
        confirmed = response.session.is_some(),
        "Account created"
    );

    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: Option<User>,
    pub session: Session,
}

/// Password login. The access token is returned and also set as an
/// HttpOnly cookie so page reloads stay signed in.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    credentials.validate()?;

    let client = state.client.detached();
    let response = client.auth().sign_in_with_password(&credentials).await?;
    let session = response
        .session
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Sign-in returned no session")))?;

    let secure = !is_local(&state.config.frontend_url);
    let max_age = session.expires_in.unwrap_or(DEFAULT_SESSION_SECS);
    let cookie = Cookie::build((SESSION_COOKIE, session.access_token.clone()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(max_age));

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            user: response.user,
            session,
        }),
    ))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Revoke the session with the auth service and drop the cookie.
/// Succeeds even when there was no session or the revoke call failed.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> (CookieJar, Json<LogoutResponse>) {
    if let Some(token) = extract_token(&jar, &headers) {
        state
            .client
            .with_session(Session::from_access_token(token))
            .auth()
            .sign_out()
            .await;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(LogoutResponse { success: true }))
}

fn is_local(url: &str) -> bool {
    url.contains("localhost") || url.contains("127.0.0.1")
}

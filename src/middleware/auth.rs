// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token authentication middleware.
//!
//! Tokens are issued by the backend's auth service. With a JWT secret
//! configured they are verified locally; otherwise the auth API is asked
//! who the token belongs to.

use crate::client::{NestboxClient, Session};
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cookie holding the access token after `/auth/login`.
pub const SESSION_COOKIE: &str = "nestbox_token";

/// Audience the auth service puts in user tokens.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Access token claims we rely on.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (auth user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
    /// Backend role claim, e.g. "authenticated"
    #[serde(default)]
    pub role: Option<String>,
}

/// Authenticated caller, with a client that acts as them.
#[derive(Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
    /// Client whose session holds the caller's token, so row-level
    /// security applies to everything done on their behalf.
    pub client: NestboxClient,
}

/// Access token from the session cookie, else the `Authorization` header.
pub fn extract_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Verify an HS256 access token and return its claims.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[AUTHENTICATED_AUDIENCE]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation).map(|d| d.claims)
}

/// Middleware that requires a valid access token.
///
/// Rejections use the API's JSON error body.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&jar, request.headers()).ok_or(AppError::Unauthorized)?;
    let client = state.client.with_session(Session::from_access_token(&token));

    let (user_id, email) = match &state.config.supabase_jwt_secret {
        Some(secret) => {
            let claims = verify_token(&token, secret).map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                AppError::Unauthorized
            })?;
            (claims.sub, claims.email)
        }
        None => match client.auth().get_user().await {
            Ok(Some(user)) => (user.id, user.email),
            Ok(None) => return Err(AppError::Unauthorized),
            Err(e) => {
                tracing::debug!(error = %e, "Auth API rejected access token");
                return Err(AppError::Unauthorized);
            }
        },
    };

    request.extensions_mut().insert(AuthUser {
        user_id,
        email,
        client,
    });

    Ok(next.run(request).await)
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;

/// Backend base URL (e.g. `https://xyz.supabase.co`).
pub const BASE_URL_ENV: &str = "SUPABASE_URL";
/// Public anonymous API key sent as `apikey` on every request.
pub const ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, without trailing slash
    pub supabase_url: String,
    /// Anonymous API key
    pub supabase_anon_key: String,
    /// JWT secret for verifying access tokens locally. When absent,
    /// tokens are checked against the auth API instead.
    pub supabase_jwt_secret: Option<Vec<u8>>,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Public site URL, used for QR code payloads
    pub public_site_url: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            supabase_url: required(BASE_URL_ENV)?
                .trim_end_matches('/')
                .to_string(),
            supabase_anon_key: required(ANON_KEY_ENV)?,
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(String::into_bytes),
            public_site_url: env::var("PUBLIC_SITE_URL").unwrap_or_else(|_| frontend_url.clone()),
            frontend_url,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            supabase_url: "http://127.0.0.1:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_jwt_secret: Some(b"test_jwt_secret_32_bytes_minimum!".to_vec()),
            frontend_url: "http://localhost:3000".to_string(),
            public_site_url: "https://nestbox.example.org".to_string(),
            port: 8080,
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var(BASE_URL_ENV, "https://project.example.co/");
        env::set_var(ANON_KEY_ENV, "anon");
        env::remove_var("SUPABASE_JWT_SECRET");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.supabase_url, "https://project.example.co");
        assert_eq!(config.supabase_anon_key, "anon");
        assert!(config.supabase_jwt_secret.is_none());
        assert_eq!(config.port, 8080);
    }
}

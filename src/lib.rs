// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! NestBox: community nest box monitoring backend
//!
//! This crate provides the data-access adapter for the hosted backend
//! (PostgREST tables plus the auth API) and the JSON API the volunteer
//! frontend calls for nest boxes, observations, assignments,
//! sponsorships and notifications.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use client::NestboxClient;
use config::Config;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Anonymous client. Requests derive per-user siblings from it.
    pub client: NestboxClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let client = NestboxClient::new(&config.supabase_url, &config.supabase_anon_key);
        Self { config, client }
    }
}

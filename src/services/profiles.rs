// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile lookup, lazy creation and counters.

use crate::client::auth::email_local_part;
use crate::client::{NestboxClient, OrderOptions};
use crate::db::tables;
use crate::error::{AppError, Result};
use crate::models::{NewProfile, Profile, ProfileUpdate, Role};
use crate::time_utils::now_rfc3339;
use serde_json::{Map, Value};
use std::time::Duration;
use validator::Validate;

/// Attempts made when fetching a profile that may not be visible yet.
const PROFILE_FETCH_ATTEMPTS: u32 = 3;
/// Fixed delay between profile fetch attempts.
const PROFILE_FETCH_BACKOFF: Duration = Duration::from_millis(500);

/// Name used when a profile is created without an email.
const FALLBACK_NAME: &str = "Volunteer";

#[derive(Clone)]
pub struct ProfileService {
    client: NestboxClient,
    retry_backoff: Duration,
}

impl ProfileService {
    pub fn new(client: NestboxClient) -> Self {
        Self {
            client,
            retry_backoff: PROFILE_FETCH_BACKOFF,
        }
    }

    /// Override the delay between fetch attempts.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Get a profile by user id.
    pub async fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        let rows: Vec<Profile> = self
            .client
            .from(tables::PROFILES)
            .select("*")
            .eq("id", user_id)
            .execute()
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Get a profile, retrying backend failures with a fixed backoff.
    async fn get_with_retry(&self, user_id: &str) -> Result<Option<Profile>> {
        let mut attempt = 1;
        loop {
            match self.get(user_id).await {
                Ok(profile) => return Ok(profile),
                Err(e) if attempt < PROFILE_FETCH_ATTEMPTS => {
                    tracing::warn!(user_id, attempt, error = %e, "Profile fetch failed, retrying");
                    tokio::time::sleep(self.retry_backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Return the user's profile, creating a volunteer profile if missing.
    ///
    /// Signup only creates the profile best-effort, so accounts without one
    /// are expected.
    pub async fn ensure(&self, user_id: &str, email: Option<&str>) -> Result<Profile> {
        if let Some(profile) = self.get_with_retry(user_id).await? {
            return Ok(profile);
        }

        tracing::info!(user_id, "No profile found, creating one");
        let new_profile = NewProfile {
            id: user_id.to_string(),
            email: email.map(str::to_string),
            full_name: email
                .map(email_local_part)
                .unwrap_or(FALLBACK_NAME)
                .to_string(),
            role: Role::Volunteer,
        };

        let profile = self
            .client
            .from(tables::PROFILES)
            .insert(&new_profile)
            .select()
            .single()
            .execute()
            .await?;
        Ok(profile)
    }

    /// Apply a user's own profile edits.
    pub async fn update(&self, user_id: &str, update: &ProfileUpdate) -> Result<Profile> {
        update.validate()?;
        if update.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }

        let mut body = match serde_json::to_value(update) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        body.insert("updated_at".to_string(), Value::String(now_rfc3339()));

        self.update_one(user_id, body).await
    }

    pub async fn increment_observations(&self, user_id: &str) -> Result<Profile> {
        self.increment(user_id, "total_observations", |p| p.total_observations)
            .await
    }

    pub async fn increment_maintenance_tasks(&self, user_id: &str) -> Result<Profile> {
        self.increment(user_id, "total_maintenance_tasks", |p| {
            p.total_maintenance_tasks
        })
        .await
    }

    /// Read-modify-write of a counter column. Not atomic: concurrent
    /// increments for one user can lose updates.
    async fn increment(
        &self,
        user_id: &str,
        column: &str,
        current: fn(&Profile) -> i64,
    ) -> Result<Profile> {
        let profile = self
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {}", user_id)))?;

        let mut body = Map::new();
        body.insert(column.to_string(), Value::from(current(&profile) + 1));
        self.update_one(user_id, body).await
    }

    async fn update_one(&self, user_id: &str, body: Map<String, Value>) -> Result<Profile> {
        let rows: Vec<Profile> = self
            .client
            .from(tables::PROFILES)
            .update(&body)
            .eq("id", user_id)
            .select()
            .execute()
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Profile {}", user_id)))
    }

    /// All profiles with `role`, by name.
    pub async fn list_by_role(&self, role: Role) -> Result<Vec<Profile>> {
        let rows = self
            .client
            .from(tables::PROFILES)
            .select("*")
            .eq("role", role)
            .order("full_name", OrderOptions::ascending())
            .execute()
            .await?;
        Ok(rows)
    }

    /// Fail with `Forbidden` unless the user is an admin.
    pub async fn require_admin(&self, user_id: &str) -> Result<Profile> {
        match self.get(user_id).await? {
            Some(profile) if profile.is_admin() => Ok(profile),
            _ => Err(AppError::Forbidden("Admin role required".to_string())),
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Observation logging.
//!
//! Logging an observation:
//! 1. Validate and insert the activity log
//! 2. If maintenance was flagged, mark the box and tell the admins
//! 3. Bump the volunteer's observation counter
//!
//! Steps 2 and 3 are best-effort: the observation is already saved.

use crate::client::{NestboxClient, OrderOptions};
use crate::db::tables;
use crate::error::{AppError, Result};
use crate::models::{ActivityLog, NestBoxStatus, NotificationKind, ObservationForm, Role};
use crate::services::{NestBoxService, NotificationService, ProfileService};
use crate::time_utils::today_iso_date;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Observation totals for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObservationSummary {
    pub total: usize,
    pub unverified: usize,
}

#[derive(Clone)]
pub struct ObservationService {
    client: NestboxClient,
}

impl ObservationService {
    pub fn new(client: NestboxClient) -> Self {
        Self { client }
    }

    pub async fn log(&self, volunteer_id: &str, form: ObservationForm) -> Result<ActivityLog> {
        form.validate()?;
        let new_log = form.into_new_log(volunteer_id, today_iso_date());

        let log: ActivityLog = self
            .client
            .from(tables::ACTIVITY_LOGS)
            .insert(&new_log)
            .select()
            .single()
            .execute()
            .await?;

        tracing::info!(
            log_id = %log.id,
            nest_box_id = %log.nest_box_id,
            volunteer_id,
            maintenance_needed = log.maintenance_needed,
            "Observation logged"
        );

        if log.maintenance_needed {
            self.flag_maintenance(&log).await;
        }

        if let Err(e) = ProfileService::new(self.client.clone())
            .increment_observations(volunteer_id)
            .await
        {
            tracing::warn!(volunteer_id, error = %e, "Failed to update observation count");
        }

        Ok(log)
    }

    async fn flag_maintenance(&self, log: &ActivityLog) {
        if let Err(e) = NestBoxService::new(self.client.clone())
            .update_status(&log.nest_box_id, NestBoxStatus::MaintenanceNeeded)
            .await
        {
            tracing::warn!(nest_box_id = %log.nest_box_id, error = %e, "Failed to flag box for maintenance");
        }

        let message = match log.maintenance_notes.as_deref() {
            Some(notes) => format!("Nest box {} needs maintenance: {}", log.nest_box_id, notes),
            None => format!("Nest box {} needs maintenance", log.nest_box_id),
        };
        if let Err(e) = NotificationService::new(self.client.clone())
            .notify_role(
                Role::Admin,
                "Maintenance reported",
                &message,
                NotificationKind::Maintenance,
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to notify admins of maintenance");
        }
    }

    /// Observations for one box, newest first.
    pub async fn list_for_box(&self, nest_box_id: &str) -> Result<Vec<ActivityLog>> {
        self.list_by("nest_box_id", nest_box_id).await
    }

    /// A volunteer's observations, newest first.
    pub async fn list_for_volunteer(&self, volunteer_id: &str) -> Result<Vec<ActivityLog>> {
        self.list_by("volunteer_id", volunteer_id).await
    }

    async fn list_by(&self, column: &str, value: &str) -> Result<Vec<ActivityLog>> {
        let logs = self
            .client
            .from(tables::ACTIVITY_LOGS)
            .select("*")
            .eq(column, value)
            .order("observation_date", OrderOptions::descending())
            .execute()
            .await?;
        Ok(logs)
    }

    /// Mark an observation verified.
    pub async fn verify(&self, log_id: &str) -> Result<ActivityLog> {
        let rows: Vec<ActivityLog> = self
            .client
            .from(tables::ACTIVITY_LOGS)
            .update(&serde_json::json!({ "verified": true }))
            .eq("id", log_id)
            .select()
            .execute()
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Observation {}", log_id)))
    }

    pub async fn summary(&self) -> Result<ObservationSummary> {
        #[derive(Deserialize)]
        struct VerifiedOnly {
            #[serde(default)]
            verified: Option<bool>,
        }

        let rows: Vec<VerifiedOnly> = self
            .client
            .from(tables::ACTIVITY_LOGS)
            .select("id,verified")
            .execute()
            .await?;

        Ok(ObservationSummary {
            total: rows.len(),
            unverified: rows.iter().filter(|r| r.verified != Some(true)).count(),
        })
    }
}

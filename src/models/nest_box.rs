// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nest box model and the form used to register one.

use super::null_as_default;
use super::validation::{validate_iso_date, validate_latitude, validate_longitude, validate_not_blank};
use serde::{Deserialize, Serialize};
use validator::Validate;

db_enum! {
    /// Lifecycle status of a box.
    NestBoxStatus {
        Active => "active",
        Inactive => "inactive",
        MaintenanceNeeded => "maintenance_needed",
        Removed => "removed",
        /// Submitted by a volunteer, awaiting admin review
        PendingReview => "pending_review",
    }
}

/// Row in `nest_boxes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestBox {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub box_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_species: Vec<String>,
    pub status: NestBoxStatus,
    /// Opaque QR payload (URL of the box page)
    pub qr_code: Option<String>,
    pub installation_date: Option<String>,
    pub last_maintenance_date: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<String>,
}

impl NestBox {
    /// Needs an admin's or volunteer's attention.
    pub fn needs_attention(&self) -> bool {
        matches!(
            self.status,
            NestBoxStatus::MaintenanceNeeded | NestBoxStatus::PendingReview
        )
    }
}

/// Insert payload for `nest_boxes`.
#[derive(Debug, Clone, Serialize)]
pub struct NewNestBox {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_type: Option<String>,
    pub target_species: Vec<String>,
    pub status: NestBoxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: String,
}

/// Box registration form. Coordinates arrive as typed text.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NestBoxForm {
    #[validate(length(max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(custom(function = "validate_latitude"))]
    pub latitude: String,
    #[validate(custom(function = "validate_longitude"))]
    pub longitude: String,
    #[validate(length(max = 50))]
    pub box_type: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub target_species: Vec<String>,
    #[validate(custom(function = "validate_iso_date"))]
    pub installation_date: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl NestBoxForm {
    /// Parsed `(latitude, longitude)`; `None` if either is not a number.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.trim().parse().ok()?;
        let lng = self.longitude.trim().parse().ok()?;
        Some((lat, lng))
    }
}

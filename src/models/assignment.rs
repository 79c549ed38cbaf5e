// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Volunteer assignment model.

use super::null_as_default;
use super::validation::{validate_iso_date, validate_not_blank};
use serde::{Deserialize, Serialize};
use validator::Validate;

db_enum! {
    AssignmentType {
        Monitoring => "monitoring",
        Maintenance => "maintenance",
        Installation => "installation",
        Removal => "removal",
    }
}

db_enum! {
    AssignmentStatus {
        Assigned => "assigned",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

db_enum! {
    #[derive(Default)]
    Priority {
        Low => "low",
        #[default]
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

/// Row in `volunteer_assignments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolunteerAssignment {
    pub id: String,
    pub nest_box_id: String,
    pub volunteer_id: String,
    pub assigned_by: Option<String>,
    pub assignment_type: AssignmentType,
    pub status: AssignmentStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    pub assigned_date: Option<String>,
    pub due_date: Option<String>,
    pub completed_date: Option<String>,
    pub notes: Option<String>,
}

impl VolunteerAssignment {
    /// Still on the volunteer's to-do list.
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            AssignmentStatus::Assigned | AssignmentStatus::InProgress
        )
    }
}

/// Insert payload for `volunteer_assignments`.
#[derive(Debug, Clone, Serialize)]
pub struct NewAssignment {
    pub nest_box_id: String,
    pub volunteer_id: String,
    pub assigned_by: String,
    pub assignment_type: AssignmentType,
    pub status: AssignmentStatus,
    pub priority: Priority,
    pub assigned_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Admin form for assigning work to a volunteer.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignmentForm {
    #[validate(custom(function = "validate_not_blank"))]
    pub nest_box_id: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub volunteer_id: String,
    pub assignment_type: AssignmentType,
    #[serde(default)]
    pub priority: Priority,
    #[validate(custom(function = "validate_iso_date"))]
    pub due_date: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

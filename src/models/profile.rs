// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Volunteer/admin profile model.

use super::null_as_default;
use serde::{Deserialize, Serialize};
use validator::Validate;

db_enum! {
    /// Application role (distinct from the backend's auth role).
    #[derive(Default)]
    Role {
        #[default]
        Volunteer => "volunteer",
        Admin => "admin",
        Sponsor => "sponsor",
        Guest => "guest",
    }
}

/// Row in `profiles`. The id matches the auth user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Number of observations logged
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_observations: i64,
    /// Number of completed maintenance assignments
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_maintenance_tasks: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Insert payload for `profiles`.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: String,
    pub role: Role,
}

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub address: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.phone.is_none() && self.address.is_none()
    }
}

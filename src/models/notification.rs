// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-app notifications.

use super::null_as_default;
use serde::{Deserialize, Serialize};

db_enum! {
    NotificationKind {
        Assignment => "assignment",
        Maintenance => "maintenance",
        Observation => "observation",
        System => "system",
    }
}

/// Row in `notifications`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub read: bool,
    pub created_at: Option<String>,
}

/// Insert payload for `notifications`.
#[derive(Debug, Clone, Serialize)]
pub struct NewNotification {
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub read: bool,
}

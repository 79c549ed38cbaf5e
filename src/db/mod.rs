// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend schema names.

/// Table names as constants.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const NEST_BOXES: &str = "nest_boxes";
    pub const ACTIVITY_LOGS: &str = "activity_logs";
    pub const VOLUNTEER_ASSIGNMENTS: &str = "volunteer_assignments";
    pub const SPONSORS: &str = "sponsors";
    pub const NOTIFICATIONS: &str = "notifications";
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - application flows built on the data-access adapter.

pub mod assignments;
pub mod nest_boxes;
pub mod notifications;
pub mod observations;
pub mod profiles;
pub mod sponsorships;

pub use assignments::{Actor, AssignmentService};
pub use nest_boxes::{NestBoxService, StatusCount};
pub use notifications::NotificationService;
pub use observations::{ObservationService, ObservationSummary};
pub use profiles::ProfileService;
pub use sponsorships::SponsorshipService;

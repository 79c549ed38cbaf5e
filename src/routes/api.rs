// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    ActivityLog, AssignmentForm, NestBox, NestBoxForm, NestBoxStatus, Notification,
    ObservationForm, Profile, ProfileUpdate, Role, Sponsor, SponsorshipForm, VolunteerAssignment,
};
use crate::services::{
    Actor, AssignmentService, NestBoxService, NotificationService, ObservationService,
    ObservationSummary, ProfileService, SponsorshipService, StatusCount,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Longest accepted search term.
const MAX_SEARCH_LEN: usize = 100;

/// API routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).patch(update_me))
        .route("/api/nest-boxes", get(list_nest_boxes).post(create_nest_box))
        .route("/api/nest-boxes/attention", get(list_needing_attention))
        .route("/api/nest-boxes/{id}", get(get_nest_box))
        .route("/api/nest-boxes/{id}/status", patch(update_nest_box_status))
        .route("/api/nest-boxes/{id}/qr-code", post(assign_qr_code))
        .route("/api/nest-boxes/{id}/observations", get(list_box_observations))
        .route("/api/nest-boxes/{id}/sponsors", get(list_box_sponsors))
        .route(
            "/api/observations",
            get(list_my_observations).post(log_observation),
        )
        .route("/api/observations/{id}/verify", post(verify_observation))
        .route(
            "/api/assignments",
            get(list_my_assignments).post(create_assignment),
        )
        .route("/api/assignments/{id}/start", post(start_assignment))
        .route("/api/assignments/{id}/complete", post(complete_assignment))
        .route("/api/assignments/{id}/cancel", post(cancel_assignment))
        .route("/api/sponsorships", post(create_sponsorship))
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/{id}/read", post(mark_notification_read))
        .route("/api/stats", get(get_stats))
}

async fn require_admin(user: &AuthUser) -> Result<Profile> {
    ProfileService::new(user.client.clone())
        .require_admin(&user.user_id)
        .await
}

// ─── Profile ─────────────────────────────────────────────────

/// Current user's profile, created on first access if signup missed it.
async fn get_me(Extension(user): Extension<AuthUser>) -> Result<Json<Profile>> {
    let profile = ProfileService::new(user.client.clone())
        .ensure(&user.user_id, user.email.as_deref())
        .await?;
    Ok(Json(profile))
}

async fn update_me(
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>> {
    let profile = ProfileService::new(user.client.clone())
        .update(&user.user_id, &update)
        .await?;
    Ok(Json(profile))
}

// ─── Nest Boxes ──────────────────────────────────────────────

#[derive(Deserialize)]
struct NestBoxQuery {
    status: Option<NestBoxStatus>,
    /// Name search
    q: Option<String>,
}

async fn list_nest_boxes(
    Extension(user): Extension<AuthUser>,
    Query(params): Query<NestBoxQuery>,
) -> Result<Json<Vec<NestBox>>> {
    let service = NestBoxService::new(user.client.clone());

    let boxes = match params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(term) if term.len() > MAX_SEARCH_LEN => {
            return Err(AppError::BadRequest(format!(
                "Search term too long (max {} characters)",
                MAX_SEARCH_LEN
            )));
        }
        Some(term) => {
            let mut boxes = service.search(term).await?;
            if let Some(status) = params.status {
                boxes.retain(|b| b.status == status);
            }
            boxes
        }
        None => service.list(params.status).await?,
    };

    Ok(Json(boxes))
}

async fn list_needing_attention(
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<NestBox>>> {
    let boxes = NestBoxService::new(user.client.clone())
        .needing_attention()
        .await?;
    Ok(Json(boxes))
}

async fn get_nest_box(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<NestBox>> {
    let nest_box = NestBoxService::new(user.client.clone()).get(&id).await?;
    Ok(Json(nest_box))
}

/// Register a box. Volunteer submissions land in `pending_review`.
async fn create_nest_box(
    Extension(user): Extension<AuthUser>,
    Json(form): Json<NestBoxForm>,
) -> Result<(StatusCode, Json<NestBox>)> {
    let profile = ProfileService::new(user.client.clone())
        .ensure(&user.user_id, user.email.as_deref())
        .await?;

    let nest_box = NestBoxService::new(user.client.clone())
        .create(&form, &user.user_id, profile.role)
        .await?;
    Ok((StatusCode::CREATED, Json(nest_box)))
}

#[derive(Deserialize)]
struct StatusRequest {
    status: NestBoxStatus,
}

async fn update_nest_box_status(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<NestBox>> {
    require_admin(&user).await?;
    let nest_box = NestBoxService::new(user.client.clone())
        .update_status(&id, body.status)
        .await?;

    tracing::info!(nest_box_id = %id, status = %body.status, admin = %user.user_id, "Nest box status changed");
    Ok(Json(nest_box))
}

async fn assign_qr_code(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<NestBox>> {
    require_admin(&user).await?;
    let nest_box = NestBoxService::new(user.client.clone())
        .assign_qr_code(&id, &state.config.public_site_url)
        .await?;
    Ok(Json(nest_box))
}

async fn list_box_observations(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ActivityLog>>> {
    let logs = ObservationService::new(user.client.clone())
        .list_for_box(&id)
        .await?;
    Ok(Json(logs))
}

async fn list_box_sponsors(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Sponsor>>> {
    let sponsors = SponsorshipService::new(user.client.clone())
        .list_for_box(&id)
        .await?;
    Ok(Json(sponsors))
}

// ─── Observations ────────────────────────────────────────────

async fn list_my_observations(
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ActivityLog>>> {
    let logs = ObservationService::new(user.client.clone())
        .list_for_volunteer(&user.user_id)
        .await?;
    Ok(Json(logs))
}

async fn log_observation(
    Extension(user): Extension<AuthUser>,
    Json(form): Json<ObservationForm>,
) -> Result<(StatusCode, Json<ActivityLog>)> {
    let log = ObservationService::new(user.client.clone())
        .log(&user.user_id, form)
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

async fn verify_observation(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ActivityLog>> {
    require_admin(&user).await?;
    let log = ObservationService::new(user.client.clone())
        .verify(&id)
        .await?;
    Ok(Json(log))
}

// ─── Assignments ─────────────────────────────────────────────

#[derive(Deserialize)]
struct AssignmentsQuery {
    #[serde(default)]
    active: bool,
}

async fn list_my_assignments(
    Extension(user): Extension<AuthUser>,
    Query(params): Query<AssignmentsQuery>,
) -> Result<Json<Vec<VolunteerAssignment>>> {
    let assignments = AssignmentService::new(user.client.clone())
        .list_for_volunteer(&user.user_id, params.active)
        .await?;
    Ok(Json(assignments))
}

async fn create_assignment(
    Extension(user): Extension<AuthUser>,
    Json(form): Json<AssignmentForm>,
) -> Result<(StatusCode, Json<VolunteerAssignment>)> {
    require_admin(&user).await?;
    let assignment = AssignmentService::new(user.client.clone())
        .assign(&user.user_id, &form)
        .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn is_admin(user: &AuthUser) -> Result<bool> {
    let profile = ProfileService::new(user.client.clone())
        .get(&user.user_id)
        .await?;
    Ok(profile.is_some_and(|p| p.is_admin()))
}

async fn start_assignment(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<VolunteerAssignment>> {
    let actor = Actor {
        user_id: &user.user_id,
        is_admin: is_admin(&user).await?,
    };
    let assignment = AssignmentService::new(user.client.clone())
        .start(&id, actor)
        .await?;
    Ok(Json(assignment))
}

#[derive(Deserialize)]
struct CompleteRequest {
    #[serde(default)]
    notes: Option<String>,
}

async fn complete_assignment(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Option<Json<CompleteRequest>>,
) -> Result<Json<VolunteerAssignment>> {
    // No body (and no content type) means no notes
    let notes = body.and_then(|Json(b)| b.notes);
    if notes.as_ref().is_some_and(|n| n.len() > 1000) {
        return Err(AppError::BadRequest("Notes too long".to_string()));
    }

    let actor = Actor {
        user_id: &user.user_id,
        is_admin: is_admin(&user).await?,
    };
    let assignment = AssignmentService::new(user.client.clone())
        .complete(&id, actor, notes)
        .await?;
    Ok(Json(assignment))
}

async fn cancel_assignment(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<VolunteerAssignment>> {
    require_admin(&user).await?;
    let actor = Actor {
        user_id: &user.user_id,
        is_admin: true,
    };
    let assignment = AssignmentService::new(user.client.clone())
        .cancel(&id, actor)
        .await?;
    Ok(Json(assignment))
}

// ─── Sponsorships ────────────────────────────────────────────

async fn create_sponsorship(
    Extension(user): Extension<AuthUser>,
    Json(form): Json<SponsorshipForm>,
) -> Result<(StatusCode, Json<Sponsor>)> {
    let sponsor = SponsorshipService::new(user.client.clone())
        .sponsor(&user.user_id, &form)
        .await?;
    Ok((StatusCode::CREATED, Json(sponsor)))
}

// ─── Notifications ───────────────────────────────────────────

#[derive(Deserialize)]
struct NotificationsQuery {
    #[serde(default)]
    unread: bool,
}

async fn list_notifications(
    Extension(user): Extension<AuthUser>,
    Query(params): Query<NotificationsQuery>,
) -> Result<Json<Vec<Notification>>> {
    let notifications = NotificationService::new(user.client.clone())
        .list_for_user(&user.user_id, params.unread)
        .await?;
    Ok(Json(notifications))
}

async fn mark_notification_read(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Notification>> {
    let notification = NotificationService::new(user.client.clone())
        .mark_read(&id, &user.user_id)
        .await?;
    Ok(Json(notification))
}

// ─── Admin Stats ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatsResponse {
    pub nest_boxes: Vec<StatusCount>,
    pub volunteers: usize,
    pub observations: ObservationSummary,
}

async fn get_stats(Extension(user): Extension<AuthUser>) -> Result<Json<StatsResponse>> {
    require_admin(&user).await?;

    let nest_boxes = NestBoxService::new(user.client.clone());
    let profiles = ProfileService::new(user.client.clone());
    let observations = ObservationService::new(user.client.clone());

    let (nest_boxes, volunteers, observations) = tokio::try_join!(
        nest_boxes.status_summary(),
        profiles.list_by_role(Role::Volunteer),
        observations.summary(),
    )?;

    Ok(Json(StatsResponse {
        nest_boxes,
        volunteers: volunteers.len(),
        observations,
    }))
}

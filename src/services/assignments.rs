// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Volunteer assignment workflow: assign → start → complete (or cancel).

use crate::client::{NestboxClient, OrderOptions};
use crate::db::tables;
use crate::error::{AppError, Result};
use crate::models::{
    AssignmentForm, AssignmentStatus, AssignmentType, NewAssignment, NotificationKind,
    VolunteerAssignment,
};
use crate::services::{NestBoxService, NotificationService, ProfileService};
use crate::time_utils::today_iso_date;
use serde_json::{json, Map, Value};
use validator::Validate;

/// Who is acting on an assignment.
#[derive(Debug, Clone, Copy)]
pub struct Actor<'a> {
    pub user_id: &'a str,
    pub is_admin: bool,
}

#[derive(Clone)]
pub struct AssignmentService {
    client: NestboxClient,
}

impl AssignmentService {
    pub fn new(client: NestboxClient) -> Self {
        Self { client }
    }

    /// Create an assignment and notify the volunteer.
    pub async fn assign(&self, assigned_by: &str, form: &AssignmentForm) -> Result<VolunteerAssignment> {
        form.validate()?;

        let row = NewAssignment {
            nest_box_id: form.nest_box_id.clone(),
            volunteer_id: form.volunteer_id.clone(),
            assigned_by: assigned_by.to_string(),
            assignment_type: form.assignment_type,
            status: AssignmentStatus::Assigned,
            priority: form.priority,
            assigned_date: today_iso_date(),
            due_date: form.due_date.clone(),
            notes: form.notes.clone(),
        };

        let assignment: VolunteerAssignment = self
            .client
            .from(tables::VOLUNTEER_ASSIGNMENTS)
            .insert(&row)
            .select()
            .single()
            .execute()
            .await?;

        tracing::info!(
            assignment_id = %assignment.id,
            volunteer_id = %assignment.volunteer_id,
            assignment_type = %assignment.assignment_type,
            "Assignment created"
        );

        let message = assignment_message(&assignment);
        if let Err(e) = NotificationService::new(self.client.clone())
            .notify(
                &assignment.volunteer_id,
                "New assignment",
                &message,
                NotificationKind::Assignment,
            )
            .await
        {
            tracing::warn!(assignment_id = %assignment.id, error = %e, "Failed to notify volunteer");
        }

        Ok(assignment)
    }

    /// A volunteer's assignments by due date. `active_only` keeps
    /// `assigned` and `in_progress`, filtered in memory.
    pub async fn list_for_volunteer(
        &self,
        volunteer_id: &str,
        active_only: bool,
    ) -> Result<Vec<VolunteerAssignment>> {
        let mut assignments: Vec<VolunteerAssignment> = self
            .client
            .from(tables::VOLUNTEER_ASSIGNMENTS)
            .select("*")
            .eq("volunteer_id", volunteer_id)
            .order("due_date", OrderOptions::ascending())
            .execute()
            .await?;

        if active_only {
            assignments.retain(VolunteerAssignment::is_active);
        }
        Ok(assignments)
    }

    /// Load an assignment the actor may act on. Volunteers only see their own.
    pub async fn get_for_actor(&self, id: &str, actor: Actor<'_>) -> Result<VolunteerAssignment> {
        let mut query = self
            .client
            .from(tables::VOLUNTEER_ASSIGNMENTS)
            .select("*")
            .eq("id", id);
        if !actor.is_admin {
            query = query.eq("volunteer_id", actor.user_id);
        }

        let rows: Vec<VolunteerAssignment> = query.execute().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Assignment {}", id)))
    }

    pub async fn start(&self, id: &str, actor: Actor<'_>) -> Result<VolunteerAssignment> {
        let assignment = self.get_for_actor(id, actor).await?;
        if assignment.status != AssignmentStatus::Assigned {
            return Err(AppError::BadRequest(format!(
                "Assignment is {}, cannot start",
                assignment.status
            )));
        }

        self.patch(id, json!({ "status": AssignmentStatus::InProgress }))
            .await
    }

    /// Complete an assignment. Maintenance work also records the box
    /// maintenance and bumps the volunteer's task counter (best-effort).
    pub async fn complete(
        &self,
        id: &str,
        actor: Actor<'_>,
        notes: Option<String>,
    ) -> Result<VolunteerAssignment> {
        let assignment = self.get_for_actor(id, actor).await?;
        if !assignment.is_active() {
            return Err(AppError::BadRequest(format!(
                "Assignment is already {}",
                assignment.status
            )));
        }

        let mut body = Map::new();
        body.insert("status".into(), json!(AssignmentStatus::Completed));
        body.insert("completed_date".into(), Value::String(today_iso_date()));
        if let Some(notes) = notes {
            body.insert("notes".into(), Value::String(notes));
        }
        let completed = self.patch(id, Value::Object(body)).await?;

        tracing::info!(
            assignment_id = id,
            volunteer_id = %completed.volunteer_id,
            "Assignment completed"
        );

        if completed.assignment_type == AssignmentType::Maintenance {
            if let Err(e) = NestBoxService::new(self.client.clone())
                .record_maintenance(&completed.nest_box_id)
                .await
            {
                tracing::warn!(nest_box_id = %completed.nest_box_id, error = %e, "Failed to record maintenance");
            }

            if let Err(e) = ProfileService::new(self.client.clone())
                .increment_maintenance_tasks(&completed.volunteer_id)
                .await
            {
                tracing::warn!(volunteer_id = %completed.volunteer_id, error = %e, "Failed to update maintenance count");
            }
        }

        Ok(completed)
    }

    /// Cancel an assignment that has not been completed.
    pub async fn cancel(&self, id: &str, actor: Actor<'_>) -> Result<VolunteerAssignment> {
        let assignment = self.get_for_actor(id, actor).await?;
        if !assignment.is_active() {
            return Err(AppError::BadRequest(format!(
                "Assignment is already {}",
                assignment.status
            )));
        }

        self.patch(id, json!({ "status": AssignmentStatus::Cancelled }))
            .await
    }

    async fn patch(&self, id: &str, body: Value) -> Result<VolunteerAssignment> {
        let rows: Vec<VolunteerAssignment> = self
            .client
            .from(tables::VOLUNTEER_ASSIGNMENTS)
            .update(&body)
            .eq("id", id)
            .select()
            .execute()
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Assignment {}", id)))
    }
}

fn assignment_message(assignment: &VolunteerAssignment) -> String {
    let mut message = format!(
        "You have a new {} assignment ({} priority) for nest box {}",
        assignment.assignment_type, assignment.priority, assignment.nest_box_id
    );
    if let Some(due) = &assignment.due_date {
        message.push_str(&format!(", due {}", due));
    }
    message
}

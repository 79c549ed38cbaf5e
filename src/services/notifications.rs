// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-app notifications.

use crate::client::{NestboxClient, OrderOptions};
use crate::db::tables;
use crate::error::{AppError, Result};
use crate::models::{NewNotification, Notification, NotificationKind, Role};
use crate::services::ProfileService;

#[derive(Clone)]
pub struct NotificationService {
    client: NestboxClient,
}

impl NotificationService {
    pub fn new(client: NestboxClient) -> Self {
        Self { client }
    }

    /// Send one notification to one user.
    pub async fn notify(
        &self,
        user_id: &str,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<Notification> {
        let row = new_notification(user_id, title, message, kind);
        let notification = self
            .client
            .from(tables::NOTIFICATIONS)
            .insert(&row)
            .select()
            .single()
            .execute()
            .await?;
        Ok(notification)
    }

    /// Send the same notification to every user with `role` in one insert.
    /// Returns how many were sent.
    pub async fn notify_role(
        &self,
        role: Role,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<usize> {
        let recipients = ProfileService::new(self.client.clone())
            .list_by_role(role)
            .await?;
        if recipients.is_empty() {
            return Ok(0);
        }

        let rows: Vec<NewNotification> = recipients
            .iter()
            .map(|p| new_notification(&p.id, title, message, kind))
            .collect();

        self.client
            .from(tables::NOTIFICATIONS)
            .insert(&rows)
            .execute()
            .await?;

        tracing::debug!(role = %role, count = rows.len(), "Role notification sent");
        Ok(rows.len())
    }

    /// A user's notifications, newest first.
    pub async fn list_for_user(&self, user_id: &str, unread_only: bool) -> Result<Vec<Notification>> {
        let mut notifications: Vec<Notification> = self
            .client
            .from(tables::NOTIFICATIONS)
            .select("*")
            .eq("user_id", user_id)
            .order("created_at", OrderOptions::descending())
            .execute()
            .await?;

        if unread_only {
            notifications.retain(|n| !n.read);
        }
        Ok(notifications)
    }

    /// Mark one of the user's notifications read.
    pub async fn mark_read(&self, id: &str, user_id: &str) -> Result<Notification> {
        let rows: Vec<Notification> = self
            .client
            .from(tables::NOTIFICATIONS)
            .update(&serde_json::json!({ "read": true }))
            .eq("id", id)
            .eq("user_id", user_id)
            .select()
            .execute()
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Notification {}", id)))
    }
}

fn new_notification(
    user_id: &str,
    title: &str,
    message: &str,
    kind: NotificationKind,
) -> NewNotification {
    NewNotification {
        user_id: user_id.to_string(),
        title: title.to_string(),
        message: message.to_string(),
        kind,
        read: false,
    }
}

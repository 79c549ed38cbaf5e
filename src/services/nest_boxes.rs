// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nest box registry.

use crate::client::{NestboxClient, OrderOptions};
use crate::db::tables;
use crate::error::{AppError, Result};
use crate::models::{NestBox, NestBoxForm, NestBoxStatus, NewNestBox, Role};
use crate::time_utils::today_iso_date;
use serde::Serialize;
use serde_json::json;
use validator::Validate;

/// Number of boxes in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: NestBoxStatus,
    pub count: usize,
}

#[derive(Clone)]
pub struct NestBoxService {
    client: NestboxClient,
}

impl NestBoxService {
    pub fn new(client: NestboxClient) -> Self {
        Self { client }
    }

    /// All boxes, optionally in one status, by name.
    pub async fn list(&self, status: Option<NestBoxStatus>) -> Result<Vec<NestBox>> {
        let mut query = self.client.from(tables::NEST_BOXES).select("*");
        if let Some(status) = status {
            query = query.eq("status", status);
        }

        let boxes = query
            .order("name", OrderOptions::ascending())
            .execute()
            .await?;
        Ok(boxes)
    }

    /// Boxes flagged for maintenance or awaiting review.
    ///
    /// The query builder has no OR filter, so this fetches everything and
    /// filters in memory.
    pub async fn needing_attention(&self) -> Result<Vec<NestBox>> {
        let mut boxes = self.list(None).await?;
        boxes.retain(NestBox::needs_attention);
        Ok(boxes)
    }

    /// Case-insensitive name search, filtered in memory.
    pub async fn search(&self, term: &str) -> Result<Vec<NestBox>> {
        let needle = term.trim().to_lowercase();
        let mut boxes = self.list(None).await?;
        if !needle.is_empty() {
            boxes.retain(|b| b.name.to_lowercase().contains(&needle));
        }
        Ok(boxes)
    }

    pub async fn get(&self, id: &str) -> Result<NestBox> {
        let rows: Vec<NestBox> = self
            .client
            .from(tables::NEST_BOXES)
            .select("*")
            .eq("id", id)
            .execute()
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Nest box {}", id)))
    }

    /// Register a box. Admin submissions go live immediately; anyone else's
    /// wait in `pending_review`.
    pub async fn create(&self, form: &NestBoxForm, created_by: &str, role: Role) -> Result<NestBox> {
        form.validate()?;
        let (latitude, longitude) = form
            .coordinates()
            .ok_or_else(|| AppError::BadRequest("Invalid coordinates".to_string()))?;

        let status = if role == Role::Admin {
            NestBoxStatus::Active
        } else {
            NestBoxStatus::PendingReview
        };

        let new_box = NewNestBox {
            name: form.name.trim().to_string(),
            latitude,
            longitude,
            box_type: form.box_type.clone(),
            target_species: form.target_species.clone(),
            status,
            installation_date: form.installation_date.clone(),
            notes: form.notes.clone(),
            created_by: created_by.to_string(),
        };

        let nest_box: NestBox = self
            .client
            .from(tables::NEST_BOXES)
            .insert(&new_box)
            .select()
            .single()
            .execute()
            .await?;

        tracing::info!(
            nest_box_id = %nest_box.id,
            status = %nest_box.status,
            created_by,
            "Nest box created"
        );
        Ok(nest_box)
    }

    pub async fn update_status(&self, id: &str, status: NestBoxStatus) -> Result<NestBox> {
        self.patch(id, json!({ "status": status })).await
    }

    /// Store the QR payload for a box. Rendering the image is the
    /// frontend's job.
    pub async fn assign_qr_code(&self, id: &str, site_url: &str) -> Result<NestBox> {
        let payload = qr_payload(site_url, id);
        self.patch(id, json!({ "qr_code": payload })).await
    }

    /// Mark maintenance done today and put the box back in service.
    pub async fn record_maintenance(&self, id: &str) -> Result<NestBox> {
        self.patch(
            id,
            json!({
                "last_maintenance_date": today_iso_date(),
                "status": NestBoxStatus::Active,
            }),
        )
        .await
    }

    /// Count of boxes per status, every status listed.
    pub async fn status_summary(&self) -> Result<Vec<StatusCount>> {
        let boxes = self.list(None).await?;
        Ok(count_by_status(&boxes))
    }

    async fn patch(&self, id: &str, body: serde_json::Value) -> Result<NestBox> {
        let rows: Vec<NestBox> = self
            .client
            .from(tables::NEST_BOXES)
            .update(&body)
            .eq("id", id)
            .select()
            .execute()
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Nest box {}", id)))
    }
}

/// URL encoded into a box's QR code.
pub fn qr_payload(site_url: &str, id: &str) -> String {
    format!("{}/nest-boxes/{}", site_url.trim_end_matches('/'), id)
}

fn count_by_status(boxes: &[NestBox]) -> Vec<StatusCount> {
    NestBoxStatus::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            count: boxes.iter().filter(|b| b.status == status).count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nest_box(id: &str, status: NestBoxStatus) -> NestBox {
        NestBox {
            id: id.to_string(),
            name: format!("Box {}", id),
            latitude: 37.0,
            longitude: -122.0,
            box_type: None,
            target_species: Vec::new(),
            status,
            qr_code: None,
            installation_date: None,
            last_maintenance_date: None,
            notes: None,
            created_by: None,
            created_at: None,
        }
    }

    #[test]
    fn test_qr_payload() {
        assert_eq!(
            qr_payload("https://nestbox.example.org/", "b1"),
            "https://nestbox.example.org/nest-boxes/b1"
        );
    }

    #[test]
    fn test_count_by_status_lists_every_status() {
        let boxes = vec![
            nest_box("1", NestBoxStatus::Active),
            nest_box("2", NestBoxStatus::Active),
            nest_box("3", NestBoxStatus::PendingReview),
        ];
        let counts = count_by_status(&boxes);

        assert_eq!(counts.len(), NestBoxStatus::ALL.len());
        let active = counts
            .iter()
            .find(|c| c.status == NestBoxStatus::Active)
            .unwrap();
        assert_eq!(active.count, 2);
        let removed = counts
            .iter()
            .find(|c| c.status == NestBoxStatus::Removed)
            .unwrap();
        assert_eq!(removed.count, 0);
    }
}

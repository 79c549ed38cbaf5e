// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sponsorships. The payment step is simulated.

use crate::client::{NestboxClient, OrderOptions};
use crate::db::tables;
use crate::error::Result;
use crate::models::{NewSponsor, Sponsor, SponsorshipForm};
use crate::services::NestBoxService;
use validator::Validate;

/// Status recorded for payments that never touched a processor.
pub const SIMULATED_PAYMENT_STATUS: &str = "simulated";

#[derive(Clone)]
pub struct SponsorshipService {
    client: NestboxClient,
}

impl SponsorshipService {
    pub fn new(client: NestboxClient) -> Self {
        Self { client }
    }

    /// Record a sponsorship at the tier's fixed price.
    pub async fn sponsor(&self, user_id: &str, form: &SponsorshipForm) -> Result<Sponsor> {
        form.validate()?;

        if let Some(nest_box_id) = &form.nest_box_id {
            // 404 for unknown boxes rather than a dangling reference
            NestBoxService::new(self.client.clone())
                .get(nest_box_id)
                .await?;
        }

        let row = NewSponsor {
            user_id: user_id.to_string(),
            nest_box_id: form.nest_box_id.clone(),
            sponsor_name: form.sponsor_name.trim().to_string(),
            email: form.email.clone(),
            tier: form.tier,
            amount_cents: form.tier.amount_cents(),
            dedication: form.dedication.clone(),
            payment_status: SIMULATED_PAYMENT_STATUS.to_string(),
            transaction_ref: simulated_transaction_ref(),
        };

        let sponsor: Sponsor = self
            .client
            .from(tables::SPONSORS)
            .insert(&row)
            .select()
            .single()
            .execute()
            .await?;

        tracing::info!(
            sponsor_id = %sponsor.id,
            tier = %sponsor.tier,
            amount_cents = sponsor.amount_cents,
            "Sponsorship recorded (simulated payment)"
        );
        Ok(sponsor)
    }

    /// Sponsors of one box, newest first.
    pub async fn list_for_box(&self, nest_box_id: &str) -> Result<Vec<Sponsor>> {
        let sponsors = self
            .client
            .from(tables::SPONSORS)
            .select("*")
            .eq("nest_box_id", nest_box_id)
            .order("created_at", OrderOptions::descending())
            .execute()
            .await?;
        Ok(sponsors)
    }
}

/// Random reference standing in for a processor transaction id.
pub fn simulated_transaction_ref() -> String {
    format!("sim_{}", hex::encode(rand::random::<[u8; 8]>()))
}

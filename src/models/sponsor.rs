// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sponsorship model. Payments are simulated; no processor is involved.

use super::validation::validate_not_blank;
use serde::{Deserialize, Serialize};
use validator::Validate;

db_enum! {
    SponsorshipTier {
        Supporter => "supporter",
        Guardian => "guardian",
        Champion => "champion",
    }
}

impl SponsorshipTier {
    /// Fixed price of the tier in US cents.
    pub fn amount_cents(&self) -> i64 {
        match self {
            SponsorshipTier::Supporter => 2_500,
            SponsorshipTier::Guardian => 5_000,
            SponsorshipTier::Champion => 10_000,
        }
    }
}

/// Row in `sponsors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: String,
    pub user_id: Option<String>,
    pub nest_box_id: Option<String>,
    pub sponsor_name: String,
    pub email: Option<String>,
    pub tier: SponsorshipTier,
    pub amount_cents: i64,
    pub dedication: Option<String>,
    pub payment_status: Option<String>,
    pub transaction_ref: Option<String>,
    pub created_at: Option<String>,
}

/// Insert payload for `sponsors`.
#[derive(Debug, Clone, Serialize)]
pub struct NewSponsor {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nest_box_id: Option<String>,
    pub sponsor_name: String,
    pub email: String,
    pub tier: SponsorshipTier,
    pub amount_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedication: Option<String>,
    pub payment_status: String,
    pub transaction_ref: String,
}

/// Sponsorship form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SponsorshipForm {
    pub nest_box_id: Option<String>,
    #[validate(length(max = 100), custom(function = "validate_not_blank"))]
    pub sponsor_name: String,
    #[validate(email)]
    pub email: String,
    pub tier: SponsorshipTier,
    #[validate(length(max = 280))]
    pub dedication: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tier_amounts() {
        assert_eq!(SponsorshipTier::Supporter.amount_cents(), 2_500);
        assert_eq!(SponsorshipTier::Guardian.amount_cents(), 5_000);
        assert_eq!(SponsorshipTier::Champion.amount_cents(), 10_000);
    }

    #[test]
    fn test_form_validation() {
        let form: SponsorshipForm = serde_json::from_value(json!({
            "sponsor_name": "The Lee Family",
            "email": "lee@example.com",
            "tier": "guardian",
            "dedication": "In memory of Grandpa Joe",
        }))
        .unwrap();
        assert!(form.validate().is_ok());

        let bad: SponsorshipForm = serde_json::from_value(json!({
            "sponsor_name": "",
            "email": "not-an-email",
            "tier": "champion",
        }))
        .unwrap();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("sponsor_name"));
        assert!(errors.field_errors().contains_key("email"));
    }
}

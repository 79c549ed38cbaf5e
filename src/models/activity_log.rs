// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Volunteer observation records.

use super::null_as_default;
use super::validation::{validate_iso_date, validate_not_blank};
use serde::{Deserialize, Serialize};
use validator::Validate;

db_enum! {
    /// Breeding stage seen at the visit.
    NestStage {
        Empty => "empty",
        Building => "building",
        Eggs => "eggs",
        Chicks => "chicks",
        Fledged => "fledged",
        Abandoned => "abandoned",
    }
}

/// Row in `activity_logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: String,
    pub nest_box_id: String,
    pub volunteer_id: String,
    pub observation_date: String,
    pub species_observed: Option<String>,
    pub nest_stage: Option<NestStage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub egg_count: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chick_count: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub maintenance_needed: bool,
    pub maintenance_notes: Option<String>,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verified: bool,
    pub created_at: Option<String>,
}

/// Insert payload for `activity_logs`.
#[derive(Debug, Clone, Serialize)]
pub struct NewActivityLog {
    pub nest_box_id: String,
    pub volunteer_id: String,
    pub observation_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species_observed: Option<String>,
    pub nest_stage: NestStage,
    pub egg_count: i32,
    pub chick_count: i32,
    pub maintenance_needed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub verified: bool,
}

/// Observation form submitted after a box visit.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ObservationForm {
    #[validate(custom(function = "validate_not_blank"))]
    pub nest_box_id: String,
    /// Defaults to today when omitted
    #[validate(custom(function = "validate_iso_date"))]
    pub observation_date: Option<String>,
    #[validate(length(max = 100))]
    pub species_observed: Option<String>,
    pub nest_stage: NestStage,
    #[serde(default)]
    #[validate(range(min = 0, max = 20))]
    pub egg_count: i32,
    #[serde(default)]
    #[validate(range(min = 0, max = 20))]
    pub chick_count: i32,
    #[serde(default)]
    pub maintenance_needed: bool,
    #[validate(length(max = 1000))]
    pub maintenance_notes: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl ObservationForm {
    /// Build the insert row for `volunteer_id`, dated `default_date` if the
    /// form left the date empty.
    pub fn into_new_log(self, volunteer_id: &str, default_date: String) -> NewActivityLog {
        let maintenance_needed = self.maintenance_needed;
        NewActivityLog {
            nest_box_id: self.nest_box_id,
            volunteer_id: volunteer_id.to_string(),
            observation_date: self.observation_date.unwrap_or(default_date),
            species_observed: self.species_observed,
            nest_stage: self.nest_stage,
            egg_count: self.egg_count,
            chick_count: self.chick_count,
            maintenance_needed,
            // Notes only make sense when maintenance was flagged
            maintenance_notes: self.maintenance_notes.filter(|_| maintenance_needed),
            notes: self.notes,
            verified: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_defaults_and_conversion() {
        let form: ObservationForm = serde_json::from_value(json!({
            "nest_box_id": "b1",
            "nest_stage": "eggs",
            "egg_count": 4,
            "maintenance_notes": "ignored without the flag",
        }))
        .unwrap();
        assert!(form.validate().is_ok());

        let log = form.into_new_log("v1", "2026-05-02".into());
        assert_eq!(log.observation_date, "2026-05-02");
        assert_eq!(log.nest_stage, NestStage::Eggs);
        assert_eq!(log.egg_count, 4);
        assert_eq!(log.chick_count, 0);
        assert!(log.maintenance_notes.is_none());
        assert!(!log.verified);
    }

    #[test]
    fn test_counts_are_bounded() {
        let form: ObservationForm = serde_json::from_value(json!({
            "nest_box_id": "b1",
            "nest_stage": "chicks",
            "chick_count": 21,
            "egg_count": -1,
        }))
        .unwrap();
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("chick_count"));
        assert!(errors.field_errors().contains_key("egg_count"));
    }

    #[test]
    fn test_unknown_stage_rejected() {
        let result: Result<ObservationForm, _> = serde_json::from_value(json!({
            "nest_box_id": "b1",
            "nest_stage": "hatching",
        }));
        assert!(result.is_err());
    }
}

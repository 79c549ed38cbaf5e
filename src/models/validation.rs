// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Field validators shared by the form models.

use regex::Regex;
use std::sync::LazyLock;
use validator::ValidationError;

/// Decimal degrees in [-90, 90].
static LATITUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?([1-8]?[0-9](\.[0-9]+)?|90(\.0+)?)$").expect("valid latitude regex")
});

/// Decimal degrees in [-180, 180].
static LONGITUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?((1[0-7][0-9]|[1-9]?[0-9])(\.[0-9]+)?|180(\.0+)?)$")
        .expect("valid longitude regex")
});

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

pub fn validate_latitude(value: &str) -> Result<(), ValidationError> {
    if LATITUDE_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(invalid(
            "latitude",
            "must be decimal degrees between -90 and 90",
        ))
    }
}

pub fn validate_longitude(value: &str) -> Result<(), ValidationError> {
    if LONGITUDE_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(invalid(
            "longitude",
            "must be decimal degrees between -180 and 180",
        ))
    }
}

/// `YYYY-MM-DD`.
pub fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| invalid("date", "must be a date in YYYY-MM-DD format"))
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(invalid("required", "must not be empty"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latitude() {
        for ok in ["0", "45.5231", "-33.8688", "90", "90.000", "-90", "8.1"] {
            assert!(validate_latitude(ok).is_ok(), "{ok} should be valid");
        }
        for bad in ["91", "90.1", "abc", "", "45.", "--45", "100"] {
            assert!(validate_latitude(bad).is_err(), "{bad} should be invalid");
        }
    }

    #[test]
    fn test_longitude() {
        for ok in ["0", "-122.6765", "179.9999", "180", "-180.0", "99"] {
            assert!(validate_longitude(ok).is_ok(), "{ok} should be valid");
        }
        for bad in ["181", "180.5", "200", "1e5", " "] {
            assert!(validate_longitude(bad).is_err(), "{bad} should be invalid");
        }
    }

    #[test]
    fn test_iso_date() {
        assert!(validate_iso_date("2026-05-01").is_ok());
        assert!(validate_iso_date("2026-13-01").is_err());
        assert!(validate_iso_date("05/01/2026").is_err());
    }

    #[test]
    fn test_not_blank() {
        assert!(validate_not_blank("Box 7").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }
}

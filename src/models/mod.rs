// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

/// Declare a fieldless enum stored as a text column.
///
/// Generates serde names, `as_str`, `Display` and `FromStr` from one
/// variant → string table so filters and JSON never disagree.
macro_rules! db_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $value)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {}", stringify!($name), other)),
                }
            }
        }
    };
}

pub mod activity_log;
pub mod assignment;
pub mod nest_box;
pub mod notification;
pub mod profile;
pub mod sponsor;
pub mod validation;

pub use activity_log::{ActivityLog, NestStage, NewActivityLog, ObservationForm};
pub use assignment::{
    AssignmentForm, AssignmentStatus, AssignmentType, NewAssignment, Priority,
    VolunteerAssignment,
};
pub use nest_box::{NestBox, NestBoxForm, NestBoxStatus, NewNestBox};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use profile::{NewProfile, Profile, ProfileUpdate, Role};
pub use sponsor::{NewSponsor, Sponsor, SponsorshipForm, SponsorshipTier};

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

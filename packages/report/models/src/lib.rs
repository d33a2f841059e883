#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Noise score and noise type taxonomy for the noise map.
//!
//! This crate defines the canonical rating scale and the fixed vocabulary
//! of noise categories used across the entire noise-map system, plus the
//! address-key normalization used as the aggregation key.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Noise score for a report, from 1 (very quiet) to 5 (very loud).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NoiseScore {
    /// Level 1: Barely audible, no disturbance
    VeryQuiet = 1,
    /// Level 2: Occasionally noticeable
    Quiet = 2,
    /// Level 3: Regularly noticeable, tolerable
    Moderate = 3,
    /// Level 4: Frequent, disruptive noise
    Loud = 4,
    /// Level 5: Constant or severe noise
    VeryLoud = 5,
}

impl NoiseScore {
    /// Returns the numeric value of this score.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates a score from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-5.
    pub const fn from_value(value: u8) -> Result<Self, InvalidScoreError> {
        match value {
            1 => Ok(Self::VeryQuiet),
            2 => Ok(Self::Quiet),
            3 => Ok(Self::Moderate),
            4 => Ok(Self::Loud),
            5 => Ok(Self::VeryLoud),
            _ => Err(InvalidScoreError { value }),
        }
    }
}

/// Error returned when attempting to create a [`NoiseScore`] from an invalid
/// numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidScoreError {
    /// The invalid score value that was provided.
    pub value: u8,
}

impl std::fmt::Display for InvalidScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid score value {}: expected 1-5", self.value)
    }
}

impl std::error::Error for InvalidScoreError {}

/// The fixed vocabulary of noise categories a report may be tagged with.
///
/// Free-text tags are not accepted; submissions with labels outside this
/// vocabulary are rejected as invalid input.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NoiseType {
    /// Footsteps from the unit above
    Footsteps,
    /// Furniture being dragged across the floor
    FurnitureDragging,
    /// Hammering, drilling, or other impact noise
    Hammering,
    /// Doors or windows slamming
    DoorSlam,
    /// Washing machines, vacuums, and other appliances
    Appliance,
    /// Music, television, or speakers
    MusicTv,
    /// Shouting, arguments, or loud conversation
    Shouting,
    /// Barking or other pet noise
    Pet,
    /// Water pipes, drains, or boiler noise
    Plumbing,
    /// Noise that doesn't fit any other category
    Other,
}

impl NoiseType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Footsteps,
            Self::FurnitureDragging,
            Self::Hammering,
            Self::DoorSlam,
            Self::Appliance,
            Self::MusicTv,
            Self::Shouting,
            Self::Pet,
            Self::Plumbing,
            Self::Other,
        ]
    }
}

/// Normalizes an address into the key used for grouping and lookups.
///
/// Trims the string and collapses runs of whitespace into a single space,
/// so inconsistently spaced free-text or geocoded addresses collapse into
/// the same bucket. This is exact post-normalization string equality, not
/// a fuzzy match: `"101동 201호"` and `"101동  201호"` share a key, while
/// `"101 동 201호"` does not.
#[must_use]
pub fn address_key(address: &str) -> String {
    address.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_from_value_roundtrip() {
        for v in 1..=5u8 {
            let score = NoiseScore::from_value(v).unwrap();
            assert_eq!(score.value(), v);
        }
        assert!(NoiseScore::from_value(0).is_err());
        assert!(NoiseScore::from_value(6).is_err());
    }

    #[test]
    fn noise_type_string_roundtrip() {
        for noise_type in NoiseType::all() {
            let name = noise_type.to_string();
            assert_eq!(name.parse::<NoiseType>().unwrap(), *noise_type);
        }
    }

    #[test]
    fn rejects_unknown_noise_type() {
        assert!("JACKHAMMER_PARTY".parse::<NoiseType>().is_err());
    }

    #[test]
    fn address_key_collapses_repeated_spaces() {
        assert_eq!(address_key("101동 201호"), address_key("101동  201호"));
    }

    #[test]
    fn address_key_is_not_fuzzy() {
        // A differently placed space produces a different key.
        assert_ne!(address_key("101동 201호"), address_key("101 동 201호"));
    }

    #[test]
    fn address_key_trims_and_collapses_tabs() {
        assert_eq!(address_key("  A B\t101\n"), "A B 101");
    }
}

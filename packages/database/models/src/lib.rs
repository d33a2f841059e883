#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Report row types and write request definitions.
//!
//! These types describe the `reports` collection as stored. API-facing
//! response types live in the server models crate so the storage shape and
//! the wire contract can evolve independently.

use chrono::{DateTime, Utc};
use noise_map_report_models::{NoiseScore, NoiseType};
use serde::{Deserialize, Serialize};

/// One stored noise report, as read back from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// Store-assigned UUID, immutable.
    pub id: String,
    /// Verified identity of the submitter, immutable. Never exposed in
    /// list responses outside the submitter's own history.
    pub submitter_id: String,
    /// Canonical road address as submitted; fixed after creation.
    pub address: String,
    /// Whitespace-normalized form of `address`, the aggregation key.
    pub address_key: String,
    /// Noise score, 1-5.
    pub score: NoiseScore,
    /// Noise categories; non-empty.
    pub noise_types: Vec<NoiseType>,
    /// Server-assigned creation time, immutable. Stored as epoch
    /// milliseconds; `DateTime<Utc>` everywhere in process.
    pub created_at: DateTime<Utc>,
    /// Latitude, if geocoding succeeded at creation time.
    pub lat: Option<f64>,
    /// Longitude, if geocoding succeeded at creation time.
    pub lng: Option<f64>,
}

/// A new report to be inserted. The store assigns `id` and `created_at`
/// and derives `address_key` from `address`.
#[derive(Debug, Clone)]
pub struct NewReport {
    /// Verified identity of the submitter.
    pub submitter_id: String,
    /// Canonical road address being rated.
    pub address: String,
    /// Noise score, 1-5.
    pub score: NoiseScore,
    /// Noise categories; non-empty.
    pub noise_types: Vec<NoiseType>,
    /// Coordinates from insert-time geocoding, if it succeeded.
    pub lat: Option<f64>,
    /// Coordinates from insert-time geocoding, if it succeeded.
    pub lng: Option<f64>,
}

/// Partial update of a report: only the score and noise types may change
/// after creation. Address, submitter, and creation time are immutable.
#[derive(Debug, Clone)]
pub struct ReportUpdate {
    /// Replacement noise score.
    pub score: NoiseScore,
    /// Replacement noise categories; non-empty.
    pub noise_types: Vec<NoiseType>,
}

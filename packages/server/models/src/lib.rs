#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the noise map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the stored row types so the wire contract can evolve independently
//! of the storage shape. Most importantly, [`ApiReport`] carries no
//! submitter identity: only the submitter's own history view
//! ([`ApiOwnReport`]) exposes it.

use chrono::{DateTime, Utc};
use noise_map_database_models::ReportRow;
use noise_map_report_models::{NoiseScore, NoiseType};
use serde::{Deserialize, Serialize};

/// A report as exposed to any client. The submitter identity is stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReport {
    /// Report ID.
    pub id: String,
    /// Canonical address being rated.
    pub address: String,
    /// Noise score (1-5).
    pub score: u8,
    /// Noise categories.
    pub noise_types: Vec<NoiseType>,
    /// Creation time (ISO 8601).
    pub created_at: DateTime<Utc>,
    /// Latitude, when insert-time geocoding succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude, when insert-time geocoding succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl From<ReportRow> for ApiReport {
    fn from(row: ReportRow) -> Self {
        Self {
            id: row.id,
            address: row.address,
            score: row.score.value(),
            noise_types: row.noise_types,
            created_at: row.created_at,
            lat: row.lat,
            lng: row.lng,
        }
    }
}

/// A report in the submitter's own history view, with full fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOwnReport {
    /// Report ID.
    pub id: String,
    /// Identity of the submitter (the requesting user).
    pub submitter_id: String,
    /// Canonical address being rated.
    pub address: String,
    /// Noise score (1-5).
    pub score: u8,
    /// Noise categories.
    pub noise_types: Vec<NoiseType>,
    /// Creation time (ISO 8601).
    pub created_at: DateTime<Utc>,
    /// Latitude, when insert-time geocoding succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude, when insert-time geocoding succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl From<ReportRow> for ApiOwnReport {
    fn from(row: ReportRow) -> Self {
        Self {
            id: row.id,
            submitter_id: row.submitter_id,
            address: row.address,
            score: row.score.value(),
            noise_types: row.noise_types,
            created_at: row.created_at,
            lat: row.lat,
            lng: row.lng,
        }
    }
}

/// Body of `POST /api/reports`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    /// Canonical address being rated.
    pub address: String,
    /// Noise score (1-5).
    pub score: u8,
    /// Noise category labels; must be non-empty and from the fixed
    /// vocabulary.
    pub noise_types: Vec<String>,
}

/// Body of `PUT /api/reports/{id}`. Only these two fields are mutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReportRequest {
    /// Replacement noise score (1-5).
    pub score: u8,
    /// Replacement noise category labels; must be non-empty and from the
    /// fixed vocabulary.
    pub noise_types: Vec<String>,
}

/// Query parameters for `GET /api/reports`: exactly one of the two modes
/// must be selected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQueryParams {
    /// List reports for this address (normalized match).
    pub address: Option<String>,
    /// When `"true"`, check the caller's submission eligibility instead.
    pub check_eligibility: Option<String>,
}

/// Query parameters for `GET /api/address`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressQueryParams {
    /// Free-text search keyword.
    pub keyword: Option<String>,
}

/// Query parameters for `GET /api/reports/summary`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQueryParams {
    /// Restrict the summary to one address (normalized match). Without
    /// this, summaries for every address are returned.
    pub address: Option<String>,
}

/// Response of `GET /api/address`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSearchResponse {
    /// Deduplicated canonical address candidates.
    pub addresses: Vec<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Validated form of a submit/update body.
#[derive(Debug, Clone)]
pub struct ValidatedRating {
    /// Parsed noise score.
    pub score: NoiseScore,
    /// Parsed noise categories, non-empty.
    pub noise_types: Vec<NoiseType>,
}

/// Validates a raw score and noise-type labels against the data-model
/// invariants: score in 1-5, labels non-empty and all from the fixed
/// vocabulary.
///
/// # Errors
///
/// Returns a human-readable description of the first violation found.
pub fn validate_rating(score: u8, noise_types: &[String]) -> Result<ValidatedRating, String> {
    let score =
        NoiseScore::from_value(score).map_err(|e| format!("Invalid score: {e}"))?;

    if noise_types.is_empty() {
        return Err("At least one noise type is required".to_string());
    }

    let noise_types = noise_types
        .iter()
        .map(|label| {
            label
                .parse::<NoiseType>()
                .map_err(|_| format!("Unknown noise type: {label}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedRating { score, noise_types })
}

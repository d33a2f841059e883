#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregated noise views derived from the report store.
//!
//! Every view is computed by a full or filtered scan at request time. The
//! corpus is assumed small and there are deliberately no materialized
//! aggregates. Grouping always happens on the whitespace-normalized
//! address key; the displayed address is the first variant seen in scan
//! order.
//!
//! Duplicate reports from the same submitter (possible via the documented
//! check-then-insert race) are counted as-is; no deduplication is applied.

use std::collections::BTreeMap;

use noise_map_database::{DbError, queries};
use noise_map_database_models::ReportRow;
use serde::Serialize;
use switchy_database::Database;
use thiserror::Error;

/// Minimum number of reports an address needs to appear in the ranking.
pub const RANKING_MIN_REPORTS: usize = 3;

/// Number of entries returned by the quietest ranking.
pub const RANKING_LIMIT: usize = 5;

/// Errors that can occur while computing aggregated views.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The underlying report store failed.
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Aggregate score for one address.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSummary {
    /// Display address (first variant seen for the normalized key).
    pub address: String,
    /// Arithmetic mean of scores across matching reports.
    pub average_score: f64,
    /// Number of matching reports.
    pub report_count: usize,
}

/// Map coordinates and score for one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLocation {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Noise score of the report at this location.
    pub score: u8,
}

/// Returns the aggregate summary for one address, or `None` if no report
/// matches its normalized key.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the report store fails.
pub async fn address_summary(
    db: &dyn Database,
    address: &str,
) -> Result<Option<AddressSummary>, AnalyticsError> {
    let reports = queries::query_by_address(db, address).await?;
    Ok(summarize_group(&reports))
}

/// Returns a summary for every address with at least one report.
///
/// Feeds the heatmap view; an empty store yields an empty list.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the report store fails.
pub async fn all_summaries(db: &dyn Database) -> Result<Vec<AddressSummary>, AnalyticsError> {
    let reports = queries::all_reports(db).await?;
    Ok(summarize_all(&reports))
}

/// Returns the quietest addresses: groups with at least
/// [`RANKING_MIN_REPORTS`] reports, sorted ascending by average score,
/// truncated to [`RANKING_LIMIT`].
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the report store fails.
pub async fn quietest_ranking(db: &dyn Database) -> Result<Vec<AddressSummary>, AnalyticsError> {
    let reports = queries::all_reports(db).await?;
    Ok(rank_quietest(&reports))
}

/// Returns coordinates and score for every report that has stored
/// coordinates. Reports whose insert-time geocoding failed are skipped.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the report store fails.
pub async fn report_locations(db: &dyn Database) -> Result<Vec<MapLocation>, AnalyticsError> {
    let reports = queries::all_reports(db).await?;
    Ok(map_locations(&reports))
}

/// Summarizes a set of reports already known to share one address key.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize_group(reports: &[ReportRow]) -> Option<AddressSummary> {
    let first = reports.first()?;
    let total: u32 = reports.iter().map(|r| u32::from(r.score.value())).sum();

    Some(AddressSummary {
        address: first.address.clone(),
        average_score: f64::from(total) / reports.len() as f64,
        report_count: reports.len(),
    })
}

/// Groups reports by normalized address key and summarizes each group.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize_all(reports: &[ReportRow]) -> Vec<AddressSummary> {
    let mut groups: BTreeMap<&str, (&str, u32, usize)> = BTreeMap::new();

    for report in reports {
        let entry = groups
            .entry(report.address_key.as_str())
            .or_insert((report.address.as_str(), 0, 0));
        entry.1 += u32::from(report.score.value());
        entry.2 += 1;
    }

    groups
        .into_values()
        .map(|(address, total, count)| AddressSummary {
            address: address.to_string(),
            average_score: f64::from(total) / count as f64,
            report_count: count,
        })
        .collect()
}

/// Ranks addresses quietest-first, applying the statistical-significance
/// floor and the top-N cut. Ties on average score keep stable-sort order.
#[must_use]
pub fn rank_quietest(reports: &[ReportRow]) -> Vec<AddressSummary> {
    let mut ranked: Vec<AddressSummary> = summarize_all(reports)
        .into_iter()
        .filter(|summary| summary.report_count >= RANKING_MIN_REPORTS)
        .collect();

    ranked.sort_by(|a, b| a.average_score.total_cmp(&b.average_score));
    ranked.truncate(RANKING_LIMIT);
    ranked
}

/// Extracts `{lat, lng, score}` from every report with stored coordinates.
#[must_use]
pub fn map_locations(reports: &[ReportRow]) -> Vec<MapLocation> {
    reports
        .iter()
        .filter_map(|report| {
            let (Some(lat), Some(lng)) = (report.lat, report.lng) else {
                return None;
            };
            Some(MapLocation {
                lat,
                lng,
                score: report.score.value(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use noise_map_report_models::{NoiseScore, NoiseType, address_key};

    fn report(address: &str, score: u8) -> ReportRow {
        ReportRow {
            id: uuid_like(address, score),
            submitter_id: "user".to_string(),
            address: address.to_string(),
            address_key: address_key(address),
            score: NoiseScore::from_value(score).unwrap(),
            noise_types: vec![NoiseType::Footsteps],
            created_at: Utc::now(),
            lat: None,
            lng: None,
        }
    }

    fn uuid_like(address: &str, score: u8) -> String {
        format!("{address}-{score}")
    }

    #[test]
    fn ranking_applies_floor_and_sorts_ascending() {
        // A: 4 reports, avg 2.0; B: 2 reports, avg 1.0; C: 5 reports, avg 3.0.
        let mut reports = vec![
            report("A", 2),
            report("A", 2),
            report("A", 2),
            report("A", 2),
            report("B", 1),
            report("B", 1),
        ];
        reports.extend((0..5).map(|_| report("C", 3)));

        let ranked = rank_quietest(&reports);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].address, "A");
        assert!((ranked[0].average_score - 2.0).abs() < f64::EPSILON);
        assert_eq!(ranked[1].address, "C");
        assert!((ranked[1].average_score - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ranking_returns_at_most_five() {
        let mut reports = Vec::new();
        for (i, score) in [1u8, 2, 3, 4, 5, 3, 2].iter().enumerate() {
            for _ in 0..RANKING_MIN_REPORTS {
                reports.push(report(&format!("addr-{i}"), *score));
            }
        }

        let ranked = rank_quietest(&reports);
        assert_eq!(ranked.len(), RANKING_LIMIT);
        assert_eq!(ranked[0].address, "addr-0");
    }

    #[test]
    fn summaries_group_on_normalized_key() {
        let reports = vec![
            report("101동 201호", 2),
            report("101동  201호", 4),
            report("101 동 201호", 5),
        ];

        let summaries = summarize_all(&reports);
        assert_eq!(summaries.len(), 2);

        let combined = summaries
            .iter()
            .find(|s| s.report_count == 2)
            .expect("combined bucket");
        assert!((combined.average_score - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_is_deterministic_without_writes() {
        let reports = vec![report("A", 1), report("A", 4), report("B", 5)];
        assert_eq!(summarize_all(&reports), summarize_all(&reports));
    }

    #[test]
    fn empty_group_summarizes_to_none() {
        assert!(summarize_group(&[]).is_none());
    }

    #[test]
    fn locations_skip_reports_without_coordinates() {
        let mut with_coords = report("A", 3);
        with_coords.lat = Some(37.5);
        with_coords.lng = Some(127.0);

        let locations = map_locations(&[with_coords, report("B", 4)]);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].score, 3);
    }
}

//! Query functions for the `reports` collection.
//!
//! All functions take a `&dyn Database` handle. Writes are single
//! statements and rely on the store's per-row atomicity; there is no
//! multi-statement transaction anywhere in this module.

use chrono::{DateTime, Utc};
use moosicbox_json_utils::database::ToValue as _;
use noise_map_database_models::{NewReport, ReportRow, ReportUpdate};
use noise_map_report_models::{NoiseScore, NoiseType, address_key};
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Inserts a new report, assigning its UUID and server timestamp.
///
/// The `address_key` column is derived from the submitted address so that
/// lookups and aggregation group inconsistently spaced variants together.
///
/// # Errors
///
/// Returns [`DbError`] if the insert is rejected by the backing store.
pub async fn insert_report(db: &dyn Database, report: NewReport) -> Result<ReportRow, DbError> {
    let id = uuid::Uuid::new_v4().to_string();
    // Truncate to millisecond precision up front so the returned row is
    // identical to what a later read will produce.
    let created_at_millis = Utc::now().timestamp_millis();
    let created_at =
        DateTime::<Utc>::from_timestamp_millis(created_at_millis).ok_or_else(|| {
            DbError::Conversion {
                message: format!("Clock out of range: {created_at_millis}"),
            }
        })?;
    let key = address_key(&report.address);
    let noise_types_json = serde_json::to_string(&report.noise_types)?;

    db.exec_raw_params(
        "INSERT INTO reports (
            id, submitter_id, address, address_key,
            score, noise_types, created_at, lat, lng
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        &[
            DatabaseValue::String(id.clone()),
            DatabaseValue::String(report.submitter_id.clone()),
            DatabaseValue::String(report.address.clone()),
            DatabaseValue::String(key.clone()),
            DatabaseValue::Int64(i64::from(report.score.value())),
            DatabaseValue::String(noise_types_json),
            DatabaseValue::Int64(created_at_millis),
            report.lat.map_or(DatabaseValue::Null, DatabaseValue::Real64),
            report.lng.map_or(DatabaseValue::Null, DatabaseValue::Real64),
        ],
    )
    .await
    .map_err(|e| DbError::Database(e.to_string()))?;

    Ok(ReportRow {
        id,
        submitter_id: report.submitter_id,
        address: report.address,
        address_key: key,
        score: report.score,
        noise_types: report.noise_types,
        created_at,
        lat: report.lat,
        lng: report.lng,
    })
}

/// Point lookup by report ID.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a stored value cannot be
/// converted.
pub async fn get_report_by_id(db: &dyn Database, id: &str) -> Result<Option<ReportRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM reports WHERE id = $1",
            &[DatabaseValue::String(id.to_string())],
        )
        .await
        .map_err(|e| DbError::Database(e.to_string()))?;

    rows.first().map(report_from_row).transpose()
}

/// Returns all reports for an address, matched on the normalized key.
///
/// Zero matches is an empty list, not an error.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a stored value cannot be
/// converted.
pub async fn query_by_address(db: &dyn Database, address: &str) -> Result<Vec<ReportRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM reports WHERE address_key = $1 ORDER BY created_at DESC",
            &[DatabaseValue::String(address_key(address))],
        )
        .await
        .map_err(|e| DbError::Database(e.to_string()))?;

    rows.iter().map(report_from_row).collect()
}

/// Returns all reports created by one identity, newest first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a stored value cannot be
/// converted.
pub async fn query_by_submitter(
    db: &dyn Database,
    submitter_id: &str,
) -> Result<Vec<ReportRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM reports WHERE submitter_id = $1 ORDER BY created_at DESC",
            &[DatabaseValue::String(submitter_id.to_string())],
        )
        .await
        .map_err(|e| DbError::Database(e.to_string()))?;

    rows.iter().map(report_from_row).collect()
}

/// Updates the score and noise types of an existing report.
///
/// Only these two fields are mutable post-creation; the caller is
/// responsible for the ownership check (via [`get_report_by_id`]) before
/// invoking this.
///
/// # Errors
///
/// Returns [`DbError`] if the update is rejected by the backing store.
pub async fn update_report(
    db: &dyn Database,
    id: &str,
    update: &ReportUpdate,
) -> Result<(), DbError> {
    let noise_types_json = serde_json::to_string(&update.noise_types)?;

    db.exec_raw_params(
        "UPDATE reports SET score = $2, noise_types = $3 WHERE id = $1",
        &[
            DatabaseValue::String(id.to_string()),
            DatabaseValue::Int64(i64::from(update.score.value())),
            DatabaseValue::String(noise_types_json),
        ],
    )
    .await
    .map_err(|e| DbError::Database(e.to_string()))?;

    Ok(())
}

/// Returns the `limit` most recently created reports system-wide.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a stored value cannot be
/// converted.
pub async fn latest_reports(db: &dyn Database, limit: u32) -> Result<Vec<ReportRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM reports ORDER BY created_at DESC LIMIT $1",
            &[DatabaseValue::Int64(i64::from(limit))],
        )
        .await
        .map_err(|e| DbError::Database(e.to_string()))?;

    rows.iter().map(report_from_row).collect()
}

/// Full scan of the collection, used by the aggregation views.
///
/// The corpus is assumed small; there are no materialized aggregates by
/// design.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a stored value cannot be
/// converted.
pub async fn all_reports(db: &dyn Database) -> Result<Vec<ReportRow>, DbError> {
    let rows = db
        .query_raw_params("SELECT * FROM reports", &[])
        .await
        .map_err(|e| DbError::Database(e.to_string()))?;

    rows.iter().map(report_from_row).collect()
}

/// Converts a raw database row into a [`ReportRow`].
fn report_from_row(row: &switchy_database::Row) -> Result<ReportRow, DbError> {
    let score_value: i64 = row.to_value("score").map_err(|e| DbError::Conversion {
        message: format!("Failed to read score: {e}"),
    })?;
    let score = NoiseScore::from_value(u8::try_from(score_value).unwrap_or(0)).map_err(|e| {
        DbError::Conversion {
            message: format!("Stored score out of range: {e}"),
        }
    })?;

    let noise_types_json: String =
        row.to_value("noise_types").map_err(|e| DbError::Conversion {
            message: format!("Failed to read noise_types: {e}"),
        })?;
    let noise_types: Vec<NoiseType> = serde_json::from_str(&noise_types_json)?;

    let created_at_millis: i64 = row.to_value("created_at").map_err(|e| DbError::Conversion {
        message: format!("Failed to read created_at: {e}"),
    })?;
    let created_at =
        DateTime::<Utc>::from_timestamp_millis(created_at_millis).ok_or_else(|| {
            DbError::Conversion {
                message: format!("Stored created_at out of range: {created_at_millis}"),
            }
        })?;

    Ok(ReportRow {
        id: row.to_value("id").unwrap_or_default(),
        submitter_id: row.to_value("submitter_id").unwrap_or_default(),
        address: row.to_value("address").unwrap_or_default(),
        address_key: row.to_value("address_key").unwrap_or_default(),
        score,
        noise_types,
        created_at,
        lat: row.to_value("lat").unwrap_or(None),
        lng: row.to_value("lng").unwrap_or(None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Box<dyn Database> {
        crate::open_in_memory().await.unwrap()
    }

    fn new_report(submitter: &str, address: &str, score: u8) -> NewReport {
        NewReport {
            submitter_id: submitter.to_string(),
            address: address.to_string(),
            score: NoiseScore::from_value(score).unwrap(),
            noise_types: vec![NoiseType::Footsteps],
            lat: None,
            lng: None,
        }
    }

    /// Overwrites a report's timestamp so ordering tests are deterministic.
    async fn set_created_at(db: &dyn Database, id: &str, millis: i64) {
        db.exec_raw_params(
            "UPDATE reports SET created_at = $2 WHERE id = $1",
            &[
                DatabaseValue::String(id.to_string()),
                DatabaseValue::Int64(millis),
            ],
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn insert_then_get_roundtrip() {
        let db = test_db().await;

        let inserted = insert_report(
            db.as_ref(),
            NewReport {
                submitter_id: "user-1".to_string(),
                address: "서울로 1 101동 201호".to_string(),
                score: NoiseScore::Loud,
                noise_types: vec![NoiseType::Footsteps, NoiseType::FurnitureDragging],
                lat: Some(37.5665),
                lng: Some(126.978),
            },
        )
        .await
        .unwrap();

        let fetched = get_report_by_id(db.as_ref(), &inserted.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fetched, inserted);
        assert_eq!(fetched.address_key, "서울로 1 101동 201호");
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        let db = test_db().await;
        let result = get_report_by_id(db.as_ref(), "no-such-id").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn address_query_matches_normalized_variants() {
        let db = test_db().await;

        insert_report(db.as_ref(), new_report("u1", "101동 201호", 3))
            .await
            .unwrap();
        insert_report(db.as_ref(), new_report("u2", "101동  201호", 4))
            .await
            .unwrap();
        // Differently placed space: a different address entirely.
        insert_report(db.as_ref(), new_report("u3", "101 동 201호", 5))
            .await
            .unwrap();

        let matches = query_by_address(db.as_ref(), "101동 201호").await.unwrap();
        assert_eq!(matches.len(), 2);

        let other = query_by_address(db.as_ref(), "101 동 201호").await.unwrap();
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].score, NoiseScore::VeryLoud);
    }

    #[tokio::test]
    async fn submitter_query_is_newest_first() {
        let db = test_db().await;

        let first = insert_report(db.as_ref(), new_report("u1", "A", 1))
            .await
            .unwrap();
        let second = insert_report(db.as_ref(), new_report("u1", "B", 2))
            .await
            .unwrap();
        insert_report(db.as_ref(), new_report("u2", "A", 3))
            .await
            .unwrap();

        set_created_at(db.as_ref(), &first.id, 1_000).await;
        set_created_at(db.as_ref(), &second.id, 2_000).await;

        let mine = query_by_submitter(db.as_ref(), "u1").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, second.id);
        assert_eq!(mine[1].id, first.id);
    }

    #[tokio::test]
    async fn update_changes_only_score_and_noise_types() {
        let db = test_db().await;

        let inserted = insert_report(db.as_ref(), new_report("u1", "101동 201호", 2))
            .await
            .unwrap();

        update_report(
            db.as_ref(),
            &inserted.id,
            &ReportUpdate {
                score: NoiseScore::VeryLoud,
                noise_types: vec![NoiseType::Shouting],
            },
        )
        .await
        .unwrap();

        let updated = get_report_by_id(db.as_ref(), &inserted.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.score, NoiseScore::VeryLoud);
        assert_eq!(updated.noise_types, vec![NoiseType::Shouting]);
        assert_eq!(updated.address, inserted.address);
        assert_eq!(updated.submitter_id, inserted.submitter_id);
        assert_eq!(updated.created_at, inserted.created_at);
    }

    #[tokio::test]
    async fn latest_reports_orders_and_limits() {
        let db = test_db().await;

        let mut ids = Vec::new();
        for i in 0..4 {
            let row = insert_report(db.as_ref(), new_report("u1", &format!("addr {i}"), 3))
                .await
                .unwrap();
            ids.push(row.id);
        }
        for (i, id) in ids.iter().enumerate() {
            set_created_at(db.as_ref(), id, 1_000 * (i as i64 + 1)).await;
        }

        let latest = latest_reports(db.as_ref(), 2).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].id, ids[3]);
        assert_eq!(latest[1].id, ids[2]);
    }
}

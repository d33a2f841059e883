//! HTTP handler functions for the noise map API.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::{DateTime, Utc};
use noise_map_database::queries;
use noise_map_database_models::{NewReport, ReportUpdate};
use noise_map_eligibility::Decision;
use noise_map_geocoder::{coords, http_client, road_address};
use noise_map_server_models::{
    AddressQueryParams, AddressSearchResponse, ApiHealth, ApiOwnReport, ApiReport,
    ReportQueryParams, SubmitReportRequest, SummaryQueryParams, UpdateReportRequest,
    validate_rating,
};

use crate::AppState;
use crate::auth::verify_user;
use crate::error::ApiError;

/// Number of reports returned by the latest activity feed.
const LATEST_FEED_LIMIT: u32 = 5;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/address?keyword=`
///
/// Resolves a free-text keyword to canonical road-address candidates via
/// the external address lookup service.
pub async fn address_search(
    state: web::Data<AppState>,
    params: web::Query<AddressQueryParams>,
) -> Result<HttpResponse, ApiError> {
    let keyword = params
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::invalid_input("Keyword is required"))?;

    let Some(config) = &state.road_address else {
        log::error!("Road address service is not configured");
        return Err(ApiError::internal("Server configuration error"));
    };

    let addresses = road_address::search(http_client(), config, keyword)
        .await
        .map_err(|e| {
            log::error!("Address lookup failed: {e}");
            ApiError::upstream_unavailable("Failed to fetch address data")
        })?;

    Ok(HttpResponse::Ok().json(AddressSearchResponse { addresses }))
}

/// `GET /api/reports`
///
/// Two mutually distinct query modes on one endpoint: `?address=` lists
/// reports for one normalized address with submitter identities stripped;
/// `?checkEligibility=true` evaluates the caller's submission eligibility.
pub async fn reports(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Query<ReportQueryParams>,
) -> Result<HttpResponse, ApiError> {
    if params.check_eligibility.as_deref() == Some("true") {
        let uid = verify_user(&req, state.verifier.as_ref()).await?;
        let decision = submission_eligibility(&state, &uid).await?;
        return Ok(HttpResponse::Ok().json(decision));
    }

    if let Some(address) = params.address.as_deref() {
        let rows = queries::query_by_address(state.db.as_ref(), address).await?;
        let reports: Vec<ApiReport> = rows.into_iter().map(ApiReport::from).collect();
        return Ok(HttpResponse::Ok().json(reports));
    }

    Err(ApiError::invalid_input(
        "Invalid request. Provide \"address\" or \"checkEligibility\".",
    ))
}

/// `POST /api/reports`
///
/// Creates a new report. Eligibility is re-evaluated here, at write time,
/// rather than trusted from a prior `checkEligibility` read; the check is
/// time-dependent and a client may delay between checking and submitting.
/// The check-then-insert sequence itself is not atomic (see DESIGN.md).
pub async fn submit_report(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<SubmitReportRequest>,
) -> Result<HttpResponse, ApiError> {
    let uid = verify_user(&req, state.verifier.as_ref()).await?;

    let address = body.address.trim();
    if address.is_empty() {
        return Err(ApiError::invalid_input("Address is required"));
    }

    let rating =
        validate_rating(body.score, &body.noise_types).map_err(ApiError::invalid_input)?;

    let decision = submission_eligibility(&state, &uid).await?;
    if !decision.eligible {
        return Err(ApiError::rate_limited(decision.reason.unwrap_or_else(|| {
            "Submission quota reached".to_string()
        })));
    }

    // Geocoding failure is tolerated by design: the report is saved
    // without coordinates.
    let coordinates = match &state.geocode {
        Some(config) => match coords::geocode(http_client(), config, address).await {
            Ok(coordinates) => coordinates,
            Err(e) => {
                log::warn!("Geocoding failed for submitted address: {e}");
                None
            }
        },
        None => None,
    };

    let row = queries::insert_report(
        state.db.as_ref(),
        NewReport {
            submitter_id: uid,
            address: address.to_string(),
            score: rating.score,
            noise_types: rating.noise_types,
            lat: coordinates.map(|c| c.lat),
            lng: coordinates.map(|c| c.lng),
        },
    )
    .await
    .map_err(|e| {
        log::error!("Failed to save report: {e}");
        ApiError::write_error("Failed to submit report")
    })?;

    Ok(HttpResponse::Created().json(ApiOwnReport::from(row)))
}

/// `PUT /api/reports/{id}`
///
/// Updates the score and noise types of an existing report. Gated by
/// ownership only, not eligibility; the address is never altered.
pub async fn update_report(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateReportRequest>,
) -> Result<HttpResponse, ApiError> {
    let uid = verify_user(&req, state.verifier.as_ref()).await?;
    let id = path.into_inner();

    let rating =
        validate_rating(body.score, &body.noise_types).map_err(ApiError::invalid_input)?;

    let Some(existing) = queries::get_report_by_id(state.db.as_ref(), &id).await? else {
        return Err(ApiError::not_found("Report not found"));
    };

    if existing.submitter_id != uid {
        return Err(ApiError::permission_denied());
    }

    queries::update_report(
        state.db.as_ref(),
        &id,
        &ReportUpdate {
            score: rating.score,
            noise_types: rating.noise_types,
        },
    )
    .await
    .map_err(|e| {
        log::error!("Failed to update report: {e}");
        ApiError::write_error("Failed to update report")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Report updated successfully"
    })))
}

/// `GET /api/reports/my`
///
/// The caller's own submission history, newest first, with full fields.
pub async fn my_reports(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let uid = verify_user(&req, state.verifier.as_ref()).await?;

    let rows = queries::query_by_submitter(state.db.as_ref(), &uid).await?;
    let reports: Vec<ApiOwnReport> = rows.into_iter().map(ApiOwnReport::from).collect();

    Ok(HttpResponse::Ok().json(reports))
}

/// `GET /api/reports/latest`
///
/// The most recent reports system-wide, submitter identities stripped.
pub async fn latest_reports(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let rows = queries::latest_reports(state.db.as_ref(), LATEST_FEED_LIMIT).await?;
    let reports: Vec<ApiReport> = rows.into_iter().map(ApiReport::from).collect();

    Ok(HttpResponse::Ok().json(reports))
}

/// `GET /api/reports/summary[?address=]`
///
/// Per-address aggregate scores. With `address`, at most one summary for
/// that normalized address; without, a summary for every address (the
/// heatmap feed). Zero matches is an empty list, not an error.
pub async fn summary(
    state: web::Data<AppState>,
    params: web::Query<SummaryQueryParams>,
) -> Result<HttpResponse, ApiError> {
    let summaries = match params.address.as_deref() {
        Some(address) => noise_map_analytics::address_summary(state.db.as_ref(), address)
            .await?
            .into_iter()
            .collect(),
        None => noise_map_analytics::all_summaries(state.db.as_ref()).await?,
    };

    Ok(HttpResponse::Ok().json(summaries))
}

/// `GET /api/reports/locations`
///
/// Coordinates and score for every report with stored coordinates, for
/// the map layer.
pub async fn locations(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let locations = noise_map_analytics::report_locations(state.db.as_ref()).await?;
    Ok(HttpResponse::Ok().json(locations))
}

/// `GET /api/ranking`
///
/// Top-5 quietest addresses with at least 3 reports, quietest first.
pub async fn ranking(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let ranked = noise_map_analytics::quietest_ranking(state.db.as_ref()).await?;
    Ok(HttpResponse::Ok().json(ranked))
}

/// Evaluates the caller's submission eligibility against its full prior
/// history. Invoked fresh on every attempt; never cached.
async fn submission_eligibility(state: &AppState, uid: &str) -> Result<Decision, ApiError> {
    let prior = queries::query_by_submitter(state.db.as_ref(), uid).await?;
    let created_ats: Vec<DateTime<Utc>> = prior.iter().map(|r| r.created_at).collect();

    Ok(noise_map_eligibility::check(
        &state.policy,
        uid,
        &created_ats,
        Utc::now(),
    ))
}

//! Geocoding client (Naver Maps geocode API).
//!
//! Turns a canonical road address into WGS84 coordinates. "No match" is a
//! normal outcome (`Ok(None)`), not an error: reports for addresses the
//! geocoder can't resolve are stored without coordinates.
//!
//! See <https://api.ncloud-docs.com/docs/ai-naver-mapsgeocoding>

use crate::{Coordinates, GeocodeError};

/// Default endpoint for the geocode API.
pub const DEFAULT_BASE_URL: &str =
    "https://naveropenapi.apigw.ntruss.com/map-geocode/v2/geocode";

/// Configuration for the geocoding service.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// Endpoint URL.
    pub base_url: String,
    /// API gateway key ID.
    pub client_id: String,
    /// API gateway key secret.
    pub client_secret: String,
}

impl GeocodeConfig {
    /// Builds the configuration from the environment.
    ///
    /// Reads `NAVER_MAP_CLIENT_ID`, `NAVER_MAP_CLIENT_SECRET`, and
    /// optionally `NAVER_MAP_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::MissingCredential`] if either credential is
    /// not set.
    pub fn from_env() -> Result<Self, GeocodeError> {
        let client_id = std::env::var("NAVER_MAP_CLIENT_ID").map_err(|_| {
            GeocodeError::MissingCredential {
                name: "NAVER_MAP_CLIENT_ID",
            }
        })?;
        let client_secret = std::env::var("NAVER_MAP_CLIENT_SECRET").map_err(|_| {
            GeocodeError::MissingCredential {
                name: "NAVER_MAP_CLIENT_SECRET",
            }
        })?;
        let base_url =
            std::env::var("NAVER_MAP_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            base_url,
            client_id,
            client_secret,
        })
    }
}

/// Geocodes a single canonical address.
///
/// Returns `Ok(None)` when the service has no match for the address.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn geocode(
    client: &reqwest::Client,
    config: &GeocodeConfig,
    address: &str,
) -> Result<Option<Coordinates>, GeocodeError> {
    let resp = client
        .get(&config.base_url)
        .query(&[("query", address)])
        .header("X-NCP-APIGW-API-KEY-ID", &config.client_id)
        .header("X-NCP-APIGW-API-KEY", &config.client_secret)
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses the geocode API JSON response.
///
/// Coordinates arrive as strings: `y` is latitude, `x` is longitude.
fn parse_response(body: &serde_json::Value) -> Result<Option<Coordinates>, GeocodeError> {
    let addresses = body["addresses"].as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Missing addresses in geocode response".to_string(),
    })?;

    let Some(first) = addresses.first() else {
        return Ok(None);
    };

    let lat = first["y"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing y coordinate in geocode response".to_string(),
        })?;

    let lng = first["x"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing x coordinate in geocode response".to_string(),
        })?;

    Ok(Some(Coordinates { lat, lng }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_geocode_result() {
        let body = serde_json::json!({
            "addresses": [{
                "roadAddress": "서울특별시 중구 세종대로 110",
                "x": "126.9779692",
                "y": "37.5662952"
            }]
        });
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.lat - 37.566_295_2).abs() < 1e-6);
        assert!((result.lng - 126.977_969_2).abs() < 1e-6);
    }

    #[test]
    fn parses_no_match_as_none() {
        let body = serde_json::json!({ "addresses": [] });
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_malformed_response() {
        let body = serde_json::json!({ "status": "INVALID_REQUEST" });
        assert!(parse_response(&body).is_err());
    }
}

//! Road address search client (juso.go.kr address link API).
//!
//! Turns a free-text keyword into a deduplicated list of canonical road
//! addresses. Where a result carries a building name, it is appended to
//! the road address to disambiguate apartment complexes.
//!
//! See <https://business.juso.go.kr/addrlink/openApi/searchApi.do>

use crate::GeocodeError;

/// Default endpoint for the address link API.
pub const DEFAULT_BASE_URL: &str = "https://business.juso.go.kr/addrlink/addrLinkApi.do";

/// Configuration for the road address search service.
#[derive(Debug, Clone)]
pub struct RoadAddressConfig {
    /// Endpoint URL.
    pub base_url: String,
    /// Confirmation key issued for the API.
    pub api_key: String,
}

impl RoadAddressConfig {
    /// Builds the configuration from the environment.
    ///
    /// Reads `JUSO_API_KEY` and optionally `JUSO_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::MissingCredential`] if `JUSO_API_KEY` is not
    /// set.
    pub fn from_env() -> Result<Self, GeocodeError> {
        let api_key = std::env::var("JUSO_API_KEY")
            .map_err(|_| GeocodeError::MissingCredential { name: "JUSO_API_KEY" })?;
        let base_url =
            std::env::var("JUSO_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self { base_url, api_key })
    }
}

/// Searches for canonical road addresses matching a free-text keyword.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn search(
    client: &reqwest::Client,
    config: &RoadAddressConfig,
    keyword: &str,
) -> Result<Vec<String>, GeocodeError> {
    let resp = client
        .get(&config.base_url)
        .query(&[
            ("confmKey", config.api_key.as_str()),
            ("currentPage", "1"),
            ("countPerPage", "10"),
            ("keyword", keyword),
            ("resultType", "json"),
        ])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses the address link API JSON response into deduplicated address
/// strings.
fn parse_response(body: &serde_json::Value) -> Result<Vec<String>, GeocodeError> {
    let juso = body["results"]["juso"]
        .as_array()
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing results.juso in address response".to_string(),
        })?;

    let mut addresses = Vec::with_capacity(juso.len());

    for item in juso {
        let Some(road_addr) = item["roadAddr"].as_str() else {
            continue;
        };

        let address = match item["bdNm"].as_str() {
            Some(building) if !building.is_empty() => format!("{road_addr} {building}"),
            _ => road_addr.to_string(),
        };

        if !addresses.contains(&address) {
            addresses.push(address);
        }
    }

    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_addresses_with_building_names() {
        let body = serde_json::json!({
            "results": {
                "juso": [
                    { "roadAddr": "서울특별시 중구 세종대로 110", "bdNm": "서울시청" },
                    { "roadAddr": "서울특별시 중구 세종대로 99", "bdNm": "" }
                ]
            }
        });
        let addresses = parse_response(&body).unwrap();
        assert_eq!(
            addresses,
            vec![
                "서울특별시 중구 세종대로 110 서울시청".to_string(),
                "서울특별시 중구 세종대로 99".to_string(),
            ]
        );
    }

    #[test]
    fn deduplicates_repeated_addresses() {
        let body = serde_json::json!({
            "results": {
                "juso": [
                    { "roadAddr": "세종대로 110", "bdNm": "시청" },
                    { "roadAddr": "세종대로 110", "bdNm": "시청" }
                ]
            }
        });
        let addresses = parse_response(&body).unwrap();
        assert_eq!(addresses.len(), 1);
    }

    #[test]
    fn rejects_malformed_response() {
        let body = serde_json::json!({ "results": {} });
        assert!(parse_response(&body).is_err());
    }
}

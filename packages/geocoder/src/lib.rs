#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! External address lookup and geocoding clients for the noise map.
//!
//! Two upstream services, consumed only through their documented
//! request/response contracts:
//!
//! 1. **Road address search** — free-text keyword to canonical road-address
//!    strings (the juso.go.kr address link API).
//! 2. **Geocoding** — canonical address to latitude/longitude (the Naver
//!    Maps geocoding API).
//!
//! Both are pure request/response with no local state. Geocoding failures
//! are expected and tolerated by callers: a report saved without
//! coordinates is not an error condition.

pub mod coords;
pub mod road_address;

use std::sync::LazyLock;

use thiserror::Error;

/// Process-wide HTTP client, lazily constructed on first use.
///
/// Both upstream clients share this handle; it is never re-initialized.
static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

/// Returns the shared HTTP client handle.
pub fn http_client() -> &'static reqwest::Client {
    &HTTP_CLIENT
}

/// A geocoding result in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// Errors from address lookup and geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Required API credentials are not configured.
    #[error("Missing credential: {name}")]
    MissingCredential {
        /// Name of the missing environment variable.
        name: &'static str,
    },
}

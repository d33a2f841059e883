//! API error boundary.
//!
//! Every failure leaving a handler is converted into a structured JSON
//! response with a stable error kind and a human-readable message; nothing
//! crashes the process. Geocoding failures never reach this boundary at
//! all: they are swallowed at the submission path and the report is saved
//! without coordinates.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use noise_map_analytics::AnalyticsError;
use noise_map_database::DbError;

/// Stable error kinds exposed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// No valid identity presented where one is required.
    Unauthenticated,
    /// Authenticated, but not the owner of the resource.
    PermissionDenied,
    /// The referenced report does not exist.
    NotFound,
    /// Malformed submission or query.
    InvalidInput,
    /// The eligibility gate rejected the submission.
    RateLimited,
    /// An upstream address service failed or timed out.
    UpstreamUnavailable,
    /// The backing store rejected a write.
    WriteError,
    /// Anything else.
    Internal,
}

impl ApiErrorKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidInput => "INVALID_INPUT",
            Self::RateLimited => "RATE_LIMITED",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::WriteError => "WRITE_ERROR",
            Self::Internal => "INTERNAL",
        }
    }

    const fn status_code(self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            Self::WriteError | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A handler failure with a stable kind and message.
#[derive(Debug)]
pub struct ApiError {
    /// Stable error kind.
    pub kind: ApiErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// Missing or invalid session.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self {
            kind: ApiErrorKind::Unauthenticated,
            message: "Authentication required".to_string(),
        }
    }

    /// Authenticated but not the resource owner.
    #[must_use]
    pub fn permission_denied() -> Self {
        Self {
            kind: ApiErrorKind::PermissionDenied,
            message: "Permission denied".to_string(),
        }
    }

    /// Unknown report ID.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::NotFound,
            message: message.into(),
        }
    }

    /// Malformed submission or query.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::InvalidInput,
            message: message.into(),
        }
    }

    /// Eligibility gate rejection.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::RateLimited,
            message: message.into(),
        }
    }

    /// Upstream address service failure.
    #[must_use]
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::UpstreamUnavailable,
            message: message.into(),
        }
    }

    /// Store rejected a write.
    #[must_use]
    pub fn write_error(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::WriteError,
            message: message.into(),
        }
    }

    /// Anything else.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Internal,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": {
                "kind": self.kind.as_str(),
                "message": self.message,
            }
        }))
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        log::error!("Report store error: {e}");
        Self::internal("Report store error")
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(e: AnalyticsError) -> Self {
        log::error!("Aggregation error: {e}");
        Self::internal("Aggregation error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_expected_statuses() {
        assert_eq!(
            ApiError::unauthenticated().status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::permission_denied().status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::rate_limited("cooldown").status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::upstream_unavailable("juso down").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn response_body_carries_stable_kind() {
        let err = ApiError::rate_limited("You can submit again later");
        assert_eq!(err.to_string(), "RATE_LIMITED: You can submit again later");
    }
}

//! Session-cookie resolution.
//!
//! The server reads the `session` cookie and hands the token to the
//! configured [`SessionVerifier`]. Cookie issuance and token semantics
//! belong to the external identity provider; here a session is only ever
//! valid or not.

use actix_web::HttpRequest;
use noise_map_identity::SessionVerifier;

use crate::error::ApiError;

/// Name of the session cookie set by the identity provider flow.
pub const SESSION_COOKIE: &str = "session";

/// Resolves the request's session cookie to a verified identity.
///
/// # Errors
///
/// Returns [`ApiError::unauthenticated`] when the cookie is missing or the
/// verifier rejects it. Provider outages are treated the same way: an
/// unverifiable session is not an authenticated one.
pub async fn verify_user(
    req: &HttpRequest,
    verifier: &dyn SessionVerifier,
) -> Result<String, ApiError> {
    let Some(cookie) = req.cookie(SESSION_COOKIE) else {
        return Err(ApiError::unauthenticated());
    };

    verifier.verify(cookie.value()).await.map_err(|e| {
        log::debug!("Session verification failed: {e}");
        ApiError::unauthenticated()
    })
}

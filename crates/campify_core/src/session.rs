//! crates/campify_core/src/session.rs
//!
//! Maps an opaque session token to the signed-in user.

use chrono::{DateTime, Utc};

use crate::domain::User;
use crate::ports::{EntityStore, PortError, PortResult};

/// Session lifetime; the cookie's `Max-Age` uses the same value.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "campify-session";

/// Resolves a token to its user.
///
/// `Ok(None)` means unauthenticated: no token, an unknown or expired token, or
/// a token whose user no longer exists. Only store failures are errors.
pub async fn resolve_session(
    store: &dyn EntityStore,
    token: Option<&str>,
    now: DateTime<Utc>,
) -> PortResult<Option<User>> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    let Some(session) = store.find_auth_session(token).await? else {
        return Ok(None);
    };
    if !session.is_live(now) {
        return Ok(None);
    }

    match store.get_user(&session.user_id).await {
        Ok(user) => Ok(Some(user)),
        Err(PortError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Pulls the session token out of a raw `Cookie` header value.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix(SESSION_COOKIE_NAME)
            .and_then(|rest| rest.strip_prefix('='))
    })
}

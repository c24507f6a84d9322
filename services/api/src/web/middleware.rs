//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes, plus the route guard
//! handlers call before touching any data.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use campify_core::domain::User;
use campify_core::policy::{can_access_route, Route};
use campify_core::session::{resolve_session, token_from_cookie_header};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::web::state::AppState;

/// The signed-in user, inserted into request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that resolves the session cookie to a user.
///
/// If valid, inserts a `CurrentUser` into request extensions for handlers to use.
/// If missing, unknown or expired, returns 401 with a redirect hint to `/login`.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract the session token from the cookie header
    let token = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header)
        .map(str::to_string);

    // 2. Resolve it to a live user
    let user = resolve_session(state.store.as_ref(), token.as_deref(), Utc::now())
        .await?
        .ok_or_else(|| {
            debug!("Rejecting request to {} without a live session", req.uri().path());
            ApiError::Unauthenticated
        })?;

    // 3. Insert the user into request extensions
    req.extensions_mut().insert(CurrentUser(user));

    // 4. Continue to the handler
    Ok(next.run(req).await)
}

/// Denies the request unless the user's role may open `route`.
pub fn require_route(user: &User, route: Route) -> Result<(), ApiError> {
    if can_access_route(user, route) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "You do not have permission to access {}.",
            route.label()
        )))
    }
}

/// Picks the student whose records a Student or Parent page shows.
///
/// A Student always sees themself. A Parent sees the requested child, or the
/// first linked child when none is requested; `None` means no child is linked.
pub fn subject_student(user: &User, requested: Option<&str>) -> Result<Option<String>, ApiError> {
    if user.is_student() {
        return Ok(Some(user.id.clone()));
    }
    let children = user.child_ids();
    match requested {
        Some(id) if children.iter().any(|c| c == id) => Ok(Some(id.to_string())),
        Some(_) => Err(ApiError::forbidden(
            "You can only view records of your own children.",
        )),
        None => Ok(children.first().cloned()),
    }
}

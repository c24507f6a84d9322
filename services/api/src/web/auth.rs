//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, and logout.
//!
//! Credentials are not verified: login looks the account up by email alone and
//! registration validates the password without storing it.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use campify_core::domain::{NewUser, Role};
use campify_core::generation::FieldErrors;
use campify_core::ports::PortError;
use campify_core::session::{token_from_cookie_header, SESSION_COOKIE_NAME, SESSION_TTL_HOURS};
use chrono::{Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::web::state::AppState;
use crate::web::views::UserView;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const MIN_NAME_CHARS: usize = 2;
pub const MIN_PASSWORD_CHARS: usize = 8;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    /// Accepted for form compatibility; not checked.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// `Student` or `Parent`.
    pub role: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserView,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

//=========================================================================================
// Validation
//=========================================================================================

fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

pub fn validate_password(field: &str, password: &str, errors: &mut FieldErrors) {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        errors.add(field, "Password must be at least 8 characters.");
    }
}

/// Checks a registration form, returning the new account on success.
fn validate_registration(req: &RegisterRequest) -> Result<NewUser, FieldErrors> {
    let mut errors = FieldErrors::new();
    let name = req.name.trim();
    if name.chars().count() < MIN_NAME_CHARS {
        errors.add("name", "Name must be at least 2 characters.");
    }
    let email = req.email.trim();
    if !is_valid_email(email) {
        errors.add("email", "Please enter a valid email.");
    }
    validate_password("password", &req.password, &mut errors);
    let role = match req.role.as_str() {
        "Student" => Some(Role::Student),
        "Parent" => Some(Role::Parent),
        _ => {
            errors.add("role", "You must select a role.");
            None
        }
    };

    errors.into_result()?;
    role.map(|role| NewUser {
        name: name.to_string(),
        email: email.to_string(),
        role,
    })
    .ok_or_else(FieldErrors::new)
}

fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE_NAME,
        token,
        Duration::hours(SESSION_TTL_HOURS).num_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn cleared_cookie(secure: bool) -> String {
    let mut cookie = format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE_NAME);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/login - Sign in by email
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; sets the session cookie", body = AuthResponse),
        (status = 401, description = "Unknown account", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Get user by email
    let user = match state.store.get_user_by_email(req.email.trim()).await {
        Ok(user) => user,
        Err(PortError::NotFound(_)) => return Err(ApiError::InvalidCredentials),
        Err(e) => return Err(e.into()),
    };

    // 2. Generate an opaque auth session token
    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::hours(SESSION_TTL_HOURS);

    // 3. Create the auth session in the store
    state
        .store
        .create_auth_session(&token, &user.id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            e
        })?;
    info!("{} {} signed in", user.role(), user.id);

    // 4. Return response with cookie
    let cookie = session_cookie(&token, state.config.cookie_secure);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: UserView::from(&user),
        }),
    ))
}

/// POST /auth/register - Create a Student or Parent account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created; sign in next", body = AuthResponse),
        (status = 422, description = "Invalid fields or email already registered", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new_user = validate_registration(&req).map_err(ApiError::Validation)?;

    let user = match state.store.create_user(new_user).await {
        Ok(user) => user,
        Err(PortError::Conflict(_)) => {
            return Err(ApiError::invalid(
                "email",
                "An account with this email already exists.",
            ))
        }
        Err(e) => return Err(e.into()),
    };
    info!("Registered new {} account {}", user.role(), user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserView::from(&user),
        }),
    ))
}

/// POST /auth/logout - Destroy the session and clear the cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Extract the session token, if any
    let token = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header);

    // 2. Delete the auth session from the store
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        state.store.delete_auth_session(token).await?;
    }

    // 3. Clear cookie
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cleared_cookie(state.config.cookie_secure))],
        Json(MessageResponse {
            message: "Signed out.".to_string(),
        }),
    ))
}

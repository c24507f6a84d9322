//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! variant is presented to a client.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use campify_core::generation::FieldErrors;
use campify_core::ports::PortError;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;
use utoipa::ToSchema;

/// Generic text shown for any report-text failure.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Something went wrong while generating the text. Please try again later.";

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No session, or a session that no longer resolves.
    #[error("Authentication required")]
    Unauthenticated,

    /// A login attempt for an unknown account.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Signed in, but the role lacks permission for the route or action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A referenced id did not resolve; `redirect` names a safe listing page.
    #[error("{what} not found")]
    NotFound { what: String, redirect: &'static str },

    /// Malformed input, reported field by field.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// The report-text service failed or timed out.
    #[error("Text generation failed: {0}")]
    Generation(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(what: impl Into<String>, redirect: &'static str) -> Self {
        ApiError::NotFound {
            what: what.into(),
            redirect,
        }
    }

    /// A store miss for one id becomes a 404 pointing at `redirect`; any
    /// other port failure is passed through unchanged.
    pub fn lookup(err: PortError, what: impl Into<String>, redirect: &'static str) -> Self {
        match err {
            PortError::NotFound(_) => Self::not_found(what, redirect),
            other => ApiError::Port(other),
        }
    }

    /// A single-field validation failure.
    pub fn invalid(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        ApiError::Validation(errors)
    }
}

/// The JSON body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    /// Where a client should send the user next, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>, redirect: Option<&str>) -> Self {
        Self {
            error: error.into(),
            redirect: redirect.map(str::to_string),
            fields: BTreeMap::new(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("Authentication required.", Some("/login")),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("Invalid email or password.", None),
            ),
            ApiError::Forbidden(message) => (
                StatusCode::FORBIDDEN,
                ErrorBody::new(message, Some("/dashboard")),
            ),
            ApiError::NotFound { what, redirect } => (
                StatusCode::NOT_FOUND,
                ErrorBody::new(format!("{what} not found."), Some(redirect)),
            ),
            ApiError::Port(PortError::NotFound(what)) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new(format!("{what} not found."), Some("/dashboard")),
            ),
            ApiError::Validation(errors) => {
                let mut body = ErrorBody::new("Please correct the highlighted fields.", None);
                body.fields = errors
                    .iter()
                    .map(|(field, message)| (field.to_string(), message.to_string()))
                    .collect();
                (StatusCode::UNPROCESSABLE_ENTITY, body)
            }
            ApiError::Generation(detail) => {
                error!("Report-text generation failed: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody::new(GENERATION_FAILED_MESSAGE, None),
                )
            }
            other => {
                error!("Internal error: {:?}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("An unexpected error occurred.", None),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

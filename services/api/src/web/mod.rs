pub mod academics;
pub mod ai;
pub mod auth;
pub mod middleware;
pub mod overview;
pub mod payments;
pub mod people;
pub mod profile;
pub mod reports;
pub mod rest;
pub mod state;
pub mod views;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ConfigError;
use crate::error::ApiError;
use crate::web::{middleware::require_auth, rest::ApiDoc, state::AppState};

pub use middleware::CurrentUser;

/// Builds the complete application: public auth routes, session-protected
/// routes, CORS, request tracing and the Swagger UI.
pub fn app_router(state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string()))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Protected routes (session required)
    let protected_routes = Router::new()
        .route("/me", get(overview::me_handler))
        .route("/dashboard", get(overview::dashboard_handler))
        .route("/courses", get(academics::list_courses_handler))
        .route("/grades", get(academics::grades_handler))
        .route("/timetable", get(academics::timetable_handler))
        .route("/students", get(people::list_students_handler))
        .route("/students/{id}", get(people::student_detail_handler))
        .route("/students/{id}/summary", post(people::summarize_student_handler))
        .route("/teachers", get(people::list_teachers_handler))
        .route("/payments", get(payments::list_payments_handler))
        .route("/payments/{id}/pay", post(payments::pay_handler))
        .route("/payments/{id}/notice", get(payments::fee_notice_handler))
        .route(
            "/reports",
            get(reports::list_reports_handler).post(reports::share_report_handler),
        )
        .route("/reports/drafts", get(reports::report_drafts_handler))
        .route("/reports/{id}/comments", post(reports::add_comment_handler))
        .route("/ai/grade-report", post(ai::grade_report_handler))
        .route("/ai/attendance-report", post(ai::attendance_report_handler))
        .route("/ai/student-summary", post(ai::student_summary_handler))
        .route("/ai/helpdesk", post(ai::helpdesk_handler))
        .route("/profile", put(profile::update_profile_handler))
        .route("/profile/password", put(profile::update_password_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}

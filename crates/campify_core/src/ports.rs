//! crates/campify_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific implementations like the entity store or the
//! hosted language model.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Assignment, Attendance, AuthSession, Course, Grade, NewUser, Payment, ReportComment,
    SharedReport, Timetable, User,
};
use crate::generation::GenerationRequest;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The process-wide owner of every entity collection.
///
/// Reads return owned snapshots. Writes are appends (plus the profile name
/// edit) and are serialized per collection by the implementation.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // --- Users ---
    async fn get_user(&self, user_id: &str) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<User>;

    async fn list_users(&self) -> PortResult<Vec<User>>;

    /// Registers a new account. Fails with `Conflict` if the email is taken.
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    async fn update_user_name(&self, user_id: &str, name: &str) -> PortResult<User>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        token: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Looks up a session by token. Unknown tokens are `Ok(None)`.
    async fn find_auth_session(&self, token: &str) -> PortResult<Option<AuthSession>>;

    async fn delete_auth_session(&self, token: &str) -> PortResult<()>;

    // --- Academic Records ---
    async fn list_courses(&self) -> PortResult<Vec<Course>>;

    async fn list_grades(&self) -> PortResult<Vec<Grade>>;

    async fn grades_for_student(&self, student_id: &str) -> PortResult<Vec<Grade>>;

    async fn attendance_for_student(&self, student_id: &str) -> PortResult<Vec<Attendance>>;

    async fn assignments_for_student(&self, student_id: &str) -> PortResult<Vec<Assignment>>;

    async fn timetable_for_student(&self, student_id: &str) -> PortResult<Option<Timetable>>;

    /// Syllabus text keyed by course *name*.
    async fn syllabus_for_course(&self, course_name: &str) -> PortResult<Option<String>>;

    // --- Payments ---
    async fn list_payments(&self) -> PortResult<Vec<Payment>>;

    async fn get_payment(&self, payment_id: &str) -> PortResult<Payment>;

    // --- Shared Reports ---
    async fn list_shared_reports(&self) -> PortResult<Vec<SharedReport>>;

    async fn get_shared_report(&self, report_id: &str) -> PortResult<SharedReport>;

    async fn create_shared_report(&self, report: SharedReport) -> PortResult<SharedReport>;

    /// Appends to a report's thread and returns the updated report.
    async fn append_report_comment(&self, comment: ReportComment) -> PortResult<SharedReport>;
}

/// The hosted text-generation collaborator.
///
/// Opaque and possibly failing. Keeps no state between calls; the helpdesk
/// history travels inside the request.
#[async_trait]
pub trait ReportTextService: Send + Sync {
    /// Produces the single text block of the request kind's output object.
    async fn generate(&self, request: &GenerationRequest) -> PortResult<String>;
}

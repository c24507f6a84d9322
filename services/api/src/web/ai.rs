//! services/api/src/web/ai.rs
//!
//! Report-text generation endpoints. Payloads are validated field by field
//! before the report-text service is called; any service failure surfaces as
//! one generic message.

use axum::{extract::State, Extension, Json};
use campify_core::domain::{AttendanceStatus, User};
use campify_core::derive::AttendanceSummary;
use campify_core::generation::{
    AttendanceRecordInput, AttendanceReportInput, CourseAverageInput, FieldErrors,
    GenerationRequest, GradeReportInput, HelpdeskInput, HelpdeskMessage, HistoryRole,
    StudentSummaryInput,
};
use campify_core::policy::can_generate_report;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorBody};
use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;

//=========================================================================================
// Request Payloads
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GradeReportRequest {
    pub student_name: String,
    pub class_name: String,
    pub teacher_name: String,
    /// Free text, e.g. "Midterm: 85/100, Quiz: 9/10".
    pub grades: String,
    /// Free text, e.g. "2 absences, 1 lates".
    pub attendance: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AttendanceRecordPayload {
    pub date: String,
    /// `Present`, `Absent` or `Late`.
    pub status: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReportRequest {
    pub student_name: String,
    pub class_name: String,
    #[serde(default)]
    pub attendance_records: Vec<AttendanceRecordPayload>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseAveragePayload {
    pub name: String,
    pub average_grade: f64,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummaryPayload {
    pub absences: usize,
    pub lates: usize,
    pub total_days: f64,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummaryRequest {
    pub student_name: String,
    #[serde(default)]
    pub courses: Vec<CourseAveragePayload>,
    pub attendance: AttendanceSummaryPayload,
}

#[derive(Deserialize, ToSchema)]
pub struct HistoryEntry {
    /// `user` or `model`.
    pub role: String,
    pub content: String,
}

#[derive(Deserialize, ToSchema)]
pub struct HelpdeskRequest {
    pub query: String,
    /// Earlier turns of this conversation; the server keeps none.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

//=========================================================================================
// Response Payloads
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct ReportResponse {
    pub report: String,
}

#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Serialize, ToSchema)]
pub struct HelpdeskResponse {
    pub response: String,
}

//=========================================================================================
// Shared Runner
//=========================================================================================

/// Validates `request`, then asks the report-text service for prose.
pub async fn generate_text(state: &AppState, request: GenerationRequest) -> Result<String, ApiError> {
    request.validate().map_err(ApiError::Validation)?;
    let kind = request.kind();
    let text = state
        .report_text
        .generate(&request)
        .await
        .map_err(|e| ApiError::Generation(format!("{}: {}", kind.as_str(), e)))?;
    info!("Generated {} ({} chars)", kind.as_str(), text.len());
    Ok(text)
}

/// Fails with the payload's parse errors together with its validation errors.
fn report_all_problems(mut errors: FieldErrors, request: &GenerationRequest) -> Result<(), ApiError> {
    if let Err(invalid) = request.validate() {
        errors.merge(invalid);
    }
    errors.into_result().map_err(ApiError::Validation)
}

fn require_report_author(user: &User) -> Result<(), ApiError> {
    if can_generate_report(user) {
        Ok(())
    } else {
        warn!("{} {} tried to generate a report", user.role(), user.id);
        Err(ApiError::forbidden(
            "Only administrators and teachers can generate reports.",
        ))
    }
}

fn parse_status(value: &str) -> Option<AttendanceStatus> {
    match value {
        "Present" => Some(AttendanceStatus::Present),
        "Absent" => Some(AttendanceStatus::Absent),
        "Late" => Some(AttendanceStatus::Late),
        _ => None,
    }
}

fn parse_history_role(value: &str) -> Option<HistoryRole> {
    match value {
        "user" => Some(HistoryRole::User),
        "model" => Some(HistoryRole::Model),
        _ => None,
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Generate a grade report.
#[utoipa::path(
    post,
    path = "/ai/grade-report",
    request_body = GradeReportRequest,
    responses(
        (status = 200, description = "Generated report", body = ReportResponse),
        (status = 403, description = "Role cannot generate reports", body = ErrorBody),
        (status = 422, description = "Invalid fields", body = ErrorBody),
        (status = 502, description = "Generation failed", body = ErrorBody)
    ),
    tag = "ai"
)]
pub async fn grade_report_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<GradeReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    require_report_author(&user)?;
    let request = GenerationRequest::GradeReport(GradeReportInput {
        student_name: req.student_name,
        class_name: req.class_name,
        teacher_name: req.teacher_name,
        grades: req.grades,
        attendance: req.attendance,
    });
    let report = generate_text(&state, request).await?;
    Ok(Json(ReportResponse { report }))
}

/// Generate an attendance report.
#[utoipa::path(
    post,
    path = "/ai/attendance-report",
    request_body = AttendanceReportRequest,
    responses(
        (status = 200, description = "Generated report", body = ReportResponse),
        (status = 403, description = "Role cannot generate reports", body = ErrorBody),
        (status = 422, description = "Invalid fields", body = ErrorBody),
        (status = 502, description = "Generation failed", body = ErrorBody)
    ),
    tag = "ai"
)]
pub async fn attendance_report_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<AttendanceReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    require_report_author(&user)?;

    let mut errors = FieldErrors::new();
    let mut records = Vec::with_capacity(req.attendance_records.len());
    for (i, record) in req.attendance_records.into_iter().enumerate() {
        // A rejected status still takes its slot so later indices line up.
        let status = parse_status(&record.status).unwrap_or_else(|| {
            errors.add(
                &format!("attendanceRecords[{i}].status"),
                "Status must be Present, Absent or Late.",
            );
            AttendanceStatus::Present
        });
        records.push(AttendanceRecordInput {
            date: record.date,
            status,
        });
    }
    let request = GenerationRequest::AttendanceReport(AttendanceReportInput {
        student_name: req.student_name,
        class_name: req.class_name,
        attendance_records: records,
    });
    report_all_problems(errors, &request)?;
    let report = generate_text(&state, request).await?;
    Ok(Json(ReportResponse { report }))
}

/// Generate a student performance summary from caller-supplied aggregates.
#[utoipa::path(
    post,
    path = "/ai/student-summary",
    request_body = StudentSummaryRequest,
    responses(
        (status = 200, description = "Generated summary", body = SummaryResponse),
        (status = 403, description = "Role cannot generate reports", body = ErrorBody),
        (status = 422, description = "Invalid fields", body = ErrorBody),
        (status = 502, description = "Generation failed", body = ErrorBody)
    ),
    tag = "ai"
)]
pub async fn student_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<StudentSummaryRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    require_report_author(&user)?;
    let request = GenerationRequest::StudentSummary(StudentSummaryInput {
        student_name: req.student_name,
        courses: req
            .courses
            .into_iter()
            .map(|c| CourseAverageInput {
                name: c.name,
                average_grade: c.average_grade,
            })
            .collect(),
        attendance: AttendanceSummary {
            absences: req.attendance.absences,
            lates: req.attendance.lates,
            total_days: req.attendance.total_days,
        },
    });
    let summary = generate_text(&state, request).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// Answer a helpdesk question for the signed-in user's role.
#[utoipa::path(
    post,
    path = "/ai/helpdesk",
    request_body = HelpdeskRequest,
    responses(
        (status = 200, description = "Assistant answer", body = HelpdeskResponse),
        (status = 422, description = "Empty question or malformed history", body = ErrorBody),
        (status = 502, description = "Generation failed", body = ErrorBody)
    ),
    tag = "ai"
)]
pub async fn helpdesk_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<HelpdeskRequest>,
) -> Result<Json<HelpdeskResponse>, ApiError> {
    let mut errors = FieldErrors::new();
    let mut history = Vec::with_capacity(req.history.len());
    for (i, entry) in req.history.into_iter().enumerate() {
        let role = parse_history_role(&entry.role).unwrap_or_else(|| {
            errors.add(&format!("history[{i}].role"), "Role must be user or model.");
            HistoryRole::User
        });
        history.push(HelpdeskMessage {
            role,
            content: entry.content,
        });
    }
    let request = GenerationRequest::Helpdesk(HelpdeskInput {
        query: req.query,
        user_role: user.role().to_string(),
        history,
    });
    report_all_problems(errors, &request)?;
    let response = generate_text(&state, request).await?;
    Ok(Json(HelpdeskResponse { response }))
}

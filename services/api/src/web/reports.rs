//! services/api/src/web/reports.rs
//!
//! Shared report threads: listing, prefilled drafts, sharing and comments.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use campify_core::derive::order_report_threads;
use campify_core::domain::{Course, ReportComment, SharedReport, User};
use campify_core::generation::{attendance_report_draft, grade_report_draft, FieldErrors};
use campify_core::policy::{
    can_comment_on_report, can_generate_report, can_share_report, can_view_report, Route,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::web::middleware::{require_route, CurrentUser};
use crate::web::state::AppState;
use crate::web::views::{name_of, ReportView};

const REPORTS_PAGE: &str = "/dashboard/reports";

/// The first message of every newly shared thread.
pub const SHARE_GREETING: &str =
    "Here is the grade report we discussed. Please let me know if you have any questions.";

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct DraftQuery {
    pub student_id: String,
    pub course_id: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GradeReportDraft {
    pub student_name: String,
    pub class_name: String,
    pub teacher_name: String,
    pub grades: String,
    pub attendance: String,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceRecordDraft {
    pub date: String,
    pub status: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReportDraft {
    pub student_name: String,
    pub class_name: String,
    pub attendance_records: Vec<AttendanceRecordDraft>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftsResponse {
    pub grade_report: GradeReportDraft,
    pub attendance_report: AttendanceReportDraft,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareReportRequest {
    pub student_id: String,
    pub course_id: String,
    pub report_content: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CommentRequest {
    pub content: String,
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Resolves the (student, course) pair a report is about and checks that the
/// user may write about it.
fn report_subject<'a>(
    user: &User,
    users: &'a [User],
    courses: &'a [Course],
    student_id: &str,
    course_id: &str,
) -> Result<(&'a User, &'a Course), ApiError> {
    if !can_generate_report(user) {
        return Err(ApiError::forbidden(
            "Only administrators and teachers can write reports.",
        ));
    }
    let student = users
        .iter()
        .find(|u| u.id == student_id && u.is_student())
        .ok_or_else(|| ApiError::not_found(format!("Student '{student_id}'"), REPORTS_PAGE))?;
    let course = courses
        .iter()
        .find(|c| c.id == course_id)
        .ok_or_else(|| ApiError::not_found(format!("Course '{course_id}'"), REPORTS_PAGE))?;
    if !can_share_report(user, &student.id, course) {
        return Err(ApiError::forbidden(
            "You can only write reports for students enrolled in courses you teach.",
        ));
    }
    Ok((student, course))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Shared reports visible to the user, newest first, threads oldest first.
#[utoipa::path(
    get,
    path = "/reports",
    responses(
        (status = 200, description = "Visible reports", body = [ReportView]),
        (status = 403, description = "Role cannot open reports", body = ErrorBody)
    ),
    tag = "reports"
)]
pub async fn list_reports_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<ReportView>>, ApiError> {
    require_route(&user, Route::Reports)?;
    let users = state.store.list_users().await?;
    let courses = state.store.list_courses().await?;
    let reports: Vec<SharedReport> = state
        .store
        .list_shared_reports()
        .await?
        .into_iter()
        .filter(|r| can_view_report(&user, r, &courses))
        .collect();

    Ok(Json(
        order_report_threads(reports)
            .iter()
            .map(|r| ReportView::new(r, &users, &courses))
            .collect(),
    ))
}

/// Grade and attendance report inputs prefilled from the records.
#[utoipa::path(
    get,
    path = "/reports/drafts",
    params(DraftQuery),
    responses(
        (status = 200, description = "Prefilled inputs", body = DraftsResponse),
        (status = 403, description = "Not permitted", body = ErrorBody),
        (status = 404, description = "Unknown student or course", body = ErrorBody)
    ),
    tag = "reports"
)]
pub async fn report_drafts_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<DraftQuery>,
) -> Result<Json<DraftsResponse>, ApiError> {
    require_route(&user, Route::Reports)?;
    let users = state.store.list_users().await?;
    let courses = state.store.list_courses().await?;
    let (student, course) =
        report_subject(&user, &users, &courses, &query.student_id, &query.course_id)?;

    let grades = state.store.grades_for_student(&student.id).await?;
    let attendance = state.store.attendance_for_student(&student.id).await?;
    let teacher_name = name_of(&users, &course.teacher_id);

    let grade = grade_report_draft(student, course, teacher_name, &grades, &attendance);
    let attendance = attendance_report_draft(student, course, &attendance);

    Ok(Json(DraftsResponse {
        grade_report: GradeReportDraft {
            student_name: grade.student_name,
            class_name: grade.class_name,
            teacher_name: grade.teacher_name,
            grades: grade.grades,
            attendance: grade.attendance,
        },
        attendance_report: AttendanceReportDraft {
            student_name: attendance.student_name,
            class_name: attendance.class_name,
            attendance_records: attendance
                .attendance_records
                .into_iter()
                .map(|r| AttendanceRecordDraft {
                    date: r.date,
                    status: r.status.as_str().to_string(),
                })
                .collect(),
        },
    }))
}

/// Share a report with the student's parent.
#[utoipa::path(
    post,
    path = "/reports",
    request_body = ShareReportRequest,
    responses(
        (status = 201, description = "Report shared", body = ReportView),
        (status = 403, description = "Not permitted", body = ErrorBody),
        (status = 404, description = "Unknown student or course", body = ErrorBody),
        (status = 422, description = "Empty report", body = ErrorBody)
    ),
    tag = "reports"
)]
pub async fn share_report_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<ShareReportRequest>,
) -> Result<(StatusCode, Json<ReportView>), ApiError> {
    require_route(&user, Route::Reports)?;
    let mut errors = FieldErrors::new();
    errors.require("reportContent", &req.report_content, "Report content is required.");
    errors.into_result().map_err(ApiError::Validation)?;

    let users = state.store.list_users().await?;
    let courses = state.store.list_courses().await?;
    let (student, course) =
        report_subject(&user, &users, &courses, &req.student_id, &req.course_id)?;

    let now = Utc::now();
    let report_id = format!("report-{}", Uuid::new_v4());
    let report = SharedReport {
        id: report_id.clone(),
        student_id: student.id.clone(),
        teacher_id: user.id.clone(),
        course_id: course.id.clone(),
        sent_date: now,
        report_content: req.report_content,
        comments: vec![ReportComment {
            id: format!("comment-{}", Uuid::new_v4()),
            report_id,
            author_id: user.id.clone(),
            content: SHARE_GREETING.to_string(),
            timestamp: now,
        }],
    };

    let report = state.store.create_shared_report(report).await?;
    info!("{} shared report {} about {}", user.id, report.id, report.student_id);
    Ok((StatusCode::CREATED, Json(ReportView::new(&report, &users, &courses))))
}

/// Append a comment to a report thread.
#[utoipa::path(
    post,
    path = "/reports/{id}/comments",
    params(("id" = String, Path, description = "Report id")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Updated thread", body = ReportView),
        (status = 403, description = "Report not visible to this user", body = ErrorBody),
        (status = 404, description = "No such report", body = ErrorBody),
        (status = 422, description = "Empty comment", body = ErrorBody)
    ),
    tag = "reports"
)]
pub async fn add_comment_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(report_id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<ReportView>), ApiError> {
    require_route(&user, Route::Reports)?;
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::invalid("content", "Comment cannot be empty."));
    }

    let courses = state.store.list_courses().await?;
    let report = state
        .store
        .get_shared_report(&report_id)
        .await
        .map_err(|e| ApiError::lookup(e, format!("Report '{report_id}'"), REPORTS_PAGE))?;
    if !can_comment_on_report(&user, &report, &courses) {
        return Err(ApiError::forbidden("You cannot comment on this report."));
    }

    let updated = state
        .store
        .append_report_comment(ReportComment {
            id: format!("comment-{}", Uuid::new_v4()),
            report_id: report.id.clone(),
            author_id: user.id.clone(),
            content: content.to_string(),
            timestamp: Utc::now(),
        })
        .await?;

    let users = state.store.list_users().await?;
    let ordered = order_report_threads(vec![updated]);
    let view = ordered
        .first()
        .map(|r| ReportView::new(r, &users, &courses))
        .ok_or_else(|| ApiError::Internal("Report vanished while commenting".to_string()))?;
    Ok((StatusCode::CREATED, Json(view)))
}

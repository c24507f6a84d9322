//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification.

use crate::error::ErrorBody;
use crate::web::{academics, ai, auth, overview, payments, people, profile, reports, views};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::register_handler,
        auth::logout_handler,
        overview::me_handler,
        overview::dashboard_handler,
        academics::list_courses_handler,
        academics::grades_handler,
        academics::timetable_handler,
        people::list_students_handler,
        people::student_detail_handler,
        people::summarize_student_handler,
        people::list_teachers_handler,
        payments::list_payments_handler,
        payments::pay_handler,
        payments::fee_notice_handler,
        reports::list_reports_handler,
        reports::report_drafts_handler,
        reports::share_report_handler,
        reports::add_comment_handler,
        ai::grade_report_handler,
        ai::attendance_report_handler,
        ai::student_summary_handler,
        ai::helpdesk_handler,
        profile::update_profile_handler,
        profile::update_password_handler,
    ),
    components(
        schemas(
            ErrorBody,
            views::UserView,
            views::NavItem,
            views::CourseView,
            views::CourseAverageView,
            views::AttendanceSummaryView,
            views::AttendanceView,
            views::PaymentView,
            views::ReportView,
            views::CommentView,
            auth::LoginRequest,
            auth::RegisterRequest,
            auth::AuthResponse,
            auth::MessageResponse,
            overview::MeResponse,
            overview::DashboardResponse,
            academics::GradesResponse,
            academics::TimetableResponse,
            people::StudentRow,
            people::StudentDetail,
            people::TeacherRow,
            payments::PaymentsResponse,
            payments::PaymentReceipt,
            payments::FeeNotice,
            reports::DraftsResponse,
            reports::ShareReportRequest,
            reports::CommentRequest,
            ai::GradeReportRequest,
            ai::AttendanceReportRequest,
            ai::StudentSummaryRequest,
            ai::HelpdeskRequest,
            ai::ReportResponse,
            ai::SummaryResponse,
            ai::HelpdeskResponse,
            profile::UpdateProfileRequest,
            profile::UpdatePasswordRequest,
            profile::ProfileResponse,
        )
    ),
    tags(
        (name = "auth", description = "Session cookie sign-in, registration and sign-out."),
        (name = "overview", description = "Current user, navigation and dashboards."),
        (name = "academics", description = "Courses, grades and timetables."),
        (name = "people", description = "Student and teacher rosters."),
        (name = "payments", description = "Fee records and notices."),
        (name = "reports", description = "Shared report threads."),
        (name = "ai", description = "AI-generated report text and helpdesk."),
        (name = "profile", description = "Account settings.")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/login",
            "/dashboard",
            "/students/{id}/summary",
            "/payments/{id}/notice",
            "/reports/{id}/comments",
            "/ai/helpdesk",
            "/profile/password",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}

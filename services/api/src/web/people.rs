//! services/api/src/web/people.rs
//!
//! Student and teacher rosters, the student profile, and the AI summary
//! generated from it.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use campify_core::derive::{attendance_summary, course_averages, overall_average, recent_attendance};
use campify_core::domain::{Course, Profile, User};
use campify_core::generation::{CourseAverageInput, GenerationRequest, StudentSummaryInput};
use campify_core::policy::{can_generate_report, can_view_student, visible_students, Route};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorBody};
use crate::web::ai::{generate_text, SummaryResponse};
use crate::web::middleware::{require_route, CurrentUser};
use crate::web::state::AppState;
use crate::web::views::{
    name_of, AttendanceSummaryView, AttendanceView, CourseAverageView, UserView, UNKNOWN,
};

const STUDENTS_PAGE: &str = "/dashboard/students";
const RECENT_ATTENDANCE_LIMIT: usize = 5;

//=========================================================================================
// API Response Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentRow {
    pub student: UserView,
    pub parent_name: String,
    pub course_count: usize,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetail {
    pub student: UserView,
    pub parent_name: String,
    pub course_averages: Vec<CourseAverageView>,
    pub overall_average: f64,
    pub attendance: AttendanceSummaryView,
    pub recent_attendance: Vec<AttendanceView>,
}

#[derive(Serialize, ToSchema)]
pub struct TeacherRow {
    pub teacher: UserView,
    /// Names of the courses this teacher runs.
    pub courses: Vec<String>,
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Loads a student the user may see, or the matching 404/403.
async fn load_visible_student(
    state: &AppState,
    user: &User,
    student_id: &str,
) -> Result<(User, Vec<User>, Vec<Course>), ApiError> {
    let users = state.store.list_users().await?;
    let courses = state.store.list_courses().await?;

    let student = users
        .iter()
        .find(|u| u.id == student_id && u.is_student())
        .cloned()
        .ok_or_else(|| ApiError::not_found(format!("Student '{student_id}'"), STUDENTS_PAGE))?;

    if !can_view_student(user, &student.id, &courses) {
        return Err(ApiError::forbidden("You do not have permission to view this student."));
    }
    Ok((student, users, courses))
}

fn parent_name(student: &User, users: &[User]) -> String {
    student
        .parent_id()
        .map(|id| name_of(users, id))
        .unwrap_or(UNKNOWN)
        .to_string()
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Students the user may see, with their parent's name.
#[utoipa::path(
    get,
    path = "/students",
    responses(
        (status = 200, description = "Visible students", body = [StudentRow]),
        (status = 403, description = "Role cannot open the student roster", body = ErrorBody)
    ),
    tag = "people"
)]
pub async fn list_students_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<StudentRow>>, ApiError> {
    require_route(&user, Route::Students)?;
    let users = state.store.list_users().await?;
    let courses = state.store.list_courses().await?;

    let rows = visible_students(&user, &users, &courses)
        .into_iter()
        .map(|student| StudentRow {
            student: UserView::from(student),
            parent_name: parent_name(student, &users),
            course_count: courses.iter().filter(|c| c.enrolls(&student.id)).count(),
        })
        .collect();
    Ok(Json(rows))
}

/// A student's profile: per-course averages, overall average and attendance.
#[utoipa::path(
    get,
    path = "/students/{id}",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student detail", body = StudentDetail),
        (status = 403, description = "Student not visible to this user", body = ErrorBody),
        (status = 404, description = "No such student", body = ErrorBody)
    ),
    tag = "people"
)]
pub async fn student_detail_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(student_id): Path<String>,
) -> Result<Json<StudentDetail>, ApiError> {
    require_route(&user, Route::Students)?;
    let (student, users, courses) = load_visible_student(&state, &user, &student_id).await?;
    let grades = state.store.grades_for_student(&student.id).await?;
    let attendance = state.store.attendance_for_student(&student.id).await?;

    let averages = course_averages(&student.id, &courses, &grades);
    let enrolled = averages.len();
    let detail = StudentDetail {
        student: UserView::from(&student),
        parent_name: parent_name(&student, &users),
        overall_average: overall_average(&averages),
        course_averages: averages.into_iter().map(CourseAverageView::from).collect(),
        attendance: attendance_summary(&attendance, &student.id, enrolled).into(),
        recent_attendance: recent_attendance(&attendance, &student.id, RECENT_ATTENDANCE_LIMIT)
            .into_iter()
            .map(|a| AttendanceView::new(a, &courses))
            .collect(),
    };
    Ok(Json(detail))
}

/// Derive the student's aggregates and generate a performance summary.
#[utoipa::path(
    post,
    path = "/students/{id}/summary",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Generated summary", body = SummaryResponse),
        (status = 403, description = "Not permitted", body = ErrorBody),
        (status = 404, description = "No such student", body = ErrorBody),
        (status = 502, description = "Generation failed", body = ErrorBody)
    ),
    tag = "people"
)]
pub async fn summarize_student_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(student_id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    require_route(&user, Route::Students)?;
    if !can_generate_report(&user) {
        return Err(ApiError::forbidden("You cannot generate summaries."));
    }
    let (student, _, courses) = load_visible_student(&state, &user, &student_id).await?;
    let grades = state.store.grades_for_student(&student.id).await?;
    let attendance = state.store.attendance_for_student(&student.id).await?;

    let averages = course_averages(&student.id, &courses, &grades);
    let request = GenerationRequest::StudentSummary(StudentSummaryInput {
        student_name: student.name.clone(),
        attendance: attendance_summary(&attendance, &student.id, averages.len()),
        courses: averages
            .into_iter()
            .map(|c| CourseAverageInput {
                name: c.course_name,
                average_grade: c.average.round(),
            })
            .collect(),
    });

    let summary = generate_text(&state, request).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// Every teacher with the courses they run.
#[utoipa::path(
    get,
    path = "/teachers",
    responses(
        (status = 200, description = "All teachers", body = [TeacherRow]),
        (status = 403, description = "Only administrators can list teachers", body = ErrorBody)
    ),
    tag = "people"
)]
pub async fn list_teachers_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<TeacherRow>>, ApiError> {
    require_route(&user, Route::Teachers)?;
    let users = state.store.list_users().await?;
    let courses = state.store.list_courses().await?;

    let rows = users
        .iter()
        .filter(|u| matches!(u.profile, Profile::Teacher { .. }))
        .map(|teacher| TeacherRow {
            teacher: UserView::from(teacher),
            courses: courses
                .iter()
                .filter(|c| c.teacher_id == teacher.id)
                .map(|c| c.name.clone())
                .collect(),
        })
        .collect();
    Ok(Json(rows))
}

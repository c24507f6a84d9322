//! services/api/src/web/academics.rs
//!
//! Courses, grade tables and timetables.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use campify_core::derive::{course_final_grade, grade_band};
use campify_core::domain::{Weekday, TIME_SLOTS};
use campify_core::policy::{visible_courses, Route};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorBody};
use crate::web::middleware::{require_route, subject_student, CurrentUser};
use crate::web::overview::ChildQuery;
use crate::web::state::AppState;
use crate::web::views::{course_name, name_of, CourseView, UserView, UNKNOWN};

//=========================================================================================
// API Response Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GradeView {
    pub assignment: String,
    pub score: f64,
    pub total: f64,
    pub percentage: f64,
    /// 1 (excellent) to 5 (failing).
    pub band: u8,
    pub letter: String,
    pub date: NaiveDate,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseGrades {
    pub course_id: String,
    pub course_name: String,
    pub grades: Vec<GradeView>,
    /// `None` when no grades are recorded for the course.
    pub final_grade: Option<f64>,
}

#[derive(Serialize, ToSchema)]
pub struct GradesResponse {
    /// `None` for a parent with no linked child.
    pub student: Option<UserView>,
    pub courses: Vec<CourseGrades>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub day: String,
    pub time: String,
    pub course_id: String,
    pub course_name: String,
    pub teacher_name: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimetableResponse {
    pub student: Option<UserView>,
    pub days: Vec<String>,
    pub time_slots: Vec<String>,
    /// Ordered by day, then time.
    pub slots: Vec<SlotView>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Courses the user may see.
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "Visible courses", body = [CourseView]),
        (status = 403, description = "Role cannot open courses", body = ErrorBody)
    ),
    tag = "academics"
)]
pub async fn list_courses_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<CourseView>>, ApiError> {
    require_route(&user, Route::Courses)?;
    let users = state.store.list_users().await?;
    let courses = state.store.list_courses().await?;
    Ok(Json(
        visible_courses(&user, &courses)
            .into_iter()
            .map(|c| CourseView::new(c, &users))
            .collect(),
    ))
}

/// Grade tables per enrolled course for the student, or a parent's child.
#[utoipa::path(
    get,
    path = "/grades",
    params(ChildQuery),
    responses(
        (status = 200, description = "Grades per course", body = GradesResponse),
        (status = 403, description = "Not permitted", body = ErrorBody)
    ),
    tag = "academics"
)]
pub async fn grades_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ChildQuery>,
) -> Result<Json<GradesResponse>, ApiError> {
    require_route(&user, Route::Grades)?;
    let Some(student_id) = subject_student(&user, query.child.as_deref())? else {
        return Ok(Json(GradesResponse {
            student: None,
            courses: Vec::new(),
        }));
    };

    let users = state.store.list_users().await?;
    let courses = state.store.list_courses().await?;
    let grades = state.store.grades_for_student(&student_id).await?;

    let per_course = courses
        .iter()
        .filter(|c| c.enrolls(&student_id))
        .map(|course| CourseGrades {
            course_id: course.id.clone(),
            course_name: course.name.clone(),
            grades: grades
                .iter()
                .filter(|g| g.course_id == course.id)
                .map(|g| {
                    let percentage = g.percentage();
                    let band = grade_band(percentage);
                    GradeView {
                        assignment: g.assignment.clone(),
                        score: g.score,
                        total: g.total,
                        percentage,
                        band: band.rank(),
                        letter: band.letter().to_string(),
                        date: g.date,
                    }
                })
                .collect(),
            final_grade: course_final_grade(&grades, &student_id, &course.id),
        })
        .collect();

    Ok(Json(GradesResponse {
        student: users.iter().find(|u| u.id == student_id).map(UserView::from),
        courses: per_course,
    }))
}

/// The weekly timetable for the student, or a parent's child.
#[utoipa::path(
    get,
    path = "/timetable",
    params(ChildQuery),
    responses(
        (status = 200, description = "Weekly timetable", body = TimetableResponse),
        (status = 403, description = "Not permitted", body = ErrorBody)
    ),
    tag = "academics"
)]
pub async fn timetable_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ChildQuery>,
) -> Result<Json<TimetableResponse>, ApiError> {
    require_route(&user, Route::Timetable)?;
    let mut response = TimetableResponse {
        student: None,
        days: Weekday::ALL.iter().map(|d| d.as_str().to_string()).collect(),
        time_slots: TIME_SLOTS.iter().map(|t| t.to_string()).collect(),
        slots: Vec::new(),
    };
    let Some(student_id) = subject_student(&user, query.child.as_deref())? else {
        return Ok(Json(response));
    };

    let users = state.store.list_users().await?;
    let courses = state.store.list_courses().await?;
    response.student = users.iter().find(|u| u.id == student_id).map(UserView::from);

    if let Some(mut timetable) = state.store.timetable_for_student(&student_id).await? {
        let slot_index = |time: &str| TIME_SLOTS.iter().position(|t| *t == time);
        timetable.slots.sort_by_key(|s| (s.day, slot_index(s.time)));
        response.slots = timetable
            .slots
            .iter()
            .map(|slot| {
                let teacher_name = courses
                    .iter()
                    .find(|c| c.id == slot.course_id)
                    .map(|c| name_of(&users, &c.teacher_id))
                    .unwrap_or(UNKNOWN);
                SlotView {
                    day: slot.day.as_str().to_string(),
                    time: slot.time.to_string(),
                    course_id: slot.course_id.clone(),
                    course_name: course_name(&courses, &slot.course_id).to_string(),
                    teacher_name: teacher_name.to_string(),
                }
            })
            .collect();
    }

    Ok(Json(response))
}

//! services/api/src/web/overview.rs
//!
//! The signed-in user's identity and the role-specific dashboard.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use campify_core::derive::{
    assignment_status, course_averages, grade_distribution, overall_average, recent_attendance,
    AssignmentStatus,
};
use campify_core::domain::{Assignment, Course, Profile, Role, User};
use campify_core::policy::{navigation, visible_courses, Route};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ErrorBody};
use crate::web::middleware::{require_route, subject_student, CurrentUser};
use crate::web::state::AppState;
use crate::web::views::{
    course_name, AttendanceView, CourseAverageView, CourseView, NavItem, UserView,
};

const RECENT_LIMIT: usize = 5;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub user: UserView,
    /// The sections this user may open, in display order.
    pub navigation: Vec<NavItem>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChildQuery {
    /// For parents with several children: which child to show.
    pub child: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct RoleCount {
    pub role: String,
    pub count: usize,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub students_count: usize,
    pub teachers_count: usize,
    pub courses_count: usize,
    pub users_count: usize,
    pub users_by_role: Vec<RoleCount>,
    /// Most recently added first.
    pub recent_users: Vec<UserView>,
}

#[derive(Serialize, ToSchema)]
pub struct LetterCount {
    pub letter: String,
    pub count: usize,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDashboard {
    pub courses: Vec<CourseView>,
    pub grade_distribution: Vec<LetterCount>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentView {
    pub id: String,
    pub course_name: String,
    pub name: String,
    pub due_date: NaiveDate,
    pub submitted_at: Option<NaiveDate>,
    /// `Submitted`, `Overdue` or `Upcoming`.
    pub status: String,
}

impl AssignmentView {
    fn new(assignment: &Assignment, courses: &[Course], today: NaiveDate) -> Self {
        let status = match assignment_status(assignment, today) {
            AssignmentStatus::Submitted => "Submitted",
            AssignmentStatus::Overdue => "Overdue",
            AssignmentStatus::Upcoming => "Upcoming",
        };
        Self {
            id: assignment.id.clone(),
            course_name: course_name(courses, &assignment.course_id).to_string(),
            name: assignment.name.clone(),
            due_date: assignment.due_date,
            submitted_at: assignment.submitted_at,
            status: status.to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDashboard {
    pub courses: Vec<CourseView>,
    pub course_averages: Vec<CourseAverageView>,
    pub overall_average: f64,
    /// Not yet submitted.
    pub assignments_due: usize,
    pub recent_assignments: Vec<AssignmentView>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParentDashboard {
    /// `None` when no child is linked to the account.
    pub child: Option<UserView>,
    pub children: Vec<UserView>,
    pub course_averages: Vec<CourseAverageView>,
    pub recent_attendance: Vec<AttendanceView>,
}

/// Exactly one section is present, matching `role`.
#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminDashboard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher: Option<TeacherDashboard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentDashboard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentDashboard>,
}

impl DashboardResponse {
    fn empty(role: Role) -> Self {
        Self {
            role: role.to_string(),
            admin: None,
            teacher: None,
            student: None,
            parent: None,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// The signed-in user and their permitted navigation.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not signed in", body = ErrorBody)
    ),
    tag = "overview"
)]
pub async fn me_handler(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<MeResponse> {
    Json(MeResponse {
        user: UserView::from(&user),
        navigation: navigation(&user).into_iter().map(NavItem::from).collect(),
    })
}

/// Role-specific dashboard aggregates.
#[utoipa::path(
    get,
    path = "/dashboard",
    params(ChildQuery),
    responses(
        (status = 200, description = "Dashboard for the user's role", body = DashboardResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 403, description = "Requested child is not linked to this parent", body = ErrorBody)
    ),
    tag = "overview"
)]
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ChildQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    require_route(&user, Route::Dashboard)?;

    let users = state.store.list_users().await?;
    let courses = state.store.list_courses().await?;
    let mut response = DashboardResponse::empty(user.role());

    match &user.profile {
        Profile::Admin => response.admin = Some(admin_dashboard(&users, &courses)),
        Profile::Teacher { .. } => {
            let grades = state.store.list_grades().await?;
            let mine = visible_courses(&user, &courses);
            let ids: Vec<&str> = mine.iter().map(|c| c.id.as_str()).collect();
            let distribution = grade_distribution(&grades, &ids);
            let grade_distribution = [
                ("A", distribution.a),
                ("B", distribution.b),
                ("C", distribution.c),
                ("D", distribution.d),
                ("F", distribution.f),
            ]
            .into_iter()
            .map(|(letter, count)| LetterCount {
                letter: letter.to_string(),
                count,
            })
            .collect();
            response.teacher = Some(TeacherDashboard {
                courses: mine.into_iter().map(|c| CourseView::new(c, &users)).collect(),
                grade_distribution,
            });
        }
        Profile::Student { .. } => {
            let grades = state.store.grades_for_student(&user.id).await?;
            let assignments = state.store.assignments_for_student(&user.id).await?;
            let today = Utc::now().date_naive();
            let averages = course_averages(&user.id, &courses, &grades);
            response.student = Some(StudentDashboard {
                courses: visible_courses(&user, &courses)
                    .into_iter()
                    .map(|c| CourseView::new(c, &users))
                    .collect(),
                overall_average: overall_average(&averages),
                course_averages: averages.into_iter().map(CourseAverageView::from).collect(),
                assignments_due: assignments.iter().filter(|a| a.submitted_at.is_none()).count(),
                recent_assignments: assignments
                    .iter()
                    .take(RECENT_LIMIT)
                    .map(|a| AssignmentView::new(a, &courses, today))
                    .collect(),
            });
        }
        Profile::Parent { child_ids } => {
            let children: Vec<UserView> = child_ids
                .iter()
                .filter_map(|id| users.iter().find(|u| u.id == *id))
                .map(UserView::from)
                .collect();
            let mut dashboard = ParentDashboard {
                child: None,
                children,
                course_averages: Vec::new(),
                recent_attendance: Vec::new(),
            };
            if let Some(child_id) = subject_student(&user, query.child.as_deref())? {
                let grades = state.store.grades_for_student(&child_id).await?;
                let attendance = state.store.attendance_for_student(&child_id).await?;
                dashboard.child = users.iter().find(|u| u.id == child_id).map(UserView::from);
                dashboard.course_averages = course_averages(&child_id, &courses, &grades)
                    .into_iter()
                    .map(CourseAverageView::from)
                    .collect();
                dashboard.recent_attendance = recent_attendance(&attendance, &child_id, RECENT_LIMIT)
                    .into_iter()
                    .map(|a| AttendanceView::new(a, &courses))
                    .collect();
            }
            response.parent = Some(dashboard);
        }
    }

    Ok(Json(response))
}

fn admin_dashboard(users: &[User], courses: &[Course]) -> AdminDashboard {
    let count = |role: Role| users.iter().filter(|u| u.role() == role).count();
    AdminDashboard {
        students_count: count(Role::Student),
        teachers_count: count(Role::Teacher),
        courses_count: courses.len(),
        users_count: users.len(),
        users_by_role: Role::ALL
            .into_iter()
            .map(|role| RoleCount {
                role: role.to_string(),
                count: count(role),
            })
            .collect(),
        recent_users: users.iter().rev().take(RECENT_LIMIT).map(UserView::from).collect(),
    }
}

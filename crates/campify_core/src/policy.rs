//! crates/campify_core/src/policy.rs
//!
//! Role-scoped authorization. Every rule is an exhaustive match over the
//! user's `Profile`, so adding a role fails to compile until every decision
//! below has been made for it.

use crate::domain::{Course, Profile, Role, SharedReport, User};
use std::collections::BTreeSet;

//=========================================================================================
// Routes
//=========================================================================================

/// The top-level sections of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Dashboard,
    Students,
    Teachers,
    Courses,
    Timetable,
    Grades,
    Payments,
    Reports,
    Profile,
    Settings,
    Help,
}

impl Route {
    pub const ALL: [Route; 11] = [
        Route::Dashboard,
        Route::Students,
        Route::Teachers,
        Route::Courses,
        Route::Timetable,
        Route::Grades,
        Route::Payments,
        Route::Reports,
        Route::Profile,
        Route::Settings,
        Route::Help,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/dashboard",
            Route::Students => "/dashboard/students",
            Route::Teachers => "/dashboard/teachers",
            Route::Courses => "/dashboard/courses",
            Route::Timetable => "/dashboard/timetable",
            Route::Grades => "/dashboard/grades",
            Route::Payments => "/dashboard/payments",
            Route::Reports => "/dashboard/reports",
            Route::Profile => "/dashboard/profile",
            Route::Settings => "/dashboard/settings",
            Route::Help => "/dashboard/help",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::Students => "Students",
            Route::Teachers => "Teachers",
            Route::Courses => "Courses",
            Route::Timetable => "Timetable",
            Route::Grades => "Grades",
            Route::Payments => "Payments",
            Route::Reports => "Reports",
            Route::Profile => "Profile",
            Route::Settings => "Settings",
            Route::Help => "Help",
        }
    }

    pub fn allowed_roles(&self) -> &'static [Role] {
        use Role::*;
        match self {
            Route::Dashboard | Route::Profile | Route::Settings | Route::Help => &Role::ALL,
            Route::Students => &[Admin, Teacher],
            Route::Teachers => &[Admin],
            Route::Courses => &[Admin, Teacher, Student],
            Route::Timetable | Route::Grades => &[Student, Parent],
            Route::Payments => &[Admin, Parent],
            Route::Reports => &[Admin, Teacher, Parent],
        }
    }
}

pub fn can_access_route(user: &User, route: Route) -> bool {
    route.allowed_roles().contains(&user.role())
}

/// The sections the user may open, in navigation order.
pub fn navigation(user: &User) -> Vec<Route> {
    Route::ALL
        .into_iter()
        .filter(|route| can_access_route(user, *route))
        .collect()
}

//=========================================================================================
// Visibility
//=========================================================================================

/// Courses the user may see.
pub fn visible_courses<'a>(user: &User, courses: &'a [Course]) -> Vec<&'a Course> {
    match &user.profile {
        Profile::Admin => courses.iter().collect(),
        Profile::Teacher { .. } => courses.iter().filter(|c| c.teacher_id == user.id).collect(),
        Profile::Student { .. } => courses.iter().filter(|c| c.enrolls(&user.id)).collect(),
        Profile::Parent { child_ids } => courses
            .iter()
            .filter(|c| child_ids.iter().any(|child| c.enrolls(child)))
            .collect(),
    }
}

/// Ids of the students the user may see.
pub fn visible_student_ids(user: &User, courses: &[Course]) -> Option<BTreeSet<String>> {
    match &user.profile {
        // `None` means "every student".
        Profile::Admin => None,
        Profile::Teacher { .. } => Some(
            courses
                .iter()
                .filter(|c| c.teacher_id == user.id)
                .flat_map(|c| c.student_ids.iter().cloned())
                .collect(),
        ),
        Profile::Student { .. } => Some(BTreeSet::from([user.id.clone()])),
        Profile::Parent { child_ids } => Some(child_ids.iter().cloned().collect()),
    }
}

/// Student accounts the user may see, in the order `users` lists them.
pub fn visible_students<'a>(user: &User, users: &'a [User], courses: &[Course]) -> Vec<&'a User> {
    let allowed = visible_student_ids(user, courses);
    users
        .iter()
        .filter(|u| u.is_student())
        .filter(|u| allowed.as_ref().map_or(true, |ids| ids.contains(&u.id)))
        .collect()
}

pub fn can_view_student(user: &User, student_id: &str, courses: &[Course]) -> bool {
    visible_student_ids(user, courses).map_or(true, |ids| ids.contains(student_id))
}

//=========================================================================================
// Actions
//=========================================================================================

pub fn can_generate_report(user: &User) -> bool {
    match user.profile {
        Profile::Admin | Profile::Teacher { .. } => true,
        Profile::Student { .. } | Profile::Parent { .. } => false,
    }
}

/// Which fee records the user may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentAccess {
    /// Every student's record, without a personal balance.
    All,
    /// The linked children's records; these may be paid.
    Children(Vec<String>),
    None,
}

pub fn payment_access(user: &User) -> PaymentAccess {
    match &user.profile {
        Profile::Admin => PaymentAccess::All,
        Profile::Parent { child_ids } => PaymentAccess::Children(child_ids.clone()),
        Profile::Teacher { .. } | Profile::Student { .. } => PaymentAccess::None,
    }
}

pub fn can_view_payments(user: &User) -> bool {
    payment_access(user) != PaymentAccess::None
}

/// Whether the user may pay the fee record of `student_id`.
pub fn can_pay_for(user: &User, student_id: &str) -> bool {
    match payment_access(user) {
        PaymentAccess::Children(ids) => ids.iter().any(|id| id == student_id),
        PaymentAccess::All | PaymentAccess::None => false,
    }
}

pub fn can_view_report(user: &User, report: &SharedReport, courses: &[Course]) -> bool {
    match &user.profile {
        Profile::Admin => true,
        Profile::Teacher { .. } => {
            report.teacher_id == user.id
                || courses
                    .iter()
                    .any(|c| c.id == report.course_id && c.teacher_id == user.id)
        }
        Profile::Parent { child_ids } => child_ids.iter().any(|id| *id == report.student_id),
        Profile::Student { .. } => false,
    }
}

/// Anyone who can see a report's thread may add to it.
pub fn can_comment_on_report(user: &User, report: &SharedReport, courses: &[Course]) -> bool {
    can_view_report(user, report, courses)
}

/// Whether the user may share a report about `student_id` for `course`.
pub fn can_share_report(user: &User, student_id: &str, course: &Course) -> bool {
    match &user.profile {
        Profile::Admin => course.enrolls(student_id),
        Profile::Teacher { .. } => course.teacher_id == user.id && course.enrolls(student_id),
        Profile::Student { .. } | Profile::Parent { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn user(id: &str, profile: Profile) -> User {
        User {
            id: id.into(),
            name: id.into(),
            email: format!("{id}@campify.edu"),
            avatar_url: String::new(),
            profile,
        }
    }

    fn admin() -> User {
        user("user-admin-1", Profile::Admin)
    }

    fn teacher(id: &str) -> User {
        user(id, Profile::Teacher { course_ids: vec![] })
    }

    fn student(id: &str) -> User {
        user(
            id,
            Profile::Student {
                parent_id: "user-parent-1".into(),
                course_ids: vec![],
            },
        )
    }

    fn parent(children: &[&str]) -> User {
        user(
            "user-parent-1",
            Profile::Parent {
                child_ids: children.iter().map(|c| c.to_string()).collect(),
            },
        )
    }

    fn courses() -> Vec<Course> {
        vec![
            Course {
                id: "course-1".into(),
                name: "Calculus".into(),
                teacher_id: "user-teacher-1".into(),
                student_ids: vec!["user-student-1".into(), "user-student-2".into()],
            },
            Course {
                id: "course-2".into(),
                name: "Database Management".into(),
                teacher_id: "user-teacher-2".into(),
                student_ids: vec!["user-student-2".into(), "user-student-3".into()],
            },
        ]
    }

    fn ids(courses: Vec<&Course>) -> Vec<&str> {
        courses.into_iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn course_visibility_by_role() {
        let all = courses();
        assert_eq!(ids(visible_courses(&admin(), &all)), vec!["course-1", "course-2"]);
        assert_eq!(ids(visible_courses(&teacher("user-teacher-2"), &all)), vec!["course-2"]);
        assert_eq!(ids(visible_courses(&student("user-student-1"), &all)), vec!["course-1"]);
        assert_eq!(
            ids(visible_courses(&parent(&["user-student-3"]), &all)),
            vec!["course-2"]
        );
    }

    #[test]
    fn empty_results_are_not_errors() {
        let all = courses();
        assert!(visible_courses(&teacher("user-teacher-9"), &all).is_empty());
        assert!(visible_courses(&parent(&[]), &all).is_empty());
        assert!(visible_students(&parent(&[]), &[student("user-student-1")], &all).is_empty());
    }

    #[test]
    fn teacher_sees_students_of_own_courses_only() {
        let all = courses();
        let users = vec![
            student("user-student-1"),
            student("user-student-2"),
            student("user-student-3"),
            teacher("user-teacher-1"),
        ];
        let seen: Vec<&str> = visible_students(&teacher("user-teacher-1"), &users, &all)
            .into_iter()
            .map(|u| u.id.as_str())
            .collect();
        assert_eq!(seen, vec!["user-student-1", "user-student-2"]);
        assert!(!can_view_student(&teacher("user-teacher-1"), "user-student-3", &all));
        assert!(can_view_student(&admin(), "user-student-3", &all));
        assert!(can_view_student(&student("user-student-3"), "user-student-3", &all));
        assert!(!can_view_student(&student("user-student-3"), "user-student-1", &all));
    }

    #[test]
    fn route_table_matches_navigation() {
        let nav: Vec<&str> = navigation(&parent(&[])).iter().map(|r| r.label()).collect();
        assert_eq!(
            nav,
            vec!["Dashboard", "Timetable", "Grades", "Payments", "Reports", "Profile", "Settings", "Help"]
        );
        assert!(can_access_route(&admin(), Route::Teachers));
        assert!(!can_access_route(&teacher("t"), Route::Teachers));
        assert!(!can_access_route(&student("s"), Route::Reports));
        assert!(can_access_route(&student("s"), Route::Courses));
        assert!(!can_access_route(&parent(&[]), Route::Courses));
    }

    #[test]
    fn only_staff_generate_reports() {
        assert!(can_generate_report(&admin()));
        assert!(can_generate_report(&teacher("t")));
        assert!(!can_generate_report(&student("s")));
        assert!(!can_generate_report(&parent(&[])));
    }

    #[test]
    fn payment_access_by_role() {
        assert_eq!(payment_access(&admin()), PaymentAccess::All);
        assert!(!can_view_payments(&teacher("t")));
        assert!(!can_view_payments(&student("s")));
        assert!(can_pay_for(&parent(&["user-student-2"]), "user-student-2"));
        assert!(!can_pay_for(&parent(&["user-student-2"]), "user-student-3"));
        assert!(!can_pay_for(&admin(), "user-student-2"));
    }

    #[test]
    fn report_visibility_and_sharing() {
        let all = courses();
        let report = SharedReport {
            id: "report-1".into(),
            student_id: "user-student-1".into(),
            teacher_id: "user-teacher-1".into(),
            course_id: "course-1".into(),
            sent_date: Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap(),
            report_content: String::new(),
            comments: vec![],
        };
        assert!(can_view_report(&admin(), &report, &all));
        assert!(can_view_report(&teacher("user-teacher-1"), &report, &all));
        assert!(!can_view_report(&teacher("user-teacher-2"), &report, &all));
        assert!(can_comment_on_report(&parent(&["user-student-1"]), &report, &all));
        assert!(!can_view_report(&parent(&["user-student-2"]), &report, &all));
        assert!(!can_view_report(&student("user-student-1"), &report, &all));

        assert!(can_share_report(&teacher("user-teacher-1"), "user-student-1", &all[0]));
        assert!(!can_share_report(&teacher("user-teacher-1"), "user-student-3", &all[1]));
        assert!(!can_share_report(&teacher("user-teacher-2"), "user-student-1", &all[0]));
        assert!(can_share_report(&admin(), "user-student-3", &all[1]));
        assert!(!can_share_report(&parent(&["user-student-1"]), "user-student-1", &all[0]));
    }
}

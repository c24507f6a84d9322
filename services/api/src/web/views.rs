//! services/api/src/web/views.rs
//!
//! JSON shapes shared by several handlers, and their conversions from the
//! core domain types.

use campify_core::derive::{AttendanceSummary, CourseAverage, PaymentIntegrity, PaymentSummary};
use campify_core::domain::{
    Attendance, Course, Payment, ReportComment, SharedReport, User,
};
use campify_core::policy::Route;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Name shown when a referenced record no longer resolves.
pub const UNKNOWN: &str = "Unknown";

pub fn name_of<'a>(users: &'a [User], id: &str) -> &'a str {
    users
        .iter()
        .find(|u| u.id == id)
        .map(|u| u.name.as_str())
        .unwrap_or(UNKNOWN)
}

pub fn course_name<'a>(courses: &'a [Course], id: &str) -> &'a str {
    courses
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.as_str())
        .unwrap_or(UNKNOWN)
}

//=========================================================================================
// Users and Navigation
//=========================================================================================

#[derive(Serialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar_url: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role().to_string(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct NavItem {
    pub path: String,
    pub label: String,
}

impl From<Route> for NavItem {
    fn from(route: Route) -> Self {
        Self {
            path: route.path().to_string(),
            label: route.label().to_string(),
        }
    }
}

//=========================================================================================
// Courses, Grades and Attendance
//=========================================================================================

#[derive(Serialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    pub id: String,
    pub name: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub enrolled_count: usize,
}

impl CourseView {
    pub fn new(course: &Course, users: &[User]) -> Self {
        Self {
            id: course.id.clone(),
            name: course.name.clone(),
            teacher_id: course.teacher_id.clone(),
            teacher_name: name_of(users, &course.teacher_id).to_string(),
            enrolled_count: course.student_ids.len(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CourseAverageView {
    pub course_id: String,
    pub course_name: String,
    /// Percentage, 0-100.
    pub average: f64,
}

impl From<CourseAverage> for CourseAverageView {
    fn from(avg: CourseAverage) -> Self {
        Self {
            course_id: avg.course_id,
            course_name: avg.course_name,
            average: avg.average,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummaryView {
    pub absences: usize,
    pub lates: usize,
    pub total_days: f64,
}

impl From<AttendanceSummary> for AttendanceSummaryView {
    fn from(summary: AttendanceSummary) -> Self {
        Self {
            absences: summary.absences,
            lates: summary.lates,
            total_days: summary.total_days,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceView {
    pub course_id: String,
    pub course_name: String,
    pub date: NaiveDate,
    pub status: String,
}

impl AttendanceView {
    pub fn new(record: &Attendance, courses: &[Course]) -> Self {
        Self {
            course_id: record.course_id.clone(),
            course_name: course_name(courses, &record.course_id).to_string(),
            date: record.date,
            status: record.status.as_str().to_string(),
        }
    }
}

//=========================================================================================
// Payments
//=========================================================================================

#[derive(Serialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub semester: String,
    pub amount_due: f64,
    pub amount_paid: f64,
    pub balance: f64,
    pub percent_paid: f64,
    pub status: String,
    pub due_date: NaiveDate,
    /// `consistent`, `paidWithBalance` or `unpaidWithoutBalance`.
    pub integrity: String,
}

impl PaymentView {
    pub fn new(payment: &Payment, summary: &PaymentSummary, users: &[User]) -> Self {
        Self {
            id: payment.id.clone(),
            student_id: payment.student_id.clone(),
            student_name: name_of(users, &payment.student_id).to_string(),
            semester: payment.semester.clone(),
            amount_due: payment.amount_due,
            amount_paid: payment.amount_paid,
            balance: summary.balance,
            percent_paid: summary.percent_paid,
            status: summary.status.as_str().to_string(),
            due_date: payment.due_date,
            integrity: integrity_str(summary.integrity).to_string(),
        }
    }
}

fn integrity_str(integrity: PaymentIntegrity) -> &'static str {
    match integrity {
        PaymentIntegrity::Consistent => "consistent",
        PaymentIntegrity::PaidWithBalance => "paidWithBalance",
        PaymentIntegrity::UnpaidWithoutBalance => "unpaidWithoutBalance",
    }
}

//=========================================================================================
// Shared Reports
//=========================================================================================

#[derive(Serialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub course_id: String,
    pub course_name: String,
    pub sent_date: DateTime<Utc>,
    pub report_content: String,
    pub comments: Vec<CommentView>,
}

impl ReportView {
    /// Expects `report.comments` already in thread order.
    pub fn new(report: &SharedReport, users: &[User], courses: &[Course]) -> Self {
        Self {
            id: report.id.clone(),
            student_id: report.student_id.clone(),
            student_name: name_of(users, &report.student_id).to_string(),
            teacher_id: report.teacher_id.clone(),
            teacher_name: name_of(users, &report.teacher_id).to_string(),
            course_id: report.course_id.clone(),
            course_name: course_name(courses, &report.course_id).to_string(),
            sent_date: report.sent_date,
            report_content: report.report_content.clone(),
            comments: report
                .comments
                .iter()
                .map(|c| comment_view(c, users))
                .collect(),
        }
    }
}

fn comment_view(comment: &ReportComment, users: &[User]) -> CommentView {
    CommentView {
        id: comment.id.clone(),
        author_id: comment.author_id.clone(),
        author_name: name_of(users, &comment.author_id).to_string(),
        content: comment.content.clone(),
        timestamp: comment.timestamp,
    }
}

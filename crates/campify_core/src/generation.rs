//! crates/campify_core/src/generation.rs
//!
//! Structured payloads accepted by the report-text service, their validation,
//! and the draft builders that prefill them from raw records.

use crate::derive::AttendanceSummary;
use crate::domain::{Attendance, AttendanceStatus, Course, Grade, User};
use std::collections::BTreeMap;
use std::fmt;

//=========================================================================================
// Field-level Validation Errors
//=========================================================================================

/// Validation messages keyed by the offending field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`. The first message for a field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn require(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Folds in another set; messages already recorded here take precedence.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.errors {
            self.errors.entry(field).or_insert(message);
        }
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

//=========================================================================================
// Payloads
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    GradeReport,
    AttendanceReport,
    StudentSummary,
    HelpdeskResponse,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::GradeReport => "gradeReport",
            GenerationKind::AttendanceReport => "attendanceReport",
            GenerationKind::StudentSummary => "studentSummary",
            GenerationKind::HelpdeskResponse => "helpdeskResponse",
        }
    }

    /// Name of the single string field the service's output object carries.
    pub fn output_field(&self) -> &'static str {
        match self {
            GenerationKind::GradeReport | GenerationKind::AttendanceReport => "report",
            GenerationKind::StudentSummary => "summary",
            GenerationKind::HelpdeskResponse => "response",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeReportInput {
    pub student_name: String,
    pub class_name: String,
    pub teacher_name: String,
    /// Free-text grade summary, e.g. "Midterm: 72/100, Homework 1: 85/100".
    pub grades: String,
    /// Free-text attendance summary, e.g. "1 absences, 2 lates".
    pub attendance: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecordInput {
    pub date: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceReportInput {
    pub student_name: String,
    pub class_name: String,
    pub attendance_records: Vec<AttendanceRecordInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseAverageInput {
    pub name: String,
    pub average_grade: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentSummaryInput {
    pub student_name: String,
    pub courses: Vec<CourseAverageInput>,
    pub attendance: AttendanceSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRole {
    User,
    Model,
}

impl HistoryRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRole::User => "user",
            HistoryRole::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HelpdeskMessage {
    pub role: HistoryRole,
    pub content: String,
}

/// A helpdesk question. The history is supplied by the caller on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct HelpdeskInput {
    pub query: String,
    pub user_role: String,
    pub history: Vec<HelpdeskMessage>,
}

/// One call to the report-text service.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    GradeReport(GradeReportInput),
    AttendanceReport(AttendanceReportInput),
    StudentSummary(StudentSummaryInput),
    Helpdesk(HelpdeskInput),
}

impl GenerationRequest {
    pub fn kind(&self) -> GenerationKind {
        match self {
            GenerationRequest::GradeReport(_) => GenerationKind::GradeReport,
            GenerationRequest::AttendanceReport(_) => GenerationKind::AttendanceReport,
            GenerationRequest::StudentSummary(_) => GenerationKind::StudentSummary,
            GenerationRequest::Helpdesk(_) => GenerationKind::HelpdeskResponse,
        }
    }

    /// Checks the payload field by field before any remote call is made.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        match self {
            GenerationRequest::GradeReport(input) => {
                errors.require("studentName", &input.student_name, "Student name is required.");
                errors.require("className", &input.class_name, "Class name is required.");
                errors.require("teacherName", &input.teacher_name, "Teacher name is required.");
                errors.require("grades", &input.grades, "Grades are required.");
                errors.require("attendance", &input.attendance, "Attendance is required.");
            }
            GenerationRequest::AttendanceReport(input) => {
                errors.require("studentName", &input.student_name, "Student name is required.");
                errors.require("className", &input.class_name, "Class name is required.");
                for (i, record) in input.attendance_records.iter().enumerate() {
                    if record.date.trim().is_empty() {
                        errors.add(
                            &format!("attendanceRecords[{i}].date"),
                            "Date is required.",
                        );
                    }
                }
            }
            GenerationRequest::StudentSummary(input) => {
                errors.require("studentName", &input.student_name, "Student name is required.");
                for (i, course) in input.courses.iter().enumerate() {
                    errors.require(
                        &format!("courses[{i}].name"),
                        &course.name,
                        "Course name is required.",
                    );
                    if !course.average_grade.is_finite()
                        || !(0.0..=100.0).contains(&course.average_grade)
                    {
                        errors.add(
                            &format!("courses[{i}].averageGrade"),
                            "Average grade must be between 0 and 100.",
                        );
                    }
                }
                if !input.attendance.total_days.is_finite() || input.attendance.total_days < 0.0 {
                    errors.add("attendance.totalDays", "Total days must be a non-negative number.");
                }
            }
            GenerationRequest::Helpdesk(input) => {
                errors.require("query", &input.query, "Please enter a question.");
                errors.require("userRole", &input.user_role, "User role is required.");
            }
        }
        errors.into_result()
    }
}

/// The text the syllabus tool returns for a course it does not know.
pub fn syllabus_not_found(course_name: &str) -> String {
    format!("Sorry, I could not find a syllabus for the course \"{course_name}\".")
}

//=========================================================================================
// Draft Builders
//=========================================================================================

/// Renders a number without a trailing ".0" when it is whole.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Prefills a grade report from one student's records in one course.
pub fn grade_report_draft(
    student: &User,
    course: &Course,
    teacher_name: &str,
    grades: &[Grade],
    attendance: &[Attendance],
) -> GradeReportInput {
    let in_course = |student_id: &str, course_id: &str| {
        student_id == student.id && course_id == course.id
    };

    let grades_summary = grades
        .iter()
        .filter(|g| in_course(&g.student_id, &g.course_id))
        .map(|g| {
            format!(
                "{}: {}/{}",
                g.assignment,
                format_number(g.score),
                format_number(g.total)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let records: Vec<&Attendance> = attendance
        .iter()
        .filter(|a| in_course(&a.student_id, &a.course_id))
        .collect();
    let absences = records
        .iter()
        .filter(|a| a.status == AttendanceStatus::Absent)
        .count();
    let lates = records
        .iter()
        .filter(|a| a.status == AttendanceStatus::Late)
        .count();

    GradeReportInput {
        student_name: student.name.clone(),
        class_name: course.name.clone(),
        teacher_name: teacher_name.to_string(),
        grades: grades_summary,
        attendance: format!("{absences} absences, {lates} lates"),
    }
}

/// Prefills an attendance report with the course's records, oldest first.
pub fn attendance_report_draft(
    student: &User,
    course: &Course,
    attendance: &[Attendance],
) -> AttendanceReportInput {
    let mut records: Vec<&Attendance> = attendance
        .iter()
        .filter(|a| a.student_id == student.id && a.course_id == course.id)
        .collect();
    records.sort_by_key(|a| a.date);

    AttendanceReportInput {
        student_name: student.name.clone(),
        class_name: course.name.clone(),
        attendance_records: records
            .into_iter()
            .map(|a| AttendanceRecordInput {
                date: a.date.format("%Y-%m-%d").to_string(),
                status: a.status,
            })
            .collect(),
    }
}

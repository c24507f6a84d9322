//! crates/campify_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

//=========================================================================================
// Users and Roles
//=========================================================================================

/// The four kinds of account the application knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Teacher, Role::Student, Role::Parent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Teacher => "Teacher",
            Role::Student => "Student",
            Role::Parent => "Parent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role-specific attributes. The variant *is* the role.
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Admin,
    Teacher { course_ids: Vec<String> },
    Student { parent_id: String, course_ids: Vec<String> },
    Parent { child_ids: Vec<String> },
}

/// Represents any account holder.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub profile: Profile,
}

impl User {
    pub fn role(&self) -> Role {
        match self.profile {
            Profile::Admin => Role::Admin,
            Profile::Teacher { .. } => Role::Teacher,
            Profile::Student { .. } => Role::Student,
            Profile::Parent { .. } => Role::Parent,
        }
    }

    pub fn is_student(&self) -> bool {
        matches!(self.profile, Profile::Student { .. })
    }

    /// Children linked to a parent account; empty for every other role.
    pub fn child_ids(&self) -> &[String] {
        match &self.profile {
            Profile::Parent { child_ids } => child_ids,
            _ => &[],
        }
    }

    pub fn parent_id(&self) -> Option<&str> {
        match &self.profile {
            Profile::Student { parent_id, .. } => Some(parent_id),
            _ => None,
        }
    }
}

/// The data needed to register a new self-service account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

//=========================================================================================
// Academic Records
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub teacher_id: String,
    pub student_ids: Vec<String>,
}

impl Course {
    pub fn enrolls(&self, student_id: &str) -> bool {
        self.student_ids.iter().any(|id| id == student_id)
    }
}

/// A single marked piece of work. Several accumulate per (student, course).
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub student_id: String,
    pub course_id: String,
    pub assignment: String,
    pub score: f64,
    pub total: f64,
    pub date: NaiveDate,
}

impl Grade {
    /// `score / total` as a percentage, or 0 when `total` is not positive.
    pub fn percentage(&self) -> f64 {
        if self.total > 0.0 {
            self.score / self.total * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Late => "Late",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attendance {
    pub student_id: String,
    pub course_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub name: String,
    pub submitted_at: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub file_url: String,
}

//=========================================================================================
// Fees
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Paid,
    Pending,
    Overdue,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Overdue => "Overdue",
        }
    }
}

/// A semester fee record. `status` is stored, not recomputed from the amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: String,
    pub student_id: String,
    pub semester: String,
    pub amount_due: f64,
    pub amount_paid: f64,
    pub status: PaymentStatus,
    pub due_date: NaiveDate,
}

//=========================================================================================
// Shared Reports
//=========================================================================================

/// A teacher-authored report shared with a student's parent.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedReport {
    pub id: String,
    pub student_id: String,
    pub teacher_id: String,
    pub course_id: String,
    pub sent_date: DateTime<Utc>,
    pub report_content: String,
    pub comments: Vec<ReportComment>,
}

/// One entry of a report's append-only comment thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportComment {
    pub id: String,
    pub report_id: String,
    pub author_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

//=========================================================================================
// Timetable
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }
}

/// The fixed teaching periods of a school day.
pub const TIME_SLOTS: [&str; 4] = [
    "09:00 - 10:30",
    "10:45 - 12:15",
    "13:30 - 15:00",
    "15:15 - 16:45",
];

#[derive(Debug, Clone, PartialEq)]
pub struct TimetableSlot {
    pub course_id: String,
    pub day: Weekday,
    pub time: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timetable {
    pub student_id: String,
    pub slots: Vec<TimetableSlot>,
}

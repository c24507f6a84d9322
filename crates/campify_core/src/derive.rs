//! crates/campify_core/src/derive.rs
//!
//! The derivation engine: view-ready aggregates computed on every read from the
//! normalized Grade, Attendance, Payment and SharedReport records. Nothing here
//! is cached and nothing here can divide by zero.

use crate::domain::{
    Assignment, Attendance, AttendanceStatus, Course, Grade, Payment, PaymentStatus, SharedReport,
};
use chrono::NaiveDate;

//=========================================================================================
// Grades
//=========================================================================================

/// Mean of `score / total` (as a percentage) over one student's grades in one
/// course. Zero grade records yield 0.
pub fn course_average(grades: &[Grade], student_id: &str, course_id: &str) -> f64 {
    let (sum, count) = grades
        .iter()
        .filter(|g| g.student_id == student_id && g.course_id == course_id)
        .fold((0.0, 0usize), |(sum, count), g| (sum + g.percentage(), count + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseAverage {
    pub course_id: String,
    pub course_name: String,
    pub average: f64,
}

/// Per-course averages for every course that enrolls the student, in course order.
pub fn course_averages(student_id: &str, courses: &[Course], grades: &[Grade]) -> Vec<CourseAverage> {
    courses
        .iter()
        .filter(|c| c.enrolls(student_id))
        .map(|c| CourseAverage {
            course_id: c.id.clone(),
            course_name: c.name.clone(),
            average: course_average(grades, student_id, &c.id),
        })
        .collect()
}

/// Mean of the per-course averages. Every course weighs the same regardless of
/// how many grades it holds; a course with no grades counts as 0.
pub fn overall_average(per_course: &[CourseAverage]) -> f64 {
    if per_course.is_empty() {
        return 0.0;
    }
    per_course.iter().map(|c| c.average).sum::<f64>() / per_course.len() as f64
}

/// `Σscore / Σtotal` over one student's grades in a course, as shown on the
/// grades page. `None` means "no grades recorded".
pub fn course_final_grade(grades: &[Grade], student_id: &str, course_id: &str) -> Option<f64> {
    let (score, total, count) = grades
        .iter()
        .filter(|g| g.student_id == student_id && g.course_id == course_id)
        .fold((0.0, 0.0, 0usize), |(s, t, n), g| (s + g.score, t + g.total, n + 1));

    match count {
        0 => None,
        _ if total > 0.0 => Some(score / total * 100.0),
        _ => Some(0.0),
    }
}

/// Severity band of a percentage; each band includes its lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GradeBand {
    Excellent = 1,
    Good = 2,
    Satisfactory = 3,
    Passing = 4,
    Failing = 5,
}

impl GradeBand {
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn letter(&self) -> char {
        match self {
            GradeBand::Excellent => 'A',
            GradeBand::Good => 'B',
            GradeBand::Satisfactory => 'C',
            GradeBand::Passing => 'D',
            GradeBand::Failing => 'F',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GradeBand::Excellent => "excellent",
            GradeBand::Good => "good",
            GradeBand::Satisfactory => "satisfactory",
            GradeBand::Passing => "passing",
            GradeBand::Failing => "failing",
        }
    }
}

pub fn grade_band(percentage: f64) -> GradeBand {
    if percentage >= 90.0 {
        GradeBand::Excellent
    } else if percentage >= 80.0 {
        GradeBand::Good
    } else if percentage >= 70.0 {
        GradeBand::Satisfactory
    } else if percentage >= 60.0 {
        GradeBand::Passing
    } else {
        GradeBand::Failing
    }
}

/// Letter-grade counts over a set of grade records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradeDistribution {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
    pub f: usize,
}

impl GradeDistribution {
    pub fn total(&self) -> usize {
        self.a + self.b + self.c + self.d + self.f
    }
}

/// Distribution over every grade recorded in the given courses.
pub fn grade_distribution(grades: &[Grade], course_ids: &[&str]) -> GradeDistribution {
    grades
        .iter()
        .filter(|g| course_ids.contains(&g.course_id.as_str()))
        .fold(GradeDistribution::default(), |mut acc, g| {
            match grade_band(g.percentage()) {
                GradeBand::Excellent => acc.a += 1,
                GradeBand::Good => acc.b += 1,
                GradeBand::Satisfactory => acc.c += 1,
                GradeBand::Passing => acc.d += 1,
                GradeBand::Failing => acc.f += 1,
            }
            acc
        })
}

//=========================================================================================
// Attendance
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttendanceSummary {
    pub absences: usize,
    pub lates: usize,
    /// Record count divided by enrolled course count. An approximation, not a
    /// calendar day count.
    pub total_days: f64,
}

/// Summarises all of a student's attendance records across their courses.
pub fn attendance_summary(
    records: &[Attendance],
    student_id: &str,
    enrolled_courses: usize,
) -> AttendanceSummary {
    let mine = records.iter().filter(|a| a.student_id == student_id);
    let (absences, lates, count) = mine.fold((0, 0, 0usize), |(abs, late, n), a| match a.status {
        AttendanceStatus::Absent => (abs + 1, late, n + 1),
        AttendanceStatus::Late => (abs, late + 1, n + 1),
        AttendanceStatus::Present => (abs, late, n + 1),
    });

    let total_days = if enrolled_courses == 0 {
        0.0
    } else {
        count as f64 / enrolled_courses as f64
    };

    AttendanceSummary {
        absences,
        lates,
        total_days,
    }
}

/// A student's records, most recent first, capped at `limit`.
pub fn recent_attendance<'a>(records: &'a [Attendance], student_id: &str, limit: usize) -> Vec<&'a Attendance> {
    let mut mine: Vec<&Attendance> = records.iter().filter(|a| a.student_id == student_id).collect();
    mine.sort_by(|a, b| b.date.cmp(&a.date));
    mine.truncate(limit);
    mine
}

//=========================================================================================
// Payments
//=========================================================================================

/// Whether the stored status agrees with what the amounts say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentIntegrity {
    Consistent,
    /// Marked `Paid` while a positive balance remains.
    PaidWithBalance,
    /// Marked `Pending`/`Overdue` with nothing left to pay.
    UnpaidWithoutBalance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSummary {
    /// `amount_due - amount_paid`. Negative when overpaid; never clamped.
    pub balance: f64,
    pub percent_paid: f64,
    pub status: PaymentStatus,
    pub integrity: PaymentIntegrity,
}

pub fn payment_balance(payment: &Payment) -> f64 {
    payment.amount_due - payment.amount_paid
}

pub fn percent_paid(payment: &Payment) -> f64 {
    if payment.amount_due == 0.0 {
        0.0
    } else {
        payment.amount_paid / payment.amount_due * 100.0
    }
}

pub fn payment_summary(payment: &Payment) -> PaymentSummary {
    let balance = payment_balance(payment);
    let integrity = match payment.status {
        PaymentStatus::Paid if balance > 0.0 => PaymentIntegrity::PaidWithBalance,
        PaymentStatus::Pending | PaymentStatus::Overdue if balance <= 0.0 => {
            PaymentIntegrity::UnpaidWithoutBalance
        }
        _ => PaymentIntegrity::Consistent,
    };

    PaymentSummary {
        balance,
        percent_paid: percent_paid(payment),
        status: payment.status,
        integrity,
    }
}

//=========================================================================================
// Shared Reports
//=========================================================================================

/// Orders a report list for display: reports newest first, each report's
/// comment thread oldest first.
pub fn order_report_threads(mut reports: Vec<SharedReport>) -> Vec<SharedReport> {
    reports.sort_by(|a, b| b.sent_date.cmp(&a.sent_date));
    for report in &mut reports {
        report.comments.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    }
    reports
}

//=========================================================================================
// Assignments
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentStatus {
    Submitted,
    Overdue,
    Upcoming,
}

pub fn assignment_status(assignment: &Assignment, today: NaiveDate) -> AssignmentStatus {
    match assignment.submitted_at {
        Some(_) => AssignmentStatus::Submitted,
        None if assignment.due_date < today => AssignmentStatus::Overdue,
        None => AssignmentStatus::Upcoming,
    }
}

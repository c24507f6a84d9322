//! services/api/src/adapters/store.rs
//!
//! The in-memory entity store, the concrete implementation of the
//! `EntityStore` port from the `core` crate. It is constructed once per process
//! and shared through `AppState`; each collection has its own lock so that
//! appends to one collection never wait on another.

use async_trait::async_trait;
use campify_core::domain::{
    Assignment, Attendance, AuthSession, Course, Grade, NewUser, Payment, Profile, ReportComment,
    Role, SharedReport, Timetable, User,
};
use campify_core::ports::{EntityStore, PortError, PortResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::adapters::seed::SeedData;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An in-memory store that implements the `EntityStore` port.
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    sessions: RwLock<HashMap<String, AuthSession>>,
    courses: RwLock<Vec<Course>>,
    grades: RwLock<Vec<Grade>>,
    attendance: RwLock<Vec<Attendance>>,
    assignments: RwLock<Vec<Assignment>>,
    payments: RwLock<Vec<Payment>>,
    shared_reports: RwLock<Vec<SharedReport>>,
    timetables: RwLock<Vec<Timetable>>,
    syllabuses: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates a store holding exactly the given records.
    pub fn new(data: SeedData) -> Self {
        info!(
            "Entity store loaded: {} users, {} courses, {} grades, {} attendance records, {} reports",
            data.users.len(),
            data.courses.len(),
            data.grades.len(),
            data.attendance.len(),
            data.shared_reports.len()
        );
        Self {
            users: RwLock::new(data.users),
            sessions: RwLock::new(HashMap::new()),
            courses: RwLock::new(data.courses),
            grades: RwLock::new(data.grades),
            attendance: RwLock::new(data.attendance),
            assignments: RwLock::new(data.assignments),
            payments: RwLock::new(data.payments),
            shared_reports: RwLock::new(data.shared_reports),
            timetables: RwLock::new(data.timetables),
            syllabuses: data.syllabuses,
        }
    }

    /// Creates a store from the generated demo dataset.
    pub fn seeded(seed: u64, now: DateTime<Utc>) -> Self {
        Self::new(SeedData::generate(seed, now))
    }
}

fn not_found(what: &str, id: &str) -> PortError {
    PortError::NotFound(format!("{what} '{id}'"))
}

//=========================================================================================
// `EntityStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get_user(&self, user_id: &str) -> PortResult<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| not_found("User", user_id))
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or_else(|| not_found("User with email", email))
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        // The write lock is held across the duplicate check and the push.
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&new_user.email)) {
            return Err(PortError::Conflict(format!(
                "An account with the email {} already exists",
                new_user.email
            )));
        }

        let id = format!("user-{}", Uuid::new_v4());
        let profile = match new_user.role {
            Role::Student => Profile::Student {
                // No parent account exists yet; the link is a placeholder.
                parent_id: format!("user-parent-{}", Uuid::new_v4()),
                course_ids: Vec::new(),
            },
            Role::Parent => Profile::Parent {
                child_ids: Vec::new(),
            },
            Role::Admin | Role::Teacher => {
                return Err(PortError::Unexpected(format!(
                    "{} accounts cannot be self-registered",
                    new_user.role
                )))
            }
        };

        let user = User {
            avatar_url: format!("https://picsum.photos/seed/{id}/100/100"),
            id,
            name: new_user.name,
            email: new_user.email,
            profile,
        };
        users.push(user.clone());
        debug!("Registered {} account {}", user.role(), user.id);
        Ok(user)
    }

    async fn update_user_name(&self, user_id: &str, name: &str) -> PortResult<User> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| not_found("User", user_id))?;
        user.name = name.to_string();
        Ok(user.clone())
    }

    async fn create_auth_session(
        &self,
        token: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut sessions = self.sessions.write().await;
        // Expired entries are dropped whenever a new session is written.
        let now = Utc::now();
        sessions.retain(|_, s| s.is_live(now));
        sessions.insert(
            token.to_string(),
            AuthSession {
                token: token.to_string(),
                user_id: user_id.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn find_auth_session(&self, token: &str) -> PortResult<Option<AuthSession>> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        Ok(self.courses.read().await.clone())
    }

    async fn list_grades(&self) -> PortResult<Vec<Grade>> {
        Ok(self.grades.read().await.clone())
    }

    async fn grades_for_student(&self, student_id: &str) -> PortResult<Vec<Grade>> {
        Ok(self
            .grades
            .read()
            .await
            .iter()
            .filter(|g| g.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn attendance_for_student(&self, student_id: &str) -> PortResult<Vec<Attendance>> {
        Ok(self
            .attendance
            .read()
            .await
            .iter()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn assignments_for_student(&self, student_id: &str) -> PortResult<Vec<Assignment>> {
        Ok(self
            .assignments
            .read()
            .await
            .iter()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn timetable_for_student(&self, student_id: &str) -> PortResult<Option<Timetable>> {
        Ok(self
            .timetables
            .read()
            .await
            .iter()
            .find(|t| t.student_id == student_id)
            .cloned())
    }

    async fn syllabus_for_course(&self, course_name: &str) -> PortResult<Option<String>> {
        Ok(self.syllabuses.get(course_name).cloned())
    }

    async fn list_payments(&self) -> PortResult<Vec<Payment>> {
        Ok(self.payments.read().await.clone())
    }

    async fn get_payment(&self, payment_id: &str) -> PortResult<Payment> {
        self.payments
            .read()
            .await
            .iter()
            .find(|p| p.id == payment_id)
            .cloned()
            .ok_or_else(|| not_found("Payment", payment_id))
    }

    async fn list_shared_reports(&self) -> PortResult<Vec<SharedReport>> {
        Ok(self.shared_reports.read().await.clone())
    }

    async fn get_shared_report(&self, report_id: &str) -> PortResult<SharedReport> {
        self.shared_reports
            .read()
            .await
            .iter()
            .find(|r| r.id == report_id)
            .cloned()
            .ok_or_else(|| not_found("Report", report_id))
    }

    async fn create_shared_report(&self, report: SharedReport) -> PortResult<SharedReport> {
        let mut reports = self.shared_reports.write().await;
        if reports.iter().any(|r| r.id == report.id) {
            return Err(PortError::Conflict(format!("Report '{}' already exists", report.id)));
        }
        reports.push(report.clone());
        Ok(report)
    }

    async fn append_report_comment(&self, comment: ReportComment) -> PortResult<SharedReport> {
        let mut reports = self.shared_reports.write().await;
        let report = reports
            .iter_mut()
            .find(|r| r.id == comment.report_id)
            .ok_or_else(|| not_found("Report", &comment.report_id))?;
        report.comments.push(comment);
        Ok(report.clone())
    }
}

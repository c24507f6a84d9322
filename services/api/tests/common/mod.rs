//! Shared fixtures for the HTTP tests: a small hand-built school, a scripted
//! report-text service, and request helpers driving the router in-process.

#![allow(dead_code)]

use api_lib::adapters::{MemoryStore, SeedData};
use api_lib::config::Config;
use api_lib::web::{app_router, state::AppState};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use campify_core::domain::{
    Attendance, AttendanceStatus, Course, Grade, Payment, PaymentStatus, Profile, ReportComment,
    SharedReport, Timetable, TimetableSlot, User, Weekday,
};
use campify_core::generation::GenerationRequest;
use campify_core::ports::{PortError, PortResult, ReportTextService};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

//=========================================================================================
// Scripted Report-Text Service
//=========================================================================================

/// Answers every request with the same text, or fails every request.
pub struct ScriptedText {
    reply: Option<String>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedText {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ReportTextService for ScriptedText {
    async fn generate(&self, request: &GenerationRequest) -> PortResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply
            .clone()
            .ok_or_else(|| PortError::Unexpected("upstream model unavailable".to_string()))
    }
}

//=========================================================================================
// Fixture School
//=========================================================================================

fn user(id: &str, name: &str, email: &str, profile: Profile) -> User {
    User {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        avatar_url: String::new(),
        profile,
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
}

fn grade(student: &str, course: &str, assignment: &str, score: f64) -> Grade {
    Grade {
        student_id: student.into(),
        course_id: course.into(),
        assignment: assignment.into(),
        score,
        total: 100.0,
        date: day(10),
    }
}

fn attendance(student: &str, course: &str, d: u32, status: AttendanceStatus) -> Attendance {
    Attendance {
        student_id: student.into(),
        course_id: course.into(),
        date: day(d),
        status,
    }
}

/// Two teachers, two courses, two students each with a parent, plus a parent
/// with no linked child.
///
/// Emily (student-1) takes Calculus and History: Calculus grades 90 and 85,
/// History 70; one absence and one late across ten records; 3000 of 5500 paid.
pub fn school() -> SeedData {
    let now = Utc::now();
    let mut data = SeedData::default();

    data.users = vec![
        user("user-admin-1", "Jennifer Anderson", "admin@campify.edu", Profile::Admin),
        user(
            "user-teacher-1",
            "Evelyn Reed",
            "reed@campify.edu",
            Profile::Teacher { course_ids: vec!["course-1".into()] },
        ),
        user(
            "user-teacher-2",
            "Marcus Cole",
            "cole@campify.edu",
            Profile::Teacher { course_ids: vec!["course-2".into()] },
        ),
        user(
            "user-student-1",
            "Emily Davis",
            "emily@campify.edu",
            Profile::Student {
                parent_id: "user-parent-1".into(),
                course_ids: vec!["course-1".into(), "course-2".into()],
            },
        ),
        user(
            "user-student-2",
            "Michael Brown",
            "michael@campify.edu",
            Profile::Student {
                parent_id: "user-parent-2".into(),
                course_ids: vec!["course-2".into()],
            },
        ),
        user(
            "user-parent-1",
            "John Davis",
            "john.davis@campify.edu",
            Profile::Parent { child_ids: vec!["user-student-1".into()] },
        ),
        user(
            "user-parent-2",
            "Mary Brown",
            "mary.brown@campify.edu",
            Profile::Parent { child_ids: vec!["user-student-2".into()] },
        ),
        user(
            "user-parent-3",
            "Pat Lone",
            "pat@campify.edu",
            Profile::Parent { child_ids: vec![] },
        ),
    ];

    data.courses = vec![
        Course {
            id: "course-1".into(),
            name: "Calculus".into(),
            teacher_id: "user-teacher-1".into(),
            student_ids: vec!["user-student-1".into()],
        },
        Course {
            id: "course-2".into(),
            name: "History".into(),
            teacher_id: "user-teacher-2".into(),
            student_ids: vec!["user-student-1".into(), "user-student-2".into()],
        },
    ];

    data.grades = vec![
        grade("user-student-1", "course-1", "Mid-Term", 90.0),
        grade("user-student-1", "course-1", "Quiz", 85.0),
        grade("user-student-1", "course-2", "Essay", 70.0),
        grade("user-student-2", "course-2", "Essay", 55.0),
    ];

    use AttendanceStatus::*;
    let calculus = [Present, Absent, Late, Present, Present];
    for (i, status) in calculus.into_iter().enumerate() {
        data.attendance.push(attendance("user-student-1", "course-1", i as u32 + 1, status));
        data.attendance.push(attendance("user-student-1", "course-2", i as u32 + 1, Present));
    }

    data.payments = vec![
        Payment {
            id: "payment-1".into(),
            student_id: "user-student-1".into(),
            semester: "Fall 2024".into(),
            amount_due: 5500.0,
            amount_paid: 3000.0,
            status: PaymentStatus::Pending,
            due_date: day(30),
        },
        Payment {
            id: "payment-2".into(),
            student_id: "user-student-2".into(),
            semester: "Fall 2024".into(),
            amount_due: 5500.0,
            amount_paid: 5500.0,
            status: PaymentStatus::Paid,
            due_date: day(30),
        },
    ];

    data.shared_reports = vec![
        SharedReport {
            id: "report-1".into(),
            student_id: "user-student-1".into(),
            teacher_id: "user-teacher-1".into(),
            course_id: "course-1".into(),
            sent_date: now - Duration::days(3),
            report_content: "Emily is doing well in Calculus.".into(),
            // Stored out of order on purpose.
            comments: vec![
                ReportComment {
                    id: "comment-1-2".into(),
                    report_id: "report-1".into(),
                    author_id: "user-parent-1".into(),
                    content: "Thank you!".into(),
                    timestamp: now - Duration::days(1),
                },
                ReportComment {
                    id: "comment-1-1".into(),
                    report_id: "report-1".into(),
                    author_id: "user-teacher-1".into(),
                    content: "Here is the report.".into(),
                    timestamp: now - Duration::days(3),
                },
            ],
        },
        SharedReport {
            id: "report-2".into(),
            student_id: "user-student-2".into(),
            teacher_id: "user-teacher-2".into(),
            course_id: "course-2".into(),
            sent_date: now - Duration::days(1),
            report_content: "Michael needs support in History.".into(),
            comments: vec![],
        },
    ];

    data.timetables = vec![Timetable {
        student_id: "user-student-1".into(),
        slots: vec![
            TimetableSlot {
                course_id: "course-2".into(),
                day: Weekday::Tuesday,
                time: "09:00 - 10:30",
            },
            TimetableSlot {
                course_id: "course-1".into(),
                day: Weekday::Monday,
                time: "10:45 - 12:15",
            },
        ],
    }];

    data.syllabuses = HashMap::from([(
        "Calculus".to_string(),
        "Limits, derivatives and integrals.".to_string(),
    )]);

    data
}

//=========================================================================================
// Request Helpers
//=========================================================================================

pub fn app_with(report_text: Arc<dyn ReportTextService>) -> Router {
    let config = Arc::new(Config::from_lookup(|_| None).unwrap());
    let store = Arc::new(MemoryStore::new(school()));
    app_router(Arc::new(AppState::new(store, config, report_text))).unwrap()
}

pub fn app() -> Router {
    app_with(ScriptedText::replying("Generated text."))
}

/// Sends one request and returns the status, the `Set-Cookie` header and the
/// JSON body (`Value::Null` when empty).
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, set_cookie, json)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _, json) = send_raw(app, method, uri, cookie, body).await;
    (status, json)
}

/// Signs in by email and returns the `name=value` pair to send back.
pub async fn login(app: &Router, email: &str) -> String {
    let (status, set_cookie, _) = send_raw(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(serde_json::json!({ "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed for {email}");
    set_cookie
        .expect("login sets a cookie")
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

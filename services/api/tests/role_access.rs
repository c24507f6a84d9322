mod common;

use axum::http::{Method, StatusCode};
use common::{app, login, send};
use serde_json::{json, Value};

fn close(value: &Value, expected: f64) -> bool {
    value.as_f64().is_some_and(|v| (v - expected).abs() < 1e-6)
}

#[tokio::test]
async fn route_table_is_enforced_per_role() {
    let app = app();
    let cases = [
        ("emily@campify.edu", "/students", StatusCode::FORBIDDEN),
        ("emily@campify.edu", "/reports", StatusCode::FORBIDDEN),
        ("emily@campify.edu", "/payments", StatusCode::FORBIDDEN),
        ("emily@campify.edu", "/courses", StatusCode::OK),
        ("emily@campify.edu", "/timetable", StatusCode::OK),
        ("reed@campify.edu", "/teachers", StatusCode::FORBIDDEN),
        ("reed@campify.edu", "/payments", StatusCode::FORBIDDEN),
        ("reed@campify.edu", "/grades", StatusCode::FORBIDDEN),
        ("reed@campify.edu", "/students", StatusCode::OK),
        ("john.davis@campify.edu", "/courses", StatusCode::FORBIDDEN),
        ("john.davis@campify.edu", "/payments", StatusCode::OK),
        ("john.davis@campify.edu", "/grades", StatusCode::OK),
        ("admin@campify.edu", "/grades", StatusCode::FORBIDDEN),
        ("admin@campify.edu", "/teachers", StatusCode::OK),
        ("admin@campify.edu", "/reports", StatusCode::OK),
    ];

    for (email, path, expected) in cases {
        let cookie = login(&app, email).await;
        let (status, body) = send(&app, Method::GET, path, Some(&cookie), None).await;
        assert_eq!(status, expected, "{email} GET {path}");
        if expected == StatusCode::FORBIDDEN {
            assert_eq!(body["redirect"], "/dashboard", "{email} GET {path}");
        }
    }
}

#[tokio::test]
async fn teachers_see_only_their_own_courses_and_students() {
    let app = app();

    let reed = login(&app, "reed@campify.edu").await;
    let (_, courses) = send(&app, Method::GET, "/courses", Some(&reed), None).await;
    let courses = courses.as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["name"], "Calculus");
    assert_eq!(courses[0]["teacherName"], "Evelyn Reed");
    assert_eq!(courses[0]["enrolledCount"], 1);

    let (_, students) = send(&app, Method::GET, "/students", Some(&reed), None).await;
    let students = students.as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["student"]["id"], "user-student-1");
    assert_eq!(students[0]["parentName"], "John Davis");
    assert_eq!(students[0]["courseCount"], 2);

    let cole = login(&app, "cole@campify.edu").await;
    let (_, students) = send(&app, Method::GET, "/students", Some(&cole), None).await;
    assert_eq!(students.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn student_detail_derives_averages_and_attendance() {
    let app = app();
    let cookie = login(&app, "admin@campify.edu").await;
    let (status, body) = send(&app, Method::GET, "/students/user-student-1", Some(&cookie), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parentName"], "John Davis");
    let averages = body["courseAverages"].as_array().unwrap();
    assert_eq!(averages.len(), 2);
    assert_eq!(averages[0]["courseName"], "Calculus");
    assert!(close(&averages[0]["average"], 87.5));
    assert_eq!(averages[1]["courseName"], "History");
    assert!(close(&averages[1]["average"], 70.0));
    assert!(close(&body["overallAverage"], 78.75));

    assert_eq!(body["attendance"]["absences"], 1);
    assert_eq!(body["attendance"]["lates"], 1);
    assert!(close(&body["attendance"]["totalDays"], 5.0));
    // Ten records on file; only the five newest are listed.
    let recent = body["recentAttendance"].as_array().unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0]["date"], "2024-09-05");
    assert_eq!(recent[4]["date"], "2024-09-03");
}

#[tokio::test]
async fn student_detail_checks_visibility_and_existence() {
    let app = app();
    let reed = login(&app, "reed@campify.edu").await;

    let (status, _) = send(&app, Method::GET, "/students/user-student-2", Some(&reed), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::GET, "/students/user-student-99", Some(&reed), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["redirect"], "/dashboard/students");

    // A teacher id is not a student.
    let (status, _) = send(&app, Method::GET, "/students/user-teacher-2", Some(&reed), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn teachers_list_their_courses() {
    let app = app();
    let cookie = login(&app, "admin@campify.edu").await;
    let (status, body) = send(&app, Method::GET, "/teachers", Some(&cookie), None).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["teacher"]["name"], "Evelyn Reed");
    assert_eq!(rows[0]["courses"], json!(["Calculus"]));
}

#[tokio::test]
async fn student_grades_are_grouped_by_course() {
    let app = app();
    let cookie = login(&app, "emily@campify.edu").await;
    let (status, body) = send(&app, Method::GET, "/grades", Some(&cookie), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student"]["id"], "user-student-1");
    let courses = body["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 2);
    assert!(close(&courses[0]["finalGrade"], 87.5));
    assert_eq!(courses[0]["grades"][0]["letter"], "A");
    assert_eq!(courses[0]["grades"][1]["letter"], "B");
    assert!(close(&courses[1]["finalGrade"], 70.0));
}

#[tokio::test]
async fn timetable_is_sorted_by_day_then_slot() {
    let app = app();
    let cookie = login(&app, "john.davis@campify.edu").await;
    let (status, body) = send(&app, Method::GET, "/timetable", Some(&cookie), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student"]["id"], "user-student-1");
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0]["day"], "Monday");
    assert_eq!(slots[0]["courseName"], "Calculus");
    assert_eq!(slots[1]["day"], "Tuesday");
    assert_eq!(slots[1]["teacherName"], "Marcus Cole");
}

#[tokio::test]
async fn parent_sees_the_child_balance() {
    let app = app();
    let cookie = login(&app, "john.davis@campify.edu").await;
    let (status, body) = send(&app, Method::GET, "/payments", Some(&cookie), None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["admin"].is_null());
    let payment = &body["parent"]["payment"];
    assert_eq!(payment["id"], "payment-1");
    assert_eq!(payment["status"], "Pending");
    assert!(close(&payment["balance"], 2500.0));
    assert!(close(&payment["percentPaid"], 3000.0 / 5500.0 * 100.0));
    assert_eq!(payment["integrity"], "consistent");
}

#[tokio::test]
async fn admin_sees_payments_grouped_by_status() {
    let app = app();
    let cookie = login(&app, "admin@campify.edu").await;
    let (status, body) = send(&app, Method::GET, "/payments", Some(&cookie), None).await;

    assert_eq!(status, StatusCode::OK);
    let admin = &body["admin"];
    assert_eq!(admin["paid"].as_array().unwrap().len(), 1);
    assert_eq!(admin["pending"].as_array().unwrap().len(), 1);
    assert_eq!(admin["overdue"], json!([]));
    assert!(close(&admin["totalCollected"], 8500.0));
    assert!(close(&admin["totalOutstanding"], 2500.0));
}

#[tokio::test]
async fn only_the_parent_can_pay_and_only_an_open_balance() {
    let app = app();
    let john = login(&app, "john.davis@campify.edu").await;

    let (status, body) = send(&app, Method::POST, "/payments/payment-1/pay", Some(&john), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(close(&body["amount"], 2500.0));
    assert_eq!(body["message"], "Thank you. Your payment of $2,500.00 has been processed.");

    let (status, _) = send(&app, Method::POST, "/payments/payment-2/pay", Some(&john), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mary = login(&app, "mary.brown@campify.edu").await;
    let (status, body) = send(&app, Method::POST, "/payments/payment-2/pay", Some(&mary), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["amount"], "There is no outstanding balance to pay.");

    let admin = login(&app, "admin@campify.edu").await;
    let (status, _) = send(&app, Method::POST, "/payments/payment-1/pay", Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::POST, "/payments/payment-9/pay", Some(&john), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["redirect"], "/dashboard/payments");
}

#[tokio::test]
async fn fee_notices_are_for_administrators() {
    let app = app();
    let admin = login(&app, "admin@campify.edu").await;
    let (status, body) = send(&app, Method::GET, "/payments/payment-1/notice", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["content"].as_str().unwrap().contains("Emily Davis"));

    let john = login(&app, "john.davis@campify.edu").await;
    let (status, _) = send(&app, Method::GET, "/payments/payment-1/notice", Some(&john), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn parent_without_children_gets_empty_pages() {
    let app = app();
    let cookie = login(&app, "pat@campify.edu").await;

    let (status, body) = send(&app, Method::GET, "/dashboard", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["parent"]["child"].is_null());
    assert_eq!(body["parent"]["children"], json!([]));

    let (status, body) = send(&app, Method::GET, "/grades", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["student"].is_null());
    assert_eq!(body["courses"], json!([]));

    let (status, body) = send(&app, Method::GET, "/payments", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["parent"]["payment"].is_null());
}

#[tokio::test]
async fn parent_cannot_select_another_family_child() {
    let app = app();
    let cookie = login(&app, "john.davis@campify.edu").await;

    let (status, _) = send(&app, Method::GET, "/grades?child=user-student-2", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::GET, "/grades?child=user-student-1", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student"]["id"], "user-student-1");
}

#[tokio::test]
async fn dashboards_are_shaped_by_role() {
    let app = app();

    let admin = login(&app, "admin@campify.edu").await;
    let (_, body) = send(&app, Method::GET, "/dashboard", Some(&admin), None).await;
    assert_eq!(body["role"], "Admin");
    assert_eq!(body["admin"]["studentsCount"], 2);
    assert_eq!(body["admin"]["teachersCount"], 2);
    assert_eq!(body["admin"]["coursesCount"], 2);
    assert!(body["teacher"].is_null());

    let emily = login(&app, "emily@campify.edu").await;
    let (_, body) = send(&app, Method::GET, "/dashboard", Some(&emily), None).await;
    assert_eq!(body["role"], "Student");
    assert!(close(&body["student"]["overallAverage"], 78.75));

    let john = login(&app, "john.davis@campify.edu").await;
    let (_, body) = send(&app, Method::GET, "/dashboard", Some(&john), None).await;
    assert_eq!(body["parent"]["child"]["id"], "user-student-1");
    assert_eq!(body["parent"]["courseAverages"].as_array().unwrap().len(), 2);
}

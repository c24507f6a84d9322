mod common;

use axum::http::{Method, StatusCode};
use common::{app, login, send, send_raw};
use serde_json::json;

#[tokio::test]
async fn login_sets_an_http_only_session_cookie() {
    let app = app();
    let (status, set_cookie, body) = send_raw(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "admin@campify.edu", "password": "anything" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "Admin");
    let cookie = set_cookie.unwrap();
    assert!(cookie.starts_with("campify-session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=86400"));
    // The token is opaque, not the user id.
    assert!(!cookie.contains("user-admin-1"));
}

#[tokio::test]
async fn me_returns_the_user_and_role_navigation() {
    let app = app();
    let cookie = login(&app, "emily@campify.edu").await;
    let (status, body) = send(&app, Method::GET, "/me", Some(&cookie), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], "user-student-1");
    let paths: Vec<&str> = body["navigation"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"/dashboard/grades"));
    assert!(paths.contains(&"/dashboard/courses"));
    assert!(!paths.contains(&"/dashboard/payments"));
    assert!(!paths.contains(&"/dashboard/students"));
}

#[tokio::test]
async fn email_lookup_ignores_case() {
    let app = app();
    let cookie = login(&app, "Emily@Campify.edu").await;
    let (status, _) = send(&app, Method::GET, "/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_email_cannot_sign_in() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@campify.edu" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password.");
}

#[tokio::test]
async fn missing_or_unknown_cookie_is_unauthenticated() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/dashboard", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/login");

    let (status, body) = send(
        &app,
        Method::GET,
        "/dashboard",
        Some("campify-session=not-a-real-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/login");

    // A raw user id is not a session token.
    let (status, _) = send(&app, Method::GET, "/me", Some("campify-session=user-admin-1"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_the_cookie_and_ends_the_session() {
    let app = app();
    let cookie = login(&app, "reed@campify.edu").await;

    let (status, set_cookie, _) = send_raw(&app, Method::POST, "/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(set_cookie.unwrap().contains("Max-Age=0"));

    let (status, _) = send(&app, Method::GET, "/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_reports_every_invalid_field() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "name": "A", "email": "nope", "password": "short", "role": "Admin" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = &body["fields"];
    assert_eq!(fields["name"], "Name must be at least 2 characters.");
    assert_eq!(fields["email"], "Please enter a valid email.");
    assert_eq!(fields["password"], "Password must be at least 8 characters.");
    assert_eq!(fields["role"], "You must select a role.");
}

#[tokio::test]
async fn registration_rejects_a_taken_email() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "name": "Emily Again",
            "email": "emily@campify.edu",
            "password": "longenough",
            "role": "Student"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["email"], "An account with this email already exists.");
}

#[tokio::test]
async fn registered_parent_can_sign_in_to_an_empty_dashboard() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "name": "Sam Newcomer",
            "email": "sam@campify.edu",
            "password": "longenough",
            "role": "Parent"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "Parent");

    let cookie = login(&app, "sam@campify.edu").await;
    let (status, body) = send(&app, Method::GET, "/dashboard", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "Parent");
    assert!(body["parent"]["child"].is_null());
    assert_eq!(body["parent"]["courseAverages"], json!([]));
}

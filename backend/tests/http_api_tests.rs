//! End-to-end tests of the axum router over the in-memory repository.

#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Datelike, Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use estate_rust::auth::TokenService;
use estate_rust::db::{FullRepository, LocalRepository};
use estate_rust::http::{create_router, AppState};

const SECRET: &str = "integration-secret";

fn app() -> Router {
    let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
    let tokens = TokenService::new(SECRET, "estate-rust", Duration::hours(1)).unwrap();
    create_router(AppState::new(repo, tokens))
}

struct Reply {
    status: StatusCode,
    body: Value,
    set_cookie: Option<String>,
}

async fn call(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    Reply {
        status,
        body,
        set_cookie,
    }
}

/// Sign up and log in; returns `(user id, token)`.
async fn register(app: &Router, email: &str) -> (String, String) {
    let signup = call(
        app,
        "POST",
        "/users/signup",
        None,
        Some(json!({
            "firstName": "Ana",
            "lastName": "Hoxha",
            "email": email,
            "password": "secret-pass"
        })),
    )
    .await;
    assert_eq!(signup.status, StatusCode::CREATED);

    let login = call(
        app,
        "POST",
        "/users/login",
        None,
        Some(json!({ "email": email, "password": "secret-pass" })),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    (
        login.body["id"].as_str().unwrap().to_string(),
        login.body["token"].as_str().unwrap().to_string(),
    )
}

async fn create_listing(app: &Router, token: &str) -> String {
    let reply = call(
        app,
        "POST",
        "/listings",
        Some(token),
        Some(json!({
            "coordinates": [19.8187, 41.3275],
            "title": "Flat near the lake",
            "address": "Rruga e Elbasanit 12",
            "nrOfRooms": 3,
            "nrOfBeds": 2,
            "buildingType": "House",
            "amenities": ["Wi Fi", "Balcony"],
            "price": 50.0
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.body["id"].as_str().unwrap().to_string()
}

fn stay(start: &str, end: &str) -> Value {
    json!({ "startDate": start, "endDate": end })
}

#[tokio::test]
async fn test_health_reports_connected() {
    let app = app();
    let reply = call(&app, "GET", "/health", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["database"], "connected");
}

#[tokio::test]
async fn test_signup_login_and_me() {
    let app = app();
    let (id, token) = register(&app, "Ana@Example.com").await;

    let me = call(&app, "GET", "/users/me", Some(&token), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["id"], id.as_str());
    assert_eq!(me.body["email"], "ana@example.com");
    assert!(me.body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_sets_http_only_cookie() {
    let app = app();
    register(&app, "ana@example.com").await;
    let login = call(
        &app,
        "POST",
        "/users/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "secret-pass" })),
    )
    .await;
    let cookie = login.set_cookie.unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_login_failures() {
    let app = app();
    register(&app, "ana@example.com").await;

    let unknown = call(
        &app,
        "POST",
        "/users/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "secret-pass" })),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["message"], "User not found");

    let wrong = call(
        &app,
        "POST",
        "/users/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["message"], "Invalid credentials");
    assert_eq!(wrong.body["error"], true);
}

#[tokio::test]
async fn test_duplicate_signup_is_bad_request() {
    let app = app();
    register(&app, "ana@example.com").await;
    let again = call(
        &app,
        "POST",
        "/users/signup",
        None,
        Some(json!({
            "firstName": "Ana",
            "lastName": "Hoxha",
            "email": "ana@example.com",
            "password": "secret-pass"
        })),
    )
    .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validation_joins_every_message() {
    let app = app();
    let reply = call(
        &app,
        "POST",
        "/users/signup",
        None,
        Some(json!({ "email": "not-an-email", "password": "123" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let message = reply.body["message"].as_str().unwrap();
    assert_eq!(message.lines().count(), 4, "{}", message);
    assert!(message.contains("\"firstName\" is required"));
}

#[tokio::test]
async fn test_bad_tokens_are_rejected() {
    let app = app();
    let (_, token) = register(&app, "ana@example.com").await;

    let missing = call(&app, "GET", "/users/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let mut tampered = token.clone();
    tampered.push('x');
    let reply = call(&app, "GET", "/users/me", Some(&tampered), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let other = TokenService::new("another-secret", "estate-rust", Duration::hours(1)).unwrap();
    let user = estate_rust::models::User::new(
        estate_rust::models::UserId::generate(),
        "Eve".to_string(),
        "Doe".to_string(),
        "eve@example.com".to_string(),
        "hash".to_string(),
        estate_rust::models::Role::User,
    );
    let forged = other.issue(&user, Utc::now()).unwrap();
    let reply = call(&app, "GET", "/users/me", Some(&forged), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_token_authenticates() {
    let app = app();
    let (id, token) = register(&app, "ana@example.com").await;
    let request = Request::builder()
        .uri("/users/me")
        .header(header::COOKIE, format!("token={}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["id"], id.as_str());
}

#[tokio::test]
async fn test_invalid_id_is_bad_request() {
    let app = app();
    let reply = call(&app, "GET", "/users/not-a-uuid", None, None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "Invalid user ID");
}

#[tokio::test]
async fn test_reservation_flow() {
    let app = app();
    let (_, host) = register(&app, "host@example.com").await;
    let (_, guest) = register(&app, "guest@example.com").await;
    let (_, other) = register(&app, "other@example.com").await;
    let listing = create_listing(&app, &host).await;
    let uri = format!("/reservations/{}", listing);

    let own = call(&app, "POST", &uri, Some(&host), Some(stay("2030-06-10", "2030-06-12"))).await;
    assert_eq!(own.status, StatusCode::FORBIDDEN);
    assert_eq!(
        own.body["message"],
        "You are not authorized to make reservations for this listing."
    );

    let first = call(&app, "POST", &uri, Some(&guest), Some(stay("2030-06-10", "2030-06-12"))).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["totalPrice"], 100.0);

    let touching = call(&app, "POST", &uri, Some(&other), Some(stay("2030-06-12", "2030-06-14"))).await;
    assert_eq!(touching.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        touching.body["message"],
        "Reservation dates overlap with an existing reservation"
    );

    let disjoint = call(&app, "POST", &uri, Some(&other), Some(stay("2030-06-13", "2030-06-15"))).await;
    assert_eq!(disjoint.status, StatusCode::CREATED);

    let reversed = call(&app, "POST", &uri, Some(&other), Some(stay("2030-06-20", "2030-06-18"))).await;
    assert_eq!(reversed.status, StatusCode::BAD_REQUEST);
    assert_eq!(reversed.body["message"], "Bad Request");

    let listed = call(&app, "GET", &uri, Some(&guest), None).await;
    assert_eq!(listed.body["totalCount"], 2);
}

#[tokio::test]
async fn test_cancelled_reservation_no_longer_blocks() {
    let app = app();
    let (_, host) = register(&app, "host@example.com").await;
    let (_, guest) = register(&app, "guest@example.com").await;
    let listing = create_listing(&app, &host).await;
    let uri = format!("/reservations/{}", listing);

    let first = call(&app, "POST", &uri, Some(&guest), Some(stay("2030-06-10", "2030-06-12"))).await;
    let reservation = first.body["id"].as_str().unwrap().to_string();
    let cancel_uri = format!("/reservations/{}", reservation);

    let cancelled = call(&app, "DELETE", &cancel_uri, Some(&guest), None).await;
    assert_eq!(cancelled.status, StatusCode::OK);
    let again = call(&app, "DELETE", &cancel_uri, Some(&guest), None).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["message"], "Reservation already deleted");

    let rebooked = call(&app, "POST", &uri, Some(&guest), Some(stay("2030-06-11", "2030-06-12"))).await;
    assert_eq!(rebooked.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_free_dates_for_current_month() {
    let app = app();
    let (_, host) = register(&app, "host@example.com").await;
    let (_, guest) = register(&app, "guest@example.com").await;
    let listing = create_listing(&app, &host).await;

    let next_month = {
        let today = Utc::now().date_naive();
        let (y, m) = if today.month() == 12 {
            (today.year() + 1, 1)
        } else {
            (today.year(), today.month() + 1)
        };
        format!("{:04}-{:02}", y, m)
    };

    let reserve = call(
        &app,
        "POST",
        &format!("/reservations/{}", listing),
        Some(&guest),
        Some(stay(&format!("{}-10", next_month), &format!("{}-12", next_month))),
    )
    .await;
    assert_eq!(reserve.status, StatusCode::CREATED);

    let report = call(
        &app,
        "GET",
        &format!("/listings/availability/{}/free?month={}", listing, next_month),
        None,
        None,
    )
    .await;
    assert_eq!(report.status, StatusCode::OK);
    let booked = report.body["bookedDates"].as_array().unwrap();
    assert_eq!(booked.len(), 3);
    let free = report.body["freeDates"].as_array().unwrap();
    assert!(!free.contains(&json!(format!("{}-11", next_month))));
    assert!(free.contains(&json!(format!("{}-01", next_month))));
}

#[tokio::test]
async fn test_availability_window_and_search() {
    let app = app();
    let (_, host) = register(&app, "host@example.com").await;
    let (_, guest) = register(&app, "guest@example.com").await;
    let listing = create_listing(&app, &host).await;
    let uri = format!("/listings/availability/{}", listing);

    let denied = call(&app, "POST", &uri, Some(&guest), Some(stay("2030-09-01", "2030-09-30"))).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let created = call(&app, "POST", &uri, Some(&host), Some(stay("2030-09-01", "2030-09-30"))).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(
        created.body["message"],
        "Availability for listing with title Flat near the lake set successfully."
    );

    let found = call(
        &app,
        "GET",
        "/listings/search?title=lake&startDate=2030-09-05&endDate=2030-09-10",
        None,
        None,
    )
    .await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body.as_array().unwrap().len(), 1);

    let outside = call(
        &app,
        "GET",
        "/listings/search?startDate=2030-10-05&endDate=2030-10-10",
        None,
        None,
    )
    .await;
    assert!(outside.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_delete_twice() {
    let app = app();
    let (_, host) = register(&app, "host@example.com").await;
    let listing = create_listing(&app, &host).await;
    let uri = format!("/listings/{}", listing);

    let first = call(&app, "DELETE", &uri, Some(&host), None).await;
    assert_eq!(first.status, StatusCode::OK);
    let second = call(&app, "DELETE", &uri, Some(&host), None).await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.body["message"], "Listing already deleted");

    let page = call(&app, "GET", "/listings", None, None).await;
    assert!(page.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reviews_round() {
    let app = app();
    let (_, host) = register(&app, "host@example.com").await;
    let (_, guest) = register(&app, "guest@example.com").await;
    let listing = create_listing(&app, &host).await;

    let short = call(
        &app,
        "POST",
        &format!("/reviews/{}", listing),
        Some(&guest),
        Some(json!({ "stars": 6, "comment": "short" })),
    )
    .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let created = call(
        &app,
        "POST",
        &format!("/reviews/{}", listing),
        Some(&guest),
        Some(json!({ "stars": 4, "comment": "Quiet and clean" })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let all = call(&app, "GET", "/reviews", None, None).await;
    assert_eq!(all.body.as_array().unwrap().len(), 1);
}

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde_json::{json, Value};
use tower::ServiceExt;

use scheduling_cell::handlers::SchedulingState;
use scheduling_cell::scheduling_routes;
use scheduling_cell::services::catalog::{today_local, FixtureSlotSource};
use scheduling_cell::services::store::InMemoryAppointmentStore;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser, TEST_JWT_SECRET};

fn app() -> (Router, Arc<InMemoryAppointmentStore>) {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let state = SchedulingState::new(
        TestConfig::default().to_arc(),
        store.clone(),
        Arc::new(FixtureSlotSource::standard_day()),
    );
    (scheduling_routes(state), store)
}

fn token() -> String {
    JwtTestUtils::create_test_token(&TestUser::default(), TEST_JWT_SECRET, Some(1))
}

fn next_weekday(weekday: Weekday) -> NaiveDate {
    let mut day = today_local().checked_add_days(Days::new(1)).unwrap();
    while day.weekday() != weekday {
        day = day.checked_add_days(Days::new(1)).unwrap();
    }
    day
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token()));

    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn booking_body(date: NaiveDate, time: &str) -> Value {
    json!({
        "draft": {
            "patient_name": "Jane Doe",
            "email": "jane@x.com",
            "phone": "555-0100",
            "service_name": "General Checkup",
            "provider": "Dr. Johnson"
        },
        "date": date,
        "time": time
    })
}

// ==============================================================================
// AUTH
// ==============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (app, _) = app();
    let request = Request::builder()
        .uri("/appointments")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let (app, _) = app();
    let expired = JwtTestUtils::create_expired_token(&TestUser::default(), TEST_JWT_SECRET);
    let request = Request::builder()
        .uri("/appointments")
        .header(header::AUTHORIZATION, format!("Bearer {}", expired))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ==============================================================================
// SLOTS
// ==============================================================================

#[tokio::test]
async fn test_slots_for_a_weekday() {
    let (app, _) = app();
    let monday = next_weekday(Weekday::Mon);

    let (status, body) = send(&app, Method::GET, &format!("/slots?date={}&provider=Dr.%20Johnson", monday), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disabled"], false);
    assert_eq!(body["slots"].as_array().unwrap().len(), 4);
    assert_eq!(body["slots"][0]["time"], "09:00");
    assert_eq!(body["available_count"], 4);
}

#[tokio::test]
async fn test_slots_for_a_weekend_are_empty() {
    let (app, _) = app();
    let saturday = next_weekday(Weekday::Sat);

    let (status, body) = send(&app, Method::GET, &format!("/slots?date={}", saturday), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disabled"], true);
    assert_eq!(body["slots"], json!([]));
}

#[tokio::test]
async fn test_date_status() {
    let (app, _) = app();
    let sunday = next_weekday(Weekday::Sun);

    let (_, body) = send(&app, Method::GET, &format!("/dates/{}", sunday), None).await;

    assert_eq!(body["disabled"], true);
}

// ==============================================================================
// BOOKINGS
// ==============================================================================

#[tokio::test]
async fn test_create_booking_end_to_end() {
    let (app, store) = app();
    let monday = next_weekday(Weekday::Mon);

    let (status, body) = send(&app, Method::POST, "/bookings", Some(booking_body(monday, "10:00"))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["record"]["patient_name"], "Jane Doe");
    assert_eq!(body["record"]["provider"], "Dr. Johnson");
    assert_eq!(body["notifications"][0]["title"], "Appointment booked successfully!");

    let stored = store.appointments().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].record.local_start().date_naive(), monday);
}

#[tokio::test]
async fn test_create_booking_with_invalid_draft() {
    let (app, store) = app();
    let body = json!({ "draft": { "patient_name": "Jane Doe", "email": "not-an-email" } });

    let (status, body) = send(&app, Method::POST, "/bookings", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "phone", "service_name", "provider"]);
    assert!(store.appointments().await.is_empty());
}

#[tokio::test]
async fn test_create_booking_for_booked_slot() {
    let (app, store) = app();
    let monday = next_weekday(Weekday::Mon);
    let mut body = booking_body(monday, "09:30");
    body["draft"]["provider"] = json!("Dr. Smith");

    let (status, _) = send(&app, Method::POST, "/bookings", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(store.appointments().await.is_empty());
}

#[tokio::test]
async fn test_create_booking_without_a_date() {
    let (app, _) = app();
    let mut body = booking_body(next_weekday(Weekday::Mon), "10:00");
    body.as_object_mut().unwrap().remove("date");

    let (status, body) = send(&app, Method::POST, "/bookings", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please select a date");
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

#[tokio::test]
async fn test_list_complete_and_delete() {
    let (app, _) = app();
    let monday = next_weekday(Weekday::Mon);
    send(&app, Method::POST, "/bookings", Some(booking_body(monday, "14:00"))).await;

    let (status, listed) = send(&app, Method::GET, "/appointments", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 1);
    let id = listed["appointments"][0]["appointment_id"].as_str().unwrap().to_string();

    let (status, completed) = send(
        &app,
        Method::POST,
        &format!("/appointments/{}/complete", id),
        Some(json!({ "follow_up_date": "2031-02-03" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        completed["notifications"][0]["title"],
        "Appointment completed and follow-up scheduled!"
    );

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/appointments/{}/complete", id),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &format!("/appointments/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = send(&app, Method::GET, "/appointments", None).await;
    assert_eq!(listed["total"], 0);
}

#[tokio::test]
async fn test_unknown_appointment_is_not_found() {
    let (app, _) = app();

    let (status, _) = send(&app, Method::DELETE, "/appointments/missing", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_by_date_range() {
    let (app, _) = app();
    let monday = next_weekday(Weekday::Mon);
    let tuesday = monday.checked_add_days(Days::new(1)).unwrap();
    send(&app, Method::POST, "/bookings", Some(booking_body(monday, "09:00"))).await;
    send(&app, Method::POST, "/bookings", Some(booking_body(tuesday, "16:30"))).await;

    let (_, listed) = send(
        &app,
        Method::GET,
        &format!("/appointments?start_date={}&end_date={}", tuesday, tuesday),
        None,
    )
    .await;

    assert_eq!(listed["total"], 1);
}

#[tokio::test]
async fn test_todays_appointments_endpoint() {
    let (app, _) = app();

    let (status, body) = send(&app, Method::GET, "/appointments/today", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], json!(today_local()));
    assert_eq!(body["total"], 0);
}

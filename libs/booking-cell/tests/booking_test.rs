use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::router::appointment_routes;
use shared_config::AppConfig;

fn test_config(supabase_url: &str) -> AppConfig {
    AppConfig {
        supabase_url: supabase_url.to_string(),
        supabase_anon_key: "test-anon-key".to_string(),
        supabase_service_role_key: "test-service-key".to_string(),
        sms_api_key: String::new(),
        whatsapp_api_key: String::new(),
        sms_sender_id: "CLINIC".to_string(),
        country_code: "91".to_string(),
    }
}

fn create_test_app(config: AppConfig) -> Router {
    appointment_routes(Arc::new(config))
}

fn all_days_open() -> Value {
    let hours = json!({"opens": "09:00:00", "closes": "17:00:00"});
    json!({
        "monday": hours, "tuesday": hours, "wednesday": hours,
        "thursday": hours, "friday": hours, "saturday": hours, "sunday": hours
    })
}

fn clinic_response(clinic_id: &Uuid) -> Value {
    json!({
        "id": clinic_id,
        "name": "Test Clinic",
        "working_hours": all_days_open(),
        "slot_duration_minutes": 15,
        "timezone": "Asia/Kolkata",
        "utc_offset_minutes": 0
    })
}

fn booked_appointment_response(clinic_id: &Uuid, date: &str, time: &str, token: i32) -> Value {
    let now = Utc::now().to_rfc3339();
    json!({
        "id": Uuid::new_v4(),
        "clinic_id": clinic_id,
        "patient_id": Uuid::new_v4(),
        "date": date,
        "time": time,
        "status": "scheduled",
        "token_number": token,
        "reminder_24h_sent": false,
        "reminder_1h_sent": false,
        "confirmation_sms_sent": false,
        "notes": null,
        "deleted_at": null,
        "created_at": now,
        "updated_at": now,
        "patient_phone": "919876543210"
    })
}

async fn mount_clinic(mock_server: &MockServer, clinic_id: &Uuid) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/clinics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([clinic_response(clinic_id)])))
        .mount(mock_server)
        .await;
}

async fn post_booking(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", "Bearer test-token")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[tokio::test]
async fn booking_a_valid_slot_returns_the_assigned_token() {
    let mock_server = MockServer::start().await;
    let clinic_id = Uuid::new_v4();
    let date = (Utc::now() + Duration::days(7)).date_naive().to_string();

    mount_clinic(&mock_server, &clinic_id).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/book_appointment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booked_appointment_response(
            &clinic_id, &date, "09:15:00", 7,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Confirmation flag update after the simulated send succeeds.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booked_appointment_response(&clinic_id, &date, "09:15:00", 7)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(test_config(&mock_server.uri()));
    let (status, body) = post_booking(
        app,
        json!({
            "clinic_id": clinic_id,
            "patient": {"name": "Asha Rao", "phone": "9876543210"},
            "date": date,
            "time": "09:15:00",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["token_number"], json!(7));
}

#[tokio::test]
async fn losing_the_commit_race_maps_to_conflict() {
    let mock_server = MockServer::start().await;
    let clinic_id = Uuid::new_v4();
    let date = (Utc::now() + Duration::days(7)).date_naive().to_string();

    mount_clinic(&mock_server, &clinic_id).await;

    // PostgREST surfaces the partial unique index rejection as HTTP 409.
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/book_appointment"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"appointments_slot_active_key\""
        })))
        .mount(&mock_server)
        .await;

    let app = create_test_app(test_config(&mock_server.uri()));
    let (status, _body) = post_booking(
        app,
        json!({
            "clinic_id": clinic_id,
            "patient": {"name": "Asha Rao", "phone": "9876543210"},
            "date": date,
            "time": "09:15:00",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn past_dates_are_rejected_before_the_rpc() {
    let mock_server = MockServer::start().await;
    let clinic_id = Uuid::new_v4();
    let yesterday = (Utc::now() - Duration::days(1)).date_naive().to_string();

    mount_clinic(&mock_server, &clinic_id).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/book_appointment"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(test_config(&mock_server.uri()));
    let (status, body) = post_booking(
        app,
        json!({
            "clinic_id": clinic_id,
            "patient": {"name": "Asha Rao", "phone": "9876543210"},
            "date": yesterday,
            "time": "09:15:00",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("past"));
}

#[tokio::test]
async fn off_grid_times_are_rejected() {
    let mock_server = MockServer::start().await;
    let clinic_id = Uuid::new_v4();
    let date = (Utc::now() + Duration::days(7)).date_naive().to_string();

    mount_clinic(&mock_server, &clinic_id).await;

    let app = create_test_app(test_config(&mock_server.uri()));
    // 09:10 is not on the 15-minute grid from 09:00.
    let (status, body) = post_booking(
        app,
        json!({
            "clinic_id": clinic_id,
            "patient": {"name": "Asha Rao", "phone": "9876543210"},
            "date": date,
            "time": "09:10:00",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not a valid slot"));
}

#[tokio::test]
async fn new_patient_with_invalid_phone_is_rejected() {
    let mock_server = MockServer::start().await;
    let clinic_id = Uuid::new_v4();
    let date = (Utc::now() + Duration::days(7)).date_naive().to_string();

    let app = create_test_app(test_config(&mock_server.uri()));
    let (status, body) = post_booking(
        app,
        json!({
            "clinic_id": clinic_id,
            "patient": {"name": "Asha Rao", "phone": "12345"},
            "date": date,
            "time": "09:15:00",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("phone"));
}

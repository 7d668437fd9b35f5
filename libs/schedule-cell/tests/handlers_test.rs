use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use schedule_cell::router::schedule_routes;
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
    schedule_routes(Arc::new(config))
}

fn clinic_response(clinic_id: &Uuid) -> Value {
    json!({
        "id": clinic_id,
        "name": "Test Clinic",
        "working_hours": {
            "monday": {"opens": "09:00:00", "closes": "10:00:00"},
            "tuesday": {"opens": "09:00:00", "closes": "10:00:00"},
            "wednesday": {"opens": "09:00:00", "closes": "10:00:00"},
            "thursday": {"opens": "09:00:00", "closes": "10:00:00"},
            "friday": {"opens": "09:00:00", "closes": "10:00:00"},
            "saturday": null,
            "sunday": null
        },
        "slot_duration_minutes": 15,
        "timezone": "Asia/Kolkata",
        "utc_offset_minutes": 330
    })
}

async fn get_availability(app: Router, clinic_id: Uuid, date: &str) -> (StatusCode, Value) {
    let uri = format!("/slots?clinic_id={}&date={}", clinic_id, date);
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header("Authorization", "Bearer test-token")
                .body(Body::empty())
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
async fn returns_open_day_slots_minus_booked_times() {
    let mock_server = MockServer::start().await;
    let clinic_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/clinics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([clinic_response(&clinic_id)])))
        .mount(&mock_server)
        .await;

    // One booked appointment at 09:15 on a Monday.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": Uuid::new_v4(), "time": "09:15:00"}
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(test_config(&mock_server.uri()));
    // 2025-01-06 is a Monday.
    let (status, body) = get_availability(app, clinic_id, "2025-01-06").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let availability = &body["availability"];
    assert_eq!(
        availability["all_slots"],
        json!(["09:00:00", "09:15:00", "09:30:00", "09:45:00"])
    );
    assert_eq!(
        availability["available_slots"],
        json!(["09:00:00", "09:30:00", "09:45:00"])
    );
}

#[tokio::test]
async fn closed_day_returns_no_slots() {
    let mock_server = MockServer::start().await;
    let clinic_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/clinics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([clinic_response(&clinic_id)])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(test_config(&mock_server.uri()));
    // 2025-01-05 is a Sunday, configured closed.
    let (status, body) = get_availability(app, clinic_id, "2025-01-05").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["availability"]["all_slots"], json!([]));
    assert_eq!(body["availability"]["available_slots"], json!([]));
}

#[tokio::test]
async fn editing_an_appointment_keeps_its_own_slot_available() {
    let mock_server = MockServer::start().await;
    let clinic_id = Uuid::new_v4();
    let own_appointment = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/clinics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([clinic_response(&clinic_id)])))
        .mount(&mock_server)
        .await;

    // The id=neq filter is part of the query string PostgREST receives, so
    // the store answers without the edited appointment's own row.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(test_config(&mock_server.uri()));
    let uri = format!(
        "/slots?clinic_id={}&date=2025-01-06&exclude_appointment_id={}",
        clinic_id, own_appointment
    );
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header("Authorization", "Bearer test-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let available = body["availability"]["available_slots"].as_array().unwrap();
    assert!(available.contains(&json!("09:15:00")));

    // Verify the exclusion filter actually reached the store.
    let requests = mock_server.received_requests().await.unwrap();
    let appointment_query = requests
        .iter()
        .find(|r| r.url.path() == "/rest/v1/appointments")
        .expect("appointments queried");
    let query = appointment_query.url.query().unwrap_or_default();
    assert!(query.contains(&format!("id=neq.{}", own_appointment)));
}

#[tokio::test]
async fn rejected_token_surfaces_as_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/clinics"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "JWT expired"})),
        )
        .mount(&mock_server)
        .await;

    let app = create_test_app(test_config(&mock_server.uri()));
    let (status, body) = get_availability(app, Uuid::new_v4(), "2025-01-06").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("JWT expired"));
}

#[tokio::test]
async fn unknown_clinic_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/clinics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(test_config(&mock_server.uri()));
    let (status, _body) = get_availability(app, Uuid::new_v4(), "2025-01-06").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

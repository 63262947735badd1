// HTTP surface tests against the in-memory store

use actix_web::{http::StatusCode, test, web, App};
use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use lume_discovery::core::{EngineSettings, FixedClock};
use lume_discovery::models::{Profile, User};
use lume_discovery::routes::{self, handle_json_payload_error, handle_query_payload_error, AppState, Claims};
use lume_discovery::services::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;

const SECRET: &str = "http-test-secret";

fn token(uid: i64) -> String {
    let exp = (Utc::now() + Duration::hours(1)).timestamp() as u64;
    encode(&Header::default(), &Claims { uid, exp }, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn bearer(uid: i64) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token(uid)))
}

async fn state(members: i64) -> (Arc<MemoryStore>, AppState) {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let store = Arc::new(MemoryStore::new());
    for user_id in 1..=members {
        store
            .insert_user(User {
                id: user_id,
                premium_expires_at: None,
                created_at: now,
                updated_at: now,
            })
            .await;
        store
            .insert_profile(Profile {
                id: 100 + user_id,
                user_id,
                name: format!("Member {}", user_id),
                photo: String::new(),
                age: 28,
                bio: String::new(),
                latitude: 0.0,
                longitude: 0.001 * user_id as f64,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    let app_state = AppState::new(
        store.clone(),
        Arc::new(FixedClock::new(now)),
        EngineSettings::default(),
        10,
        SECRET,
    );
    (store, app_state)
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
                .configure(routes::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health() {
    let (_store, state) = state(0).await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_discover_requires_token() {
    let (_store, state) = state(2).await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/api/v1/profiles").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_discover_returns_page_and_paginator() {
    let (_store, state) = state(4).await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/profiles?page=1&pageSize=2&latitude=0&longitude=0")
        .insert_header(bearer(1))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["id"], 102);
    assert_eq!(data[0]["distance"], "222m");
    assert_eq!(body["paginator"]["totalRecords"], 3);
    assert_eq!(body["paginator"]["totalPages"], 2);
    assert_eq!(body["paginator"]["nextPage"], 2);
    assert_eq!(body["paginator"]["labelPages"], "1-2 of 3");
    assert_eq!(body["paginator"]["pageSizes"], json!([2]));
    assert_eq!(body["paginator"]["defaultPageSize"], 2);
}

#[actix_web::test]
async fn test_discover_clamps_page_size() {
    let (_store, state) = state(3).await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/profiles?pageSize=5000")
        .insert_header(bearer(1))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_discover_rejects_negative_page() {
    let (_store, state) = state(3).await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/profiles?page=-1")
        .insert_header(bearer(1))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_swipe_then_quota() {
    let (store, state) = state(12).await;
    let app = app!(state);

    for target in 2..=11 {
        let req = test::TestRequest::post()
            .uri("/api/v1/swipes")
            .insert_header(bearer(1))
            .set_json(json!({ "profileId": 100 + target, "decision": "PASS" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/swipes")
        .insert_header(bearer(1))
        .set_json(json!({ "profileId": 112, "decision": "LIKE" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(store.swipes().await.len(), 10);
}

#[actix_web::test]
async fn test_swipe_rejects_unknown_decision() {
    let (_store, state) = state(2).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/swipes")
        .insert_header(bearer(1))
        .set_json(json!({ "profileId": 102, "decision": "SUPERLIKE" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_swipe_unknown_profile_is_404() {
    let (_store, state) = state(2).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/swipes")
        .insert_header(bearer(1))
        .set_json(json!({ "profileId": 999, "decision": "LIKE" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_malformed_json_is_400() {
    let (_store, state) = state(2).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/swipes")
        .insert_header(bearer(1))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_outage_is_503() {
    let (store, state) = state(2).await;
    let app = app!(state);
    store.set_unavailable(true);

    let req = test::TestRequest::get()
        .uri("/api/v1/profiles")
        .insert_header(bearer(1))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_premium_purchase_and_location_update() {
    let (_store, state) = state(1).await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/premium/purchase")
        .insert_header(bearer(1))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["premiumExpiresAt"].as_str().unwrap().starts_with("2024-07-01"));

    let req = test::TestRequest::put()
        .uri("/api/v1/profiles/location")
        .insert_header(bearer(1))
        .set_json(json!({ "latitude": 48.85, "longitude": 2.35 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri("/api/v1/profiles/location")
        .insert_header(bearer(1))
        .set_json(json!({ "latitude": 100.0, "longitude": 2.35 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_empty_coordinates_fall_back_to_unranked() {
    let (_store, state) = state(3).await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/profiles?latitude=&longitude=")
        .insert_header(bearer(1))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert!(data.iter().all(|c| c.get("distance").is_none()));
}

#[actix_web::test]
async fn test_malformed_coordinates_are_400() {
    let (_store, state) = state(3).await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/profiles?latitude=abc&longitude=1")
        .insert_header(bearer(1))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_query");
}

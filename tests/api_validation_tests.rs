// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

fn authed_request(
    state: &ralli_api::AppState,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let token = common::create_test_jwt("user-abc", &state.config.jwt_signing_key);
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_unknown_sport_filter_rejected() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(authed_request(
            &state,
            "GET",
            "/api/facilities?latitude=37.77&longitude=-122.41&sports=cricket",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_out_of_range_coordinate_rejected() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(authed_request(
            &state,
            "GET",
            "/api/facilities?latitude=137.77&longitude=-122.41",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_search_coordinates_rejected() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(authed_request(&state, "GET", "/api/facilities", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkin_with_bogus_latitude_rejected() {
    let (app, state) = common::create_test_app();

    let body = serde_json::json!({
        "facility_id": "f1",
        "sport": "tennis",
        "latitude": 999.0,
        "longitude": -122.41
    });

    let response = app
        .oneshot(authed_request(&state, "POST", "/api/checkins", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkin_with_empty_facility_rejected() {
    let (app, state) = common::create_test_app();

    let body = serde_json::json!({
        "facility_id": "",
        "sport": "tennis",
        "latitude": 37.77,
        "longitude": -122.41
    });

    let response = app
        .oneshot(authed_request(&state, "POST", "/api/checkins", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_with_invalid_datetime_rejected() {
    let (app, state) = common::create_test_app();

    let body = serde_json::json!({
        "facility_id": "f1",
        "sport": "basketball",
        "scheduled_for": "tomorrow-ish"
    });

    let response = app
        .oneshot(authed_request(&state, "POST", "/api/sessions", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_in_the_past_rejected() {
    let (app, state) = common::create_test_app();

    let body = serde_json::json!({
        "facility_id": "f1",
        "sport": "basketball",
        "scheduled_for": "2020-01-01T10:00:00Z"
    });

    let response = app
        .oneshot(authed_request(&state, "POST", "/api/sessions", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_with_oversized_player_limit_rejected() {
    let (app, state) = common::create_test_app();

    let body = serde_json::json!({
        "facility_id": "f1",
        "sport": "soccer",
        "scheduled_for": "2030-01-01T10:00:00Z",
        "max_players": 500
    });

    let response = app
        .oneshot(authed_request(&state, "POST", "/api/sessions", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_session_cursor_rejected() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(authed_request(
            &state,
            "GET",
            "/api/sessions?cursor=%21%21%21",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_capacity_report_with_long_notes_rejected() {
    let (app, state) = common::create_test_app();

    let body = serde_json::json!({
        "facility_id": "f1",
        "sport": "pickleball",
        "occupancy_level": "high",
        "notes": "x".repeat(501)
    });

    let response = app
        .oneshot(authed_request(&state, "POST", "/api/capacity", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_capacity_query_with_unknown_sport_rejected() {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(authed_request(
            &state,
            "GET",
            "/api/facilities/f1/capacity?sport=handball",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_with_invalid_email_rejected() {
    let (app, state) = common::create_test_app();

    let body = serde_json::json!({
        "email": "not-an-email"
    });

    let response = app
        .oneshot(authed_request(&state, "PUT", "/api/me", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

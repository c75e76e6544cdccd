// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use ralli_api::config::Config;
use ralli_api::db::FirestoreDb;
use ralli_api::routes::create_router;
use ralli_api::services::{CapacityService, FacilityFinder, PlacesClient};
use ralli_api::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();

    // Unroutable endpoint: any places call fails fast instead of
    // reaching the real API.
    let places = PlacesClient::with_base_url(
        config.google_places_api_key.clone(),
        "http://127.0.0.1:1".to_string(),
    );
    let facility_finder = FacilityFinder::new(places);
    let capacity = CapacityService::new(db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        facility_finder,
        capacity,
    });

    (create_router(state.clone()), state)
}

/// Create a JWT accepted by the auth middleware.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    ralli_api::middleware::auth::create_jwt(user_id, signing_key)
        .expect("Failed to create test JWT")
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::geo_utils::distance_meters;
use crate::middleware::auth::AuthUser;
use crate::models::capacity::CapacityReportRequest;
use crate::models::checkin::CheckInRequest;
use crate::models::session::{RsvpRequest, SessionRequest, SessionStatus};
use crate::models::{
    CapacityRecord, CheckIn, Facility, Session, SessionParticipant, Sport, User,
};
use crate::services::CapacityService;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Default and maximum search radius around the caller (meters).
const DEFAULT_SEARCH_RADIUS_M: f64 = 5_000.0;
const MAX_SEARCH_RADIUS_M: f64 = 50_000.0;

/// How close a user must be to a facility to check in (meters).
const CHECKIN_MAX_DISTANCE_M: f64 = 100.0;

/// Check-ins newer than this count as "currently playing".
const ACTIVE_CHECKIN_WINDOW_MINS: i64 = 120;

/// Capacity history defaults and bounds (hours).
const DEFAULT_HISTORY_HOURS: i64 = 24;
const MAX_HISTORY_HOURS: i64 = 168;

/// Session listing page size bounds.
const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 50;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).put(update_me))
        .route("/api/facilities", get(search_facilities))
        .route("/api/facilities/{id}", get(get_facility))
        .route("/api/facilities/{id}/checkins", get(get_facility_checkins))
        .route("/api/facilities/{id}/capacity", get(get_facility_capacity))
        .route("/api/checkins", post(create_check_in))
        .route("/api/capacity", post(report_capacity))
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/rsvp", post(rsvp_session))
        .route("/api/account", delete(delete_account))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub preferred_sports: Vec<Sport>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            preferred_sports: user.preferred_sports,
        }
    }
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(Json(profile.into()))
}

/// Profile update payload.
#[derive(Deserialize, Validate)]
pub struct ProfileRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    pub preferred_sports: Option<Vec<Sport>>,
}

/// Create or update the caller's profile.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<UserResponse>> {
    request.validate()?;

    let now = chrono::Utc::now().to_rfc3339();
    let existing = state.db.get_user(&user.user_id).await?;

    let profile = User {
        id: user.user_id.clone(),
        email: request.email,
        full_name: request.full_name,
        avatar_url: request.avatar_url,
        preferred_sports: request
            .preferred_sports
            .or(existing.as_ref().map(|u| u.preferred_sports.clone()))
            .unwrap_or_default(),
        created_at: existing.map(|u| u.created_at).unwrap_or_else(|| now.clone()),
        updated_at: now,
    };

    state.db.upsert_user(&profile).await?;

    Ok(Json(profile.into()))
}

// ─── Facility Search ─────────────────────────────────────────

#[derive(Deserialize)]
struct FacilitySearchQuery {
    latitude: f64,
    longitude: f64,
    /// Search radius in meters (default 5000)
    radius_m: Option<f64>,
    /// Comma-separated sport filter ("tennis,pickleball")
    sports: Option<String>,
}

/// One search result with its latest crowd report, if recent.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub struct FacilityResult {
    pub facility: Facility,
    pub capacity: Option<CapacityRecord>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub struct FacilitySearchResponse {
    pub facilities: Vec<FacilityResult>,
    pub count: u32,
}

/// Search for facilities near a coordinate.
async fn search_facilities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<FacilitySearchQuery>,
) -> Result<Json<FacilitySearchResponse>> {
    validate_coordinate(params.latitude, params.longitude)?;

    let radius = params
        .radius_m
        .unwrap_or(DEFAULT_SEARCH_RADIUS_M)
        .clamp(100.0, MAX_SEARCH_RADIUS_M);
    let sports = parse_sports(params.sports.as_deref())?;

    tracing::debug!(
        user_id = %user.user_id,
        latitude = params.latitude,
        longitude = params.longitude,
        radius,
        sports = ?sports,
        "Searching facilities"
    );

    let facilities = state
        .facility_finder
        .search_nearby(
            params.latitude,
            params.longitude,
            radius,
            sports.as_deref(),
        )
        .await?;

    // Overlay the latest crowd report on each result
    let facility_ids: Vec<String> = facilities.iter().map(|f| f.id.clone()).collect();
    let mut capacities = state.capacity.latest_for_facilities(&facility_ids).await?;

    let results: Vec<FacilityResult> = facilities
        .into_iter()
        .map(|facility| {
            let capacity = capacities.remove(&facility.id);
            FacilityResult { facility, capacity }
        })
        .collect();

    Ok(Json(FacilitySearchResponse {
        count: results.len() as u32,
        facilities: results,
    }))
}

/// Facility detail response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub struct FacilityDetailResponse {
    pub facility: Facility,
    pub capacity: Option<CapacityRecord>,
    /// Number of check-ins in the last two hours
    pub active_check_ins: u32,
}

/// Get one facility by place ID.
///
/// Prefers a live places lookup (fresh hours/rating); falls back to the
/// stored copy when the places API is unavailable.
async fn get_facility(
    State(state): State<Arc<AppState>>,
    Path(facility_id): Path<String>,
) -> Result<Json<FacilityDetailResponse>> {
    let facility = match state.facility_finder.get_facility(&facility_id).await {
        Ok(Some(facility)) => facility,
        Ok(None) => state
            .db
            .get_facility(&facility_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Facility {}", facility_id)))?,
        Err(e) => {
            tracing::warn!(facility_id = %facility_id, error = %e, "Places lookup failed, trying stored copy");
            state.db.get_facility(&facility_id).await?.ok_or(e)?
        }
    };

    let capacity = state.capacity.latest(&facility_id, None).await?;
    let since = chrono::Utc::now() - chrono::Duration::minutes(ACTIVE_CHECKIN_WINDOW_MINS);
    let active_check_ins = state.db.get_recent_check_ins(&facility_id, since).await?.len() as u32;

    Ok(Json(FacilityDetailResponse {
        facility,
        capacity,
        active_check_ins,
    }))
}

// ─── Check-ins ───────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub struct CheckInsResponse {
    pub check_ins: Vec<CheckIn>,
    pub count: u32,
    /// Check-in counts keyed by sport
    pub by_sport: HashMap<String, u32>,
}

/// Recent check-ins at a facility ("who's playing now").
async fn get_facility_checkins(
    State(state): State<Arc<AppState>>,
    Path(facility_id): Path<String>,
) -> Result<Json<CheckInsResponse>> {
    let since = chrono::Utc::now() - chrono::Duration::minutes(ACTIVE_CHECKIN_WINDOW_MINS);
    let check_ins = state.db.get_recent_check_ins(&facility_id, since).await?;

    let mut by_sport: HashMap<String, u32> = HashMap::new();
    for check_in in &check_ins {
        *by_sport.entry(check_in.sport.as_str().to_string()).or_insert(0) += 1;
    }

    Ok(Json(CheckInsResponse {
        count: check_ins.len() as u32,
        by_sport,
        check_ins,
    }))
}

/// Create a check-in at a facility.
async fn create_check_in(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<CheckIn>> {
    request.validate()?;

    let facility = resolve_facility(&state, &request.facility_id).await?;

    ensure_within_checkin_range(
        request.latitude,
        request.longitude,
        &facility,
    )?;
    ensure_sport_offered(&facility, request.sport)?;

    let check_in = CheckIn {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.user_id.clone(),
        facility_id: facility.id.clone(),
        sport: request.sport,
        latitude: request.latitude,
        longitude: request.longitude,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    state.db.add_check_in(&check_in).await?;

    tracing::info!(
        user_id = %user.user_id,
        facility_id = %facility.id,
        sport = %request.sport,
        "Check-in recorded"
    );

    Ok(Json(check_in))
}

// ─── Capacity ────────────────────────────────────────────────

/// Capacity report response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub struct CapacityStatusResponse {
    pub latest: Option<CapacityRecord>,
    /// Whether `latest` is fresh enough to display as current
    pub is_current: bool,
    pub history: Vec<CapacityRecord>,
}

#[derive(Deserialize)]
struct CapacityQuery {
    sport: Option<String>,
    /// History window in hours (default 24, max 168)
    hours: Option<i64>,
}

/// Latest crowd report and history for a facility.
async fn get_facility_capacity(
    State(state): State<Arc<AppState>>,
    Path(facility_id): Path<String>,
    Query(params): Query<CapacityQuery>,
) -> Result<Json<CapacityStatusResponse>> {
    let sport = params
        .sport
        .as_deref()
        .map(|raw| {
            raw.parse::<Sport>()
                .map_err(|e| AppError::BadRequest(e.to_string()))
        })
        .transpose()?;
    let hours = params
        .hours
        .unwrap_or(DEFAULT_HISTORY_HOURS)
        .clamp(1, MAX_HISTORY_HOURS);

    let latest = state.capacity.latest(&facility_id, sport).await?;
    let is_current = latest.as_ref().is_some_and(CapacityService::is_recent);
    let history = state.capacity.history(&facility_id, hours).await?;

    Ok(Json(CapacityStatusResponse {
        latest,
        is_current,
        history,
    }))
}

/// Report the current crowd level at a facility.
async fn report_capacity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CapacityReportRequest>,
) -> Result<Json<CapacityRecord>> {
    request.validate()?;

    // Make sure the facility is known before accepting reports for it
    let facility = resolve_facility(&state, &request.facility_id).await?;
    ensure_sport_offered(&facility, request.sport)?;

    let record = state.capacity.report(&user.user_id, &request).await?;
    Ok(Json(record))
}

// ─── Sessions ────────────────────────────────────────────────

#[derive(Deserialize)]
struct SessionsQuery {
    facility_id: Option<String>,
    sport: Option<String>,
    /// Cursor for forward pagination (opaque token).
    cursor: Option<String>,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub struct SessionsResponse {
    pub sessions: Vec<Session>,
    pub per_page: u32,
    pub next_cursor: Option<String>,
}

/// List upcoming sessions, soonest first.
async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionsQuery>,
) -> Result<Json<SessionsResponse>> {
    let sport = params
        .sport
        .as_deref()
        .map(|raw| {
            raw.parse::<Sport>()
                .map_err(|e| AppError::BadRequest(e.to_string()))
        })
        .transpose()?;
    let limit = params.per_page.clamp(1, MAX_PER_PAGE);
    let cursor = parse_cursor(params.cursor.as_deref())?;

    let from = match &cursor {
        Some(cursor) => cursor.scheduled_for,
        None => chrono::Utc::now(),
    };

    // Fetch one extra item to determine if another page is available.
    let fetch_limit = limit.saturating_add(1);
    let mut sessions = state
        .db
        .list_upcoming_sessions(params.facility_id.as_deref(), sport, from, fetch_limit)
        .await?;

    // Drop everything at or before the cursor position (the >= query
    // re-fetches sessions sharing the cursor's timestamp).
    if let Some(cursor) = &cursor {
        sessions.retain(|s| {
            (s.scheduled_for.as_str(), s.id.as_str())
                > (cursor.raw_scheduled_for.as_str(), cursor.session_id.as_str())
        });
    }

    let has_more = sessions.len() > limit as usize;
    if has_more {
        sessions.truncate(limit as usize);
    }

    let next_cursor = if has_more {
        sessions.last().map(|s| encode_cursor(&s.scheduled_for, &s.id))
    } else {
        None
    };

    Ok(Json(SessionsResponse {
        sessions,
        per_page: limit,
        next_cursor,
    }))
}

/// Create a session. The creator is automatically RSVPed "in".
async fn create_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<Session>> {
    request.validate()?;

    let scheduled_for = chrono::DateTime::parse_from_rfc3339(&request.scheduled_for)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|_| {
            AppError::BadRequest("Invalid 'scheduled_for': must be RFC3339 datetime".to_string())
        })?;

    if scheduled_for <= chrono::Utc::now() {
        return Err(AppError::BadRequest(
            "'scheduled_for' must be in the future".to_string(),
        ));
    }

    let facility = resolve_facility(&state, &request.facility_id).await?;
    ensure_sport_offered(&facility, request.sport)?;

    let profile = request.sport.profile();
    let now = chrono::Utc::now().to_rfc3339();
    let session = Session {
        id: uuid::Uuid::new_v4().to_string(),
        creator_id: user.user_id.clone(),
        facility_id: facility.id.clone(),
        sport: request.sport,
        title: request
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| profile.default_session_title.to_string()),
        description: request.description,
        scheduled_for: scheduled_for.to_rfc3339(),
        max_players: request.max_players.unwrap_or(profile.max_players),
        current_players: 0,
        status: SessionStatus::Upcoming,
        created_at: now.clone(),
        updated_at: now.clone(),
    };

    state.db.set_session(&session).await?;

    // Creator joins their own session
    let session = state
        .db
        .rsvp_atomic(
            &session.id,
            &user.user_id,
            crate::models::ParticipantStatus::In,
            &now,
        )
        .await?;

    tracing::info!(
        session_id = %session.id,
        facility_id = %session.facility_id,
        sport = %session.sport,
        "Session created"
    );

    Ok(Json(session))
}

/// Session detail response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub struct SessionDetailResponse {
    pub session: Session,
    pub participants: Vec<SessionParticipant>,
}

/// Get a session with its participants.
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDetailResponse>> {
    let session = state
        .db
        .get_session(&session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {}", session_id)))?;

    let participants = state.db.list_participants(&session_id).await?;

    Ok(Json(SessionDetailResponse {
        session,
        participants,
    }))
}

/// RSVP to a session (in / out / maybe).
async fn rsvp_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<String>,
    Json(request): Json<RsvpRequest>,
) -> Result<Json<Session>> {
    let now = chrono::Utc::now().to_rfc3339();
    let session = state
        .db
        .rsvp_atomic(&session_id, &user.user_id, request.status, &now)
        .await?;

    Ok(Json(session))
}

// ─── Account Deletion ────────────────────────────────────────

/// Response for account deletion.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub deleted_documents: u32,
}

/// Delete the caller's account and all associated data.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DeleteAccountResponse>> {
    tracing::info!(user_id = %user.user_id, "User-initiated account deletion");

    let deleted = state.db.delete_user_data(&user.user_id).await?;

    Ok(Json(DeleteAccountResponse {
        success: true,
        deleted_documents: deleted as u32,
    }))
}

// ─── Helpers ─────────────────────────────────────────────────

/// Load a facility from storage, discovering and storing it on first
/// reference.
async fn resolve_facility(state: &AppState, facility_id: &str) -> Result<Facility> {
    if let Some(facility) = state.db.get_facility(facility_id).await? {
        return Ok(facility);
    }

    let facility = state
        .facility_finder
        .get_facility(facility_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Facility {}", facility_id)))?;

    state.db.upsert_facility(&facility).await?;
    tracing::info!(facility_id = %facility.id, name = %facility.name, "Facility stored");

    Ok(facility)
}

fn validate_coordinate(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::BadRequest(
            "Invalid coordinate: latitude must be in [-90, 90], longitude in [-180, 180]"
                .to_string(),
        ));
    }
    Ok(())
}

/// Parse a comma-separated sport filter ("tennis,pickleball").
fn parse_sports(raw: Option<&str>) -> Result<Option<Vec<Sport>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let sports = raw
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.parse::<Sport>()
                .map_err(|e| AppError::BadRequest(e.to_string()))
        })
        .collect::<Result<Vec<Sport>>>()?;

    Ok(if sports.is_empty() { None } else { Some(sports) })
}

/// Reject a check-in further than [`CHECKIN_MAX_DISTANCE_M`] from the
/// facility.
fn ensure_within_checkin_range(
    user_lat: f64,
    user_lng: f64,
    facility: &Facility,
) -> Result<f64> {
    let distance = distance_meters(user_lat, user_lng, facility.latitude, facility.longitude);
    if distance > CHECKIN_MAX_DISTANCE_M {
        return Err(AppError::BadRequest(format!(
            "Too far from {} to check in ({:.0} m away, limit {:.0} m)",
            facility.name, distance, CHECKIN_MAX_DISTANCE_M
        )));
    }
    Ok(distance)
}

fn ensure_sport_offered(facility: &Facility, sport: Sport) -> Result<()> {
    if !facility.offers(sport) {
        return Err(AppError::BadRequest(format!(
            "{} does not offer {}",
            facility.name, sport
        )));
    }
    Ok(())
}

/// Cursor into the upcoming-sessions listing.
#[derive(Debug)]
struct SessionCursor {
    scheduled_for: chrono::DateTime<chrono::Utc>,
    raw_scheduled_for: String,
    session_id: String,
}

fn parse_cursor(cursor: Option<&str>) -> Result<Option<SessionCursor>> {
    cursor
        .map(|raw| {
            let invalid_cursor =
                || AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = String::from_utf8(decoded).map_err(|_| invalid_cursor())?;

            let (scheduled_for, session_id) =
                decoded_str.split_once('|').ok_or_else(invalid_cursor)?;

            let parsed = chrono::DateTime::parse_from_rfc3339(scheduled_for)
                .map_err(|_| invalid_cursor())?
                .with_timezone(&chrono::Utc);

            Ok(SessionCursor {
                scheduled_for: parsed,
                raw_scheduled_for: scheduled_for.to_string(),
                session_id: session_id.to_string(),
            })
        })
        .transpose()
}

fn encode_cursor(scheduled_for: &str, session_id: &str) -> String {
    URL_SAFE_NO_PAD.encode(format!("{}|{}", scheduled_for, session_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_round_trip() {
        let scheduled_for = "2026-08-07T18:30:00+00:00";
        let encoded = encode_cursor(scheduled_for, "session-42");
        let decoded = parse_cursor(Some(&encoded)).unwrap().unwrap();

        assert_eq!(decoded.raw_scheduled_for, scheduled_for);
        assert_eq!(decoded.session_id, "session-42");
        assert_eq!(
            decoded.scheduled_for,
            chrono::DateTime::parse_from_rfc3339(scheduled_for).unwrap()
        );
    }

    #[test]
    fn test_cursor_rejects_invalid_input() {
        let err = parse_cursor(Some("not-base64!")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let missing_separator = URL_SAFE_NO_PAD.encode("no-separator-here");
        let err = parse_cursor(Some(&missing_separator)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_parse_sports_list() {
        let sports = parse_sports(Some("tennis, pickleball")).unwrap().unwrap();
        assert_eq!(sports, vec![Sport::Tennis, Sport::Pickleball]);
    }

    #[test]
    fn test_parse_sports_empty_is_none() {
        assert!(parse_sports(None).unwrap().is_none());
        assert!(parse_sports(Some("")).unwrap().is_none());
        assert!(parse_sports(Some(" , ")).unwrap().is_none());
    }

    #[test]
    fn test_parse_sports_rejects_unknown() {
        assert!(parse_sports(Some("tennis,cricket")).is_err());
    }

    fn test_facility() -> Facility {
        Facility {
            id: "f1".to_string(),
            name: "Mission Courts".to_string(),
            description: "Real tennis facility".to_string(),
            latitude: 37.7596,
            longitude: -122.4269,
            sports: vec![Sport::Tennis],
            address: "19th & Dolores".to_string(),
            amenities: vec!["Outdoor space".to_string()],
            created_at: chrono::Utc::now().to_rfc3339(),
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_checkin_range_accepts_nearby_user() {
        let facility = test_facility();
        // ~30 m east of the facility
        let distance =
            ensure_within_checkin_range(37.7596, -122.42656, &facility).unwrap();
        assert!(distance < CHECKIN_MAX_DISTANCE_M);
    }

    #[test]
    fn test_checkin_range_rejects_distant_user() {
        let facility = test_facility();
        // ~1.5 km away
        let err = ensure_within_checkin_range(37.7730, -122.4269, &facility).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_sport_offered_check() {
        let facility = test_facility();
        assert!(ensure_sport_offered(&facility, Sport::Tennis).is_ok());
        assert!(ensure_sport_offered(&facility, Sport::Soccer).is_err());
    }
}

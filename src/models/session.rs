// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scheduled play sessions and RSVP records.

use crate::models::Sport;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub enum SessionStatus {
    Upcoming,
    Active,
    Completed,
    Cancelled,
}

/// A scheduled play session at a facility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub struct Session {
    /// Session ID (UUID, also document ID)
    pub id: String,
    /// User who created the session
    pub creator_id: String,
    /// Facility where the session takes place
    pub facility_id: String,
    /// Sport being played
    pub sport: Sport,
    /// Session title ("Open Run", "Looking for Partner", ...)
    pub title: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Scheduled start time (ISO 8601)
    pub scheduled_for: String,
    /// Maximum number of players
    pub max_players: u32,
    /// Number of participants currently "in" (kept in sync by RSVP writes)
    pub current_players: u32,
    pub status: SessionStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// RSVP state of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub enum ParticipantStatus {
    In,
    Out,
    Maybe,
}

/// A user's RSVP to a session.
///
/// Document ID: `{session_id}_{user_id}` so each user has at most one
/// RSVP per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub struct SessionParticipant {
    pub session_id: String,
    pub user_id: String,
    pub status: ParticipantStatus,
    /// When the RSVP was first recorded (ISO 8601)
    pub joined_at: String,
}

/// Payload for creating a session.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SessionRequest {
    #[validate(length(min = 1, message = "facility_id must not be empty"))]
    pub facility_id: String,
    pub sport: Sport,
    /// Defaults to the sport's stock title when omitted.
    #[validate(length(max = 100))]
    pub title: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Scheduled start time (RFC 3339)
    pub scheduled_for: String,
    /// Defaults to the sport's player limit when omitted.
    #[validate(range(min = 2, max = 64))]
    pub max_players: Option<u32>,
}

/// Payload for RSVPing to a session.
#[derive(Debug, Clone, Deserialize)]
pub struct RsvpRequest {
    pub status: ParticipantStatus,
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Check-in model and request payload.

use crate::models::Sport;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// A user's check-in at a facility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub struct CheckIn {
    /// Check-in ID (UUID, also document ID)
    pub id: String,
    /// User who checked in
    pub user_id: String,
    /// Facility checked into
    pub facility_id: String,
    /// Sport being played
    pub sport: Sport,
    /// Reported latitude at check-in time
    pub latitude: f64,
    /// Reported longitude at check-in time
    pub longitude: f64,
    /// When the check-in happened (ISO 8601)
    pub created_at: String,
}

/// Payload for creating a check-in.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckInRequest {
    #[validate(length(min = 1, message = "facility_id must not be empty"))]
    pub facility_id: String,
    pub sport: Sport,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

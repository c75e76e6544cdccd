// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Canonical facility record produced by the classifier.

use crate::models::Sport;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A normalized sports facility, independent of the places-API schema.
///
/// Produced by the classifier from a raw place record and stored in
/// Firestore the first time a user checks in or schedules a session
/// there. `sports` and `amenities` are never empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub struct Facility {
    /// Place ID assigned by the external lookup service (also document ID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Generated description ("Real tennis facility • 4.5★ • Open now")
    pub description: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Inferred sports, order-preserving and duplicate-free
    pub sports: Vec<Sport>,
    /// Formatted street address
    pub address: String,
    /// Human-readable amenity labels
    pub amenities: Vec<String>,
    /// When this record was classified (ISO 8601)
    pub created_at: String,
    /// Last classification time (ISO 8601)
    pub updated_at: String,
}

impl Facility {
    /// Whether this facility offers the given sport.
    pub fn offers(&self, sport: Sport) -> bool {
        self.sports.contains(&sport)
    }
}

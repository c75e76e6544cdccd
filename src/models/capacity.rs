// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Crowd-level (capacity) reports for facilities.

use crate::models::Sport;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// How busy a facility is, as reported by a player on site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub enum OccupancyLevel {
    Low,
    Medium,
    High,
    Full,
}

impl OccupancyLevel {
    /// Nominal occupancy percentage for this level.
    pub fn percentage(&self) -> u8 {
        match self {
            OccupancyLevel::Low => 25,
            OccupancyLevel::Medium => 50,
            OccupancyLevel::High => 75,
            OccupancyLevel::Full => 100,
        }
    }

    /// Short display label.
    pub fn label(&self) -> &'static str {
        match self {
            OccupancyLevel::Low => "Low activity",
            OccupancyLevel::Medium => "Moderate activity",
            OccupancyLevel::High => "High activity",
            OccupancyLevel::Full => "Very busy",
        }
    }
}

/// A stored capacity report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub struct CapacityRecord {
    /// Report ID (UUID, also document ID)
    pub id: String,
    pub facility_id: String,
    /// Sport the reporter was there to play
    pub sport: Sport,
    pub occupancy_level: OccupancyLevel,
    /// Nominal percentage derived from the level
    pub occupancy_percentage: u8,
    /// Optional free-text note ("league night, both courts taken")
    pub notes: Option<String>,
    /// Reporting user
    pub user_id: String,
    /// When the report was made (ISO 8601)
    pub reported_at: String,
}

/// Payload for reporting capacity.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CapacityReportRequest {
    #[validate(length(min = 1, message = "facility_id must not be empty"))]
    pub facility_id: String,
    pub sport: Sport,
    pub occupancy_level: OccupancyLevel,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Crowd-level reporting service.
//!
//! Players on site report how busy a facility is; the app shows the
//! most recent report next to each facility. Reports age out quickly:
//! a report older than two hours is no longer considered current.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::capacity::CapacityReportRequest;
use crate::models::{CapacityRecord, Sport};
use chrono::{DateTime, Duration, Utc};
use futures_util::{stream, StreamExt};
use std::collections::HashMap;

/// How long a report counts as current.
const RECENT_REPORT_WINDOW_MINS: i64 = 120;

/// Lookback window for the multi-facility map overlay.
const MULTI_FACILITY_LOOKBACK_HOURS: i64 = 6;

/// Concurrent Firestore lookups when resolving many facilities.
const MAX_CONCURRENT_LOOKUPS: usize = 10;

/// Service for reporting and querying facility crowd levels.
#[derive(Clone)]
pub struct CapacityService {
    db: FirestoreDb,
}

impl CapacityService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Store a new capacity report from a user.
    pub async fn report(
        &self,
        user_id: &str,
        request: &CapacityReportRequest,
    ) -> Result<CapacityRecord, AppError> {
        let record = CapacityRecord {
            id: uuid::Uuid::new_v4().to_string(),
            facility_id: request.facility_id.clone(),
            sport: request.sport,
            occupancy_level: request.occupancy_level,
            occupancy_percentage: request.occupancy_level.percentage(),
            notes: request.notes.clone(),
            user_id: user_id.to_string(),
            reported_at: Utc::now().to_rfc3339(),
        };

        self.db.add_capacity_report(&record).await?;

        tracing::info!(
            facility_id = %record.facility_id,
            level = ?record.occupancy_level,
            "Capacity reported"
        );

        Ok(record)
    }

    /// Most recent report for a facility, optionally narrowed to one
    /// sport.
    pub async fn latest(
        &self,
        facility_id: &str,
        sport: Option<Sport>,
    ) -> Result<Option<CapacityRecord>, AppError> {
        self.db.latest_capacity(facility_id, sport).await
    }

    /// Most recent report within the lookback window for each of the
    /// given facilities (for the map overlay). Facilities with no recent
    /// report are absent from the result.
    pub async fn latest_for_facilities(
        &self,
        facility_ids: &[String],
    ) -> Result<HashMap<String, CapacityRecord>, AppError> {
        if facility_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let since = Utc::now() - Duration::hours(MULTI_FACILITY_LOOKBACK_HOURS);

        let results: Vec<Result<Option<CapacityRecord>, AppError>> =
            stream::iter(facility_ids.to_vec())
                .map(|facility_id| {
                    let db = self.db.clone();
                    async move { db.latest_capacity(&facility_id, None).await }
                })
                .buffer_unordered(MAX_CONCURRENT_LOOKUPS)
                .collect()
                .await;

        let mut latest = HashMap::new();
        for result in results {
            if let Some(record) = result? {
                if parse_reported_at(&record)? >= since {
                    latest.insert(record.facility_id.clone(), record);
                }
            }
        }

        Ok(latest)
    }

    /// Report history for a facility over the given number of hours,
    /// oldest first.
    pub async fn history(
        &self,
        facility_id: &str,
        hours: i64,
    ) -> Result<Vec<CapacityRecord>, AppError> {
        let since = Utc::now() - Duration::hours(hours);
        self.db.capacity_history(facility_id, since).await
    }

    /// Whether a report is recent enough to display as current.
    pub fn is_recent(record: &CapacityRecord) -> bool {
        DateTime::parse_from_rfc3339(&record.reported_at)
            .map(|reported| {
                Utc::now() - reported.with_timezone(&Utc)
                    < Duration::minutes(RECENT_REPORT_WINDOW_MINS)
            })
            .unwrap_or(false)
    }
}

fn parse_reported_at(record: &CapacityRecord) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(&record.reported_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Invalid reported_at on capacity record {}: {}",
                record.id,
                e
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OccupancyLevel;

    fn record(reported_at: String) -> CapacityRecord {
        CapacityRecord {
            id: "r1".to_string(),
            facility_id: "f1".to_string(),
            sport: Sport::Basketball,
            occupancy_level: OccupancyLevel::Medium,
            occupancy_percentage: OccupancyLevel::Medium.percentage(),
            notes: None,
            user_id: "u1".to_string(),
            reported_at,
        }
    }

    #[test]
    fn test_fresh_report_is_recent() {
        let r = record(Utc::now().to_rfc3339());
        assert!(CapacityService::is_recent(&r));
    }

    #[test]
    fn test_stale_report_is_not_recent() {
        let r = record((Utc::now() - Duration::hours(3)).to_rfc3339());
        assert!(!CapacityService::is_recent(&r));
    }

    #[test]
    fn test_unparseable_timestamp_is_not_recent() {
        let r = record("not-a-date".to_string());
        assert!(!CapacityService::is_recent(&r));
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Facility discovery service.
//!
//! Handles the search workflow:
//! 1. Build search keywords from the caller's sport filter
//! 2. Fan out a bounded number of keyword searches against the places API
//! 3. Dedupe candidates and drop closed businesses
//! 4. Classify each candidate into a canonical facility record
//!
//! A short-lived snapshot of each query's results is kept in memory so a
//! screen visit (map load plus a couple of filter toggles) does not
//! repeat identical paid searches.

use crate::error::AppError;
use crate::models::{Facility, Sport};
use crate::services::classifier;
use crate::services::places::PlacesClient;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Keyword searches per query; bounded to stay inside API quotas.
const MAX_KEYWORD_SEARCHES: usize = 3;

/// Pause between consecutive keyword searches.
const SEARCH_PACING_MS: u64 = 100;

/// How long a search snapshot stays valid.
const SNAPSHOT_TTL_SECS: i64 = 60;

/// Cached result set for one search query.
#[derive(Clone)]
struct SearchSnapshot {
    facilities: Vec<Facility>,
    fetched_at: DateTime<Utc>,
}

/// Service that discovers and classifies nearby facilities.
#[derive(Clone)]
pub struct FacilityFinder {
    places: PlacesClient,
    snapshots: Arc<DashMap<String, SearchSnapshot>>,
}

impl FacilityFinder {
    pub fn new(places: PlacesClient) -> Self {
        Self {
            places,
            snapshots: Arc::new(DashMap::new()),
        }
    }

    /// Search for facilities near a coordinate, optionally filtered by
    /// sport.
    ///
    /// Fans out up to [`MAX_KEYWORD_SEARCHES`] keyword searches, then
    /// runs the classification pipeline over the accumulated candidates.
    /// Malformed candidate records are skipped, not fatal.
    pub async fn search_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        sports: Option<&[Sport]>,
    ) -> Result<Vec<Facility>, AppError> {
        let key = snapshot_key(latitude, longitude, radius_meters, sports);
        let now = Utc::now();

        if let Some(snapshot) = self.snapshots.get(&key) {
            if now - snapshot.fetched_at < Duration::seconds(SNAPSHOT_TTL_SECS) {
                tracing::debug!(key = %key, "Returning cached search snapshot");
                return Ok(snapshot.facilities.clone());
            }
        }
        self.snapshots
            .retain(|_, snapshot| now - snapshot.fetched_at < Duration::seconds(SNAPSHOT_TTL_SECS));

        let keywords = classifier::build_search_keywords(sports);

        let mut raw = Vec::new();
        let mut last_error = None;
        for (i, keyword) in keywords.iter().take(MAX_KEYWORD_SEARCHES).enumerate() {
            if i > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(SEARCH_PACING_MS)).await;
            }

            match self
                .places
                .search_text(latitude, longitude, radius_meters, keyword)
                .await
            {
                Ok(places) => raw.extend(places),
                Err(e) => {
                    tracing::warn!(keyword, error = %e, "Keyword search failed");
                    last_error = Some(e);
                }
            }
        }

        // Only fail the whole search if every keyword search failed.
        if raw.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        let candidates = classifier::dedupe_open_places(raw);

        let mut facilities = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            let sports = classifier::detect_sports(candidate);
            match classifier::to_facility(candidate, &sports) {
                Ok(facility) => facilities.push(facility),
                Err(e) => {
                    tracing::warn!(
                        place_id = %candidate.id,
                        error = %e,
                        "Skipping malformed place record"
                    );
                }
            }
        }

        tracing::info!(
            count = facilities.len(),
            latitude,
            longitude,
            "Facility search complete"
        );

        self.snapshots.insert(
            key,
            SearchSnapshot {
                facilities: facilities.clone(),
                fetched_at: now,
            },
        );

        Ok(facilities)
    }

    /// Look up and classify a single facility by place ID.
    pub async fn get_facility(&self, place_id: &str) -> Result<Option<Facility>, AppError> {
        let Some(place) = self.places.place_details(place_id).await? else {
            return Ok(None);
        };

        let sports = classifier::detect_sports(&place);
        let facility = classifier::to_facility(&place, &sports)
            .map_err(|e| AppError::PlacesApi(format!("Malformed place record: {}", e)))?;

        Ok(Some(facility))
    }

}

/// Cache key for one search query. Coordinates are rounded to ~100 m so
/// GPS jitter between refreshes hits the same snapshot.
fn snapshot_key(
    latitude: f64,
    longitude: f64,
    radius_meters: f64,
    sports: Option<&[Sport]>,
) -> String {
    let sports_key = match sports {
        Some(sports) if !sports.is_empty() => sports
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join("+"),
        _ => "any".to_string(),
    };
    format!(
        "{:.3}:{:.3}:{:.0}:{}",
        latitude, longitude, radius_meters, sports_key
    )
}

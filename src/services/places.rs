// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Places API (v1) client for facility lookup.
//!
//! Handles:
//! - Text search biased around a coordinate (`places:searchText`)
//! - Single-place detail lookup
//! - Photo media URL construction
//! - Rate limit and auth error detection

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Fields requested from search responses. Keeping the mask tight keeps
/// the per-request billing SKU down.
const SEARCH_FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,places.location,places.types,places.rating,places.currentOpeningHours,places.photos,places.businessStatus";

/// Fields requested from detail lookups.
const DETAILS_FIELD_MASK: &str = "id,displayName,formattedAddress,location,types,rating,currentOpeningHours,photos,businessStatus";

/// Results requested per keyword search.
const MAX_RESULT_COUNT: u32 = 10;

/// Places API client.
#[derive(Clone)]
pub struct PlacesClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PlacesClient {
    /// Create a new Places client.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://places.googleapis.com/v1".to_string())
    }

    /// Create a client against a custom endpoint (used by tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Search for places matching a keyword, biased around a coordinate.
    ///
    /// Results are ranked by distance from the bias center. An empty
    /// result set is not an error.
    pub async fn search_text(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        keyword: &str,
    ) -> Result<Vec<Place>, AppError> {
        let url = format!("{}/places:searchText", self.base_url);

        let body = serde_json::json!({
            "textQuery": format!("{} near me", keyword),
            "maxResultCount": MAX_RESULT_COUNT,
            "locationBias": {
                "circle": {
                    "center": {
                        "latitude": latitude,
                        "longitude": longitude
                    },
                    "radius": radius_meters
                }
            },
            "rankPreference": "DISTANCE"
        });

        let response = self
            .http
            .post(&url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", SEARCH_FIELD_MASK)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::PlacesApi(e.to_string()))?;

        let search: SearchTextResponse = self.check_response_json(response).await?;
        Ok(search.places.unwrap_or_default())
    }

    /// Look up a single place by ID. Returns `None` if the place no
    /// longer exists.
    pub async fn place_details(&self, place_id: &str) -> Result<Option<Place>, AppError> {
        let url = format!("{}/places/{}", self.base_url, place_id);

        let response = self
            .http
            .get(&url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", DETAILS_FIELD_MASK)
            .send()
            .await
            .map_err(|e| AppError::PlacesApi(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }

        let place: Place = self.check_response_json(response).await?;
        Ok(Some(place))
    }

    /// Build a media URL for a photo reference
    /// (e.g. "places/{place_id}/photos/{photo_id}").
    pub fn photo_url(&self, photo_name: &str, max_width_px: u32) -> String {
        format!(
            "{}/{}/media?maxWidthPx={}&key={}",
            self.base_url,
            photo_name,
            max_width_px,
            urlencoding::encode(&self.api_key)
        )
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // Rate limit - surfaced so callers can back off
            if status.as_u16() == 429 {
                tracing::warn!("Places API rate limit hit (429)");
                return Err(AppError::PlacesApi("rate limited (429)".to_string()));
            }

            // Key missing or not authorized for the Places API
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(AppError::PlacesApi(format!(
                    "API key rejected (HTTP {})",
                    status.as_u16()
                )));
            }

            return Err(AppError::PlacesApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::PlacesApi(format!("JSON parse error: {}", e)))
    }
}

/// Response envelope for `places:searchText`.
#[derive(Debug, Clone, Deserialize)]
struct SearchTextResponse {
    places: Option<Vec<Place>>,
}

/// Raw place record from the Places API. Read-only input to the
/// classifier; never mutated after deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    #[serde(default)]
    pub display_name: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_opening_hours: Option<OpeningHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<Photo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_status: Option<BusinessStatus>,
}

impl Place {
    /// Whether the business is flagged as permanently or temporarily
    /// closed. An absent or unrecognized status counts as open.
    pub fn is_closed(&self) -> bool {
        matches!(
            self.business_status,
            Some(BusinessStatus::ClosedPermanently) | Some(BusinessStatus::ClosedTemporarily)
        )
    }

    /// Whether the record carries at least one photo reference.
    pub fn has_photos(&self) -> bool {
        self.photos.as_ref().is_some_and(|photos| !photos.is_empty())
    }
}

/// Localized display name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// Current opening hours; only the open-now flag is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
}

/// Photo reference with pixel dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_px: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_px: Option<u32>,
}

/// Operating status reported by the Places API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessStatus {
    Operational,
    ClosedTemporarily,
    ClosedPermanently,
    #[serde(other)]
    BusinessStatusUnspecified,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_deserializes_from_api_shape() {
        let json = serde_json::json!({
            "id": "ChIJabc123",
            "displayName": { "text": "Mission Courts", "languageCode": "en" },
            "formattedAddress": "19th St & Dolores St, San Francisco, CA",
            "location": { "latitude": 37.7596, "longitude": -122.4269 },
            "types": ["park", "establishment"],
            "rating": 4.6,
            "currentOpeningHours": { "openNow": true },
            "photos": [{ "name": "places/ChIJabc123/photos/p1", "widthPx": 400, "heightPx": 300 }],
            "businessStatus": "OPERATIONAL"
        });

        let place: Place = serde_json::from_value(json).unwrap();
        assert_eq!(place.id, "ChIJabc123");
        assert_eq!(place.display_name.text, "Mission Courts");
        assert_eq!(place.types, vec!["park", "establishment"]);
        assert_eq!(place.rating, Some(4.6));
        assert!(place.has_photos());
        assert!(!place.is_closed());
    }

    #[test]
    fn test_place_tolerates_sparse_records() {
        let place: Place = serde_json::from_value(serde_json::json!({ "id": "x" })).unwrap();
        assert!(place.display_name.text.is_empty());
        assert!(place.location.is_none());
        assert!(!place.is_closed());
        assert!(!place.has_photos());
    }

    #[test]
    fn test_unknown_business_status_counts_as_open() {
        let place: Place = serde_json::from_value(serde_json::json!({
            "id": "x",
            "businessStatus": "SOMETHING_NEW"
        }))
        .unwrap();
        assert_eq!(
            place.business_status,
            Some(BusinessStatus::BusinessStatusUnspecified)
        );
        assert!(!place.is_closed());
    }

    #[test]
    fn test_closed_statuses_detected() {
        for status in ["CLOSED_TEMPORARILY", "CLOSED_PERMANENTLY"] {
            let place: Place = serde_json::from_value(serde_json::json!({
                "id": "x",
                "businessStatus": status
            }))
            .unwrap();
            assert!(place.is_closed(), "{} should count as closed", status);
        }
    }

    #[test]
    fn test_photo_url_contains_dimensions_and_key() {
        let client = PlacesClient::new("test-key".to_string());
        let url = client.photo_url("places/abc/photos/def", 400);
        assert_eq!(
            url,
            "https://places.googleapis.com/v1/places/abc/photos/def/media?maxWidthPx=400&key=test-key"
        );
    }
}

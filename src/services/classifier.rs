// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Facility sport classification and normalization.
//!
//! The places API carries no usable sport taxonomy, so support for each
//! sport is inferred from a facility's name and category tags. The
//! pipeline runs: build search keywords → (external lookup) → dedupe and
//! drop closed businesses → detect sports → convert to a canonical
//! [`Facility`] record. Every step is a pure function over its input;
//! the heuristics deliberately over-include sports, because the app
//! treats an absent sport as "not offered" with no recovery path.

use crate::models::{Facility, Sport};
use crate::services::places::Place;
use std::collections::HashSet;

/// Search keywords per sport, tried in order by the facility finder.
const SPORT_SEARCH_KEYWORDS: &[(Sport, &[&str])] = &[
    (
        Sport::Basketball,
        &[
            "basketball court",
            "basketball gym",
            "indoor court",
            "sports center",
        ],
    ),
    (
        Sport::Tennis,
        &[
            "tennis court",
            "tennis club",
            "racquet club",
            "country club",
            "tennis center",
            "racquetball club",
            "athletic club",
            "tennis facility",
        ],
    ),
    (
        Sport::Pickleball,
        &[
            "pickleball court",
            "paddle court",
            "recreation center",
            "community center",
            "sports complex",
        ],
    ),
    (
        Sport::Volleyball,
        &[
            "volleyball court",
            "beach volleyball",
            "sports complex",
            "recreation center",
            "indoor court",
        ],
    ),
    (
        Sport::Running,
        &[
            "running track",
            "trail",
            "track",
            "jogging path",
            "park",
            "fitness trail",
            "running path",
        ],
    ),
    (
        Sport::Soccer,
        &[
            "soccer field",
            "football field",
            "sports complex",
            "park",
            "athletic field",
            "soccer pitch",
        ],
    ),
];

/// Generic venue keywords used when no sport filter is given.
const FALLBACK_SEARCH_KEYWORDS: &[&str] = &[
    "recreation center",
    "sports complex",
    "gym",
    "park",
    "tennis court",
    "basketball court",
];

/// Substrings that directly signal a sport in a facility's name or tags.
const SPORT_SIGNALS: &[(Sport, &[&str])] = &[
    (Sport::Basketball, &["basketball", "hoops", "indoor court"]),
    (
        Sport::Tennis,
        &["tennis", "racquet", "racket", "country club", "athletic club"],
    ),
    (
        Sport::Pickleball,
        &["pickleball", "paddle tennis", "paddle court"],
    ),
    (
        Sport::Volleyball,
        &["volleyball", "beach volleyball", "sand volleyball"],
    ),
    (
        Sport::Soccer,
        &["soccer", "football", "futbol", "pitch", "field"],
    ),
    (
        Sport::Running,
        &["track", "trail", "running", "jogging", "path", "marathon"],
    ),
];

/// Venue-type phrases mapped to the sports such venues commonly offer.
/// Additive only: a match never removes sports already detected.
const VENUE_TYPE_SPORTS: &[(&str, &[Sport])] = &[
    (
        "recreation center",
        &[Sport::Basketball, Sport::Volleyball, Sport::Pickleball],
    ),
    (
        "sports complex",
        &[
            Sport::Basketball,
            Sport::Volleyball,
            Sport::Soccer,
            Sport::Tennis,
        ],
    ),
    (
        "community center",
        &[Sport::Basketball, Sport::Volleyball, Sport::Pickleball],
    ),
    (
        "athletic club",
        &[Sport::Tennis, Sport::Basketball, Sport::Volleyball],
    ),
    ("country club", &[Sport::Tennis, Sport::Running]),
    (
        "ymca",
        &[Sport::Basketball, Sport::Volleyball, Sport::Running],
    ),
    ("fitness center", &[Sport::Basketball, Sport::Running]),
    ("stadium", &[Sport::Soccer, Sport::Running]),
    (
        "school",
        &[Sport::Basketball, Sport::Soccer, Sport::Tennis, Sport::Running],
    ),
    (
        "university",
        &[
            Sport::Basketball,
            Sport::Soccer,
            Sport::Tennis,
            Sport::Running,
            Sport::Volleyball,
        ],
    ),
];

/// Category tags mapped to display amenity labels.
const AMENITY_LABELS: &[(&str, &str)] = &[
    ("gym", "Fitness facilities"),
    ("park", "Outdoor space"),
    ("establishment", "Established facility"),
    ("health", "Health and wellness"),
    ("school", "School facility"),
    ("university", "University facility"),
    ("stadium", "Large venue"),
    ("tourist_attraction", "Popular destination"),
];

/// Label emitted when no other amenity applies.
const AMENITY_PLACEHOLDER: &str = "Sports facility";

/// Rating at or above which a facility is labeled "Highly rated".
const HIGHLY_RATED_THRESHOLD: f64 = 4.0;

/// Errors from converting a raw place record.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Place record missing required field: {0}")]
    InvalidInput(&'static str),
}

/// Build the ordered list of search keywords for the given sport filter.
///
/// Keywords for each requested sport are emitted in the order the sports
/// were supplied, preserving each sport's internal keyword order. With no
/// filter, a fixed mix of popular venue keywords is returned. Duplicates
/// are not removed here; candidate dedup happens on place IDs instead.
pub fn build_search_keywords(sports: Option<&[Sport]>) -> Vec<&'static str> {
    match sports {
        Some(sports) if !sports.is_empty() => sports
            .iter()
            .flat_map(|sport| {
                SPORT_SEARCH_KEYWORDS
                    .iter()
                    .find(|(s, _)| s == sport)
                    .map(|(_, keywords)| keywords.iter().copied())
                    .into_iter()
                    .flatten()
            })
            .collect(),
        _ => FALLBACK_SEARCH_KEYWORDS.to_vec(),
    }
}

/// Collapse results from multiple keyword searches into a unique,
/// open-business candidate list.
///
/// Keeps the first occurrence of each place ID in input order (later
/// duplicates are dropped, not merged), then removes permanently or
/// temporarily closed businesses.
pub fn dedupe_open_places(places: Vec<Place>) -> Vec<Place> {
    let mut seen = HashSet::new();
    places
        .into_iter()
        .filter(|place| seen.insert(place.id.clone()))
        .filter(|place| !place.is_closed())
        .collect()
}

/// Infer which sports a facility supports from its name and category tags.
///
/// Three additive passes over the lower-cased name+tags text: direct
/// sport signals, venue-type inference, and a fixed fallback chain
/// (gym/fitness → basketball, tagged park → running, generic "court" →
/// basketball+tennis, otherwise basketball). The result is ordered by
/// first detection, duplicate-free, and never empty.
pub fn detect_sports(place: &Place) -> Vec<Sport> {
    let name = place.display_name.text.to_lowercase();
    let tags = place.types.join(" ").to_lowercase();
    let combined = format!("{} {}", name, tags);

    let mut sports = Vec::new();

    for (sport, signals) in SPORT_SIGNALS {
        if signals.iter().any(|signal| combined.contains(signal)) {
            sports.push(*sport);
        }
    }

    for (venue_type, venue_sports) in VENUE_TYPE_SPORTS {
        if combined.contains(venue_type) {
            for sport in *venue_sports {
                if !sports.contains(sport) {
                    sports.push(*sport);
                }
            }
        }
    }

    if sports.is_empty() {
        if combined.contains("gym") || combined.contains("fitness") {
            sports.push(Sport::Basketball);
        } else if tags.contains("park") {
            sports.push(Sport::Running);
        } else if combined.contains("court") {
            // Generic court could be either
            sports.push(Sport::Basketball);
            sports.push(Sport::Tennis);
        } else {
            sports.push(Sport::Basketball);
        }
    }

    sports
}

/// Derive display amenity labels from category tags and metadata.
///
/// Never returns an empty list; a placeholder label stands in when
/// nothing else applies.
pub fn extract_amenities(place: &Place) -> Vec<String> {
    let mut amenities: Vec<String> = Vec::new();

    for tag in &place.types {
        if let Some((_, label)) = AMENITY_LABELS.iter().find(|(t, _)| *t == tag.as_str()) {
            amenities.push((*label).to_string());
        }
    }

    if place
        .rating
        .is_some_and(|rating| rating >= HIGHLY_RATED_THRESHOLD)
    {
        amenities.push("Highly rated".to_string());
    }

    if place.has_photos() {
        amenities.push("Photos available".to_string());
    }

    if place.current_opening_hours.is_some() {
        amenities.push("Operating hours available".to_string());
    }

    if amenities.is_empty() {
        amenities.push(AMENITY_PLACEHOLDER.to_string());
    }

    amenities
}

/// Convert a raw place record plus its detected sports into a canonical
/// [`Facility`].
///
/// A record missing its ID, name, or coordinate is rejected with
/// [`ClassifierError::InvalidInput`]; callers skip such records.
pub fn to_facility(place: &Place, sports: &[Sport]) -> Result<Facility, ClassifierError> {
    if place.id.trim().is_empty() {
        return Err(ClassifierError::InvalidInput("id"));
    }

    let name = place.display_name.text.trim();
    if name.is_empty() {
        return Err(ClassifierError::InvalidInput("displayName"));
    }

    let location = place
        .location
        .ok_or(ClassifierError::InvalidInput("location"))?;
    if !location.latitude.is_finite() || !location.longitude.is_finite() {
        return Err(ClassifierError::InvalidInput("location"));
    }

    let now = chrono::Utc::now().to_rfc3339();

    Ok(Facility {
        id: place.id.clone(),
        name: name.to_string(),
        description: build_description(place, sports),
        latitude: location.latitude,
        longitude: location.longitude,
        sports: sports.to_vec(),
        address: place.formatted_address.clone().unwrap_or_default(),
        amenities: extract_amenities(place),
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Synthesize a facility description from place metadata.
fn build_description(place: &Place, sports: &[Sport]) -> String {
    let sport_list: Vec<&str> = sports.iter().map(|s| s.as_str()).collect();
    let mut description = format!("Real {} facility", sport_list.join(", "));

    if let Some(rating) = place.rating {
        description.push_str(&format!(" • {}★", rating));
    }

    if let Some(open_now) = place
        .current_opening_hours
        .as_ref()
        .and_then(|hours| hours.open_now)
    {
        description.push_str(if open_now { " • Open now" } else { " • Closed" });
    }

    description
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::places::{BusinessStatus, LatLng, LocalizedText, OpeningHours, Photo};

    fn place(name: &str, types: &[&str]) -> Place {
        Place {
            id: format!("place-{}", name.to_lowercase().replace(' ', "-")),
            display_name: LocalizedText {
                text: name.to_string(),
                language_code: Some("en".to_string()),
            },
            formatted_address: Some("123 Main St, San Francisco, CA".to_string()),
            location: Some(LatLng {
                latitude: 37.7749,
                longitude: -122.4194,
            }),
            types: types.iter().map(|t| t.to_string()).collect(),
            rating: None,
            current_opening_hours: None,
            photos: None,
            business_status: Some(BusinessStatus::Operational),
        }
    }

    // ─── Keyword generation ──────────────────────────────────────

    #[test]
    fn test_keywords_for_single_sport() {
        let keywords = build_search_keywords(Some(&[Sport::Basketball]));
        assert_eq!(
            keywords,
            vec![
                "basketball court",
                "basketball gym",
                "indoor court",
                "sports center"
            ]
        );
    }

    #[test]
    fn test_keywords_preserve_requested_sport_order() {
        let keywords = build_search_keywords(Some(&[Sport::Running, Sport::Tennis]));
        // Running's keywords come first because running was requested first.
        assert_eq!(keywords[0], "running track");
        let tennis_start = keywords.iter().position(|k| *k == "tennis court").unwrap();
        assert!(tennis_start > 0);
        assert!(keywords[..tennis_start].iter().all(|k| {
            build_search_keywords(Some(&[Sport::Running])).contains(k)
        }));
    }

    #[test]
    fn test_keywords_fallback_when_no_sports() {
        assert_eq!(build_search_keywords(None), FALLBACK_SEARCH_KEYWORDS);
        assert_eq!(build_search_keywords(Some(&[])), FALLBACK_SEARCH_KEYWORDS);
    }

    #[test]
    fn test_keywords_never_empty_for_any_sport_set() {
        for sport in Sport::ALL {
            assert!(!build_search_keywords(Some(&[sport])).is_empty());
        }
    }

    // ─── Dedup and filtering ─────────────────────────────────────

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let mut first = place("Mission Rec Center", &["establishment"]);
        first.rating = Some(4.5);
        let mut duplicate = place("Mission Rec Center", &["establishment"]);
        duplicate.rating = Some(1.0);
        let other = place("Dolores Park", &["park"]);

        let result = dedupe_open_places(vec![first, other, duplicate]);
        assert_eq!(result.len(), 2);
        // The retained record is the first occurrence, not the later one.
        assert_eq!(result[0].rating, Some(4.5));
    }

    #[test]
    fn test_dedupe_drops_closed_businesses() {
        let open = place("Open Gym", &["gym"]);
        let mut temp_closed = place("Temp Closed Gym", &["gym"]);
        temp_closed.business_status = Some(BusinessStatus::ClosedTemporarily);
        let mut perm_closed = place("Perm Closed Gym", &["gym"]);
        perm_closed.business_status = Some(BusinessStatus::ClosedPermanently);
        let mut unknown = place("Unknown Status Gym", &["gym"]);
        unknown.business_status = None;

        let result = dedupe_open_places(vec![open, temp_closed, perm_closed, unknown]);
        let names: Vec<&str> = result
            .iter()
            .map(|p| p.display_name.text.as_str())
            .collect();
        assert_eq!(names, vec!["Open Gym", "Unknown Status Gym"]);
    }

    #[test]
    fn test_dedupe_empty_input() {
        assert!(dedupe_open_places(vec![]).is_empty());
    }

    // ─── Sport detection ─────────────────────────────────────────

    #[test]
    fn test_detect_direct_sport_mentions() {
        let sports = detect_sports(&place(
            "Golden Gate Tennis & Pickleball Club",
            &["establishment"],
        ));
        assert!(sports.contains(&Sport::Tennis));
        assert!(sports.contains(&Sport::Pickleball));
    }

    #[test]
    fn test_detect_venue_type_inference() {
        let sports = detect_sports(&place("Westside Community Center", &["community center"]));
        assert_eq!(
            sports,
            vec![Sport::Basketball, Sport::Volleyball, Sport::Pickleball]
        );
    }

    #[test]
    fn test_detect_venue_type_is_additive() {
        // Direct tennis signal plus athletic-club inference; tennis stays first.
        let sports = detect_sports(&place("Bayview Tennis & Athletic Club", &["establishment"]));
        assert_eq!(sports[0], Sport::Tennis);
        assert!(sports.contains(&Sport::Basketball));
        assert!(sports.contains(&Sport::Volleyball));
    }

    #[test]
    fn test_detect_park_falls_back_to_running() {
        // No direct signal and no venue-type entry for a bare park: the
        // tag-based fallback fires.
        let sports = detect_sports(&place("Central Park", &["park"]));
        assert_eq!(sports, vec![Sport::Running]);
    }

    #[test]
    fn test_detect_gym_falls_back_to_basketball() {
        let sports = detect_sports(&place("24 Hour Gym", &["gym"]));
        assert_eq!(sports, vec![Sport::Basketball]);
    }

    #[test]
    fn test_detect_generic_court_falls_back_to_basketball_and_tennis() {
        let sports = detect_sports(&place("Riverside Court", &["establishment"]));
        assert_eq!(sports, vec![Sport::Basketball, Sport::Tennis]);
    }

    #[test]
    fn test_detect_conservative_default() {
        let sports = detect_sports(&place("Some Venue", &["establishment"]));
        assert_eq!(sports, vec![Sport::Basketball]);
    }

    #[test]
    fn test_detect_never_empty() {
        let samples = [
            place("", &[]),
            place("x", &["establishment"]),
            place("Cafe", &["restaurant"]),
        ];
        for sample in &samples {
            assert!(!detect_sports(sample).is_empty());
        }
    }

    #[test]
    fn test_detect_is_monotonic_under_added_signals() {
        let base = detect_sports(&place("Westside Community Center", &["community center"]));
        let extended = detect_sports(&place(
            "Westside Community Center Soccer",
            &["community center"],
        ));
        for sport in &base {
            assert!(
                extended.contains(sport),
                "adding a signal removed {}",
                sport
            );
        }
        assert!(extended.contains(&Sport::Soccer));
    }

    #[test]
    fn test_detect_output_has_no_duplicates() {
        // "country club" is both a direct tennis signal and a venue type
        // that lists tennis; the sport must appear exactly once.
        let sports = detect_sports(&place("Hillsborough Country Club", &["establishment"]));
        assert_eq!(sports, vec![Sport::Tennis, Sport::Running]);
        let unique: HashSet<_> = sports.iter().collect();
        assert_eq!(unique.len(), sports.len());
    }

    // ─── Amenities ───────────────────────────────────────────────

    #[test]
    fn test_amenities_from_tags_and_rating() {
        let mut p = place("City Gym", &["gym", "health"]);
        p.rating = Some(4.5);
        let amenities = extract_amenities(&p);
        assert_eq!(
            amenities,
            vec!["Fitness facilities", "Health and wellness", "Highly rated"]
        );
    }

    #[test]
    fn test_amenities_highly_rated_only() {
        let mut p = place("Plain Venue", &[]);
        p.rating = Some(4.5);
        assert_eq!(extract_amenities(&p), vec!["Highly rated"]);
    }

    #[test]
    fn test_amenities_rating_below_threshold_ignored() {
        let mut p = place("Plain Venue", &[]);
        p.rating = Some(3.9);
        assert_eq!(extract_amenities(&p), vec![AMENITY_PLACEHOLDER]);
    }

    #[test]
    fn test_amenities_placeholder_when_nothing_matches() {
        let p = place("Plain Venue", &["restaurant"]);
        assert_eq!(extract_amenities(&p), vec![AMENITY_PLACEHOLDER]);
    }

    #[test]
    fn test_amenities_photos_and_hours() {
        let mut p = place("Plain Venue", &[]);
        p.photos = Some(vec![Photo {
            name: "places/abc/photos/def".to_string(),
            width_px: Some(400),
            height_px: Some(300),
        }]);
        p.current_opening_hours = Some(OpeningHours {
            open_now: Some(true),
        });
        assert_eq!(
            extract_amenities(&p),
            vec!["Photos available", "Operating hours available"]
        );
    }

    #[test]
    fn test_amenities_empty_photo_list_not_counted() {
        let mut p = place("Plain Venue", &[]);
        p.photos = Some(vec![]);
        assert_eq!(extract_amenities(&p), vec![AMENITY_PLACEHOLDER]);
    }

    // ─── Conversion ──────────────────────────────────────────────

    #[test]
    fn test_to_facility_copies_fields() {
        let p = place("Mission Playground", &["park"]);
        let facility = to_facility(&p, &[Sport::Running]).unwrap();
        assert_eq!(facility.id, p.id);
        assert_eq!(facility.name, "Mission Playground");
        assert_eq!(facility.latitude, 37.7749);
        assert_eq!(facility.longitude, -122.4194);
        assert_eq!(facility.address, "123 Main St, San Francisco, CA");
        assert_eq!(facility.sports, vec![Sport::Running]);
        assert!(!facility.amenities.is_empty());
    }

    #[test]
    fn test_to_facility_description_with_metadata() {
        let mut p = place("Mission Courts", &[]);
        p.rating = Some(4.5);
        p.current_opening_hours = Some(OpeningHours {
            open_now: Some(true),
        });
        let facility = to_facility(&p, &[Sport::Basketball, Sport::Tennis]).unwrap();
        assert_eq!(
            facility.description,
            "Real basketball, tennis facility • 4.5★ • Open now"
        );
    }

    #[test]
    fn test_to_facility_description_closed() {
        let mut p = place("Mission Courts", &[]);
        p.current_opening_hours = Some(OpeningHours {
            open_now: Some(false),
        });
        let facility = to_facility(&p, &[Sport::Tennis]).unwrap();
        assert_eq!(facility.description, "Real tennis facility • Closed");
    }

    #[test]
    fn test_to_facility_rejects_missing_id() {
        let mut p = place("Nameless", &[]);
        p.id = String::new();
        let err = to_facility(&p, &[Sport::Basketball]).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidInput("id")));
    }

    #[test]
    fn test_to_facility_rejects_missing_name() {
        let mut p = place("x", &[]);
        p.display_name.text = "  ".to_string();
        let err = to_facility(&p, &[Sport::Basketball]).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidInput("displayName")));
    }

    #[test]
    fn test_to_facility_rejects_missing_location() {
        let mut p = place("No Location", &[]);
        p.location = None;
        let err = to_facility(&p, &[Sport::Basketball]).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidInput("location")));
    }

    #[test]
    fn test_to_facility_idempotent_modulo_time() {
        let p = place("Stable Venue", &["gym"]);
        let first = to_facility(&p, &[Sport::Basketball]).unwrap();
        let second = to_facility(&p, &[Sport::Basketball]).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.name, second.name);
        assert_eq!(first.description, second.description);
        assert_eq!(first.sports, second.sports);
        assert_eq!(first.address, second.address);
        assert_eq!(first.amenities, second.amenities);
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sport taxonomy and per-sport metadata.
//!
//! The six sports below are the entire domain vocabulary: filters,
//! keyword generation, and classification all speak in these values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Closed enumeration of supported sports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/types/generated/")
)]
pub enum Sport {
    Basketball,
    Tennis,
    Pickleball,
    Volleyball,
    Running,
    Soccer,
}

impl Sport {
    /// All supported sports, in canonical order.
    pub const ALL: [Sport; 6] = [
        Sport::Basketball,
        Sport::Tennis,
        Sport::Pickleball,
        Sport::Volleyball,
        Sport::Running,
        Sport::Soccer,
    ];

    /// Lowercase identifier used in storage and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Basketball => "basketball",
            Sport::Tennis => "tennis",
            Sport::Pickleball => "pickleball",
            Sport::Volleyball => "volleyball",
            Sport::Running => "running",
            Sport::Soccer => "soccer",
        }
    }

    /// Static metadata for this sport (display name, session defaults).
    pub fn profile(&self) -> &'static SportProfile {
        match self {
            Sport::Basketball => &SportProfile {
                name: "Basketball",
                icon: "🏀",
                color: "#FF6B35",
                default_session_title: "Open Run",
                max_players: 10,
            },
            Sport::Tennis => &SportProfile {
                name: "Tennis",
                icon: "🎾",
                color: "#4CAF50",
                default_session_title: "Looking for Partner",
                max_players: 4,
            },
            Sport::Pickleball => &SportProfile {
                name: "Pickleball",
                icon: "🏓",
                color: "#9C27B0",
                default_session_title: "Pickleball Game",
                max_players: 4,
            },
            Sport::Volleyball => &SportProfile {
                name: "Volleyball",
                icon: "🏐",
                color: "#2196F3",
                default_session_title: "Volleyball Match",
                max_players: 12,
            },
            Sport::Running => &SportProfile {
                name: "Running",
                icon: "🏃",
                color: "#FF9800",
                default_session_title: "Group Run",
                max_players: 20,
            },
            Sport::Soccer => &SportProfile {
                name: "Soccer",
                icon: "⚽",
                color: "#795548",
                default_session_title: "Pickup Game",
                max_players: 22,
            },
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = UnknownSport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basketball" => Ok(Sport::Basketball),
            "tennis" => Ok(Sport::Tennis),
            "pickleball" => Ok(Sport::Pickleball),
            "volleyball" => Ok(Sport::Volleyball),
            "running" => Ok(Sport::Running),
            "soccer" => Ok(Sport::Soccer),
            other => Err(UnknownSport(other.to_string())),
        }
    }
}

/// Error for unrecognized sport identifiers.
#[derive(Debug, thiserror::Error)]
#[error("Unknown sport: {0}")]
pub struct UnknownSport(pub String);

/// Static per-sport metadata used for session defaults and display.
#[derive(Debug, Clone)]
pub struct SportProfile {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub default_session_title: &'static str,
    pub max_players: u32,
}

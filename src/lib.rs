// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ralli: find nearby sports facilities and the people playing there.
//!
//! This crate provides the backend API for discovering sports
//! facilities via the Google Places API, classifying which sports each
//! one offers, and tracking check-ins, crowd levels, and scheduled play
//! sessions.

pub mod config;
pub mod db;
pub mod error;
pub mod geo_utils;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{CapacityService, FacilityFinder};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub facility_finder: FacilityFinder,
    pub capacity: CapacityService,
}

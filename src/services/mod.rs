// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod capacity;
pub mod classifier;
pub mod facility;
pub mod places;

pub use capacity::CapacityService;
pub use facility::FacilityFinder;
pub use places::PlacesClient;

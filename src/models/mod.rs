// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod capacity;
pub mod checkin;
pub mod facility;
pub mod session;
pub mod sport;
pub mod user;

pub use capacity::{CapacityRecord, OccupancyLevel};
pub use checkin::CheckIn;
pub use facility::Facility;
pub use session::{ParticipantStatus, Session, SessionParticipant, SessionStatus};
pub use sport::Sport;
pub use user::User;

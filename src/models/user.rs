//! User model for storage and API.

use crate::models::Sport;
use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
///
/// The document ID is the subject of the identity provider's JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Identity-provider user ID (also used as document ID)
    pub id: String,
    /// Email address
    pub email: String,
    /// Display name (may be None if not shared)
    pub full_name: Option<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Sports the user wants surfaced first
    #[serde(default)]
    pub preferred_sports: Vec<Sport>,
    /// When the profile was first stored
    pub created_at: String,
    /// Last profile update
    pub updated_at: String,
}

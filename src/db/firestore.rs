// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage)
//! - Facilities (classified facility records)
//! - Check-ins
//! - Sessions and participants (RSVP bookkeeping)
//! - Capacity reports (crowd levels)

use crate::db::collections;
use crate::error::AppError;
use crate::models::session::{ParticipantStatus, SessionStatus};
use crate::models::{CapacityRecord, CheckIn, Facility, Session, SessionParticipant, Sport, User};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user profile by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user profile.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Facility Operations ─────────────────────────────────────

    /// Get a stored facility by place ID.
    pub async fn get_facility(&self, facility_id: &str) -> Result<Option<Facility>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::FACILITIES)
            .obj()
            .one(facility_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a classified facility record.
    ///
    /// Facilities are written the first time a check-in or session
    /// references them, so later reads don't depend on the places API.
    pub async fn upsert_facility(&self, facility: &Facility) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::FACILITIES)
            .document_id(&facility.id)
            .object(facility)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Check-in Operations ─────────────────────────────────────

    /// Store a check-in.
    pub async fn add_check_in(&self, check_in: &CheckIn) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CHECK_INS)
            .document_id(&check_in.id)
            .object(check_in)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get check-ins at a facility since the given time, newest first.
    pub async fn get_recent_check_ins(
        &self,
        facility_id: &str,
        since: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<CheckIn>, AppError> {
        let facility_id = facility_id.to_string();
        let since = since.to_rfc3339();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::CHECK_INS)
            .filter(move |q| {
                q.for_all([
                    q.field("facility_id").eq(facility_id.clone()),
                    q.field("created_at").greater_than_or_equal(since.clone()),
                ])
            })
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Session Operations ──────────────────────────────────────

    /// Store a session (create or overwrite).
    pub async fn set_session(&self, session: &Session) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SESSIONS)
            .document_id(&session.id)
            .object(session)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a session by ID.
    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SESSIONS)
            .obj()
            .one(session_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List upcoming sessions scheduled at or after `from`, soonest
    /// first, optionally filtered by facility and sport.
    pub async fn list_upcoming_sessions(
        &self,
        facility_id: Option<&str>,
        sport: Option<Sport>,
        from: chrono::DateTime<chrono::Utc>,
        limit: u32,
    ) -> Result<Vec<Session>, AppError> {
        let facility_id = facility_id.map(|s| s.to_string());
        let from = from.to_rfc3339();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::SESSIONS)
            .filter(move |q| {
                let mut filters = vec![
                    q.field("status").eq("upcoming"),
                    q.field("scheduled_for").greater_than_or_equal(from.clone()),
                ];
                if let Some(facility_id) = facility_id.clone() {
                    filters.push(q.field("facility_id").eq(facility_id));
                }
                if let Some(sport) = sport {
                    filters.push(q.field("sport").eq(sport.as_str()));
                }
                q.for_all(filters)
            })
            .order_by([(
                "scheduled_for",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all participants of a session.
    pub async fn list_participants(
        &self,
        session_id: &str,
    ) -> Result<Vec<SessionParticipant>, AppError> {
        let session_id = session_id.to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::SESSION_PARTICIPANTS)
            .filter(move |q| q.for_all([q.field("session_id").eq(session_id.clone())]))
            .order_by([("joined_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Atomically record an RSVP and keep the session's player count
    /// consistent.
    ///
    /// Uses a Firestore transaction so two users racing for the last
    /// spot cannot both join: if the session document changes under us,
    /// Firestore retries/aborts and the count never exceeds
    /// `max_players`.
    ///
    /// Returns the updated session.
    pub async fn rsvp_atomic(
        &self,
        session_id: &str,
        user_id: &str,
        status: ParticipantStatus,
        now: &str,
    ) -> Result<Session, AppError> {
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Read the session within the transaction to register it for
        // conflict detection.
        let session: Option<Session> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SESSIONS)
            .obj()
            .one(session_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read session in transaction: {}", e))
            })?;

        let Some(mut session) = session else {
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(format!("Session {}", session_id)));
        };

        if session.status != SessionStatus::Upcoming {
            let _ = transaction.rollback().await;
            return Err(AppError::BadRequest(
                "Session is no longer open for RSVPs".to_string(),
            ));
        }

        let doc_id = participant_doc_id(session_id, user_id);
        let existing: Option<SessionParticipant> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SESSION_PARTICIPANTS)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read participant in transaction: {}", e))
            })?;

        let was_in = existing
            .as_ref()
            .is_some_and(|p| p.status == ParticipantStatus::In);
        let is_in = status == ParticipantStatus::In;

        if is_in && !was_in && session.current_players >= session.max_players {
            let _ = transaction.rollback().await;
            return Err(AppError::BadRequest("Session is full".to_string()));
        }

        let participant = SessionParticipant {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            status,
            joined_at: existing
                .map(|p| p.joined_at)
                .unwrap_or_else(|| now.to_string()),
        };

        if is_in && !was_in {
            session.current_players += 1;
        } else if !is_in && was_in {
            session.current_players = session.current_players.saturating_sub(1);
        }
        session.updated_at = now.to_string();

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::SESSION_PARTICIPANTS)
            .document_id(&doc_id)
            .object(&participant)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add participant to transaction: {}", e))
            })?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::SESSIONS)
            .document_id(session_id)
            .object(&session)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add session to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            session_id,
            user_id,
            status = ?participant.status,
            current_players = session.current_players,
            "RSVP recorded"
        );

        Ok(session)
    }

    // ─── Capacity Operations ─────────────────────────────────────

    /// Store a capacity report.
    pub async fn add_capacity_report(&self, record: &CapacityRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::FACILITY_CAPACITY)
            .document_id(&record.id)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Most recent capacity report for a facility, optionally narrowed
    /// to one sport.
    pub async fn latest_capacity(
        &self,
        facility_id: &str,
        sport: Option<Sport>,
    ) -> Result<Option<CapacityRecord>, AppError> {
        let facility_id = facility_id.to_string();

        let records: Vec<CapacityRecord> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::FACILITY_CAPACITY)
            .filter(move |q| {
                let mut filters = vec![q.field("facility_id").eq(facility_id.clone())];
                if let Some(sport) = sport {
                    filters.push(q.field("sport").eq(sport.as_str()));
                }
                q.for_all(filters)
            })
            .order_by([(
                "reported_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(records.into_iter().next())
    }

    /// Capacity reports for a facility since the given time, oldest
    /// first.
    pub async fn capacity_history(
        &self,
        facility_id: &str,
        since: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<CapacityRecord>, AppError> {
        let facility_id = facility_id.to_string();
        let since = since.to_rfc3339();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::FACILITY_CAPACITY)
            .filter(move |q| {
                q.for_all([
                    q.field("facility_id").eq(facility_id.clone()),
                    q.field("reported_at").greater_than_or_equal(since.clone()),
                ])
            })
            .order_by([(
                "reported_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    /// Query all documents in a collection matching a user-id field.
    async fn query_by_user<T>(
        &self,
        collection: &str,
        field: &str,
        user_id: &str,
    ) -> Result<Vec<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        let field = field.to_string();
        let user_id = user_id.to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| q.for_all([q.field(field.clone()).eq(user_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── User Data Deletion ────────────────────────────────────────

    /// Delete ALL data for a user.
    ///
    /// Deletes from all collections:
    /// - sessions the user created (and their participants)
    /// - the user's RSVPs on other sessions (with player counts re-synced)
    /// - `check_ins` (query by user_id)
    /// - `facility_capacity` (query by user_id)
    /// - `users/{user_id}`
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_user_data(&self, user_id: &str) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        // 1. Delete sessions the user created, with their participants
        let own_sessions: Vec<Session> = self
            .query_by_user(collections::SESSIONS, "creator_id", user_id)
            .await?;

        for session in &own_sessions {
            let participants = self.list_participants(&session.id).await?;
            deleted_count += participants.len();
            self.batch_delete(
                &participants,
                collections::SESSION_PARTICIPANTS,
                |p: &SessionParticipant| participant_doc_id(&p.session_id, &p.user_id),
            )
            .await?;
        }

        let count = own_sessions.len();
        self.batch_delete(&own_sessions, collections::SESSIONS, |s: &Session| {
            s.id.clone()
        })
        .await?;
        deleted_count += count;
        tracing::debug!(user_id, count, "Deleted user's sessions");

        // 2. Delete the user's RSVPs on other sessions and re-sync counts
        let rsvps: Vec<SessionParticipant> = self
            .query_by_user(collections::SESSION_PARTICIPANTS, "user_id", user_id)
            .await?;

        let count = rsvps.len();
        self.batch_delete(
            &rsvps,
            collections::SESSION_PARTICIPANTS,
            |p: &SessionParticipant| participant_doc_id(&p.session_id, &p.user_id),
        )
        .await?;
        deleted_count += count;

        // Deletes are rare, so a sequential recount per affected session
        // is fine.
        for rsvp in rsvps.iter().filter(|p| p.status == ParticipantStatus::In) {
            if let Some(mut session) = self.get_session(&rsvp.session_id).await? {
                let in_count = self
                    .list_participants(&session.id)
                    .await?
                    .iter()
                    .filter(|p| p.status == ParticipantStatus::In)
                    .count() as u32;
                session.current_players = in_count;
                session.updated_at = chrono::Utc::now().to_rfc3339();
                self.set_session(&session).await?;
            }
        }
        tracing::debug!(user_id, count, "Deleted user's RSVPs");

        // 3. Delete check-ins
        let check_ins: Vec<CheckIn> = self
            .query_by_user(collections::CHECK_INS, "user_id", user_id)
            .await?;

        let count = check_ins.len();
        self.batch_delete(&check_ins, collections::CHECK_INS, |c: &CheckIn| {
            c.id.clone()
        })
        .await?;
        deleted_count += count;
        tracing::debug!(user_id, count, "Deleted check-ins");

        // 4. Delete capacity reports
        let reports: Vec<CapacityRecord> = self
            .query_by_user(collections::FACILITY_CAPACITY, "user_id", user_id)
            .await?;

        let count = reports.len();
        self.batch_delete(
            &reports,
            collections::FACILITY_CAPACITY,
            |r: &CapacityRecord| r.id.clone(),
        )
        .await?;
        deleted_count += count;
        tracing::debug!(user_id, count, "Deleted capacity reports");

        // 5. Delete user profile
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        deleted_count += 1;
        tracing::debug!(user_id, "Deleted user profile");

        tracing::info!(user_id, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}

/// Document ID for a participant record: one RSVP per user per session.
pub fn participant_doc_id(session_id: &str, user_id: &str) -> String {
    format!("{}_{}", session_id, user_id)
}

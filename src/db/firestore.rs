// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Training sessions (one document per weekly-cycle attempt)
//! - Training log (one document per reminder cycle)

use crate::db::{collections, TrainingRepository};
use crate::error::AppError;
use crate::models::{TrainingLogEntry, TrainingSession};
use crate::time_utils::format_training_date;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
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

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

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

        Ok(Self { client })
    }

    async fn upsert_session(&self, session: &TrainingSession) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::TRAINING_SESSIONS)
            .document_id(&session.id)
            .object(session)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn upsert_log_entry(&self, entry: &TrainingLogEntry) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::TRAINING_LOG)
            .document_id(&entry.id)
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl TrainingRepository for FirestoreDb {
    // ─── Session Operations ──────────────────────────────────────

    async fn get_active_session(
        &self,
        user_id: i64,
    ) -> Result<Option<TrainingSession>, AppError> {
        let sessions: Vec<TrainingSession> = self
            .client
            .fluent()
            .select()
            .from(collections::TRAINING_SESSIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("session_active").eq(true),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Normally exactly one; the newest wins if a supersede write was lost.
        Ok(sessions.into_iter().max_by_key(|s| s.created_at))
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<TrainingSession>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::TRAINING_SESSIONS)
            .obj()
            .one(session_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_active_sessions(&self) -> Result<Vec<TrainingSession>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::TRAINING_SESSIONS)
            .filter(|q| q.for_all([q.field("session_active").eq(true)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn insert_session(&self, session: &TrainingSession) -> Result<(), AppError> {
        self.upsert_session(session).await
    }

    async fn update_session(&self, session: &TrainingSession) -> Result<(), AppError> {
        self.upsert_session(session).await
    }

    // ─── Training Log Operations ─────────────────────────────────

    async fn get_log_entry(&self, entry_id: &str) -> Result<Option<TrainingLogEntry>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::TRAINING_LOG)
            .obj()
            .one(entry_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_log_entries(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<TrainingLogEntry>, AppError> {
        let date = format_training_date(date);

        let mut entries: Vec<TrainingLogEntry> = self
            .client
            .fluent()
            .select()
            .from(collections::TRAINING_LOG)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("training_date").eq(date.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    async fn insert_log_entry(&self, entry: &TrainingLogEntry) -> Result<(), AppError> {
        self.upsert_log_entry(entry).await
    }

    async fn update_log_entry(&self, entry: &TrainingLogEntry) -> Result<(), AppError> {
        self.upsert_log_entry(entry).await
    }
}

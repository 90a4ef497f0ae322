//! Database layer.
//!
//! [`TrainingRepository`] is plain CRUD over sessions and log entries; all
//! training logic lives in the services. Two implementations exist:
//! Firestore for deployments and an in-memory map for local runs and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::Result;
use crate::models::{TrainingLogEntry, TrainingSession};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Collection names as constants.
pub mod collections {
    /// Weekly-cycle sessions (keyed by session id)
    pub const TRAINING_SESSIONS: &str = "training_sessions";
    /// Reminder log entries (keyed by entry id)
    pub const TRAINING_LOG: &str = "training_log";
}

/// Row storage for sessions and log entries.
#[async_trait]
pub trait TrainingRepository: Send + Sync {
    /// The user's active session, if any.
    async fn get_active_session(&self, user_id: i64) -> Result<Option<TrainingSession>>;

    async fn get_session(&self, session_id: &str) -> Result<Option<TrainingSession>>;

    /// Every active session, across all users.
    async fn list_active_sessions(&self) -> Result<Vec<TrainingSession>>;

    async fn insert_session(&self, session: &TrainingSession) -> Result<()>;

    /// Overwrite a stored session (last writer wins).
    async fn update_session(&self, session: &TrainingSession) -> Result<()>;

    async fn get_log_entry(&self, entry_id: &str) -> Result<Option<TrainingLogEntry>>;

    /// All entries of a user for one calendar date, pending or resolved.
    async fn list_log_entries(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<TrainingLogEntry>>;

    async fn insert_log_entry(&self, entry: &TrainingLogEntry) -> Result<()>;

    async fn update_log_entry(&self, entry: &TrainingLogEntry) -> Result<()>;
}

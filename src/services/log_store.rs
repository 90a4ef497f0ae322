// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training log store and pending-check tracker.
//!
//! One entry per (user, calendar day) reminder cycle. At most one entry per
//! (user, date) is pending at a time; resolved entries are never deleted.

use crate::db::TrainingRepository;
use crate::error::{AppError, Result};
use crate::models::{TrainingLogEntry, TrainingType};
use crate::services::session::{user_lock, UserLocks};
use crate::time_utils::days_before;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct LogStore {
    db: Arc<dyn TrainingRepository>,
    locks: UserLocks,
}

impl LogStore {
    pub fn new(db: Arc<dyn TrainingRepository>, locks: UserLocks) -> Self {
        Self { db, locks }
    }

    /// Insert a pending entry unless one is already pending for `(user, date)`.
    ///
    /// Returns the new entry, or `None` when nothing was inserted.
    pub async fn create_pending_entry(
        &self,
        user_id: i64,
        session_id: &str,
        date: NaiveDate,
        training_type: TrainingType,
    ) -> Result<Option<TrainingLogEntry>> {
        let lock = user_lock(&self.locks, user_id);
        let _guard = lock.lock().await;

        if let Some(existing) = self.pending_for(user_id, date).await? {
            tracing::debug!(
                user_id,
                %date,
                entry_id = %existing.id,
                "Pending entry already exists"
            );
            return Ok(None);
        }

        let entry = TrainingLogEntry::pending(user_id, session_id, date, training_type, Utc::now());
        self.db.insert_log_entry(&entry).await?;

        tracing::info!(
            user_id,
            %date,
            entry_id = %entry.id,
            training_type = training_type.label(),
            "Pending training check created"
        );

        Ok(Some(entry))
    }

    /// The pending entry a session owns for `date`, if any.
    ///
    /// Entries left pending by a superseded session are never returned.
    pub async fn find_pending(
        &self,
        user_id: i64,
        session_id: &str,
        date: NaiveDate,
    ) -> Result<Option<TrainingLogEntry>> {
        Ok(self
            .pending_for(user_id, date)
            .await?
            .filter(|e| e.session_id == session_id))
    }

    /// The session's pending entry for `today`, falling back to the day before.
    ///
    /// Inbound answers can refer to either: the 23:00 prompt asks about
    /// today, the 16:00 reminder about yesterday.
    pub async fn find_recent_pending(
        &self,
        user_id: i64,
        session_id: &str,
        today: NaiveDate,
    ) -> Result<Option<TrainingLogEntry>> {
        if let Some(entry) = self.find_pending(user_id, session_id, today).await? {
            return Ok(Some(entry));
        }
        match days_before(today, 1) {
            Some(yesterday) => self.find_pending(user_id, session_id, yesterday).await,
            None => Ok(None),
        }
    }

    /// Whether the session has any entry, pending or resolved, for `date`.
    pub async fn has_entry_for(
        &self,
        user_id: i64,
        session_id: &str,
        date: NaiveDate,
    ) -> Result<bool> {
        Ok(self
            .db
            .list_log_entries(user_id, date)
            .await?
            .iter()
            .any(|e| e.session_id == session_id))
    }

    /// Resolve a pending entry with the user's answer.
    pub async fn resolve(
        &self,
        entry_id: &str,
        completed: bool,
        pain_feedback: Option<&str>,
    ) -> Result<TrainingLogEntry> {
        let user_id = self.load(entry_id).await?.user_id;

        let lock = user_lock(&self.locks, user_id);
        let _guard = lock.lock().await;

        let mut entry = self.load(entry_id).await?;
        if !entry.is_pending() {
            return Err(AppError::EntryNotFound(entry_id.to_string()));
        }

        entry.completed = Some(completed);
        if let Some(pain) = pain_feedback {
            entry.pain_feedback = Some(pain.to_string());
        }
        self.db.update_log_entry(&entry).await?;

        tracing::info!(
            user_id,
            entry_id,
            date = %entry.date,
            completed,
            "Training check resolved"
        );

        Ok(entry)
    }

    /// Store a pain label verbatim on an entry.
    pub async fn record_pain_feedback(&self, entry_id: &str, label: &str) -> Result<()> {
        let user_id = self.load(entry_id).await?.user_id;

        let lock = user_lock(&self.locks, user_id);
        let _guard = lock.lock().await;

        let mut entry = self.load(entry_id).await?;
        entry.pain_feedback = Some(label.to_string());
        self.db.update_log_entry(&entry).await?;

        tracing::info!(user_id, entry_id, pain = label, "Pain feedback recorded");
        Ok(())
    }

    async fn load(&self, entry_id: &str) -> Result<TrainingLogEntry> {
        self.db
            .get_log_entry(entry_id)
            .await?
            .ok_or_else(|| AppError::EntryNotFound(entry_id.to_string()))
    }

    async fn pending_for(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Option<TrainingLogEntry>> {
        Ok(self
            .db
            .list_log_entries(user_id, date)
            .await?
            .into_iter()
            .find(TrainingLogEntry::is_pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;

    fn store() -> LogStore {
        LogStore::new(Arc::new(MemoryDb::new()), UserLocks::default())
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_pending_is_idempotent() {
        let store = store();

        let first = store
            .create_pending_entry(1, "s1", day(15), TrainingType::ChestShouldersTriceps)
            .await
            .unwrap();
        assert!(first.is_some());

        let second = store
            .create_pending_entry(1, "s1", day(15), TrainingType::ChestShouldersTriceps)
            .await
            .unwrap();
        assert!(second.is_none());

        // Another date or user is independent
        assert!(store
            .create_pending_entry(1, "s1", day(16), TrainingType::BackBiceps)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .create_pending_entry(2, "s2", day(15), TrainingType::ChestShouldersTriceps)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_resolve_twice_is_entry_not_found() {
        let store = store();
        let entry = store
            .create_pending_entry(1, "s1", day(15), TrainingType::LegsCore)
            .await
            .unwrap()
            .unwrap();

        let resolved = store.resolve(&entry.id, true, None).await.unwrap();
        assert_eq!(resolved.completed, Some(true));
        assert!(store.find_pending(1, "s1", day(15)).await.unwrap().is_none());
        assert!(store.has_entry_for(1, "s1", day(15)).await.unwrap());
        assert!(!store.has_entry_for(1, "other", day(15)).await.unwrap());

        let err = store.resolve(&entry.id, false, None).await.unwrap_err();
        assert!(matches!(err, AppError::EntryNotFound(_)));

        let err = store.resolve("missing", true, None).await.unwrap_err();
        assert!(matches!(err, AppError::EntryNotFound(_)));
    }

    #[tokio::test]
    async fn test_recent_pending_falls_back_to_yesterday() {
        let store = store();
        store
            .create_pending_entry(1, "s1", day(14), TrainingType::BackBiceps)
            .await
            .unwrap();

        let found = store
            .find_recent_pending(1, "s1", day(15))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.date, day(14));

        // Two days back is out of reach
        assert!(store
            .find_recent_pending(1, "s1", day(16))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_pending_lookup_is_scoped_to_session() {
        let store = store();
        store
            .create_pending_entry(1, "old", day(15), TrainingType::BackBiceps)
            .await
            .unwrap();

        assert!(store.find_pending(1, "old", day(15)).await.unwrap().is_some());
        assert!(store.find_pending(1, "new", day(15)).await.unwrap().is_none());
        assert!(store
            .find_recent_pending(1, "new", day(16))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_pain_feedback_stored_verbatim() {
        let store = store();
        let entry = store
            .create_pending_entry(1, "s1", day(15), TrainingType::LegsCore)
            .await
            .unwrap()
            .unwrap();
        store.resolve(&entry.id, true, None).await.unwrap();

        store
            .record_pain_feedback(&entry.id, "Болит спина")
            .await
            .unwrap();

        let entries = store.db.list_log_entries(1, day(15)).await.unwrap();
        assert_eq!(entries[0].pain_feedback.as_deref(), Some("Болит спина"));
    }
}

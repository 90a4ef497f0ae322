// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory repository backed by concurrent maps.
//!
//! Used with `STORAGE_BACKEND=memory` and by the test suite. Data does not
//! survive a restart.

use crate::db::TrainingRepository;
use crate::error::Result;
use crate::models::{TrainingLogEntry, TrainingSession};
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory session and log storage.
#[derive(Clone, Default)]
pub struct MemoryDb {
    sessions: Arc<DashMap<String, TrainingSession>>,
    log: Arc<DashMap<String, TrainingLogEntry>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrainingRepository for MemoryDb {
    async fn get_active_session(&self, user_id: i64) -> Result<Option<TrainingSession>> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id && s.active)
            .max_by_key(|s| s.created_at)
            .map(|s| s.value().clone()))
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<TrainingSession>> {
        Ok(self.sessions.get(session_id).map(|s| s.value().clone()))
    }

    async fn list_active_sessions(&self) -> Result<Vec<TrainingSession>> {
        let mut sessions: Vec<TrainingSession> = self
            .sessions
            .iter()
            .filter(|s| s.active)
            .map(|s| s.value().clone())
            .collect();
        sessions.sort_by_key(|s| (s.user_id, s.created_at));
        Ok(sessions)
    }

    async fn insert_session(&self, session: &TrainingSession) -> Result<()> {
        self.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn update_session(&self, session: &TrainingSession) -> Result<()> {
        self.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get_log_entry(&self, entry_id: &str) -> Result<Option<TrainingLogEntry>> {
        Ok(self.log.get(entry_id).map(|e| e.value().clone()))
    }

    async fn list_log_entries(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<TrainingLogEntry>> {
        let mut entries: Vec<TrainingLogEntry> = self
            .log
            .iter()
            .filter(|e| e.user_id == user_id && e.date == date)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    async fn insert_log_entry(&self, entry: &TrainingLogEntry) -> Result<()> {
        self.log.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    async fn update_log_entry(&self, entry: &TrainingLogEntry) -> Result<()> {
        self.log.insert(entry.id.clone(), entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TrainingDaysPattern, TrainingType};
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_active_session_lookup_ignores_inactive() {
        let db = MemoryDb::new();
        let now = Utc::now();

        let mut old = TrainingSession::new(1, TrainingDaysPattern::MonWedFri, now);
        old.active = false;
        let current =
            TrainingSession::new(1, TrainingDaysPattern::TueThuSat, now + Duration::seconds(1));
        db.insert_session(&old).await.unwrap();
        db.insert_session(&current).await.unwrap();

        let found = db.get_active_session(1).await.unwrap().unwrap();
        assert_eq!(found.id, current.id);
        assert_eq!(db.list_active_sessions().await.unwrap().len(), 1);
        assert!(db.get_active_session(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_log_entries_filtered_by_user_and_date() {
        let db = MemoryDb::new();
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let other_day = day.succ_opt().unwrap();

        for (user, date) in [(1, day), (1, other_day), (2, day)] {
            let entry = TrainingLogEntry::pending(
                user,
                "s",
                date,
                TrainingType::ChestShouldersTriceps,
                Utc::now(),
            );
            db.insert_log_entry(&entry).await.unwrap();
        }

        let entries = db.list_log_entries(1, day).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].date, day);
    }
}

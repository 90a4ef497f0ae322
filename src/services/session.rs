// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session state machine service.
//!
//! Wraps the pure transition rules of [`TrainingSession`] with persistence
//! and per-user serialization:
//! - Every read-modify-write runs under the user's async mutex
//! - `updated_at` is refreshed on every write
//! - Operations on an absent or inactive session fail with `SessionNotFound`

use crate::db::TrainingRepository;
use crate::error::{AppError, Result};
use crate::models::{TrainingDaysPattern, TrainingSession, WeekEvaluation};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-user mutexes shared by every service that mutates a user's rows.
pub type UserLocks = Arc<DashMap<i64, Arc<Mutex<()>>>>;

/// Get (or create) the mutex for one user.
pub(crate) fn user_lock(locks: &UserLocks, user_id: i64) -> Arc<Mutex<()>> {
    locks
        .entry(user_id)
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Weekly-cycle operations over stored sessions.
#[derive(Clone)]
pub struct TrainingService {
    db: Arc<dyn TrainingRepository>,
    locks: UserLocks,
}

impl TrainingService {
    pub fn new(db: Arc<dyn TrainingRepository>, locks: UserLocks) -> Self {
        Self { db, locks }
    }

    /// Start a new week-1 session, superseding any active one.
    pub async fn start_session(
        &self,
        user_id: i64,
        pattern: TrainingDaysPattern,
    ) -> Result<TrainingSession> {
        let lock = user_lock(&self.locks, user_id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        while let Some(mut previous) = self.db.get_active_session(user_id).await? {
            previous.active = false;
            previous.updated_at = now;
            self.db.update_session(&previous).await?;
            tracing::info!(
                user_id,
                session_id = %previous.id,
                "Superseded active training session"
            );
        }

        let session = TrainingSession::new(user_id, pattern, now);
        self.db.insert_session(&session).await?;

        tracing::info!(
            user_id,
            session_id = %session.id,
            pattern = pattern.label(),
            "Training session started"
        );

        Ok(session)
    }

    pub async fn get_active_session(&self, user_id: i64) -> Result<Option<TrainingSession>> {
        self.db.get_active_session(user_id).await
    }

    /// Every active session (scheduler sweeps).
    pub async fn list_active_sessions(&self) -> Result<Vec<TrainingSession>> {
        self.db.list_active_sessions().await
    }

    /// Active session of a user, or `SessionNotFound`.
    pub async fn require_active_session(&self, user_id: i64) -> Result<TrainingSession> {
        self.db
            .get_active_session(user_id)
            .await?
            .ok_or(AppError::SessionNotFound)
    }

    /// Record the answer to "did you train?".
    ///
    /// `completed = true` applies the lock-step advance and returns whether
    /// the week is now complete. `completed = false` is a postponement: the
    /// same slot stays due and nothing is written.
    pub async fn record_day_outcome(&self, session_id: &str, completed: bool) -> Result<bool> {
        if !completed {
            let session = self.load_active(session_id).await?;
            tracing::info!(
                user_id = session.user_id,
                session_id,
                training_type = session.current_training_type().label(),
                "Training postponed"
            );
            return Ok(false);
        }

        let (session, week_complete) = self
            .mutate_session(session_id, |s| s.complete_day())
            .await?;

        tracing::info!(
            user_id = session.user_id,
            session_id,
            completed_days = session.completed_days_count,
            current_day = session.current_day_index,
            week_complete,
            "Training day completed"
        );

        Ok(week_complete)
    }

    /// The "missed (test)" button.
    ///
    /// Same state effect as a postponement (nothing changes). Kept as its own
    /// operation because the user sees a different reply for it.
    pub async fn record_missed_day(&self, session_id: &str) -> Result<TrainingSession> {
        let session = self.load_active(session_id).await?;
        tracing::info!(
            user_id = session.user_id,
            session_id,
            training_type = session.current_training_type().label(),
            "Training day marked missed (test)"
        );
        Ok(session)
    }

    /// The "skip day" button: counts as a completed day.
    pub async fn skip_day(&self, session_id: &str) -> Result<bool> {
        tracing::debug!(session_id, "Skip-day shortcut");
        self.record_day_outcome(session_id, true).await
    }

    /// Which gate, if any, the session's week must pass next.
    pub fn evaluate_week_completion(&self, session: &TrainingSession) -> WeekEvaluation {
        session.evaluate_week()
    }

    /// Apply the check1 answer; a failure restarts the current week.
    pub async fn apply_check1(&self, session_id: &str, passed: bool) -> Result<TrainingSession> {
        let (session, ()) = self
            .mutate_session(session_id, |s| {
                s.apply_check1(passed);
                Ok(())
            })
            .await?;

        tracing::info!(
            user_id = session.user_id,
            session_id,
            passed,
            week = session.week_number,
            "Check1 answered"
        );

        Ok(session)
    }

    /// Apply the check2 (calorie) answer.
    ///
    /// Any non-empty text passes. No numeric validation is done; the
    /// acceptance rule is an open product decision.
    pub async fn apply_check2(&self, session_id: &str, calorie_text: &str) -> Result<TrainingSession> {
        let calorie_text = calorie_text.trim();
        if calorie_text.is_empty() {
            return Err(AppError::BadRequest("empty check2 answer".to_string()));
        }

        let (session, ()) = self
            .mutate_session(session_id, |s| {
                s.pass_check2();
                Ok(())
            })
            .await?;

        tracing::info!(
            user_id = session.user_id,
            session_id,
            week = session.week_number,
            value = calorie_text,
            "Check2 answered"
        );

        Ok(session)
    }

    /// Move the user's active session to the next week.
    pub async fn advance_week(&self, user_id: i64) -> Result<TrainingSession> {
        let session = self
            .mutate_active_for_user(user_id, |s| {
                s.advance_week();
                Ok(())
            })
            .await?;

        tracing::info!(user_id, week = session.week_number, "Advanced to next week");
        Ok(session)
    }

    /// Move the user's active session back one week (testing affordance).
    pub async fn regress_week(&self, user_id: i64) -> Result<TrainingSession> {
        let session = self
            .mutate_active_for_user(user_id, |s| s.regress_week())
            .await?;

        tracing::info!(user_id, week = session.week_number, "Went back one week");
        Ok(session)
    }

    /// Mark a session inactive (unanswered-reminder timeout).
    pub async fn deactivate(&self, session_id: &str) -> Result<TrainingSession> {
        let (session, ()) = self
            .mutate_session(session_id, |s| {
                s.active = false;
                Ok(())
            })
            .await?;

        tracing::info!(
            user_id = session.user_id,
            session_id,
            "Training session deactivated"
        );

        Ok(session)
    }

    // ─── Helpers ─────────────────────────────────────────────────

    async fn load_active(&self, session_id: &str) -> Result<TrainingSession> {
        self.db
            .get_session(session_id)
            .await?
            .filter(|s| s.active)
            .ok_or(AppError::SessionNotFound)
    }

    /// Load, transform and store one session under its owner's lock.
    ///
    /// Nothing is written when `f` fails.
    async fn mutate_session<T, F>(&self, session_id: &str, f: F) -> Result<(TrainingSession, T)>
    where
        F: FnOnce(&mut TrainingSession) -> Result<T> + Send,
    {
        let user_id = self.load_active(session_id).await?.user_id;

        let lock = user_lock(&self.locks, user_id);
        let _guard = lock.lock().await;

        // Re-read under the lock; another writer may have got there first.
        let mut session = self.load_active(session_id).await?;
        let value = f(&mut session)?;
        session.updated_at = Utc::now();
        self.db.update_session(&session).await?;

        Ok((session, value))
    }

    async fn mutate_active_for_user<F>(&self, user_id: i64, f: F) -> Result<TrainingSession>
    where
        F: FnOnce(&mut TrainingSession) -> Result<()> + Send,
    {
        let lock = user_lock(&self.locks, user_id);
        let _guard = lock.lock().await;

        let mut session = self.require_active_session(user_id).await?;
        f(&mut session)?;
        session.updated_at = Utc::now();
        self.db.update_session(&session).await?;

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;

    fn service() -> TrainingService {
        TrainingService::new(Arc::new(MemoryDb::new()), UserLocks::default())
    }

    #[tokio::test]
    async fn test_start_session_supersedes_previous() {
        let svc = service();
        let first = svc
            .start_session(1, TrainingDaysPattern::MonWedFri)
            .await
            .unwrap();
        let second = svc
            .start_session(1, TrainingDaysPattern::WedFriSun)
            .await
            .unwrap();

        let active = svc.require_active_session(1).await.unwrap();
        assert_eq!(active.id, second.id);
        assert_eq!(active.training_days_pattern, TrainingDaysPattern::WedFriSun);

        let err = svc.record_day_outcome(&first.id, true).await.unwrap_err();
        assert!(matches!(err, AppError::SessionNotFound));
    }

    #[tokio::test]
    async fn test_postponement_and_missed_day_change_nothing() {
        let svc = service();
        let s = svc
            .start_session(1, TrainingDaysPattern::MonWedFri)
            .await
            .unwrap();
        svc.record_day_outcome(&s.id, true).await.unwrap();

        assert!(!svc.record_day_outcome(&s.id, false).await.unwrap());
        svc.record_missed_day(&s.id).await.unwrap();

        let after = svc.require_active_session(1).await.unwrap();
        assert_eq!(after.completed_days_count, 1);
        assert_eq!(after.current_day_index, 1);
    }

    #[tokio::test]
    async fn test_skip_day_counts_as_completed() {
        let svc = service();
        let s = svc
            .start_session(1, TrainingDaysPattern::TueThuSat)
            .await
            .unwrap();

        svc.skip_day(&s.id).await.unwrap();
        svc.skip_day(&s.id).await.unwrap();
        assert!(svc.skip_day(&s.id).await.unwrap());

        let err = svc.skip_day(&s.id).await.unwrap_err();
        assert!(matches!(err, AppError::WeekAlreadyComplete));

        let after = svc.require_active_session(1).await.unwrap();
        assert_eq!(after.completed_days_count, 3);
        assert_eq!(after.current_day_index, 0);
    }

    #[tokio::test]
    async fn test_empty_check2_rejected() {
        let svc = service();
        let s = svc
            .start_session(1, TrainingDaysPattern::MonWedFri)
            .await
            .unwrap();

        let err = svc.apply_check2(&s.id, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(!svc.require_active_session(1).await.unwrap().check2_passed);

        // Anything non-empty passes
        let s = svc.apply_check2(&s.id, "много").await.unwrap();
        assert!(s.check2_passed);
    }

    #[tokio::test]
    async fn test_operations_without_session() {
        let svc = service();
        assert!(matches!(
            svc.advance_week(9).await,
            Err(AppError::SessionNotFound)
        ));
        assert!(matches!(
            svc.regress_week(9).await,
            Err(AppError::SessionNotFound)
        ));
        assert!(matches!(
            svc.deactivate("missing").await,
            Err(AppError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn test_deactivated_session_rejects_updates() {
        let svc = service();
        let s = svc
            .start_session(1, TrainingDaysPattern::MonWedFri)
            .await
            .unwrap();

        svc.deactivate(&s.id).await.unwrap();

        assert!(svc.get_active_session(1).await.unwrap().is_none());
        assert!(matches!(
            svc.apply_check1(&s.id, true).await,
            Err(AppError::SessionNotFound)
        ));
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore repository tests. These run only against the emulator:
//!
//! ```sh
//! FIRESTORE_EMULATOR_HOST=localhost:8080 cargo test --test firestore_integration
//! ```

use chrono::{NaiveDate, Utc};
use training_coach::db::TrainingRepository;
use training_coach::models::{TrainingDaysPattern, TrainingLogEntry, TrainingSession, TrainingType};

mod common;
use common::test_db;

/// Unique user id per test run so reruns against a live emulator don't collide.
fn unique_user() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default() % 1_000_000_000
}

#[tokio::test]
async fn test_session_roundtrip() {
    require_emulator!();
    let db = test_db().await;
    let user_id = unique_user();

    let mut session = TrainingSession::new(user_id, TrainingDaysPattern::MonWedFri, Utc::now());
    db.insert_session(&session).await.unwrap();

    let active = db.get_active_session(user_id).await.unwrap().unwrap();
    assert_eq!(active.id, session.id);
    assert_eq!(active.training_days_pattern, TrainingDaysPattern::MonWedFri);

    session.complete_day().unwrap();
    session.active = false;
    db.update_session(&session).await.unwrap();

    let stored = db.get_session(&session.id).await.unwrap().unwrap();
    assert_eq!(stored.completed_days_count, 1);
    assert_eq!(stored.current_day_index, 1);
    assert!(db.get_active_session(user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_log_entries_by_date() {
    require_emulator!();
    let db = test_db().await;
    let user_id = unique_user();
    let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

    let mut entry = TrainingLogEntry::pending(
        user_id,
        "session-1",
        day,
        TrainingType::ChestShouldersTriceps,
        Utc::now(),
    );
    db.insert_log_entry(&entry).await.unwrap();

    let entries = db.list_log_entries(user_id, day).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_pending());

    let other_day = day.succ_opt().unwrap();
    assert!(db.list_log_entries(user_id, other_day).await.unwrap().is_empty());

    entry.completed = Some(true);
    entry.pain_feedback = Some("Здоров".to_string());
    db.update_log_entry(&entry).await.unwrap();

    let stored = db.get_log_entry(&entry.id).await.unwrap().unwrap();
    assert_eq!(stored.completed, Some(true));
    assert_eq!(stored.pain_feedback.as_deref(), Some("Здоров"));
}

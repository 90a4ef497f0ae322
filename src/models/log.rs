// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training log model: one reminder cycle per user and calendar day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TrainingType;

/// Stored log record in the `training_log` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingLogEntry {
    /// Entry ID (also used as document ID)
    pub id: String,
    /// Chat user ID
    pub user_id: i64,
    /// Session that owned the entry when it was created
    pub session_id: String,
    /// Local calendar day the reminder is about
    #[serde(rename = "training_date")]
    pub date: NaiveDate,
    /// Workout type that was due
    #[serde(rename = "training_type")]
    pub training_type: TrainingType,
    /// `None` while pending, then the user's yes/no answer
    #[serde(default)]
    pub completed: Option<bool>,
    /// Pain label given after a completed workout
    #[serde(default)]
    pub pain_feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TrainingLogEntry {
    /// A new pending entry.
    pub fn pending(
        user_id: i64,
        session_id: &str,
        date: NaiveDate,
        training_type: TrainingType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            session_id: session_id.to_string(),
            date,
            training_type,
            completed: None,
            pain_feedback: None,
            created_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.completed.is_none()
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user conversation context.
//!
//! Records which multi-step flow a user is in, so that the next free-text
//! reply can be interpreted. A context is created when a flow starts and
//! removed on the flow's terminal transition.

use dashmap::DashMap;
use std::sync::Arc;

/// How a "day done" flow was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOrigin {
    /// Answer to a scheduled reminder; a log entry was resolved.
    Reminder,
    /// The "skip day" testing button; no log entry involved.
    Shortcut,
}

/// The step a user is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationContext {
    /// A workout was reported done; waiting for the pain answer.
    AwaitingPain {
        session_id: String,
        entry_id: Option<String>,
        origin: DayOrigin,
    },
    /// Waiting for the yes/no check1 answer.
    Check1 { session_id: String },
    /// Waiting for the free-text calorie answer.
    Check2 { session_id: String },
}

/// Conversation contexts keyed by user ID (shared across handlers).
#[derive(Clone, Default)]
pub struct ContextStore {
    inner: Arc<DashMap<i64, ConversationContext>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: i64) -> Option<ConversationContext> {
        self.inner.get(&user_id).map(|c| c.value().clone())
    }

    pub fn set(&self, user_id: i64, context: ConversationContext) {
        tracing::debug!(user_id, ?context, "Conversation context set");
        self.inner.insert(user_id, context);
    }

    pub fn clear(&self, user_id: i64) {
        if self.inner.remove(&user_id).is_some() {
            tracing::debug!(user_id, "Conversation context cleared");
        }
    }
}

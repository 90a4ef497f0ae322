// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod context;
pub mod log;
pub mod outbound;
pub mod session;

pub use context::{ContextStore, ConversationContext, DayOrigin};
pub use log::TrainingLogEntry;
pub use outbound::{InlineButton, Keyboard, OutboundMessage};
pub use session::{
    TrainingDaysPattern, TrainingSession, TrainingType, WeekEvaluation, DAYS_PER_WEEK,
};

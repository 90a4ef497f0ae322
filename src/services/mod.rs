// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod log_store;
pub mod messages;
pub mod notifier;
pub mod router;
pub mod scheduler;
pub mod session;

pub use log_store::LogStore;
pub use notifier::{MockNotifier, Notifier, TelegramClient};
pub use router::{classify, Command, PainLabel, ResponseRouter, RouterOutcome};
pub use scheduler::{
    spawn_timers, ReminderScheduler, SchedulerCommand, SchedulerJob, SchedulerQueue, SweepReport,
};
pub use session::{TrainingService, UserLocks};

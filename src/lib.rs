// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Training Coach: a chat assistant for a weekly three-day training program.
//!
//! This crate tracks which training day is due, records completion and pain
//! feedback, gates week progression behind periodic checks, and sends
//! scheduled reminders through a Telegram bot.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::TrainingRepository;
use models::ContextStore;
use services::{
    LogStore, Notifier, ReminderScheduler, ResponseRouter, SchedulerQueue, TrainingService,
    UserLocks,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn TrainingRepository>,
    pub training: TrainingService,
    pub log_store: LogStore,
    pub contexts: ContextStore,
    pub router: ResponseRouter,
    pub scheduler: ReminderScheduler,
    pub notifier: Arc<dyn Notifier>,
    pub scheduler_queue: SchedulerQueue,
}

impl AppState {
    /// Wire the services around one repository and notifier.
    pub fn new(
        config: Config,
        db: Arc<dyn TrainingRepository>,
        notifier: Arc<dyn Notifier>,
        scheduler_queue: SchedulerQueue,
    ) -> Self {
        let locks = UserLocks::default();
        let contexts = ContextStore::new();
        let training = TrainingService::new(db.clone(), locks.clone());
        let log_store = LogStore::new(db.clone(), locks);
        let router = ResponseRouter::new(training.clone(), log_store.clone(), contexts.clone());
        let scheduler = ReminderScheduler::new(
            training.clone(),
            log_store.clone(),
            contexts.clone(),
            notifier.clone(),
            config.operator_chat_id,
        );

        Self {
            config,
            db,
            training,
            log_store,
            contexts,
            router,
            scheduler,
            notifier,
            scheduler_queue,
        }
    }
}

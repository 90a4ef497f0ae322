// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training Coach Server
//!
//! Receives Telegram updates over a webhook and runs the daily reminder
//! jobs for active training sessions.

use std::sync::Arc;
use training_coach::{
    config::{Config, StorageBackend},
    db::{FirestoreDb, MemoryDb, TrainingRepository},
    services::{scheduler::QUEUE_CAPACITY, spawn_timers, Notifier, SchedulerQueue, TelegramClient},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.storage_backend,
        offset = %config.local_offset,
        "Starting Training Coach"
    );

    // Initialize storage
    let db: Arc<dyn TrainingRepository> = match config.storage_backend {
        StorageBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Arc::new(MemoryDb::new())
        }
    };

    let notifier: Arc<dyn Notifier> = Arc::new(TelegramClient::new(&config.telegram_bot_token));

    // Scheduler queue: timers and /tasks/run feed it, one worker drains it
    let (scheduler_queue, scheduler_rx) = SchedulerQueue::channel(QUEUE_CAPACITY);

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        db,
        notifier,
        scheduler_queue.clone(),
    ));

    tokio::spawn(state.scheduler.clone().run_worker(scheduler_rx));

    if config.scheduler_enabled {
        let timers = spawn_timers(scheduler_queue, config.local_offset);
        tracing::info!(count = timers.len(), "Scheduler timers started");
    } else {
        tracing::info!("Scheduler timers disabled; jobs run only via /tasks/run");
    }

    // Build router
    let app = training_coach::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["training_coach=debug", "info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry().with(filter).with(format).init();
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use std::sync::Arc;
use tokio::sync::mpsc;
use training_coach::config::Config;
use training_coach::db::{FirestoreDb, MemoryDb};
use training_coach::routes::create_router;
use training_coach::services::{MockNotifier, SchedulerCommand, SchedulerQueue};
use training_coach::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// In-memory app with a recording notifier.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub notifier: Arc<MockNotifier>,
    /// Receiving end of the scheduler queue (no worker runs in tests).
    pub scheduler_rx: mpsc::Receiver<SchedulerCommand>,
}

/// Create a test app with in-memory storage.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> TestApp {
    let notifier = Arc::new(MockNotifier::new());
    let (queue, scheduler_rx) = SchedulerQueue::channel(8);

    let state = Arc::new(AppState::new(
        config,
        Arc::new(MemoryDb::new()),
        notifier.clone(),
        queue,
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        notifier,
        scheduler_rx,
    }
}

/// Local time at the default test offset (UTC+3).
#[allow(dead_code)]
pub fn local(y: i32, m: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(y, m, d, h, mi, 0)
        .unwrap()
}

/// 2024-01-15 is a Monday.
#[allow(dead_code)]
pub fn jan(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reminder scheduler.
//!
//! Three daily timers (and the `/tasks/run/{job}` endpoint) put
//! [`SchedulerCommand`]s on one bounded queue. A single worker drains it, so
//! a job never runs concurrently with itself and a slow run only delays the
//! next one. [`ReminderScheduler::run_job`] takes `now` explicitly and never
//! reads the wall clock.

use crate::error::{AppError, Result};
use crate::models::{ContextStore, TrainingSession};
use crate::services::log_store::LogStore;
use crate::services::messages;
use crate::services::notifier::Notifier;
use crate::services::session::TrainingService;
use crate::time_utils::days_before;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use futures_util::stream::{self, StreamExt};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Maximum sessions processed concurrently within one sweep.
const MAX_CONCURRENT_SESSIONS: usize = 8;

/// Default capacity of the scheduler queue.
pub const QUEUE_CAPACITY: usize = 16;

/// The three daily jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulerJob {
    /// 23:00: prompt users whose training day is today.
    DailyCheck,
    /// 16:00: remind users who left yesterday's prompt unanswered.
    NextDayReminder,
    /// 23:59: drop sessions with a prompt unanswered for two days.
    UnansweredCleanup,
}

impl SchedulerJob {
    pub const ALL: [SchedulerJob; 3] = [
        SchedulerJob::DailyCheck,
        SchedulerJob::NextDayReminder,
        SchedulerJob::UnansweredCleanup,
    ];

    /// Local wall-clock time the job fires at.
    pub fn fire_time(self) -> NaiveTime {
        let (h, m) = match self {
            SchedulerJob::DailyCheck => (23, 0),
            SchedulerJob::NextDayReminder => (16, 0),
            SchedulerJob::UnansweredCleanup => (23, 59),
        };
        NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
    }

    /// Name used in `/tasks/run/{job}`.
    pub fn slug(self) -> &'static str {
        match self {
            SchedulerJob::DailyCheck => "daily-check",
            SchedulerJob::NextDayReminder => "next-day-reminder",
            SchedulerJob::UnansweredCleanup => "unanswered-cleanup",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|j| j.slug() == slug)
    }
}

impl fmt::Display for SchedulerJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// One queued job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerCommand {
    pub job: SchedulerJob,
    /// Local time the run is evaluated at.
    pub now: DateTime<FixedOffset>,
}

/// Sending half of the scheduler queue.
#[derive(Clone)]
pub struct SchedulerQueue {
    tx: mpsc::Sender<SchedulerCommand>,
}

impl SchedulerQueue {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SchedulerCommand>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Queue a run, waiting if the queue is full.
    pub async fn enqueue(&self, command: SchedulerCommand) -> Result<()> {
        tracing::debug!(job = %command.job, now = %command.now, "Scheduler job queued");
        self.tx
            .send(command)
            .await
            .map_err(|_| AppError::Internal(anyhow::anyhow!("scheduler queue closed")))
    }
}

/// One session that could not be processed during a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    pub user_id: i64,
    pub session_id: String,
    pub error: String,
}

/// Summary of one job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub job: SchedulerJob,
    /// Active sessions looked at
    pub scanned: usize,
    /// Sessions prompted, reminded or dropped
    pub acted: usize,
    pub failures: Vec<SweepFailure>,
}

/// Runs the daily jobs over all active sessions.
#[derive(Clone)]
pub struct ReminderScheduler {
    training: TrainingService,
    log_store: LogStore,
    contexts: ContextStore,
    notifier: Arc<dyn Notifier>,
    operator_chat_id: Option<i64>,
}

impl ReminderScheduler {
    pub fn new(
        training: TrainingService,
        log_store: LogStore,
        contexts: ContextStore,
        notifier: Arc<dyn Notifier>,
        operator_chat_id: Option<i64>,
    ) -> Self {
        Self {
            training,
            log_store,
            contexts,
            notifier,
            operator_chat_id,
        }
    }

    /// Drain the queue until every sender is gone.
    pub async fn run_worker(self, mut rx: mpsc::Receiver<SchedulerCommand>) {
        tracing::info!("Scheduler worker started");
        while let Some(command) = rx.recv().await {
            if let Err(e) = self.run_job(command.job, command.now).await {
                tracing::error!(job = %command.job, error = %e, "Scheduler job failed");
            }
        }
        tracing::info!("Scheduler worker stopped");
    }

    /// Run one job over every active session.
    ///
    /// Per-session errors are collected in the report; only failing to list
    /// the sessions aborts the run.
    pub async fn run_job(
        &self,
        job: SchedulerJob,
        now: DateTime<FixedOffset>,
    ) -> Result<SweepReport> {
        let sessions = self.training.list_active_sessions().await?;
        let scanned = sessions.len();

        let results: Vec<(TrainingSession, Result<bool>)> = stream::iter(sessions)
            .map(|session| async move {
                let result = match job {
                    SchedulerJob::DailyCheck => self.daily_check(&session, now).await,
                    SchedulerJob::NextDayReminder => self.next_day_reminder(&session, now).await,
                    SchedulerJob::UnansweredCleanup => {
                        self.unanswered_cleanup(&session, now).await
                    }
                };
                (session, result)
            })
            .buffer_unordered(MAX_CONCURRENT_SESSIONS)
            .collect()
            .await;

        let mut acted = 0;
        let mut failures = Vec::new();
        for (session, result) in results {
            match result {
                Ok(true) => acted += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        job = %job,
                        user_id = session.user_id,
                        session_id = %session.id,
                        error = %e,
                        "Scheduler failed for session"
                    );
                    failures.push(SweepFailure {
                        user_id: session.user_id,
                        session_id: session.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            job = %job,
            now = %now,
            scanned,
            acted,
            failed = failures.len(),
            "Scheduler job finished"
        );

        let report = SweepReport {
            job,
            scanned,
            acted,
            failures,
        };
        self.report_failures(&report).await;

        Ok(report)
    }

    async fn report_failures(&self, report: &SweepReport) {
        let Some(chat_id) = self.operator_chat_id else {
            return;
        };
        if report.failures.is_empty() {
            return;
        }

        let message =
            messages::sweep_failures(report.job.slug(), report.failures.len(), report.scanned);
        if let Err(e) = self.notifier.send(chat_id, &message).await {
            tracing::warn!(error = %e, "Failed to notify operator about sweep failures");
        }
    }

    /// Create today's pending entry and prompt the user.
    async fn daily_check(
        &self,
        session: &TrainingSession,
        now: DateTime<FixedOffset>,
    ) -> Result<bool> {
        let today = now.date_naive();
        if !session.training_days_pattern.is_training_day(today.weekday()) {
            return Ok(false);
        }

        // Answered days are not asked again
        if self
            .log_store
            .has_entry_for(session.user_id, &session.id, today)
            .await?
        {
            return Ok(false);
        }

        let training_type = session.current_training_type();
        let created = self
            .log_store
            .create_pending_entry(session.user_id, &session.id, today, training_type)
            .await?;
        if created.is_none() {
            return Ok(false);
        }

        self.notifier
            .send(session.user_id, &messages::daily_check(training_type))
            .await?;
        Ok(true)
    }

    /// Re-send yesterday's prompt if it is still unanswered.
    async fn next_day_reminder(
        &self,
        session: &TrainingSession,
        now: DateTime<FixedOffset>,
    ) -> Result<bool> {
        let Some(yesterday) = days_before(now.date_naive(), 1) else {
            return Ok(false);
        };
        if !session
            .training_days_pattern
            .is_training_day(yesterday.weekday())
        {
            return Ok(false);
        }

        let Some(entry) = self
            .log_store
            .find_pending(session.user_id, &session.id, yesterday)
            .await?
        else {
            return Ok(false);
        };

        self.notifier
            .send(
                session.user_id,
                &messages::next_day_reminder(entry.training_type),
            )
            .await?;
        Ok(true)
    }

    /// Drop the session if the prompt from two days ago is still pending.
    async fn unanswered_cleanup(
        &self,
        session: &TrainingSession,
        now: DateTime<FixedOffset>,
    ) -> Result<bool> {
        let Some(two_days_ago) = days_before(now.date_naive(), 2) else {
            return Ok(false);
        };

        if self
            .log_store
            .find_pending(session.user_id, &session.id, two_days_ago)
            .await?
            .is_none()
        {
            return Ok(false);
        }

        self.training.deactivate(&session.id).await?;
        self.contexts.clear(session.user_id);

        self.notifier
            .send(session.user_id, &messages::session_dropped())
            .await?;
        Ok(true)
    }
}

/// Next occurrence of `at` strictly after `now`, in `now`'s offset.
pub fn next_fire(now: DateTime<FixedOffset>, at: NaiveTime) -> DateTime<FixedOffset> {
    let mut date = now.date_naive();
    if now.time() >= at {
        date = date.succ_opt().unwrap_or(date);
    }

    now.offset()
        .from_local_datetime(&date.and_time(at))
        .single()
        .unwrap_or_else(|| now + Duration::days(1))
}

/// Spawn one timer task per job, feeding `queue` at each fire time.
pub fn spawn_timers(queue: SchedulerQueue, offset: FixedOffset) -> Vec<JoinHandle<()>> {
    SchedulerJob::ALL
        .into_iter()
        .map(|job| {
            let queue = queue.clone();
            tokio::spawn(async move {
                loop {
                    let now = Utc::now().with_timezone(&offset);
                    let fire_at = next_fire(now, job.fire_time());
                    let wait = (fire_at - now).to_std().unwrap_or_default();

                    tracing::debug!(job = %job, fire_at = %fire_at, "Scheduler timer armed");
                    tokio::time::sleep(wait).await;

                    if queue
                        .enqueue(SchedulerCommand { job, now: fire_at })
                        .await
                        .is_err()
                    {
                        tracing::warn!(job = %job, "Scheduler queue closed, stopping timer");
                        break;
                    }
                }
            })
        })
        .collect()
}

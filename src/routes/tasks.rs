// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scheduler job triggers.
//!
//! Lets an external cron drive the daily jobs. Runs go through the same
//! queue as the in-process timers, so they never overlap.

use crate::error::AppError;
use crate::services::{SchedulerCommand, SchedulerJob};
use crate::AppState;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Task routes (bearer-authenticated in `create_router`).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tasks/run/{job}", post(run_job))
}

#[derive(Serialize)]
pub struct QueuedResponse {
    pub job: String,
    pub now: String,
}

/// Queue one job run at the current local time.
async fn run_job(
    State(state): State<Arc<AppState>>,
    Path(job): Path<String>,
) -> Result<(StatusCode, Json<QueuedResponse>), AppError> {
    let job = SchedulerJob::from_slug(&job)
        .ok_or_else(|| AppError::BadRequest(format!("unknown job: {}", job)))?;

    let now = state.config.local_now();
    state
        .scheduler_queue
        .enqueue(SchedulerCommand { job, now })
        .await?;

    tracing::info!(job = %job, now = %now, "Scheduler job triggered over HTTP");

    Ok((
        StatusCode::ACCEPTED,
        Json(QueuedResponse {
            job: job.slug().to_string(),
            now: now.to_rfc3339(),
        }),
    ))
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook route for Telegram updates.

use crate::error::AppError;
use crate::middleware::secret_matches;
use crate::services::RouterOutcome;
use crate::AppState;
use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Header Telegram sets to the `secret_token` given to `setWebhook`.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook/{uuid}", post(handle_update))
}

/// Telegram update (only the fields this service reads).
#[derive(Deserialize, Debug)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Deserialize, Debug)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Chat {
    pub id: i64,
}

#[derive(Deserialize, Debug)]
pub struct User {
    pub id: i64,
}

#[derive(Deserialize, Debug)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub data: Option<String>,
}

/// Handle one update (POST).
///
/// Once authenticated, always answers 200 so Telegram does not redeliver;
/// processing failures are logged.
async fn handle_update(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Value>,
) -> StatusCode {
    // Validate Path UUID
    if uuid != state.config.webhook_path_uuid {
        tracing::warn!(
            received_uuid = %uuid,
            "Security Alert: Webhook path UUID mismatch"
        );
        return StatusCode::NOT_FOUND;
    }

    let provided = headers
        .get(SECRET_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());
    if !secret_matches(provided, &state.config.webhook_secret_token) {
        tracing::warn!("Security Alert: Webhook secret token mismatch");
        return StatusCode::FORBIDDEN;
    }

    let update: Update = match serde_json::from_value(payload) {
        Ok(u) => u,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse Telegram update");
            return StatusCode::OK; // Still return 200 to avoid redelivery
        }
    };

    if let Err(e) = process_update(&state, update).await {
        tracing::error!(error = %e, "Failed to process Telegram update");
    }

    StatusCode::OK
}

async fn process_update(state: &AppState, update: Update) -> Result<(), AppError> {
    if let Some(query) = update.callback_query {
        let user_id = query.from.id;
        tracing::info!(
            update_id = update.update_id,
            user_id,
            data = ?query.data,
            "Callback query received"
        );

        if let Err(e) = state.notifier.answer_callback(&query.id).await {
            tracing::warn!(user_id, error = %e, "Failed to answer callback query");
        }

        let Some(data) = query.data else {
            return Ok(());
        };
        let outcome = state.router.handle_callback(user_id, &data).await?;
        deliver(state, user_id, outcome).await;
        return Ok(());
    }

    let Some(message) = update.message else {
        tracing::debug!(update_id = update.update_id, "Ignoring update without message");
        return Ok(());
    };
    let Some(text) = message.text else {
        return Ok(());
    };

    let chat_id = message.chat.id;
    let user_id = message.from.map(|u| u.id).unwrap_or(chat_id);
    tracing::info!(update_id = update.update_id, user_id, "Message received");

    let today = state.config.local_today();
    let outcome = state.router.handle_message(user_id, &text, today).await?;
    deliver(state, chat_id, outcome).await;
    Ok(())
}

/// Send replies in order. A failed send is logged and the rest still go out.
async fn deliver(state: &AppState, chat_id: i64, outcome: RouterOutcome) {
    let replies = match outcome {
        RouterOutcome::Replies(replies) => replies,
        RouterOutcome::Unhandled => {
            tracing::debug!(chat_id, "Message left to the menu handler");
            return;
        }
    };

    for (index, reply) in replies.iter().enumerate() {
        if let Err(e) = state.notifier.send(chat_id, reply).await {
            tracing::warn!(chat_id, index, error = %e, "Failed to deliver reply");
        }
    }
}

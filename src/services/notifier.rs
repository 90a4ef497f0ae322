// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Outbound chat delivery.
//!
//! Handles:
//! - Telegram Bot API `sendMessage` with reply or inline keyboards
//! - Callback query acknowledgement
//! - Rate limit detection (logged, surfaced as a transport error)

use crate::error::{AppError, Result};
use crate::models::{Keyboard, OutboundMessage};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Mutex;

/// Delivers messages to a chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: i64, message: &OutboundMessage) -> Result<()>;

    /// Acknowledge an inline-button press. No-op by default.
    async fn answer_callback(&self, _callback_query_id: &str) -> Result<()> {
        Ok(())
    }
}

/// Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("https://api.telegram.org/bot{}", bot_token),
        }
    }

    async fn call(&self, method: &str, body: &Value) -> Result<()> {
        let url = format!("{}/{}", self.base_url, method);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        self.check_response(method, response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, method: &str, response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!(method, "Telegram rate limit hit (429)");
            return Err(AppError::Transport(AppError::TRANSPORT_RATE_LIMIT.to_string()));
        }

        Err(AppError::Transport(format!("HTTP {}: {}", status, body)))
    }
}

/// Telegram `reply_markup` for a keyboard, if it changes anything.
fn reply_markup(keyboard: &Keyboard) -> Option<Value> {
    match keyboard {
        Keyboard::Unchanged => None,
        Keyboard::Reply(rows) => Some(json!({
            "keyboard": rows
                .iter()
                .map(|row| row.iter().map(|label| json!({ "text": label })).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
            "resize_keyboard": true,
        })),
        Keyboard::Inline(rows) => Some(json!({ "inline_keyboard": rows })),
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, chat_id: i64, message: &OutboundMessage) -> Result<()> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": message.text,
        });
        if let Some(markup) = reply_markup(&message.keyboard) {
            body["reply_markup"] = markup;
        }

        self.call("sendMessage", &body).await
    }

    async fn answer_callback(&self, callback_query_id: &str) -> Result<()> {
        self.call(
            "answerCallbackQuery",
            &json!({ "callback_query_id": callback_query_id }),
        )
        .await
    }
}

/// Recording notifier for tests and local runs.
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<(i64, OutboundMessage)>>,
    fail_chat_ids: Mutex<HashSet<i64>>,
    fail_next: Mutex<usize>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make delivery to these chats fail with a transport error.
    pub fn set_fail_chat_ids(&self, ids: impl IntoIterator<Item = i64>) {
        if let Ok(mut fail) = self.fail_chat_ids.lock() {
            *fail = ids.into_iter().collect();
        }
    }

    /// Make the next `count` sends fail, whatever the chat.
    pub fn fail_next_sends(&self, count: usize) {
        if let Ok(mut fail) = self.fail_next.lock() {
            *fail = count;
        }
    }

    /// Messages delivered so far, in order.
    pub fn sent(&self) -> Vec<(i64, OutboundMessage)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Messages delivered to one chat.
    pub fn sent_to(&self, chat_id: i64) -> Vec<OutboundMessage> {
        self.sent()
            .into_iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, m)| m)
            .collect()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, chat_id: i64, message: &OutboundMessage) -> Result<()> {
        let fail_once = self
            .fail_next
            .lock()
            .map(|mut n| {
                let hit = *n > 0;
                *n = n.saturating_sub(1);
                hit
            })
            .unwrap_or(false);
        let should_fail = fail_once
            || self
                .fail_chat_ids
                .lock()
                .map(|f| f.contains(&chat_id))
                .unwrap_or(false);
        if should_fail {
            tracing::warn!(chat_id, "Mock delivery failure");
            return Err(AppError::Transport(format!("mock failure for {chat_id}")));
        }

        if let Ok(mut sent) = self.sent.lock() {
            sent.push((chat_id, message.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_markup_shapes() {
        assert!(reply_markup(&Keyboard::Unchanged).is_none());

        let reply = reply_markup(&Keyboard::reply(&[&["a", "b"]])).unwrap();
        assert_eq!(reply["keyboard"][0][1]["text"], "b");
        assert_eq!(reply["resize_keyboard"], true);

        let inline = reply_markup(&crate::services::messages::choose_pattern().keyboard).unwrap();
        assert_eq!(
            inline["inline_keyboard"][0][0]["callback_data"],
            "days_mon_wed_fri"
        );
    }

    #[tokio::test]
    async fn test_mock_notifier_failures() {
        let mock = MockNotifier::new();
        mock.set_fail_chat_ids([2]);

        mock.send(1, &OutboundMessage::text("hi")).await.unwrap();
        assert!(mock.send(2, &OutboundMessage::text("hi")).await.is_err());

        assert_eq!(mock.sent().len(), 1);
        assert_eq!(mock.sent_to(1)[0].text, "hi");

        mock.fail_next_sends(1);
        assert!(mock.send(1, &OutboundMessage::text("lost")).await.is_err());
        mock.send(1, &OutboundMessage::text("kept")).await.unwrap();
        assert_eq!(mock.sent_to(1).len(), 2);
    }
}

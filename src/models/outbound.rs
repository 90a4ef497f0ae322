// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Outbound chat messages, independent of the transport.

use serde::Serialize;

/// Inline button with a callback payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

/// Keyboard attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Keyboard {
    /// Keep whatever keyboard the user currently has.
    #[default]
    Unchanged,
    /// Reply keyboard rows (buttons send their label as text).
    Reply(Vec<Vec<String>>),
    /// Inline keyboard rows attached to the message.
    Inline(Vec<Vec<InlineButton>>),
}

impl Keyboard {
    pub fn reply(rows: &[&[&str]]) -> Self {
        Keyboard::Reply(
            rows.iter()
                .map(|row| row.iter().map(|label| label.to_string()).collect())
                .collect(),
        )
    }
}

/// A message to deliver to one chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub keyboard: Keyboard,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Unchanged,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = keyboard;
        self
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Response router: inbound text and buttons to state-machine commands.
//!
//! Classification is a pure function of the text and the user's
//! conversation context. Matching is case-insensitive and the first rule
//! that matches wins:
//! 1. Open check step (check1 yes/no, or any text for check2)
//! 2. Day outcome ("done" / "not done")
//! 3. Pain labels
//! 4. Training navigation buttons
//!
//! Anything else is left to the general menu handler.

use crate::error::{AppError, Result};
use crate::models::{
    ContextStore, ConversationContext, DayOrigin, OutboundMessage, TrainingDaysPattern,
    TrainingSession, WeekEvaluation,
};
use crate::services::log_store::LogStore;
use crate::services::messages;
use crate::services::session::TrainingService;
use chrono::NaiveDate;

/// Pain answers offered after a completed workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PainLabel {
    Healthy,
    Arm,
    Back,
    Legs,
}

impl PainLabel {
    pub const ALL: [PainLabel; 4] = [
        PainLabel::Healthy,
        PainLabel::Arm,
        PainLabel::Back,
        PainLabel::Legs,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PainLabel::Healthy => messages::PAIN_HEALTHY,
            PainLabel::Arm => messages::PAIN_ARM,
            PainLabel::Back => messages::PAIN_BACK,
            PainLabel::Legs => messages::PAIN_LEGS,
        }
    }
}

/// One classified inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Check1Answer { session_id: String, passed: bool },
    Check2Answer { session_id: String, text: String },
    DayDone,
    DayNotDone,
    Pain(PainLabel),
    SkipDay,
    MissedDayTest,
    PreviousWeek,
    NextWeek,
    ShowStatus,
    ShowSchedule,
    ShowTodayExercises,
    TrainingProcess,
    SelectPattern(TrainingDaysPattern),
}

const CHECK1_YES: [&str; 4] = ["✅ да", "да", "yes", "✅"];
const CHECK1_NO: [&str; 4] = ["❌ нет", "нет", "no", "❌"];

fn eq_label(text: &str, label: &str) -> bool {
    text == label.to_lowercase()
}

/// Classify one inbound text. `None` means the text is not ours.
pub fn classify(text: &str, context: Option<&ConversationContext>) -> Option<Command> {
    let raw = text.trim();
    let text = raw.to_lowercase();

    match context {
        Some(ConversationContext::Check1 { session_id }) => {
            let passed = if CHECK1_YES.contains(&text.as_str()) {
                Some(true)
            } else if CHECK1_NO.contains(&text.as_str()) {
                Some(false)
            } else {
                None
            };
            if let Some(passed) = passed {
                return Some(Command::Check1Answer {
                    session_id: session_id.clone(),
                    passed,
                });
            }
        }
        Some(ConversationContext::Check2 { session_id }) => {
            return Some(Command::Check2Answer {
                session_id: session_id.clone(),
                text: raw.to_string(),
            });
        }
        _ => {}
    }

    // "не выполнил" also contains "выполнил"
    if text.contains("не выполнил") {
        return Some(Command::DayNotDone);
    }
    if text.contains("да, выполнил") || text == "выполнил" {
        return Some(Command::DayDone);
    }

    if let Some(pain) = PainLabel::ALL
        .into_iter()
        .find(|p| eq_label(&text, p.label()))
    {
        return Some(Command::Pain(pain));
    }

    let navigation = [
        (messages::BTN_SKIP_DAY, Command::SkipDay),
        (messages::BTN_MISSED_TEST, Command::MissedDayTest),
        (messages::BTN_PREVIOUS_WEEK, Command::PreviousWeek),
        (messages::BTN_NEXT_WEEK, Command::NextWeek),
        (messages::BTN_STATUS, Command::ShowStatus),
        (messages::BTN_SCHEDULE, Command::ShowSchedule),
        (messages::BTN_TODAY_EXERCISES, Command::ShowTodayExercises),
    ];
    if let Some((_, command)) = navigation
        .into_iter()
        .find(|(label, _)| eq_label(&text, label))
    {
        return Some(command);
    }

    if text.contains(messages::TRAINING_PROCESS_COMMAND) {
        return Some(Command::TrainingProcess);
    }

    TrainingDaysPattern::from_label(&text).map(Command::SelectPattern)
}

/// Result of routing one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterOutcome {
    /// Handled here; send these replies in order.
    Replies(Vec<OutboundMessage>),
    /// Not part of the training vocabulary.
    Unhandled,
}

/// Executes classified commands against the training services.
#[derive(Clone)]
pub struct ResponseRouter {
    training: TrainingService,
    log_store: LogStore,
    contexts: ContextStore,
}

impl ResponseRouter {
    pub fn new(training: TrainingService, log_store: LogStore, contexts: ContextStore) -> Self {
        Self {
            training,
            log_store,
            contexts,
        }
    }

    /// Route one text message. `today` is the user's local calendar date.
    ///
    /// Domain errors become short replies; only storage and internal
    /// errors are returned.
    pub async fn handle_message(
        &self,
        user_id: i64,
        text: &str,
        today: NaiveDate,
    ) -> Result<RouterOutcome> {
        let context = self.contexts.get(user_id);
        let Some(command) = classify(text, context.as_ref()) else {
            tracing::debug!(user_id, "Inbound message not in the training vocabulary");
            return Ok(RouterOutcome::Unhandled);
        };

        tracing::debug!(user_id, ?command, "Inbound message classified");

        let result = self.execute(user_id, command, context, today).await;
        self.into_outcome(user_id, result)
    }

    /// Route an inline-button press.
    pub async fn handle_callback(&self, user_id: i64, data: &str) -> Result<RouterOutcome> {
        let Some(pattern) = TrainingDaysPattern::from_callback_data(data) else {
            tracing::debug!(user_id, data, "Unknown callback data");
            return Ok(RouterOutcome::Unhandled);
        };

        let result = self.select_pattern(user_id, pattern).await;
        self.into_outcome(user_id, result)
    }

    fn into_outcome(
        &self,
        user_id: i64,
        result: Result<Vec<OutboundMessage>>,
    ) -> Result<RouterOutcome> {
        match result {
            Ok(replies) => Ok(RouterOutcome::Replies(replies)),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(user_id, error = %e, "Recoverable error while routing");
                let reply = match e {
                    AppError::SessionNotFound => {
                        // Any open step belonged to a session that is gone
                        self.contexts.clear(user_id);
                        messages::no_active_session()
                    }
                    AppError::InvalidWeekRegression => messages::already_first_week(),
                    AppError::EntryNotFound(_) => messages::training_not_found(),
                    _ => OutboundMessage::text("❌ Ошибка обработки"),
                };
                Ok(RouterOutcome::Replies(vec![reply]))
            }
            Err(e) => Err(e),
        }
    }

    async fn execute(
        &self,
        user_id: i64,
        command: Command,
        context: Option<ConversationContext>,
        today: NaiveDate,
    ) -> Result<Vec<OutboundMessage>> {
        match command {
            Command::Check1Answer { session_id, passed } => {
                self.check1(user_id, session_id, passed).await
            }
            Command::Check2Answer { session_id, text } => {
                self.check2(user_id, &session_id, &text).await
            }
            Command::DayDone => self.day_done(user_id, today).await,
            Command::DayNotDone => self.day_not_done(user_id, today).await,
            Command::Pain(label) => self.pain(user_id, context, label).await,
            Command::SkipDay => self.skip_day(user_id).await,
            Command::MissedDayTest => {
                let session = self.training.require_active_session(user_id).await?;
                let session = self.training.record_missed_day(&session.id).await?;
                Ok(vec![messages::missed_day(session.current_training_type())])
            }
            Command::PreviousWeek => {
                let session = self.training.regress_week(user_id).await?;
                self.contexts.clear(user_id);
                Ok(vec![messages::moved_to_previous_week(session.week_number)])
            }
            Command::NextWeek => {
                let session = self.training.advance_week(user_id).await?;
                self.contexts.clear(user_id);
                Ok(vec![messages::moved_to_next_week(session.week_number)])
            }
            Command::ShowStatus => {
                let session = self.training.require_active_session(user_id).await?;
                Ok(vec![messages::status(&session)])
            }
            Command::ShowSchedule => {
                let session = self.training.require_active_session(user_id).await?;
                Ok(vec![messages::schedule(&session)])
            }
            Command::ShowTodayExercises => {
                let session = self.training.require_active_session(user_id).await?;
                Ok(vec![messages::today_exercises(&session)])
            }
            Command::TrainingProcess => match self.training.get_active_session(user_id).await? {
                Some(session) => Ok(vec![messages::status(&session)]),
                None => Ok(vec![messages::choose_pattern()]),
            },
            Command::SelectPattern(pattern) => self.select_pattern(user_id, pattern).await,
        }
    }

    // ─── Day outcome ─────────────────────────────────────────────

    async fn day_done(&self, user_id: i64, today: NaiveDate) -> Result<Vec<OutboundMessage>> {
        let session = self.training.require_active_session(user_id).await?;
        let Some(entry) = self
            .log_store
            .find_recent_pending(user_id, &session.id, today)
            .await?
        else {
            return Ok(vec![messages::training_not_found()]);
        };

        self.log_store.resolve(&entry.id, true, None).await?;

        self.contexts.set(
            user_id,
            ConversationContext::AwaitingPain {
                session_id: session.id,
                entry_id: Some(entry.id),
                origin: DayOrigin::Reminder,
            },
        );

        Ok(vec![messages::pain_prompt()])
    }

    async fn day_not_done(&self, user_id: i64, today: NaiveDate) -> Result<Vec<OutboundMessage>> {
        let session = self.training.require_active_session(user_id).await?;
        let Some(entry) = self
            .log_store
            .find_recent_pending(user_id, &session.id, today)
            .await?
        else {
            return Ok(vec![messages::training_not_found()]);
        };

        self.log_store.resolve(&entry.id, false, None).await?;
        self.training.record_day_outcome(&session.id, false).await?;

        Ok(vec![messages::postponed(entry.training_type)])
    }

    async fn skip_day(&self, user_id: i64) -> Result<Vec<OutboundMessage>> {
        let session = self.training.require_active_session(user_id).await?;

        self.contexts.set(
            user_id,
            ConversationContext::AwaitingPain {
                session_id: session.id,
                entry_id: None,
                origin: DayOrigin::Shortcut,
            },
        );

        Ok(vec![messages::pain_prompt()])
    }

    async fn pain(
        &self,
        user_id: i64,
        context: Option<ConversationContext>,
        label: PainLabel,
    ) -> Result<Vec<OutboundMessage>> {
        let Some(ConversationContext::AwaitingPain {
            session_id,
            entry_id,
            origin,
        }) = context
        else {
            return Ok(vec![messages::no_pain_question()]);
        };

        if let Some(entry_id) = entry_id.as_deref() {
            match self
                .log_store
                .record_pain_feedback(entry_id, label.label())
                .await
            {
                Ok(()) => {}
                Err(AppError::EntryNotFound(id)) => {
                    tracing::warn!(user_id, entry_id = %id, "Pain feedback for missing entry");
                }
                Err(e) => return Err(e),
            }
        }

        if label != PainLabel::Healthy {
            // Stored for later adaptation; the user can still answer "healthy"
            return Ok(vec![messages::pain_in_development()]);
        }

        self.contexts.clear(user_id);

        let recorded = match origin {
            DayOrigin::Reminder => self.training.record_day_outcome(&session_id, true).await,
            DayOrigin::Shortcut => self.training.skip_day(&session_id).await,
        };
        match recorded {
            Ok(_) => {}
            Err(AppError::WeekAlreadyComplete) => {
                tracing::warn!(user_id, session_id = %session_id, "Day answered on a completed week");
            }
            Err(e) => return Err(e),
        }

        let session = self.training.require_active_session(user_id).await?;
        Ok(self.render_week_state(user_id, &session))
    }

    /// Replies after a day was counted, opening a gate step if one is due.
    fn render_week_state(&self, user_id: i64, session: &TrainingSession) -> Vec<OutboundMessage> {
        match self.training.evaluate_week_completion(session) {
            WeekEvaluation::InProgress { .. } => vec![messages::day_counted()],
            WeekEvaluation::Complete { week_number } => {
                self.contexts.clear(user_id);
                vec![
                    messages::week_done(week_number),
                    messages::await_manual_advance(),
                ]
            }
            WeekEvaluation::Check1Required { week_number } => {
                self.contexts.set(
                    user_id,
                    ConversationContext::Check1 {
                        session_id: session.id.clone(),
                    },
                );
                vec![messages::week_done(week_number), messages::check1_prompt()]
            }
            WeekEvaluation::Check2Required { week_number } => {
                self.contexts.set(
                    user_id,
                    ConversationContext::Check2 {
                        session_id: session.id.clone(),
                    },
                );
                vec![messages::week_done(week_number), messages::check2_prompt()]
            }
        }
    }

    // ─── Week gates ──────────────────────────────────────────────

    async fn check1(
        &self,
        user_id: i64,
        session_id: String,
        passed: bool,
    ) -> Result<Vec<OutboundMessage>> {
        let session = self.training.apply_check1(&session_id, passed).await?;

        if !passed {
            self.contexts.clear(user_id);
            return Ok(vec![messages::check1_failed()]);
        }

        let mut replies = vec![messages::check1_passed()];
        match self.training.evaluate_week_completion(&session) {
            WeekEvaluation::Check2Required { .. } => {
                self.contexts
                    .set(user_id, ConversationContext::Check2 { session_id });
                replies.push(messages::check2_prompt());
            }
            _ => {
                self.contexts.clear(user_id);
                replies.push(messages::await_manual_advance());
            }
        }
        Ok(replies)
    }

    async fn check2(
        &self,
        user_id: i64,
        session_id: &str,
        text: &str,
    ) -> Result<Vec<OutboundMessage>> {
        if text.trim().is_empty() {
            return Ok(vec![messages::check2_prompt()]);
        }

        self.training.apply_check2(session_id, text).await?;
        self.contexts.clear(user_id);

        Ok(vec![
            messages::check2_accepted(text.trim()),
            messages::await_manual_advance(),
        ])
    }

    async fn select_pattern(
        &self,
        user_id: i64,
        pattern: TrainingDaysPattern,
    ) -> Result<Vec<OutboundMessage>> {
        let session = self.training.start_session(user_id, pattern).await?;
        self.contexts.clear(user_id);
        Ok(vec![messages::session_started(&session)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check1_ctx() -> ConversationContext {
        ConversationContext::Check1 {
            session_id: "s".to_string(),
        }
    }

    fn check2_ctx() -> ConversationContext {
        ConversationContext::Check2 {
            session_id: "s".to_string(),
        }
    }

    fn check1(passed: bool) -> Option<Command> {
        Some(Command::Check1Answer {
            session_id: "s".to_string(),
            passed,
        })
    }

    fn check2(text: &str) -> Option<Command> {
        Some(Command::Check2Answer {
            session_id: "s".to_string(),
            text: text.to_string(),
        })
    }

    #[test]
    fn test_day_outcome_vocabulary() {
        assert_eq!(classify("✅ Да, выполнил", None), Some(Command::DayDone));
        assert_eq!(classify("❌ Нет, не выполнил", None), Some(Command::DayNotDone));
        assert_eq!(classify("нет, НЕ ВЫПОЛНИЛ", None), Some(Command::DayNotDone));
        assert_eq!(classify("да, выполнил", None), Some(Command::DayDone));
    }

    #[test]
    fn test_pain_vocabulary_is_case_insensitive() {
        assert_eq!(classify("здоров", None), Some(Command::Pain(PainLabel::Healthy)));
        assert_eq!(classify("Болит рука", None), Some(Command::Pain(PainLabel::Arm)));
        assert_eq!(classify("БОЛИТ СПИНА", None), Some(Command::Pain(PainLabel::Back)));
        assert_eq!(classify(" Болят ноги ", None), Some(Command::Pain(PainLabel::Legs)));
    }

    #[test]
    fn test_check1_context_takes_priority() {
        let ctx = check1_ctx();
        assert_eq!(classify("✅ Да", Some(&ctx)), check1(true));
        assert_eq!(classify("нет", Some(&ctx)), check1(false));
        assert_eq!(classify("yes", Some(&ctx)), check1(true));

        // Other buttons still work while check1 is open
        assert_eq!(classify("📊 Статус", Some(&ctx)), Some(Command::ShowStatus));

        // Without the context "✅ Да" means nothing
        assert_eq!(classify("✅ Да", None), None);
    }

    #[test]
    fn test_check2_context_captures_any_text() {
        let ctx = check2_ctx();
        assert_eq!(classify("2100", Some(&ctx)), check2("2100"));
        assert_eq!(classify("✅ Да, выполнил", Some(&ctx)), check2("✅ Да, выполнил"));
        assert_eq!(classify("  ", Some(&ctx)), check2(""));
    }

    #[test]
    fn test_navigation_buttons() {
        assert_eq!(classify("⏭️ Скип дня", None), Some(Command::SkipDay));
        assert_eq!(
            classify("⏸️ Пропустить день (тест)", None),
            Some(Command::MissedDayTest)
        );
        assert_eq!(
            classify("⬅️ Предыдущая неделя", None),
            Some(Command::PreviousWeek)
        );
        assert_eq!(classify("➡️ Следующая неделя", None), Some(Command::NextWeek));
        assert_eq!(classify("📅 Расписание", None), Some(Command::ShowSchedule));
        assert_eq!(
            classify("📋 Упражнения дня", None),
            Some(Command::ShowTodayExercises)
        );
        assert_eq!(
            classify("/training process", None),
            Some(Command::TrainingProcess)
        );
        assert_eq!(
            classify("Вт-Чт-Сб", None),
            Some(Command::SelectPattern(TrainingDaysPattern::TueThuSat))
        );
        assert_eq!(classify("🏠 Главное меню", None), None);
        assert_eq!(classify("hello", None), None);
    }
}

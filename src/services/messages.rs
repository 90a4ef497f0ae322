// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User-facing texts and keyboards.

use crate::models::{
    InlineButton, Keyboard, OutboundMessage, TrainingDaysPattern, TrainingSession, TrainingType,
    WeekEvaluation, DAYS_PER_WEEK,
};

// Button labels (also the inbound vocabulary)
pub const BTN_DONE: &str = "✅ Да, выполнил";
pub const BTN_NOT_DONE: &str = "❌ Нет, не выполнил";
pub const BTN_YES: &str = "✅ Да";
pub const BTN_NO: &str = "❌ Нет";
pub const BTN_TODAY_EXERCISES: &str = "📋 Упражнения дня";
pub const BTN_SCHEDULE: &str = "📅 Расписание";
pub const BTN_SKIP_DAY: &str = "⏭️ Скип дня";
pub const BTN_STATUS: &str = "📊 Статус";
pub const BTN_MAIN_MENU: &str = "🏠 Главное меню";
pub const BTN_MISSED_TEST: &str = "⏸️ Пропустить день (тест)";
pub const BTN_PREVIOUS_WEEK: &str = "⬅️ Предыдущая неделя";
pub const BTN_NEXT_WEEK: &str = "➡️ Следующая неделя";
/// Command text that opens the training flow (matched anywhere in the message).
pub const TRAINING_PROCESS_COMMAND: &str = "training process";

pub const PAIN_HEALTHY: &str = "Здоров";
pub const PAIN_ARM: &str = "Болит рука";
pub const PAIN_BACK: &str = "Болит спина";
pub const PAIN_LEGS: &str = "Болят ноги";

pub fn training_keyboard() -> Keyboard {
    Keyboard::reply(&[
        &[BTN_TODAY_EXERCISES, BTN_SCHEDULE],
        &[BTN_SKIP_DAY, BTN_STATUS],
        &[BTN_MISSED_TEST],
        &[BTN_PREVIOUS_WEEK, BTN_NEXT_WEEK],
        &[BTN_MAIN_MENU],
    ])
}

fn day_outcome_keyboard() -> Keyboard {
    Keyboard::reply(&[&[BTN_DONE, BTN_NOT_DONE]])
}

fn pain_keyboard() -> Keyboard {
    Keyboard::reply(&[&[PAIN_HEALTHY, PAIN_ARM], &[PAIN_BACK, PAIN_LEGS]])
}

fn check1_keyboard() -> Keyboard {
    Keyboard::reply(&[&[BTN_YES, BTN_NO]])
}

// ─── Scheduler prompts ───────────────────────────────────────────

pub fn daily_check(training_type: TrainingType) -> OutboundMessage {
    OutboundMessage::text(format!(
        "🏋️ Выполнили ли вы тренировку сегодня?\n\nТренировка: {}",
        training_type.label()
    ))
    .with_keyboard(day_outcome_keyboard())
}

pub fn next_day_reminder(training_type: TrainingType) -> OutboundMessage {
    OutboundMessage::text(format!(
        "🏋️ Напоминание: выполнили ли вы тренировку вчера?\n\nТренировка: {}",
        training_type.label()
    ))
    .with_keyboard(day_outcome_keyboard())
}

pub fn session_dropped() -> OutboundMessage {
    OutboundMessage::text(
        "⚠️ Тренировочная сессия сброшена из-за отсутствия ответа.\n\n\
         Запустите новый тренировочный процесс через меню.",
    )
}

pub fn sweep_failures(job: &str, failures: usize, scanned: usize) -> OutboundMessage {
    OutboundMessage::text(format!(
        "⚠️ {job}: не удалось обработать {failures} из {scanned} сессий."
    ))
}

// ─── Day outcome flow ────────────────────────────────────────────

pub fn pain_prompt() -> OutboundMessage {
    OutboundMessage::text("💪 Отлично! Выполнили тренировку!\n\nБолело ли что-то во время тренировки?")
        .with_keyboard(pain_keyboard())
}

pub fn postponed(training_type: TrainingType) -> OutboundMessage {
    OutboundMessage::text(format!(
        "📅 Тренировка перенесена на следующий день.\n\nНе забудьте выполнить: {}",
        training_type.label()
    ))
    .with_keyboard(training_keyboard())
}

pub fn missed_day(training_type: TrainingType) -> OutboundMessage {
    OutboundMessage::text(format!(
        "⏸️ День пропущен!\n\nСчетчики не изменились. Следующая тренировка: {}",
        training_type.label()
    ))
    .with_keyboard(training_keyboard())
}

pub fn pain_in_development() -> OutboundMessage {
    OutboundMessage::text(
        "🚧 Функция адаптации тренировки под боль пока в разработке.\nСпасибо за информацию!",
    )
}

pub fn day_counted() -> OutboundMessage {
    OutboundMessage::text("✅ Отлично! Тренировка засчитана.\n\nПродолжайте в том же духе! 💪")
        .with_keyboard(training_keyboard())
}

pub fn training_not_found() -> OutboundMessage {
    OutboundMessage::text("❌ Тренировка не найдена")
}

pub fn no_pain_question() -> OutboundMessage {
    OutboundMessage::text("❌ Сейчас нет вопроса о самочувствии после тренировки.")
}

// ─── Week gates ──────────────────────────────────────────────────

pub fn week_done(week_number: u32) -> OutboundMessage {
    OutboundMessage::text(format!(
        "🎉 Неделя {week_number} выполнена!\n\n📊 Информация о вашем теле (в разработке)"
    ))
}

pub fn await_manual_advance() -> OutboundMessage {
    OutboundMessage::text(format!(
        "✅ Неделя завершена!\n\nДля перехода к следующей неделе используйте кнопку '{}'.",
        BTN_NEXT_WEEK
    ))
    .with_keyboard(training_keyboard())
}

pub fn check1_prompt() -> OutboundMessage {
    OutboundMessage::text("📋 Чек-лист 1:\n\nВыполнили ли вы все тренировки? (check01)")
        .with_keyboard(check1_keyboard())
}

pub fn check2_prompt() -> OutboundMessage {
    OutboundMessage::text(
        "📋 Чек-лист 2:\n\nСредняя калорийность (check02)\n\
         Введите вашу среднюю калорийность за неделю:",
    )
}

pub fn check1_passed() -> OutboundMessage {
    OutboundMessage::text("✅ Чек-лист 1 пройден!")
}

pub fn check1_failed() -> OutboundMessage {
    OutboundMessage::text(
        "⚠️ Чек-лист 1 не пройден.\n\nНужно выполнить неделю заново (3 дня тренировок).",
    )
    .with_keyboard(training_keyboard())
}

pub fn check2_accepted(value: &str) -> OutboundMessage {
    OutboundMessage::text(format!(
        "✅ Спасибо! Данные о калорийности приняты.\n\n📊 Введенное значение: {value}\n\n\
         Чек-лист 2 пройден! Неделя завершена."
    ))
}

// ─── Navigation ──────────────────────────────────────────────────

pub fn no_active_session() -> OutboundMessage {
    OutboundMessage::text("❌ У вас нет активной тренировочной сессии.")
}

pub fn already_first_week() -> OutboundMessage {
    OutboundMessage::text("❌ Вы уже на первой неделе!").with_keyboard(training_keyboard())
}

pub fn moved_to_previous_week(week_number: u32) -> OutboundMessage {
    OutboundMessage::text(format!(
        "⬅️ Перешли на неделю {week_number}!\n\nСчетчики сброшены. Можете начать заново."
    ))
    .with_keyboard(training_keyboard())
}

pub fn moved_to_next_week(week_number: u32) -> OutboundMessage {
    OutboundMessage::text(format!(
        "➡️ Перешли на неделю {week_number}!\n\nСчетчики сброшены. Можете начать новую неделю."
    ))
    .with_keyboard(training_keyboard())
}

pub fn choose_pattern() -> OutboundMessage {
    let rows = TrainingDaysPattern::ALL
        .into_iter()
        .map(|p| {
            vec![InlineButton {
                text: p.label().to_string(),
                callback_data: p.callback_data().to_string(),
            }]
        })
        .collect();

    OutboundMessage::text(
        "🏋️ Выберите дни для тренировок:\n\n\
         Выберите один из вариантов (между днями должен быть промежуток в 1 день):",
    )
    .with_keyboard(Keyboard::Inline(rows))
}

pub fn session_started(session: &TrainingSession) -> OutboundMessage {
    OutboundMessage::text(format!(
        "✅ Тренировочный процесс запущен!\n\n📅 Дни тренировок: {}\n📋 Первая тренировка: {}",
        session.training_days_pattern.label(),
        session.current_training_type().label()
    ))
    .with_keyboard(training_keyboard())
}

pub fn status(session: &TrainingSession) -> OutboundMessage {
    let mut text = format!(
        "📊 Статус тренировок (Неделя {}):\n\n\
         📅 Дни тренировок: {}\n\
         ✅ Выполнено дней: {}/{}\n\
         📋 Текущий день: {}\n\n",
        session.week_number,
        session.training_days_pattern.label(),
        session.completed_days_count,
        DAYS_PER_WEEK,
        session.current_day_index + 1
    );
    text.push_str(&match session.evaluate_week() {
        WeekEvaluation::InProgress { .. } => "💪 Продолжайте тренировки!".to_string(),
        WeekEvaluation::Check1Required { .. } => {
            "🎉 Неделя завершена! Ответьте на Чек-лист 1.".to_string()
        }
        WeekEvaluation::Check2Required { .. } => {
            "🎉 Неделя завершена! Ответьте на Чек-лист 2.".to_string()
        }
        WeekEvaluation::Complete { .. } => format!(
            "🎉 Неделя завершена! Для перехода используйте кнопку '{}'.",
            BTN_NEXT_WEEK
        ),
    });
    OutboundMessage::text(text).with_keyboard(training_keyboard())
}

pub fn schedule(session: &TrainingSession) -> OutboundMessage {
    let mut text = format!(
        "📅 Расписание тренировок (Неделя {}):\n\n📆 Дни тренировок: {}\n\n",
        session.week_number,
        session.training_days_pattern.label()
    );
    for (slot, training_type) in (0u8..).zip(TrainingType::ALL) {
        let mark = if slot < session.completed_days_count {
            "✅"
        } else if slot == session.current_day_index {
            "⏳"
        } else {
            "⭕"
        };
        text.push_str(&format!("{mark} {}\n", training_type.label()));
    }
    OutboundMessage::text(text).with_keyboard(training_keyboard())
}

pub fn today_exercises(session: &TrainingSession) -> OutboundMessage {
    OutboundMessage::text(format!(
        "📋 {} (Неделя {})",
        session.current_training_type().label(),
        session.week_number
    ))
    .with_keyboard(training_keyboard())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_schedule_marks_slots() {
        let mut session = TrainingSession::new(1, TrainingDaysPattern::MonWedFri, Utc::now());
        session.complete_day().unwrap();

        let text = schedule(&session).text;
        assert!(text.contains("✅ День 1: Грудь, Плечи, Трицепс"));
        assert!(text.contains("⏳ День 2: Спина, Бицепс"));
        assert!(text.contains("⭕ День 3: Ноги и Кор"));
    }

    #[test]
    fn test_status_follows_week_gate() {
        let mut session = TrainingSession::new(1, TrainingDaysPattern::MonWedFri, Utc::now());
        assert!(status(&session).text.contains("Продолжайте тренировки"));

        for _ in 0..3 {
            session.complete_day().unwrap();
        }
        // Week 1 has no checks
        let text = status(&session).text;
        assert!(text.contains("Для перехода используйте кнопку"));
        assert!(!text.contains("Чек-лист"));

        session.week_number = 2;
        assert!(status(&session).text.contains("Чек-лист 1"));

        session.check1_passed = true;
        assert!(status(&session).text.contains("Чек-лист 2"));

        session.check2_passed = true;
        assert!(!status(&session).text.contains("Чек-лист"));
    }

    #[test]
    fn test_choose_pattern_has_three_inline_buttons() {
        match choose_pattern().keyboard {
            Keyboard::Inline(rows) => {
                let data: Vec<_> = rows.iter().map(|r| r[0].callback_data.as_str()).collect();
                assert_eq!(
                    data,
                    ["days_mon_wed_fri", "days_tue_thu_sat", "days_wed_fri_sun"]
                );
            }
            other => panic!("unexpected keyboard: {other:?}"),
        }
    }
}

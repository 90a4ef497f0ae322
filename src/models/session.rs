// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training session model and its weekly-cycle transition rules.
//!
//! The rules here are pure: they mutate a session in memory and report what
//! happened. Persistence, locking and messaging live in
//! [`crate::services::TrainingService`].

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Number of training-day slots in one week.
pub const DAYS_PER_WEEK: u8 = 3;

/// The three weekday triplets a user can train on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrainingDaysPattern {
    #[serde(rename = "Пн-Ср-Пт")]
    MonWedFri,
    #[serde(rename = "Вт-Чт-Сб")]
    TueThuSat,
    #[serde(rename = "Ср-Пт-Вс")]
    WedFriSun,
}

impl TrainingDaysPattern {
    pub const ALL: [TrainingDaysPattern; 3] = [
        TrainingDaysPattern::MonWedFri,
        TrainingDaysPattern::TueThuSat,
        TrainingDaysPattern::WedFriSun,
    ];

    /// Label shown to the user and stored in `training_days`.
    pub fn label(self) -> &'static str {
        match self {
            TrainingDaysPattern::MonWedFri => "Пн-Ср-Пт",
            TrainingDaysPattern::TueThuSat => "Вт-Чт-Сб",
            TrainingDaysPattern::WedFriSun => "Ср-Пт-Вс",
        }
    }

    /// Inline-button payload for the pattern choice.
    pub fn callback_data(self) -> &'static str {
        match self {
            TrainingDaysPattern::MonWedFri => "days_mon_wed_fri",
            TrainingDaysPattern::TueThuSat => "days_tue_thu_sat",
            TrainingDaysPattern::WedFriSun => "days_wed_fri_sun",
        }
    }

    pub fn weekdays(self) -> [Weekday; 3] {
        match self {
            TrainingDaysPattern::MonWedFri => [Weekday::Mon, Weekday::Wed, Weekday::Fri],
            TrainingDaysPattern::TueThuSat => [Weekday::Tue, Weekday::Thu, Weekday::Sat],
            TrainingDaysPattern::WedFriSun => [Weekday::Wed, Weekday::Fri, Weekday::Sun],
        }
    }

    pub fn is_training_day(self, weekday: Weekday) -> bool {
        self.weekdays().contains(&weekday)
    }

    pub fn from_callback_data(data: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.callback_data() == data)
    }

    /// Match a typed label, case-insensitively.
    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.label().to_lowercase() == text)
    }
}

/// Workout type of each training-day slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrainingType {
    #[serde(rename = "День 1: Грудь, Плечи, Трицепс")]
    ChestShouldersTriceps,
    #[serde(rename = "День 2: Спина, Бицепс")]
    BackBiceps,
    #[serde(rename = "День 3: Ноги и Кор")]
    LegsCore,
}

impl TrainingType {
    pub const ALL: [TrainingType; 3] = [
        TrainingType::ChestShouldersTriceps,
        TrainingType::BackBiceps,
        TrainingType::LegsCore,
    ];

    /// Workout type for a day slot; indices wrap modulo the week length.
    pub fn for_slot(index: u8) -> Self {
        Self::ALL[usize::from(index % DAYS_PER_WEEK)]
    }

    pub fn label(self) -> &'static str {
        match self {
            TrainingType::ChestShouldersTriceps => "День 1: Грудь, Плечи, Трицепс",
            TrainingType::BackBiceps => "День 2: Спина, Бицепс",
            TrainingType::LegsCore => "День 3: Ноги и Кор",
        }
    }
}

/// One weekly-cycle attempt of a user.
///
/// Field names on the wire follow the `training_sessions` layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSession {
    /// Session ID (also used as document ID)
    pub id: String,
    /// Chat user ID (owner)
    pub user_id: i64,
    /// Current week, starting at 1
    pub week_number: u32,
    /// Weekday triplet, fixed at creation
    #[serde(rename = "training_days")]
    pub training_days_pattern: TrainingDaysPattern,
    /// Slot due next (0..=2)
    #[serde(rename = "current_day")]
    pub current_day_index: u8,
    /// Slots done this week (0..=3)
    #[serde(rename = "completed_days")]
    pub completed_days_count: u8,
    #[serde(rename = "session_active")]
    pub active: bool,
    #[serde(rename = "check01_passed")]
    pub check1_passed: bool,
    #[serde(rename = "check02_passed")]
    pub check2_passed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What the week-completion gate asks for next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekEvaluation {
    /// Fewer than three days done.
    InProgress { completed_days: u8 },
    /// Week finished; the user advances manually.
    Complete { week_number: u32 },
    /// Week 2 one-time audit is due.
    Check1Required { week_number: u32 },
    /// Weekly calorie checkpoint is due.
    Check2Required { week_number: u32 },
}

impl TrainingSession {
    /// A fresh week-1 session.
    pub fn new(user_id: i64, pattern: TrainingDaysPattern, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            week_number: 1,
            training_days_pattern: pattern,
            current_day_index: 0,
            completed_days_count: 0,
            active: true,
            check1_passed: false,
            check2_passed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_week_complete(&self) -> bool {
        self.completed_days_count >= DAYS_PER_WEEK
    }

    /// Workout type of the slot that is due next.
    pub fn current_training_type(&self) -> TrainingType {
        TrainingType::for_slot(self.current_day_index)
    }

    /// Lock-step advance of the day slot and the completed counter.
    ///
    /// Returns whether the week is now complete. Refuses to move past a
    /// finished week so the counters stay within `0..=3`.
    pub fn complete_day(&mut self) -> Result<bool, crate::error::AppError> {
        if self.is_week_complete() {
            return Err(crate::error::AppError::WeekAlreadyComplete);
        }
        self.current_day_index = (self.current_day_index + 1) % DAYS_PER_WEEK;
        self.completed_days_count += 1;
        Ok(self.is_week_complete())
    }

    /// Restart the current week from its first slot.
    fn reset_week_progress(&mut self) {
        self.completed_days_count = 0;
        self.current_day_index = 0;
    }

    /// Which gate, if any, a finished week must pass.
    pub fn evaluate_week(&self) -> WeekEvaluation {
        if !self.is_week_complete() {
            return WeekEvaluation::InProgress {
                completed_days: self.completed_days_count,
            };
        }

        let week_number = self.week_number;
        match week_number {
            0 | 1 => WeekEvaluation::Complete { week_number },
            2 if !self.check1_passed => WeekEvaluation::Check1Required { week_number },
            _ if !self.check2_passed => WeekEvaluation::Check2Required { week_number },
            _ => WeekEvaluation::Complete { week_number },
        }
    }

    /// Apply the check1 answer. A failure restarts the week.
    pub fn apply_check1(&mut self, passed: bool) {
        if passed {
            self.check1_passed = true;
        } else {
            self.reset_week_progress();
        }
    }

    pub fn pass_check2(&mut self) {
        self.check2_passed = true;
    }

    /// Move to the next week. `check1_passed` is never reset.
    pub fn advance_week(&mut self) {
        self.week_number += 1;
        self.reset_week_progress();
        self.check2_passed = false;
    }

    /// Move back one week, with the same reset shape as [`Self::advance_week`].
    pub fn regress_week(&mut self) -> Result<(), crate::error::AppError> {
        if self.week_number <= 1 {
            return Err(crate::error::AppError::InvalidWeekRegression);
        }
        self.week_number -= 1;
        self.reset_week_progress();
        self.check2_passed = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn session_at_week(week: u32) -> TrainingSession {
        let mut s = TrainingSession::new(42, TrainingDaysPattern::MonWedFri, Utc::now());
        s.week_number = week;
        s
    }

    fn finish_week(s: &mut TrainingSession) {
        for _ in 0..DAYS_PER_WEEK {
            s.complete_day().unwrap();
        }
    }

    #[test]
    fn test_complete_day_moves_both_counters() {
        let mut s = session_at_week(1);

        assert!(!s.complete_day().unwrap());
        assert_eq!((s.completed_days_count, s.current_day_index), (1, 1));
        assert!(!s.complete_day().unwrap());
        assert_eq!((s.completed_days_count, s.current_day_index), (2, 2));
        assert!(s.complete_day().unwrap());
        assert_eq!((s.completed_days_count, s.current_day_index), (3, 0));
    }

    #[test]
    fn test_complete_day_refuses_past_full_week() {
        let mut s = session_at_week(1);
        finish_week(&mut s);

        let err = s.complete_day().unwrap_err();
        assert!(matches!(err, AppError::WeekAlreadyComplete));
        assert_eq!(s.completed_days_count, 3);
        assert_eq!(s.current_day_index, 0);
    }

    #[test]
    fn test_week_one_never_gates() {
        let mut s = session_at_week(1);
        finish_week(&mut s);
        assert_eq!(
            s.evaluate_week(),
            WeekEvaluation::Complete { week_number: 1 }
        );
    }

    #[test]
    fn test_week_two_requests_check1_then_check2() {
        let mut s = session_at_week(2);
        finish_week(&mut s);
        assert_eq!(
            s.evaluate_week(),
            WeekEvaluation::Check1Required { week_number: 2 }
        );

        s.apply_check1(true);
        assert_eq!(
            s.evaluate_week(),
            WeekEvaluation::Check2Required { week_number: 2 }
        );

        s.pass_check2();
        assert_eq!(
            s.evaluate_week(),
            WeekEvaluation::Complete { week_number: 2 }
        );
    }

    #[test]
    fn test_later_weeks_only_request_check2() {
        let mut s = session_at_week(3);
        finish_week(&mut s);
        assert_eq!(
            s.evaluate_week(),
            WeekEvaluation::Check2Required { week_number: 3 }
        );
        assert!(!s.check1_passed);
    }

    #[test]
    fn test_failed_check1_resets_week() {
        let mut s = session_at_week(2);
        finish_week(&mut s);

        s.apply_check1(false);

        assert_eq!(s.completed_days_count, 0);
        assert_eq!(s.current_day_index, 0);
        assert!(!s.check1_passed);
        assert_eq!(
            s.evaluate_week(),
            WeekEvaluation::InProgress { completed_days: 0 }
        );
    }

    #[test]
    fn test_advance_keeps_check1_and_resets_check2() {
        let mut s = session_at_week(2);
        finish_week(&mut s);
        s.apply_check1(true);
        s.pass_check2();

        s.advance_week();

        assert_eq!(s.week_number, 3);
        assert!(s.check1_passed);
        assert!(!s.check2_passed);
        assert_eq!((s.completed_days_count, s.current_day_index), (0, 0));
    }

    #[test]
    fn test_regress_matches_advance_reset_shape() {
        let mut advanced = session_at_week(3);
        advanced.complete_day().unwrap();
        advanced.check2_passed = true;
        let mut regressed = advanced.clone();

        advanced.advance_week();
        regressed.regress_week().unwrap();

        assert_eq!(advanced.week_number, 4);
        assert_eq!(regressed.week_number, 2);
        for s in [&advanced, &regressed] {
            assert_eq!(s.completed_days_count, 0);
            assert_eq!(s.current_day_index, 0);
            assert!(!s.check2_passed);
        }
    }

    #[test]
    fn test_regress_refused_at_week_one() {
        let mut s = session_at_week(1);
        assert!(matches!(
            s.regress_week(),
            Err(AppError::InvalidWeekRegression)
        ));
        assert_eq!(s.week_number, 1);
    }

    #[test]
    fn test_pattern_lookup() {
        assert_eq!(
            TrainingDaysPattern::from_callback_data("days_tue_thu_sat"),
            Some(TrainingDaysPattern::TueThuSat)
        );
        assert_eq!(
            TrainingDaysPattern::from_label("пн-ср-пт"),
            Some(TrainingDaysPattern::MonWedFri)
        );
        assert!(TrainingDaysPattern::WedFriSun.is_training_day(Weekday::Sun));
        assert!(!TrainingDaysPattern::MonWedFri.is_training_day(Weekday::Tue));
    }

    #[test]
    fn test_session_serializes_with_storage_field_names() {
        let s = session_at_week(1);
        let json = serde_json::to_value(&s).unwrap();

        assert_eq!(json["training_days"], "Пн-Ср-Пт");
        assert_eq!(json["current_day"], 0);
        assert_eq!(json["completed_days"], 0);
        assert_eq!(json["session_active"], true);
        assert_eq!(json["check01_passed"], false);
        assert_eq!(json["check02_passed"], false);
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar dates.

use chrono::{Days, NaiveDate};

/// Stored form of a training date (`YYYY-MM-DD`).
pub fn format_training_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The date `days` calendar days before `date`.
pub fn days_before(date: NaiveDate, days: u64) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_training_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_training_date(date), "2024-03-05");
    }

    #[test]
    fn test_days_before_crosses_month() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            days_before(date, 2),
            NaiveDate::from_ymd_opt(2024, 2, 28)
        );
    }
}

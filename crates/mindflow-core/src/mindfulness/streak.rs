//! Consecutive-day mindfulness streaks.
//!
//! A streak is the number of consecutive calendar days (UTC) with at least
//! one session, anchored at today or yesterday. A user who practised
//! yesterday but not yet today keeps their streak until the day is over.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const ACTIVE_MESSAGE: &str = "Keep going! You're building a great habit.";
const IDLE_MESSAGE: &str = "Start your mindfulness journey today!";

/// Streak length plus the message shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub days: u32,
    pub message: String,
}

impl StreakSummary {
    pub fn new(days: u32) -> Self {
        let message = if days > 0 { ACTIVE_MESSAGE } else { IDLE_MESSAGE };
        Self {
            days,
            message: message.to_string(),
        }
    }
}

/// Streak calculator
#[derive(Debug, Clone)]
pub struct StreakCalculator {
    today: NaiveDate,
}

impl Default for StreakCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreakCalculator {
    /// Create a calculator anchored at the current UTC date.
    pub fn new() -> Self {
        Self::at(Utc::now().date_naive())
    }

    /// Create a calculator anchored at `today`.
    pub fn at(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Count consecutive session days ending today or yesterday.
    ///
    /// Input order does not matter. Several sessions on one day count once,
    /// and sessions dated after `today` are ignored.
    pub fn calculate<I>(&self, session_times: I) -> u32
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut days: Vec<NaiveDate> = session_times
            .into_iter()
            .map(|at| at.date_naive())
            .filter(|day| *day <= self.today)
            .collect();
        days.sort_unstable_by(|a, b| b.cmp(a));
        days.dedup();

        let Some((&latest, earlier)) = days.split_first() else {
            return 0;
        };
        let Some(yesterday) = self.today.pred_opt() else {
            return 0;
        };

        let mut cursor = if latest == self.today {
            yesterday
        } else if latest == yesterday {
            match yesterday.pred_opt() {
                Some(day) => day,
                None => return 1,
            }
        } else {
            return 0;
        };

        let mut streak = 1;
        for &day in earlier {
            if day != cursor {
                break;
            }
            streak += 1;
            cursor = match cursor.pred_opt() {
                Some(prev) => prev,
                None => break,
            };
        }
        streak
    }

    pub fn summarize<I>(&self, session_times: I) -> StreakSummary
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        StreakSummary::new(self.calculate(session_times))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    /// A session `days_ago` days before today at the given hour.
    fn session(days_ago: i64, hour: u32) -> DateTime<Utc> {
        let day = today() - Duration::days(days_ago);
        Utc.from_utc_datetime(&day.and_hms_opt(hour, 15, 0).unwrap())
    }

    fn streak(sessions: Vec<DateTime<Utc>>) -> u32 {
        StreakCalculator::at(today()).calculate(sessions)
    }

    #[test]
    fn no_sessions_means_no_streak() {
        assert_eq!(streak(vec![]), 0);
    }

    #[test]
    fn single_session_today() {
        assert_eq!(streak(vec![session(0, 8)]), 1);
    }

    #[test]
    fn three_consecutive_days() {
        assert_eq!(streak(vec![session(0, 8), session(1, 21), session(2, 7)]), 3);
    }

    #[test]
    fn gap_ends_the_walk() {
        assert_eq!(streak(vec![session(0, 9), session(3, 9)]), 1);
    }

    #[test]
    fn same_day_sessions_count_once() {
        assert_eq!(streak(vec![session(0, 7), session(0, 19)]), 1);
    }

    #[test]
    fn clustered_days_do_not_inflate_streak() {
        let sessions = vec![
            session(0, 6),
            session(0, 12),
            session(0, 22),
            session(1, 9),
            session(1, 10),
            session(2, 23),
        ];
        assert_eq!(streak(sessions), 3);
    }

    #[test]
    fn yesterday_anchor_keeps_streak_alive() {
        assert_eq!(streak(vec![session(1, 8), session(2, 8), session(3, 8)]), 3);
    }

    #[test]
    fn stale_latest_session_breaks_streak() {
        assert_eq!(streak(vec![session(2, 8), session(3, 8)]), 0);
    }

    #[test]
    fn order_of_input_is_irrelevant() {
        assert_eq!(streak(vec![session(2, 8), session(0, 8), session(1, 8)]), 3);
    }

    #[test]
    fn future_sessions_are_ignored() {
        let tomorrow = session(-1, 8);
        assert_eq!(streak(vec![tomorrow, session(0, 8)]), 1);
        assert_eq!(streak(vec![tomorrow]), 0);
    }

    #[test]
    fn summary_message_depends_on_streak() {
        assert_eq!(StreakSummary::new(0).message, IDLE_MESSAGE);
        assert_eq!(StreakSummary::new(4).message, ACTIVE_MESSAGE);
    }
}

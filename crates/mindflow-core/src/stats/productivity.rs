//! Daily productivity records.
//!
//! A user has at most one record per UTC calendar day; writing a second
//! record for the same day replaces the first.

use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use super::start_of_day;
use crate::error::ValidationError;
use crate::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyScore {
    pub hour: u8,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityDataPoint {
    pub id: i64,
    pub user_id: UserId,
    pub date: DateTime<Utc>,
    pub focus_score: Option<u8>,
    pub completed_tasks: u32,
    pub mindfulness_minutes: u32,
    pub hourly_data: Vec<HourlyScore>,
}

/// Unvalidated productivity payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityInput {
    pub user_id: Option<UserId>,
    pub date: Option<DateTime<Utc>>,
    pub focus_score: Option<i64>,
    pub completed_tasks: Option<u32>,
    pub mindfulness_minutes: Option<u32>,
    #[serde(default)]
    pub hourly_data: Vec<HourlyScoreInput>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HourlyScoreInput {
    pub hour: i64,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductivity {
    pub user_id: UserId,
    pub date: DateTime<Utc>,
    pub focus_score: Option<u8>,
    pub completed_tasks: u32,
    pub mindfulness_minutes: u32,
    pub hourly_data: Vec<HourlyScore>,
}

fn percent(value: i64) -> Option<u8> {
    u8::try_from(value).ok().filter(|v| *v <= 100)
}

impl ProductivityInput {
    /// Validate and fill defaults. A missing date means `now`.
    ///
    /// # Errors
    /// Rejects a missing owner, scores outside 0-100 and hours outside 0-23.
    pub fn validate(self, now: DateTime<Utc>) -> Result<NewProductivity, ValidationError> {
        let mut errors = ValidationError::new();
        if self.user_id.is_none() {
            errors.push("userId", "User ID is required");
        }

        let focus_score = match self.focus_score {
            None => None,
            Some(raw) => {
                let score = percent(raw);
                if score.is_none() {
                    errors.push("focusScore", "Focus score must be between 0 and 100");
                }
                score
            }
        };

        let mut hourly_data = Vec::with_capacity(self.hourly_data.len());
        for entry in &self.hourly_data {
            let hour = u8::try_from(entry.hour).ok().filter(|h| *h < 24);
            let score = percent(entry.score);
            match (hour, score) {
                (Some(hour), Some(score)) => hourly_data.push(HourlyScore { hour, score }),
                (None, _) => errors.push("hourlyData", "Hour must be between 0 and 23"),
                (_, None) => errors.push("hourlyData", "Score must be between 0 and 100"),
            }
        }

        errors.into_result()?;
        let user_id = self
            .user_id
            .ok_or_else(|| ValidationError::single("userId", "User ID is required"))?;

        Ok(NewProductivity {
            user_id,
            date: self.date.unwrap_or(now),
            focus_score,
            completed_tasks: self.completed_tasks.unwrap_or(0),
            mindfulness_minutes: self.mindfulness_minutes.unwrap_or(0),
            hourly_data,
        })
    }
}

/// Window of productivity records to chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// Since midnight UTC today.
    #[default]
    Day,
    /// The last seven days.
    Week,
    /// The last calendar month.
    Month,
}

impl Timeframe {
    /// Earliest record date included in the window.
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Timeframe::Day => start_of_day(now),
            Timeframe::Week => now - Duration::days(7),
            Timeframe::Month => now
                .checked_sub_months(Months::new(1))
                .unwrap_or_else(|| now - Duration::days(30)),
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Timeframe::Day),
            "week" => Ok(Timeframe::Week),
            "month" => Ok(Timeframe::Month),
            other => Err(format!("unknown timeframe: {other}")),
        }
    }
}

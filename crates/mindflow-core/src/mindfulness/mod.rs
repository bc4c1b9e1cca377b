//! Mindfulness activities, tips and recorded sessions.

pub mod streak;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::UserId;

pub use streak::{StreakCalculator, StreakSummary};

/// Kind of guided activity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Meditation,
    Breathing,
    Reflection,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Meditation => "meditation",
            ActivityKind::Breathing => "breathing",
            ActivityKind::Reflection => "reflection",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "meditation" => Some(ActivityKind::Meditation),
            "breathing" => Some(ActivityKind::Breathing),
            "reflection" => Some(ActivityKind::Reflection),
            _ => None,
        }
    }
}

/// A guided activity from the shared catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindfulnessActivity {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    /// Suggested duration in seconds.
    pub duration: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub duration: u32,
}

/// When a tip is meant to be shown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TipKind {
    Daily,
    TaskRelated,
    General,
}

impl TipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipKind::Daily => "daily",
            TipKind::TaskRelated => "task-related",
            TipKind::General => "general",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(TipKind::Daily),
            "task-related" => Some(TipKind::TaskRelated),
            "general" => Some(TipKind::General),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindfulnessTip {
    pub id: i64,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: TipKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTip {
    pub content: String,
    pub kind: TipKind,
}

/// A recorded session. Sessions are immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindfulnessSession {
    pub id: i64,
    pub user_id: UserId,
    pub activity_id: Option<i64>,
    /// Actual duration in seconds.
    pub duration: u32,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Unvalidated session payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInput {
    pub user_id: Option<UserId>,
    pub activity_id: Option<i64>,
    pub duration: Option<i64>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub user_id: UserId,
    pub activity_id: Option<i64>,
    pub duration: u32,
    pub completed: bool,
}

impl SessionInput {
    /// # Errors
    /// Rejects a missing owner or a duration under one second.
    pub fn validate(self) -> Result<NewSession, ValidationError> {
        let mut errors = ValidationError::new();
        if self.user_id.is_none() {
            errors.push("userId", "User ID is required");
        }
        let duration = match self.duration {
            Some(d) if d >= 1 => u32::try_from(d).ok(),
            _ => None,
        };
        if duration.is_none() {
            errors.push("duration", "Duration must be at least 1 second");
        }

        match (self.user_id, duration) {
            (Some(user_id), Some(duration)) => Ok(NewSession {
                user_id,
                activity_id: self.activity_id,
                duration,
                completed: self.completed.unwrap_or(true),
            }),
            _ => Err(errors),
        }
    }
}

//! Task types, input validation and partial updates.
//!
//! A task carries a user-declared [`PriorityTier`]. Tasks declared with the
//! `ai` tier get a numeric score from the [`PriorityScorer`]; that score is
//! the only thing that orders them ahead of other tasks.

pub mod priority;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::category::Category;
use crate::error::ValidationError;
use crate::UserId;

pub use priority::{PriorityInput, PriorityScorer, ScoreBreakdown, ScoreTerm};

/// User-declared priority label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    High,
    Medium,
    Low,
    /// Let the scorer decide.
    Ai,
}

impl PriorityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityTier::High => "high",
            PriorityTier::Medium => "medium",
            PriorityTier::Low => "low",
            PriorityTier::Ai => "ai",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(PriorityTier::High),
            "medium" => Ok(PriorityTier::Medium),
            "low" => Ok(PriorityTier::Low),
            "ai" => Ok(PriorityTier::Ai),
            other => Err(format!("unknown priority tier: {other}")),
        }
    }
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: PriorityTier,
    pub category_id: Option<i64>,
    pub completed: bool,
    pub is_mindful: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: UserId,
    /// Score from the [`PriorityScorer`]; only set for `ai`-tier tasks.
    pub ai_priority: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task with its category embedded, as returned by task listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithCategory {
    #[serde(flatten)]
    pub task: Task,
    pub category: Option<Category>,
}

/// Listing filter for `GET /api/tasks`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    /// Tasks due on or after the start of today.
    Today,
    /// Tasks declared with the `high` tier.
    Important,
    Completed,
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TaskFilter::All),
            "today" => Ok(TaskFilter::Today),
            "important" => Ok(TaskFilter::Important),
            "completed" => Ok(TaskFilter::Completed),
            other => Err(format!("unknown task filter: {other}")),
        }
    }
}

/// Unvalidated task creation payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category_id: Option<i64>,
    pub completed: Option<bool>,
    pub is_mindful: Option<bool>,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: Option<UserId>,
}

/// A validated task ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: PriorityTier,
    pub category_id: Option<i64>,
    pub completed: bool,
    pub is_mindful: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: UserId,
    pub ai_priority: Option<u8>,
}

const PRIORITY_MESSAGE: &str = "Priority must be high, medium, low, or ai";

fn parse_tier(raw: &str, errors: &mut ValidationError) -> Option<PriorityTier> {
    match raw.parse::<PriorityTier>() {
        Ok(tier) => Some(tier),
        Err(_) => {
            errors.push("priority", PRIORITY_MESSAGE);
            None
        }
    }
}

impl TaskInput {
    /// Check required fields and convert into a [`NewTask`].
    ///
    /// # Errors
    /// Returns every rejected field at once.
    pub fn validate(self) -> Result<NewTask, ValidationError> {
        let mut errors = ValidationError::new();

        let title = match self.title {
            Some(t) if !t.trim().is_empty() => Some(t),
            _ => {
                errors.push("title", "Task title is required");
                None
            }
        };
        let priority = match self.priority.as_deref() {
            Some(raw) => parse_tier(raw, &mut errors),
            None => {
                errors.push("priority", PRIORITY_MESSAGE);
                None
            }
        };
        if self.user_id.is_none() {
            errors.push("userId", "User ID is required");
        }

        match (title, priority, self.user_id) {
            (Some(title), Some(priority), Some(user_id)) if errors.is_empty() => Ok(NewTask {
                title,
                description: self.description,
                priority,
                category_id: self.category_id,
                completed: self.completed.unwrap_or(false),
                is_mindful: self.is_mindful.unwrap_or(false),
                due_date: self.due_date,
                user_id,
                ai_priority: None,
            }),
            _ => Err(errors),
        }
    }
}

impl NewTask {
    /// Attach a score when the task is declared `ai`; other tiers carry none.
    pub fn scored(mut self, scorer: &PriorityScorer) -> Self {
        self.ai_priority = match self.priority {
            PriorityTier::Ai => Some(scorer.score(&PriorityInput::from(&self))),
            _ => None,
        };
        self
    }
}

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Unvalidated partial update payload. Absent fields are left unchanged;
/// `null` clears nullable fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatchInput {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i64>>,
    pub completed: Option<bool>,
    pub is_mindful: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// A validated partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<PriorityTier>,
    pub category_id: Option<Option<i64>>,
    pub completed: Option<bool>,
    pub is_mindful: Option<bool>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskPatchInput {
    /// # Errors
    /// Rejects an empty title or an unknown priority tier.
    pub fn validate(self) -> Result<TaskPatch, ValidationError> {
        let mut errors = ValidationError::new();
        if matches!(self.title.as_deref(), Some(t) if t.trim().is_empty()) {
            errors.push("title", "Task title is required");
        }
        let priority = self
            .priority
            .as_deref()
            .and_then(|raw| parse_tier(raw, &mut errors));
        errors.into_result()?;

        Ok(TaskPatch {
            title: self.title,
            description: self.description,
            priority,
            category_id: self.category_id,
            completed: self.completed,
            is_mindful: self.is_mindful,
            due_date: self.due_date,
        })
    }
}

impl TaskPatch {
    /// The task as it will look once the patch is stored.
    ///
    /// `ai_priority` and timestamps are carried over untouched; see
    /// [`resolve_ai_priority`] for the score.
    pub fn apply_to(&self, task: &Task) -> Task {
        let mut merged = task.clone();
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        if let Some(description) = &self.description {
            merged.description = description.clone();
        }
        if let Some(priority) = self.priority {
            merged.priority = priority;
        }
        if let Some(category_id) = self.category_id {
            merged.category_id = category_id;
        }
        if let Some(completed) = self.completed {
            merged.completed = completed;
        }
        if let Some(is_mindful) = self.is_mindful {
            merged.is_mindful = is_mindful;
        }
        if let Some(due_date) = self.due_date {
            merged.due_date = due_date;
        }
        merged
    }
}

/// Decide the score stored after an update from `before` to `merged`.
///
/// The scorer only runs on a transition into the `ai` tier. A task already
/// in `ai` keeps its score, and leaving `ai` clears it.
pub fn resolve_ai_priority(before: &Task, merged: &Task, scorer: &PriorityScorer) -> Option<u8> {
    match (before.priority, merged.priority) {
        (PriorityTier::Ai, PriorityTier::Ai) => before
            .ai_priority
            .or_else(|| Some(scorer.score(&PriorityInput::from(merged)))),
        (_, PriorityTier::Ai) => Some(scorer.score(&PriorityInput::from(merged))),
        _ => None,
    }
}

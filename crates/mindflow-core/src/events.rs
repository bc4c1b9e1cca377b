//! Change-events pushed to live clients.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::mindfulness::MindfulnessSession;
use crate::task::Task;

/// A change to user data, tagged with its wire kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    TaskCreated(Task),
    TaskUpdated(Task),
    TaskDeleted { id: i64 },
    MindfulnessCompleted(MindfulnessSession),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TaskCreated(_) => "TASK_CREATED",
            Event::TaskUpdated(_) => "TASK_UPDATED",
            Event::TaskDeleted { .. } => "TASK_DELETED",
            Event::MindfulnessCompleted(_) => "MINDFULNESS_COMPLETED",
        }
    }
}

/// Wire frame: `{type, payload, timestamp}`.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope<'a> {
    #[serde(flatten)]
    pub event: &'a Event,
    pub timestamp: DateTime<Utc>,
}

impl<'a> EventEnvelope<'a> {
    pub fn new(event: &'a Event, timestamp: DateTime<Utc>) -> Self {
        Self { event, timestamp }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

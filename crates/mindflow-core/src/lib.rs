//! # Mindflow Core Library
//!
//! This library provides the business logic for Mindflow, a personal
//! productivity and wellness tracker. The HTTP/WebSocket server and the admin
//! CLI are thin layers over the same core library.
//!
//! ## Architecture
//!
//! - **Tasks**: task model, validation and the rule-based [`PriorityScorer`]
//! - **Mindfulness**: activities, tips, sessions and the [`StreakCalculator`]
//! - **Stats**: dashboard counters, category progress and daily productivity records
//! - **Insights**: the [`InsightSelector`] seam and its catalog-backed default
//! - **Notify**: per-user [`ConnectionRegistry`] and the [`EventBroadcaster`]
//! - **Storage**: SQLite persistence and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Database`]: persistence for every entity plus dashboard aggregations
//! - [`Config`]: application configuration management
//! - [`Event`]: typed change-events pushed to live clients

pub mod category;
pub mod error;
pub mod events;
pub mod insight;
pub mod mindfulness;
pub mod notify;
pub mod stats;
pub mod storage;
pub mod task;

/// Identifier of the user owning tasks, categories and sessions.
pub type UserId = i64;

pub use category::{Category, CategoryInput, NewCategory};
pub use error::{ConfigError, CoreError, DatabaseError, FieldError, ValidationError};
pub use events::{Event, EventEnvelope};
pub use insight::{Insight, InsightKind, InsightSelector, InsightSignals, RandomInsightSelector};
pub use mindfulness::{
    MindfulnessActivity, MindfulnessSession, MindfulnessTip, SessionInput, StreakCalculator,
    StreakSummary, TipKind,
};
pub use notify::{ConnectionHandle, ConnectionRegistry, Delivery, EventBroadcaster};
pub use stats::{CategoryProgress, DashboardStats, ProductivityDataPoint, Timeframe};
pub use storage::{Config, Database};
pub use task::{PriorityScorer, PriorityTier, Task, TaskFilter, TaskWithCategory};

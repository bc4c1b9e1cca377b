//! Task priority scoring.
//!
//! Produces an integer priority score (0-100) from a handful of task
//! attributes. Contributions are additive and independent of each other:
//!
//! | Factor | Contribution |
//! |--------|--------------|
//! | Base | +50 |
//! | Due today or overdue | +30 |
//! | Due in 1 day | +25 |
//! | Due within 3 days | +20 |
//! | Due within 7 days | +15 |
//! | Due later | +5 |
//! | Description > 200 / > 100 / > 50 chars | +10 / +5 / +2 |
//! | Mindfulness reminder | +8 |
//! | Declared tier (not `ai`): high / medium / low | +15 / +5 / -5 |
//!
//! The sum is clamped to [0, 100].

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{NewTask, PriorityTier, Task};

const BASE_SCORE: i32 = 50;
const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// The task attributes the scorer looks at.
#[derive(Debug, Clone, Copy)]
pub struct PriorityInput<'a> {
    pub due_date: Option<DateTime<Utc>>,
    pub description: Option<&'a str>,
    pub is_mindful: bool,
    pub tier: PriorityTier,
}

impl<'a> From<&'a Task> for PriorityInput<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            due_date: task.due_date,
            description: task.description.as_deref(),
            is_mindful: task.is_mindful,
            tier: task.priority,
        }
    }
}

impl<'a> From<&'a NewTask> for PriorityInput<'a> {
    fn from(task: &'a NewTask) -> Self {
        Self {
            due_date: task.due_date,
            description: task.description.as_deref(),
            is_mindful: task.is_mindful,
            tier: task.priority,
        }
    }
}

/// One named contribution to a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreTerm {
    pub name: &'static str,
    pub points: i32,
}

/// Per-factor explanation of a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub terms: Vec<ScoreTerm>,
    /// Sum of all terms before clamping.
    pub raw: i32,
    pub score: u8,
}

/// Rule-based priority scorer.
#[derive(Debug, Clone)]
pub struct PriorityScorer {
    now: DateTime<Utc>,
}

impl Default for PriorityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityScorer {
    /// Create a scorer measuring due dates against the current time.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Create a scorer measuring due dates against `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Calculate the priority score for a task (0-100).
    pub fn score(&self, input: &PriorityInput<'_>) -> u8 {
        self.breakdown(input).score
    }

    /// Calculate the score along with the contribution of each factor.
    pub fn breakdown(&self, input: &PriorityInput<'_>) -> ScoreBreakdown {
        let mut terms = vec![ScoreTerm {
            name: "base",
            points: BASE_SCORE,
        }];

        if let Some(due) = input.due_date {
            terms.push(ScoreTerm {
                name: "due_date",
                points: due_date_points(self.days_until(due)),
            });
        }

        if let Some(description) = input.description {
            let points = description_points(description.chars().count());
            if points != 0 {
                terms.push(ScoreTerm {
                    name: "description",
                    points,
                });
            }
        }

        if input.is_mindful {
            terms.push(ScoreTerm {
                name: "mindful",
                points: 8,
            });
        }

        if let Some(points) = tier_points(input.tier) {
            terms.push(ScoreTerm { name: "tier", points });
        }

        let raw: i32 = terms.iter().map(|t| t.points).sum();
        ScoreBreakdown {
            terms,
            raw,
            score: raw.clamp(0, 100) as u8,
        }
    }

    /// Whole days until `due`, rounded toward negative infinity.
    fn days_until(&self, due: DateTime<Utc>) -> i64 {
        due.signed_duration_since(self.now)
            .num_milliseconds()
            .div_euclid(MILLIS_PER_DAY)
    }
}

fn due_date_points(days_until_due: i64) -> i32 {
    match days_until_due {
        d if d <= 0 => 30,
        1 => 25,
        d if d <= 3 => 20,
        d if d <= 7 => 15,
        _ => 5,
    }
}

fn description_points(len: usize) -> i32 {
    if len > 200 {
        10
    } else if len > 100 {
        5
    } else if len > 50 {
        2
    } else {
        0
    }
}

/// The `ai` tier contributes nothing; the scorer is what decides it.
fn tier_points(tier: PriorityTier) -> Option<i32> {
    match tier {
        PriorityTier::High => Some(15),
        PriorityTier::Medium => Some(5),
        PriorityTier::Low => Some(-5),
        PriorityTier::Ai => None,
    }
}

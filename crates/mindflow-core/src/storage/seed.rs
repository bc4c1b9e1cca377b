//! Seed data: the shared activity/tip catalog and an optional demo user.
//!
//! Every seeding step skips rows that already exist (activities by title,
//! tips by content, categories and tasks by name/title per user), so running
//! a seed twice changes nothing.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use rand::Rng;
use rusqlite::params;
use serde::Serialize;

use super::Database;
use crate::category::NewCategory;
use crate::error::Result;
use crate::mindfulness::{ActivityKind, NewActivity, NewTip, TipKind};
use crate::stats::{HourlyScore, NewProductivity};
use crate::task::{NewTask, PriorityTier};
use crate::UserId;

const ACTIVITIES: &[(ActivityKind, &str, &str, u32)] = &[
    (
        ActivityKind::Meditation,
        "Morning Clarity",
        "Start your day with clear intentions and focused awareness",
        300,
    ),
    (
        ActivityKind::Meditation,
        "Quick Centering",
        "A brief reset for busy moments during the day",
        120,
    ),
    (
        ActivityKind::Breathing,
        "Deep Breathing",
        "Focus on breath to restore calm and balance",
        480,
    ),
    (
        ActivityKind::Meditation,
        "Evening Wind Down",
        "Release the day's tensions and prepare for restful sleep",
        600,
    ),
    (
        ActivityKind::Reflection,
        "Body Scan Relaxation",
        "Progressive relaxation through mindful body awareness",
        900,
    ),
];

const TIPS: &[(TipKind, &str)] = &[
    (TipKind::Daily, "Before starting your next task, take three deep breaths. Inhale peace, exhale tension. Notice how your body feels in this moment."),
    (TipKind::TaskRelated, "Between tasks, pause for 30 seconds to feel your feet on the ground and notice three things you can see, hear, and feel."),
    (TipKind::TaskRelated, "Notice when your mind wanders during focused work. Gently acknowledge the thought, then return to your task without judgment."),
    (TipKind::Daily, "Take one mindful bite during your next meal. Notice the texture, temperature, and flavors without distraction."),
    (TipKind::General, "When you feel overwhelmed, place a hand on your heart and offer yourself words of kindness."),
    (TipKind::TaskRelated, "As you transition between tasks, take a moment to celebrate what you've accomplished before moving on."),
    (TipKind::General, "Your worth isn't measured by your productivity. Take a moment to appreciate yourself exactly as you are."),
    (TipKind::Daily, "Pause right now and feel the weight of your body being supported. Let yourself be held."),
];

const CATEGORIES: &[(&str, &str)] = &[
    ("Work", "#4F46E5"),
    ("Personal", "#A78BFA"),
    ("Health & Wellness", "#34D399"),
    ("Learning", "#EC4899"),
    ("Spiritual", "#F59E0B"),
];

/// When a demo task is due, relative to the seeding day.
#[derive(Clone, Copy)]
enum Due {
    TodayAt(u32),
    InDays(i64),
}

struct DemoTask {
    title: &'static str,
    description: &'static str,
    priority: PriorityTier,
    category: &'static str,
    is_mindful: bool,
    due: Due,
    completed: bool,
}

const DEMO_TASKS: &[DemoTask] = &[
    DemoTask {
        title: "Finalize project proposal",
        description: "Complete the final draft with all client feedback incorporated.",
        priority: PriorityTier::High,
        category: "Work",
        is_mindful: true,
        due: Due::TodayAt(15),
        completed: false,
    },
    DemoTask {
        title: "Morning meditation session",
        description: "15-minute guided meditation to start the day with intention.",
        priority: PriorityTier::Medium,
        category: "Spiritual",
        is_mindful: true,
        due: Due::TodayAt(9),
        completed: false,
    },
    DemoTask {
        title: "Review team feedback",
        description: "Go through team feedback for the latest design iteration.",
        priority: PriorityTier::Low,
        category: "Work",
        is_mindful: false,
        due: Due::TodayAt(10),
        completed: true,
    },
    DemoTask {
        title: "Weekly grocery shopping",
        description: "Buy fresh produce and meal prep ingredients.",
        priority: PriorityTier::Medium,
        category: "Personal",
        is_mindful: false,
        due: Due::InDays(1),
        completed: false,
    },
    DemoTask {
        title: "30-minute yoga practice",
        description: "Focus on stretching and mindful movement.",
        priority: PriorityTier::Medium,
        category: "Health & Wellness",
        is_mindful: true,
        due: Due::TodayAt(17),
        completed: false,
    },
    DemoTask {
        title: "Read chapter on mindfulness",
        description: "Continue reading the book on mindfulness practices.",
        priority: PriorityTier::Low,
        category: "Learning",
        is_mindful: true,
        due: Due::InDays(2),
        completed: false,
    },
    DemoTask {
        title: "Schedule doctor appointment",
        description: "Annual check-up and wellness visit.",
        priority: PriorityTier::High,
        category: "Health & Wellness",
        is_mindful: false,
        due: Due::InDays(5),
        completed: false,
    },
    DemoTask {
        title: "Journal reflection",
        description: "Write about progress and insights from the week.",
        priority: PriorityTier::Medium,
        category: "Spiritual",
        is_mindful: true,
        due: Due::TodayAt(20),
        completed: false,
    },
];

impl Due {
    fn resolve(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Due::TodayAt(hour) => {
                let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
                Utc.from_utc_datetime(&now.date_naive().and_time(time))
            }
            Due::InDays(days) => now + Duration::days(days),
        }
    }
}

/// Rows created by a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub activities: usize,
    pub tips: usize,
    pub categories: usize,
    pub tasks: usize,
    pub productivity: usize,
}

/// Insert the activity and tip catalog.
pub fn seed_catalog(db: &Database, now: DateTime<Utc>) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for &(kind, title, description, duration) in ACTIVITIES {
        if db.activity_exists(title)? {
            tracing::debug!(title, "activity already exists, skipping");
            continue;
        }
        db.create_activity(
            &NewActivity {
                kind,
                title: title.to_string(),
                description: description.to_string(),
                duration,
            },
            now,
        )?;
        summary.activities += 1;
    }

    for &(kind, content) in TIPS {
        if db.tip_exists(content)? {
            continue;
        }
        db.create_tip(
            &NewTip {
                content: content.to_string(),
                kind,
            },
            now,
        )?;
        summary.tips += 1;
    }

    tracing::info!(
        activities = summary.activities,
        tips = summary.tips,
        "seeded mindfulness catalog"
    );
    Ok(summary)
}

fn task_exists(db: &Database, user_id: UserId, title: &str) -> Result<bool> {
    let exists = db.conn().query_row(
        "SELECT EXISTS(SELECT 1 FROM tasks WHERE user_id = ?1 AND title = ?2)",
        params![user_id, title],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Populate demo categories, tasks and today's productivity record for a user.
pub fn seed_demo_user<R: Rng>(
    db: &Database,
    user_id: UserId,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    let mut categories = db.list_categories(user_id)?;
    for &(name, color) in CATEGORIES {
        if categories.iter().any(|c| c.name == name) {
            continue;
        }
        let created = db.create_category(
            &NewCategory {
                name: name.to_string(),
                color: color.to_string(),
                user_id,
            },
            now,
        )?;
        categories.push(created);
        summary.categories += 1;
    }

    for demo in DEMO_TASKS {
        if task_exists(db, user_id, demo.title)? {
            continue;
        }
        let category_id = categories
            .iter()
            .find(|c| c.name == demo.category)
            .map(|c| c.id);
        db.create_task(
            &NewTask {
                title: demo.title.to_string(),
                description: Some(demo.description.to_string()),
                priority: demo.priority,
                category_id,
                completed: demo.completed,
                is_mindful: demo.is_mindful,
                due_date: Some(demo.due.resolve(now)),
                user_id,
                ai_priority: None,
            },
            now,
        )?;
        summary.tasks += 1;
    }

    let has_today = !db
        .productivity_since(user_id, crate::stats::start_of_day(now))?
        .is_empty();
    if !has_today {
        let hourly_data = (8..=18)
            .map(|hour| HourlyScore {
                hour,
                score: rng.gen_range(0..100),
            })
            .collect();
        db.upsert_productivity(
            &NewProductivity {
                user_id,
                date: now,
                focus_score: Some(85),
                completed_tasks: 3,
                mindfulness_minutes: 15,
                hourly_data,
            },
            now,
        )?;
        summary.productivity = 1;
    }

    tracing::info!(
        user_id,
        categories = summary.categories,
        tasks = summary.tasks,
        "seeded demo user"
    );
    Ok(summary)
}

//! SQLite-based storage for tasks, categories, mindfulness and productivity.
//!
//! Provides persistent storage for:
//! - Tasks and their categories
//! - Mindfulness activities, tips and sessions
//! - Daily productivity records
//! - Dashboard aggregations built on top of them

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{data_dir, migrations};
use crate::category::{Category, NewCategory};
use crate::error::{CoreError, DatabaseError, Result};
use crate::insight::InsightSignals;
use crate::mindfulness::{
    ActivityKind, MindfulnessActivity, MindfulnessSession, MindfulnessTip, NewActivity,
    NewSession, NewTip, StreakCalculator, StreakSummary, TipKind,
};
use crate::stats::{
    start_of_day, CategoryProgress, DashboardStats, HourlyScore, NewProductivity,
    ProductivityDataPoint, Timeframe,
};
use crate::task::{NewTask, PriorityTier, Task, TaskFilter, TaskWithCategory};
use crate::UserId;

const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.priority, t.category_id, \
     t.completed, t.is_mindful, t.due_date, t.user_id, t.ai_priority, t.created_at, t.updated_at";
const CATEGORY_COLUMNS: &str = "c.id, c.name, c.color, c.user_id, c.created_at";
const ACTIVITY_COLUMNS: &str = "id, kind, title, description, duration, created_at";
const SESSION_COLUMNS: &str = "id, user_id, activity_id, duration, completed, created_at";
const TIP_COLUMNS: &str = "id, content, kind, created_at";
const PRODUCTIVITY_COLUMNS: &str =
    "id, user_id, date, focus_score, completed_tasks, mindfulness_minutes, hourly_data";

/// Number of tasks handed to the insight selector.
const INSIGHT_TASK_LIMIT: u32 = 10;

/// Timestamps are stored as fixed-width RFC 3339 so text order is time order.
fn ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn conversion_failure(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn get_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_failure(idx, e))
}

fn get_opt_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(_) => get_ts(row, idx).map(Some),
        None => Ok(None),
    }
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let priority: String = row.get(3)?;
    let priority = priority
        .parse::<PriorityTier>()
        .map_err(|e| conversion_failure(3, e))?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority,
        category_id: row.get(4)?,
        completed: row.get(5)?,
        is_mindful: row.get(6)?,
        due_date: get_opt_ts(row, 7)?,
        user_id: row.get(8)?,
        ai_priority: row.get(9)?,
        created_at: get_ts(row, 10)?,
        updated_at: get_ts(row, 11)?,
    })
}

/// Category columns starting at `offset`.
fn row_to_category(row: &Row<'_>, offset: usize) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        color: row.get(offset + 2)?,
        user_id: row.get(offset + 3)?,
        created_at: get_ts(row, offset + 4)?,
    })
}

fn row_to_task_with_category(row: &Row<'_>) -> rusqlite::Result<TaskWithCategory> {
    let task = row_to_task(row)?;
    let category = match row.get::<_, Option<i64>>(12)? {
        Some(_) => Some(row_to_category(row, 12)?),
        None => None,
    };
    Ok(TaskWithCategory { task, category })
}

fn row_to_activity(row: &Row<'_>) -> rusqlite::Result<MindfulnessActivity> {
    let kind: String = row.get(1)?;
    let kind = ActivityKind::parse(&kind)
        .ok_or_else(|| conversion_failure(1, format!("unknown activity kind: {kind}")))?;
    Ok(MindfulnessActivity {
        id: row.get(0)?,
        kind,
        title: row.get(2)?,
        description: row.get(3)?,
        duration: row.get(4)?,
        created_at: get_ts(row, 5)?,
    })
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<MindfulnessSession> {
    Ok(MindfulnessSession {
        id: row.get(0)?,
        user_id: row.get(1)?,
        activity_id: row.get(2)?,
        duration: row.get(3)?,
        completed: row.get(4)?,
        created_at: get_ts(row, 5)?,
    })
}

fn row_to_tip(row: &Row<'_>) -> rusqlite::Result<MindfulnessTip> {
    let kind: String = row.get(2)?;
    let kind = TipKind::parse(&kind)
        .ok_or_else(|| conversion_failure(2, format!("unknown tip kind: {kind}")))?;
    Ok(MindfulnessTip {
        id: row.get(0)?,
        content: row.get(1)?,
        kind,
        created_at: get_ts(row, 3)?,
    })
}

fn row_to_productivity(row: &Row<'_>) -> rusqlite::Result<ProductivityDataPoint> {
    let hourly: String = row.get(6)?;
    let hourly_data: Vec<HourlyScore> =
        serde_json::from_str(&hourly).map_err(|e| conversion_failure(6, e))?;
    Ok(ProductivityDataPoint {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: get_ts(row, 2)?,
        focus_score: row.get(3)?,
        completed_tasks: row.get(4)?,
        mindfulness_minutes: row.get(5)?,
        hourly_data,
    })
}

fn filter_clause(filter: TaskFilter) -> &'static str {
    match filter {
        TaskFilter::All => "",
        TaskFilter::Today => "AND t.due_date >= ?2",
        TaskFilter::Important => "AND t.priority = 'high'",
        TaskFilter::Completed => "AND t.completed = 1",
    }
}

/// SQLite database for all Mindflow data.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/mindflow/mindflow.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("mindflow.db");
        Self::open_at(path)
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Tasks ───────────────────────────────────────────────────────────

    /// Insert a task. `ai_priority` is stored as given.
    ///
    /// # Errors
    /// Returns `NotFound` if the category does not exist or belongs to
    /// another user.
    pub fn create_task(&self, task: &NewTask, now: DateTime<Utc>) -> Result<Task> {
        self.ensure_category(task.category_id, task.user_id)?;
        let now = ts(now);
        self.conn.execute(
            "INSERT INTO tasks (title, description, priority, category_id, completed,
                                is_mindful, due_date, user_id, ai_priority, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                task.title,
                task.description,
                task.priority.as_str(),
                task.category_id,
                task.completed,
                task.is_mindful,
                task.due_date.map(ts),
                task.user_id,
                task.ai_priority,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_task(id)?
            .ok_or_else(|| CoreError::not_found("Task", id))
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?1");
        let task = self
            .conn
            .query_row(&sql, params![id], row_to_task)
            .optional()?;
        Ok(task)
    }

    /// Overwrite every mutable field of a stored task and bump `updated_at`.
    ///
    /// # Errors
    /// Returns `NotFound` if the task or its category does not exist.
    pub fn update_task(&self, task: &Task, now: DateTime<Utc>) -> Result<Task> {
        self.ensure_category(task.category_id, task.user_id)?;
        let changed = self.conn.execute(
            "UPDATE tasks SET title = ?2, description = ?3, priority = ?4, category_id = ?5,
                              completed = ?6, is_mindful = ?7, due_date = ?8,
                              ai_priority = ?9, updated_at = ?10
             WHERE id = ?1",
            params![
                task.id,
                task.title,
                task.description,
                task.priority.as_str(),
                task.category_id,
                task.completed,
                task.is_mindful,
                task.due_date.map(ts),
                task.ai_priority,
                ts(now),
            ],
        )?;
        if changed == 0 {
            return Err(CoreError::not_found("Task", task.id));
        }
        self.get_task(task.id)?
            .ok_or_else(|| CoreError::not_found("Task", task.id))
    }

    /// # Errors
    /// Returns `NotFound` if no task has this id.
    pub fn delete_task(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(CoreError::not_found("Task", id));
        }
        Ok(())
    }

    /// A user's tasks with categories embedded.
    ///
    /// Scored tasks come first, highest score first; the rest follow,
    /// newest first.
    pub fn list_tasks(
        &self,
        user_id: UserId,
        filter: TaskFilter,
        limit: u32,
        offset: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<TaskWithCategory>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS}, {CATEGORY_COLUMNS}
             FROM tasks t
             LEFT JOIN categories c ON c.id = t.category_id
             WHERE t.user_id = ?1 {}
             ORDER BY t.ai_priority IS NOT NULL, t.ai_priority DESC, t.created_at DESC, t.id DESC
             LIMIT ?3 OFFSET ?4",
            filter_clause(filter)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![user_id, ts(start_of_day(now)), limit, offset],
            row_to_task_with_category,
        )?;
        let tasks = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    fn ensure_category(&self, category_id: Option<i64>, user_id: UserId) -> Result<()> {
        let Some(id) = category_id else {
            return Ok(());
        };
        match self.get_category(id)? {
            Some(category) if category.user_id == user_id => Ok(()),
            _ => Err(CoreError::not_found("Category", id)),
        }
    }

    // ── Categories ──────────────────────────────────────────────────────

    pub fn create_category(&self, category: &NewCategory, now: DateTime<Utc>) -> Result<Category> {
        self.conn.execute(
            "INSERT INTO categories (name, color, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![category.name, category.color, category.user_id, ts(now)],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_category(id)?
            .ok_or_else(|| CoreError::not_found("Category", id))
    }

    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.id = ?1");
        let category = self
            .conn
            .query_row(&sql, params![id], |row| row_to_category(row, 0))
            .optional()?;
        Ok(category)
    }

    /// A user's categories ordered by name.
    pub fn list_categories(&self, user_id: UserId) -> Result<Vec<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.user_id = ?1 ORDER BY c.name, c.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], |row| row_to_category(row, 0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ── Mindfulness ─────────────────────────────────────────────────────

    pub fn create_activity(
        &self,
        activity: &NewActivity,
        now: DateTime<Utc>,
    ) -> Result<MindfulnessActivity> {
        self.conn.execute(
            "INSERT INTO mindfulness_activities (kind, title, description, duration, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                activity.kind.as_str(),
                activity.title,
                activity.description,
                activity.duration,
                ts(now),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_activity(id)?
            .ok_or_else(|| CoreError::not_found("Activity", id))
    }

    pub fn get_activity(&self, id: i64) -> Result<Option<MindfulnessActivity>> {
        let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM mindfulness_activities WHERE id = ?1");
        let activity = self
            .conn
            .query_row(&sql, params![id], row_to_activity)
            .optional()?;
        Ok(activity)
    }

    /// All activities, newest first.
    pub fn list_activities(&self) -> Result<Vec<MindfulnessActivity>> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM mindfulness_activities ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_activity)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn activity_exists(&self, title: &str) -> Result<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM mindfulness_activities WHERE title = ?1)",
            params![title],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Record a session.
    ///
    /// # Errors
    /// Returns `NotFound` if the referenced activity does not exist.
    pub fn create_session(
        &self,
        session: &NewSession,
        now: DateTime<Utc>,
    ) -> Result<MindfulnessSession> {
        if let Some(activity_id) = session.activity_id {
            if self.get_activity(activity_id)?.is_none() {
                return Err(CoreError::not_found("Activity", activity_id));
            }
        }
        self.conn.execute(
            "INSERT INTO mindfulness_sessions (user_id, activity_id, duration, completed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.user_id,
                session.activity_id,
                session.duration,
                session.completed,
                ts(now),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        let sql = format!("SELECT {SESSION_COLUMNS} FROM mindfulness_sessions WHERE id = ?1");
        let stored = self.conn.query_row(&sql, params![id], row_to_session)?;
        Ok(stored)
    }

    /// A user's sessions, newest first.
    pub fn list_sessions(&self, user_id: UserId) -> Result<Vec<MindfulnessSession>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM mindfulness_sessions
             WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], row_to_session)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn create_tip(&self, tip: &NewTip, now: DateTime<Utc>) -> Result<MindfulnessTip> {
        self.conn.execute(
            "INSERT INTO mindfulness_tips (content, kind, created_at) VALUES (?1, ?2, ?3)",
            params![tip.content, tip.kind.as_str(), ts(now)],
        )?;
        let id = self.conn.last_insert_rowid();
        let sql = format!("SELECT {TIP_COLUMNS} FROM mindfulness_tips WHERE id = ?1");
        let stored = self.conn.query_row(&sql, params![id], row_to_tip)?;
        Ok(stored)
    }

    pub fn tip_exists(&self, content: &str) -> Result<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM mindfulness_tips WHERE content = ?1)",
            params![content],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// A random tip, optionally of one kind. `None` when there is none.
    pub fn random_tip(&self, kind: Option<TipKind>) -> Result<Option<MindfulnessTip>> {
        let sql = format!(
            "SELECT {TIP_COLUMNS} FROM mindfulness_tips
             WHERE ?1 IS NULL OR kind = ?1
             ORDER BY RANDOM() LIMIT 1"
        );
        let tip = self
            .conn
            .query_row(&sql, params![kind.map(|k| k.as_str())], row_to_tip)
            .optional()?;
        Ok(tip)
    }

    /// Consecutive-day streak for a user as of `today`.
    pub fn mindfulness_streak(&self, user_id: UserId, today: NaiveDate) -> Result<StreakSummary> {
        let mut stmt = self
            .conn
            .prepare("SELECT created_at FROM mindfulness_sessions WHERE user_id = ?1")?;
        let times = stmt
            .query_map(params![user_id], |row| get_ts(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(StreakCalculator::at(today).summarize(times))
    }

    // ── Productivity ────────────────────────────────────────────────────

    /// Insert or replace the user's record for the record's calendar day.
    pub fn upsert_productivity(
        &self,
        record: &NewProductivity,
        now: DateTime<Utc>,
    ) -> Result<ProductivityDataPoint> {
        let day = record.date.date_naive().to_string();
        let hourly = serde_json::to_string(&record.hourly_data)?;
        self.conn.execute(
            "INSERT INTO productivity_data (user_id, day, date, focus_score, completed_tasks,
                                            mindfulness_minutes, hourly_data, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (user_id, day) DO UPDATE SET
                date = excluded.date,
                focus_score = excluded.focus_score,
                completed_tasks = excluded.completed_tasks,
                mindfulness_minutes = excluded.mindfulness_minutes,
                hourly_data = excluded.hourly_data",
            params![
                record.user_id,
                day,
                ts(record.date),
                record.focus_score,
                record.completed_tasks,
                record.mindfulness_minutes,
                hourly,
                ts(now),
            ],
        )?;
        let sql = format!(
            "SELECT {PRODUCTIVITY_COLUMNS} FROM productivity_data WHERE user_id = ?1 AND day = ?2"
        );
        let stored = self
            .conn
            .query_row(&sql, params![record.user_id, day], row_to_productivity)?;
        Ok(stored)
    }

    /// Records dated at or after `since`, oldest first.
    pub fn productivity_since(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<ProductivityDataPoint>> {
        let sql = format!(
            "SELECT {PRODUCTIVITY_COLUMNS} FROM productivity_data
             WHERE user_id = ?1 AND date >= ?2 ORDER BY date ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, ts(since)], row_to_productivity)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn productivity(
        &self,
        user_id: UserId,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProductivityDataPoint>> {
        self.productivity_since(user_id, timeframe.start(now))
    }

    pub fn latest_productivity(&self, user_id: UserId) -> Result<Option<ProductivityDataPoint>> {
        let sql = format!(
            "SELECT {PRODUCTIVITY_COLUMNS} FROM productivity_data
             WHERE user_id = ?1 ORDER BY date DESC LIMIT 1"
        );
        let record = self
            .conn
            .query_row(&sql, params![user_id], row_to_productivity)
            .optional()?;
        Ok(record)
    }

    // ── Dashboard ───────────────────────────────────────────────────────

    pub fn dashboard_stats(&self, user_id: UserId, now: DateTime<Utc>) -> Result<DashboardStats> {
        let today = ts(start_of_day(now));

        let active_tasks: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND completed = 0",
            params![user_id],
            |row| row.get(0),
        )?;
        let completed_today: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND completed = 1 AND updated_at >= ?2",
            params![user_id, today],
            |row| row.get(0),
        )?;
        let session_seconds: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(duration), 0) FROM mindfulness_sessions
             WHERE user_id = ?1 AND created_at >= ?2",
            params![user_id, today],
            |row| row.get(0),
        )?;
        let focus_score = self
            .latest_productivity(user_id)?
            .and_then(|record| record.focus_score)
            .unwrap_or(0);

        Ok(DashboardStats {
            active_tasks,
            completed_today,
            focus_score,
            mindfulness_minutes: u32::try_from(session_seconds / 60).unwrap_or(u32::MAX),
        })
    }

    /// Completion per category, ordered by category name.
    pub fn category_progress(&self, user_id: UserId) -> Result<Vec<CategoryProgress>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS},
                    COUNT(t.id),
                    COALESCE(SUM(CASE WHEN t.completed = 1 THEN 1 ELSE 0 END), 0)
             FROM categories c
             LEFT JOIN tasks t ON t.category_id = c.id AND t.user_id = c.user_id
             WHERE c.user_id = ?1
             GROUP BY c.id
             ORDER BY c.name, c.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], |row| {
            let category = row_to_category(row, 0)?;
            let total: u32 = row.get(5)?;
            let completed: u32 = row.get(6)?;
            Ok(CategoryProgress::new(category, completed, total))
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Recent activity handed to the insight selector.
    pub fn insight_signals(&self, user_id: UserId, now: DateTime<Utc>) -> Result<InsightSignals> {
        let recent_tasks = self
            .list_tasks(user_id, TaskFilter::All, INSIGHT_TASK_LIMIT, 0, now)?
            .into_iter()
            .map(|t| t.task)
            .collect();
        Ok(InsightSignals {
            productivity: self.productivity(user_id, Timeframe::Week, now)?,
            recent_tasks,
            sessions: self.list_sessions(user_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ProductivityInput;
    use crate::task::{PriorityScorer, TaskInput, TaskPatch};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, 14, 0, 0).unwrap()
    }

    fn new_task(user_id: UserId, title: &str, tier: &str) -> NewTask {
        TaskInput {
            title: Some(title.into()),
            priority: Some(tier.into()),
            user_id: Some(user_id),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    fn category(db: &Database, user_id: UserId, name: &str) -> Category {
        db.create_category(
            &NewCategory {
                name: name.into(),
                color: "#4F46E5".into(),
                user_id,
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn create_and_get_task() {
        let db = Database::open_memory().unwrap();
        let task = db.create_task(&new_task(1, "Write", "medium"), now()).unwrap();
        assert_eq!(task.title, "Write");
        assert_eq!(task.created_at, now());
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(db.get_task(task.id).unwrap(), Some(task));
        assert!(db.get_task(999).unwrap().is_none());
    }

    #[test]
    fn unscored_tasks_list_before_ai_scores() {
        let db = Database::open_memory().unwrap();
        let scorer = PriorityScorer::at(now());
        let plain = db.create_task(&new_task(1, "Plain", "high"), now()).unwrap();
        let newer = db
            .create_task(&new_task(1, "Newer", "low"), now() + Duration::minutes(1))
            .unwrap();
        let mut ai = new_task(1, "Scored", "ai");
        ai.due_date = Some(now() + Duration::days(2));
        let ai = db
            .create_task(&ai.scored(&scorer), now() - Duration::days(1))
            .unwrap();
        assert_eq!(ai.ai_priority, Some(70));

        let ids: Vec<i64> = db
            .list_tasks(1, TaskFilter::All, 50, 0, now())
            .unwrap()
            .into_iter()
            .map(|t| t.task.id)
            .collect();
        assert_eq!(ids, vec![newer.id, plain.id, ai.id]);

        let mut urgent = new_task(1, "Urgent", "ai");
        urgent.due_date = Some(now());
        let urgent = db.create_task(&urgent.scored(&scorer), now()).unwrap();
        let ids: Vec<i64> = db
            .list_tasks(1, TaskFilter::All, 50, 0, now())
            .unwrap()
            .into_iter()
            .map(|t| t.task.id)
            .collect();
        assert_eq!(ids, vec![newer.id, plain.id, urgent.id, ai.id]);
    }

    #[test]
    fn list_applies_filters_limit_and_offset() {
        let db = Database::open_memory().unwrap();
        let mut due = new_task(1, "Due", "medium");
        due.due_date = Some(now() + Duration::hours(2));
        db.create_task(&due, now()).unwrap();
        let mut overdue = new_task(1, "Overdue", "medium");
        overdue.due_date = Some(now() - Duration::days(2));
        db.create_task(&overdue, now()).unwrap();
        db.create_task(&new_task(1, "Important", "high"), now()).unwrap();
        let mut done = new_task(1, "Done", "low");
        done.completed = true;
        db.create_task(&done, now()).unwrap();
        db.create_task(&new_task(2, "Other user", "high"), now()).unwrap();

        let titles = |filter| -> Vec<String> {
            db.list_tasks(1, filter, 50, 0, now())
                .unwrap()
                .into_iter()
                .map(|t| t.task.title)
                .collect()
        };
        assert_eq!(titles(TaskFilter::Today), vec!["Due"]);
        assert_eq!(titles(TaskFilter::Important), vec!["Important"]);
        assert_eq!(titles(TaskFilter::Completed), vec!["Done"]);
        assert_eq!(titles(TaskFilter::All).len(), 4);

        assert_eq!(db.list_tasks(1, TaskFilter::All, 2, 0, now()).unwrap().len(), 2);
        assert_eq!(db.list_tasks(1, TaskFilter::All, 50, 3, now()).unwrap().len(), 1);
    }

    #[test]
    fn listing_embeds_category() {
        let db = Database::open_memory().unwrap();
        let work = category(&db, 1, "Work");
        let mut task = new_task(1, "Report", "medium");
        task.category_id = Some(work.id);
        db.create_task(&task, now()).unwrap();

        let listed = db.list_tasks(1, TaskFilter::All, 50, 0, now()).unwrap();
        assert_eq!(listed[0].category.as_ref(), Some(&work));
    }

    #[test]
    fn foreign_category_is_rejected() {
        let db = Database::open_memory().unwrap();
        let theirs = category(&db, 2, "Theirs");
        let mut task = new_task(1, "Sneaky", "low");
        task.category_id = Some(theirs.id);
        let err = db.create_task(&task, now()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "Category", .. }));
    }

    #[test]
    fn update_overwrites_and_bumps_timestamp() {
        let db = Database::open_memory().unwrap();
        let task = db.create_task(&new_task(1, "Draft", "medium"), now()).unwrap();
        let later = now() + Duration::hours(1);
        let merged = TaskPatch {
            completed: Some(true),
            title: Some("Final".into()),
            ..Default::default()
        }
        .apply_to(&task);

        let stored = db.update_task(&merged, later).unwrap();
        assert!(stored.completed);
        assert_eq!(stored.title, "Final");
        assert_eq!(stored.updated_at, later);
        assert_eq!(stored.created_at, now());
    }

    #[test]
    fn update_and_delete_missing_task() {
        let db = Database::open_memory().unwrap();
        let mut ghost = db.create_task(&new_task(1, "Ghost", "low"), now()).unwrap();
        db.delete_task(ghost.id).unwrap();

        assert!(matches!(
            db.delete_task(ghost.id).unwrap_err(),
            CoreError::NotFound { entity: "Task", .. }
        ));
        ghost.title = "Still gone".into();
        assert!(matches!(
            db.update_task(&ghost, now()).unwrap_err(),
            CoreError::NotFound { entity: "Task", .. }
        ));
    }

    #[test]
    fn categories_are_listed_by_name() {
        let db = Database::open_memory().unwrap();
        category(&db, 1, "Work");
        category(&db, 1, "Health");
        category(&db, 1, "Work");
        category(&db, 2, "Elsewhere");
        let names: Vec<String> = db
            .list_categories(1)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Health", "Work", "Work"]);
    }

    #[test]
    fn session_requires_known_activity() {
        let db = Database::open_memory().unwrap();
        let session = NewSession {
            user_id: 1,
            activity_id: Some(42),
            duration: 60,
            completed: true,
        };
        assert!(matches!(
            db.create_session(&session, now()).unwrap_err(),
            CoreError::NotFound { entity: "Activity", .. }
        ));

        let activity = db
            .create_activity(
                &NewActivity {
                    kind: ActivityKind::Breathing,
                    title: "Deep Breathing".into(),
                    description: "Slow breaths".into(),
                    duration: 480,
                },
                now(),
            )
            .unwrap();
        let stored = db
            .create_session(
                &NewSession {
                    activity_id: Some(activity.id),
                    ..session
                },
                now(),
            )
            .unwrap();
        assert_eq!(stored.activity_id, Some(activity.id));
        assert_eq!(db.list_sessions(1).unwrap(), vec![stored]);
    }

    #[test]
    fn streak_counts_session_days() {
        let db = Database::open_memory().unwrap();
        for days_ago in [0, 0, 1, 2, 5] {
            let session = NewSession {
                user_id: 1,
                activity_id: None,
                duration: 120,
                completed: true,
            };
            db.create_session(&session, now() - Duration::days(days_ago))
                .unwrap();
        }
        let summary = db.mindfulness_streak(1, now().date_naive()).unwrap();
        assert_eq!(summary.days, 3);
        assert_eq!(db.mindfulness_streak(2, now().date_naive()).unwrap().days, 0);
    }

    #[test]
    fn random_tip_respects_kind() {
        let db = Database::open_memory().unwrap();
        assert!(db.random_tip(None).unwrap().is_none());
        db.create_tip(
            &NewTip {
                content: "Breathe".into(),
                kind: TipKind::Daily,
            },
            now(),
        )
        .unwrap();
        assert_eq!(db.random_tip(None).unwrap().unwrap().content, "Breathe");
        assert!(db.random_tip(Some(TipKind::General)).unwrap().is_none());
        assert!(db.tip_exists("Breathe").unwrap());
    }

    #[test]
    fn productivity_upsert_replaces_same_day() {
        let db = Database::open_memory().unwrap();
        let record = |score: i64, at: DateTime<Utc>| {
            ProductivityInput {
                user_id: Some(1),
                date: Some(at),
                focus_score: Some(score),
                ..Default::default()
            }
            .validate(now())
            .unwrap()
        };
        let first = db.upsert_productivity(&record(60, now()), now()).unwrap();
        let second = db
            .upsert_productivity(&record(90, now() + Duration::hours(2)), now())
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.focus_score, Some(90));

        db.upsert_productivity(&record(40, now() - Duration::days(3)), now())
            .unwrap();
        let week = db.productivity(1, Timeframe::Week, now()).unwrap();
        assert_eq!(week.len(), 2);
        assert!(week[0].date < week[1].date);
        assert_eq!(db.productivity(1, Timeframe::Day, now()).unwrap().len(), 1);
    }

    #[test]
    fn dashboard_counts_today_only() {
        let db = Database::open_memory().unwrap();
        db.create_task(&new_task(1, "Open", "low"), now()).unwrap();
        let mut done = new_task(1, "Done today", "low");
        done.completed = true;
        db.create_task(&done, now()).unwrap();
        let mut old = new_task(1, "Done last week", "low");
        old.completed = true;
        db.create_task(&old, now() - Duration::days(7)).unwrap();

        for (seconds, at) in [(300, now()), (600, now()), (900, now() - Duration::days(1))] {
            let session = NewSession {
                user_id: 1,
                activity_id: None,
                duration: seconds,
                completed: true,
            };
            db.create_session(&session, at).unwrap();
        }

        let stats = db.dashboard_stats(1, now()).unwrap();
        assert_eq!(stats.active_tasks, 1);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.focus_score, 0);
        assert_eq!(stats.mindfulness_minutes, 15);
    }

    #[test]
    fn category_progress_is_idempotent() {
        let db = Database::open_memory().unwrap();
        let work = category(&db, 1, "Work");
        category(&db, 1, "Empty");
        for completed in [true, false, false] {
            let mut task = new_task(1, "t", "medium");
            task.category_id = Some(work.id);
            task.completed = completed;
            db.create_task(&task, now()).unwrap();
        }

        let first = db.category_progress(1).unwrap();
        assert_eq!(first, db.category_progress(1).unwrap());
        assert_eq!(first[0].category.name, "Empty");
        assert_eq!(first[0].percentage, 0);
        assert_eq!(first[1].total_tasks, 3);
        assert_eq!(first[1].completed_tasks, 1);
        assert_eq!(first[1].percentage, 33);
    }

    #[test]
    fn insight_signals_cap_recent_tasks() {
        let db = Database::open_memory().unwrap();
        for i in 0..12 {
            db.create_task(&new_task(1, &format!("t{i}"), "low"), now())
                .unwrap();
        }
        let signals = db.insight_signals(1, now()).unwrap();
        assert_eq!(signals.recent_tasks.len(), 10);
        assert!(signals.sessions.is_empty());
    }
}

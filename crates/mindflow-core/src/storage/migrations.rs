//! Database schema migrations for mindflow.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use indoc::indoc;
use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 if no version is set (fresh database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: initial schema.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(indoc! {"
        CREATE TABLE IF NOT EXISTS categories (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            color       TEXT NOT NULL,
            user_id     INTEGER NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT NOT NULL,
            description TEXT,
            priority    TEXT NOT NULL CHECK (priority IN ('high', 'medium', 'low', 'ai')),
            category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
            completed   INTEGER NOT NULL DEFAULT 0,
            is_mindful  INTEGER NOT NULL DEFAULT 0,
            due_date    TEXT,
            user_id     INTEGER NOT NULL,
            ai_priority INTEGER,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS mindfulness_activities (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            kind        TEXT NOT NULL,
            title       TEXT NOT NULL,
            description TEXT NOT NULL,
            duration    INTEGER NOT NULL CHECK (duration >= 1),
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS mindfulness_sessions (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL,
            activity_id INTEGER REFERENCES mindfulness_activities(id) ON DELETE SET NULL,
            duration    INTEGER NOT NULL CHECK (duration >= 1),
            completed   INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS mindfulness_tips (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            content     TEXT NOT NULL,
            kind        TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS productivity_data (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id             INTEGER NOT NULL,
            day                 TEXT NOT NULL,
            date                TEXT NOT NULL,
            focus_score         INTEGER,
            completed_tasks     INTEGER NOT NULL DEFAULT 0,
            mindfulness_minutes INTEGER NOT NULL DEFAULT 0,
            hourly_data         TEXT NOT NULL DEFAULT '[]',
            created_at          TEXT NOT NULL,
            UNIQUE (user_id, day)
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);
        CREATE INDEX IF NOT EXISTS idx_tasks_user_order ON tasks(user_id, ai_priority, created_at);
        CREATE INDEX IF NOT EXISTS idx_tasks_category ON tasks(category_id);
        CREATE INDEX IF NOT EXISTS idx_categories_user ON categories(user_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_user_created ON mindfulness_sessions(user_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_productivity_user_date ON productivity_data(user_id, date);
    "})?;

    set_schema_version(&tx, 1)?;
    tx.commit()?;
    Ok(())
}

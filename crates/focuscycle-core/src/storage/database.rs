//! SQLite-based focus-time ledger.
//!
//! Every completed focus phase is one row. The ledger is the persistent
//! [`FocusTimeSink`] and answers the statistics queries of the CLI.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::data_dir;
use crate::accounting::FocusTimeSink;
use crate::error::{DatabaseError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusRecord {
    pub id: i64,
    pub minutes: u32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusStats {
    pub completed_focus_sessions: u64,
    pub total_focus_minutes: u64,
    pub today_focus_sessions: u64,
    pub today_focus_minutes: u64,
}

/// Focus time completed since a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusWindowStats {
    pub since: DateTime<Utc>,
    pub focus_sessions: u64,
    pub focus_minutes: u64,
}

/// SQLite database for the focus ledger.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the ledger at `<data_dir>/focuscycle.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("focuscycle.db");
        Ok(Self::open_at(&path)?)
    }

    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and throwaway sessions).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS focus_sessions (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                minutes      INTEGER NOT NULL,
                completed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_focus_sessions_completed_at ON focus_sessions(completed_at);",
        )?;
        Ok(())
    }

    /// Record a completed focus phase.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_focus(&self, minutes: u32, completed_at: DateTime<Utc>) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO focus_sessions (minutes, completed_at) VALUES (?1, ?2)",
            params![minutes, completed_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent records first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn recent(&self, limit: usize) -> Result<Vec<FocusRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, minutes, completed_at FROM focus_sessions
             ORDER BY completed_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, minutes, completed_at) = row?;
            let completed_at = DateTime::parse_from_rfc3339(&completed_at)
                .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp in row {id}: {e}")))?
                .with_timezone(&Utc);
            records.push(FocusRecord {
                id,
                minutes,
                completed_at,
            });
        }
        Ok(records)
    }

    /// Totals of rows completed at or after `since`.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn stats_since(&self, since: DateTime<Utc>) -> Result<FocusWindowStats, DatabaseError> {
        let (focus_sessions, focus_minutes) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(minutes), 0)
             FROM focus_sessions
             WHERE completed_at >= ?1",
            params![since.to_rfc3339()],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;
        Ok(FocusWindowStats {
            since,
            focus_sessions,
            focus_minutes,
        })
    }

    /// Focus time since midnight UTC.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn stats_today(&self) -> Result<FocusWindowStats, DatabaseError> {
        self.stats_since(start_of_today())
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub fn stats_all(&self) -> Result<FocusStats, DatabaseError> {
        let (count, minutes) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(minutes), 0) FROM focus_sessions",
            [],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;
        let today = self.stats_today()?;
        Ok(FocusStats {
            completed_focus_sessions: count,
            total_focus_minutes: minutes,
            today_focus_sessions: today.focus_sessions,
            today_focus_minutes: today.focus_minutes,
        })
    }
}

impl FocusTimeSink for Database {
    fn focus_completed(&mut self, minutes: u32) -> Result<()> {
        let id = self.record_focus(minutes, Utc::now())?;
        debug!(id, minutes, "focus time recorded");
        Ok(())
    }
}

fn start_of_today() -> DateTime<Utc> {
    let now = Utc::now();
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn record_and_query() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_focus(25, now).unwrap();
        db.record_focus(50, now).unwrap();
        let stats = db.stats_all().unwrap();
        assert_eq!(stats.completed_focus_sessions, 2);
        assert_eq!(stats.total_focus_minutes, 75);
        assert_eq!(stats.today_focus_sessions, 2);
    }

    #[test]
    fn empty_ledger_has_zero_stats() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.stats_all().unwrap(), FocusStats::default());
        assert!(db.recent(10).unwrap().is_empty());
    }

    #[test]
    fn stats_since_excludes_older_rows() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_focus(25, now - Duration::days(3)).unwrap();
        db.record_focus(30, now).unwrap();
        let since = now - Duration::hours(1);
        let window = db.stats_since(since).unwrap();
        assert_eq!(window.since, since);
        assert_eq!(window.focus_sessions, 1);
        assert_eq!(window.focus_minutes, 30);

        let all = db.stats_all().unwrap();
        assert_eq!(all.completed_focus_sessions, 2);
        assert_eq!(all.total_focus_minutes, 55);
    }

    #[test]
    fn today_window_is_not_reported_as_all_time_totals() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_focus(25, now - Duration::days(2)).unwrap();
        db.record_focus(15, now).unwrap();

        let today = db.stats_today().unwrap();
        assert_eq!(today.focus_sessions, 1);
        assert_eq!(today.focus_minutes, 15);
        assert!(today.since <= now);

        let json = serde_json::to_value(&today).unwrap();
        assert!(json.get("completed_focus_sessions").is_none());
        assert!(json.get("total_focus_minutes").is_none());

        let all = db.stats_all().unwrap();
        assert_eq!(all.total_focus_minutes, 40);
        assert_eq!(all.today_focus_minutes, 15);
    }

    #[test]
    fn recent_is_newest_first() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_focus(10, now - Duration::minutes(30)).unwrap();
        db.record_focus(20, now).unwrap();
        let recent = db.recent(1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].minutes, 20);
    }

    #[test]
    fn sink_records_rows() {
        let mut db = Database::open_memory().unwrap();
        db.focus_completed(25).unwrap();
        assert_eq!(db.stats_all().unwrap().total_focus_minutes, 25);
    }

    #[test]
    fn open_at_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.record_focus(25, Utc::now()).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.stats_all().unwrap().completed_focus_sessions, 1);
    }
}

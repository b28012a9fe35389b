//! SQLite-backed slot template storage.
//!
//! Templates are read-only to the engine; writes exist for seeding and
//! administration. Stored records are parsed strictly: one malformed row
//! fails the whole read as a storage error instead of silently shrinking the
//! timetable.

use std::path::Path;

use chrono::{Duration, NaiveTime, Weekday};
use rusqlite::{params, Connection};
use thiserror::Error;

use slotbook_engine::{Attendee, SlotTemplate};

/// Errors from the template store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database itself failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored record did not pass validated parsing.
    #[error("Invalid template record {id}: {message}")]
    InvalidRecord { id: i64, message: String },
}

impl StoreError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    fn invalid(id: i64, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            id,
            message: message.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// SQLite-based slot template storage.
pub struct SqliteTemplateStore {
    conn: Connection,
}

/// One row as stored, before validated parsing.
struct RawTemplate {
    id: i64,
    weekday: String,
    start_time: String,
    duration_minutes: i64,
    attendees: String,
}

impl SqliteTemplateStore {
    /// Open (or create) a template store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store, for tests and local development.
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS slot_templates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                weekday TEXT NOT NULL,
                start_time TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                attendees TEXT NOT NULL DEFAULT '[]'
            );

            CREATE INDEX IF NOT EXISTS idx_slot_templates_weekday ON slot_templates(weekday);
            "#,
        )?;
        Ok(())
    }

    /// Insert a template, returning its id. Seeding/administration only.
    pub fn insert_template(
        &self,
        weekday: Weekday,
        start_time: NaiveTime,
        duration_minutes: i64,
        attendees: &[Attendee],
    ) -> anyhow::Result<i64> {
        let attendees_str = serde_json::to_string(attendees)?;
        self.conn.execute(
            "INSERT INTO slot_templates (weekday, start_time, duration_minutes, attendees)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                weekday_str(weekday),
                start_time.format("%H:%M:%S").to_string(),
                duration_minutes,
                attendees_str,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!("Inserted slot template with ID: {}", id);
        Ok(id)
    }

    /// The full template set, ordered by start time then id.
    pub fn list_templates(&self) -> StoreResult<Vec<SlotTemplate>> {
        self.query_templates(
            "SELECT id, weekday, start_time, duration_minutes, attendees
             FROM slot_templates
             ORDER BY start_time, id",
            params![],
        )
    }

    /// Templates for a single weekday, ordered by start time then id.
    pub fn templates_for_weekday(&self, weekday: Weekday) -> StoreResult<Vec<SlotTemplate>> {
        self.query_templates(
            "SELECT id, weekday, start_time, duration_minutes, attendees
             FROM slot_templates
             WHERE weekday = ?1
             ORDER BY start_time, id",
            params![weekday_str(weekday)],
        )
    }

    fn query_templates(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StoreResult<Vec<SlotTemplate>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| StoreError::storage(e.to_string()))?;

        let raw_rows = stmt
            .query_map(params, |row| {
                Ok(RawTemplate {
                    id: row.get(0)?,
                    weekday: row.get(1)?,
                    start_time: row.get(2)?,
                    duration_minutes: row.get(3)?,
                    attendees: row.get(4)?,
                })
            })
            .map_err(|e| StoreError::storage(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::storage(e.to_string()))?;

        raw_rows.into_iter().map(parse_template).collect()
    }

    /// Direct connection access for crate-internal tests.
    #[cfg(test)]
    pub(crate) fn conn_for_tests(&self) -> &Connection {
        &self.conn
    }

    /// Number of stored templates.
    pub fn count(&self) -> anyhow::Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM slot_templates", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn weekday_str(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

/// Validated parse of one stored row.
fn parse_template(raw: RawTemplate) -> StoreResult<SlotTemplate> {
    let weekday: Weekday = raw
        .weekday
        .parse()
        .map_err(|_| StoreError::invalid(raw.id, format!("unknown weekday {:?}", raw.weekday)))?;

    let start_time = NaiveTime::parse_from_str(&raw.start_time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&raw.start_time, "%H:%M"))
        .map_err(|_| {
            StoreError::invalid(raw.id, format!("unparseable start time {:?}", raw.start_time))
        })?;

    if raw.duration_minutes <= 0 {
        return Err(StoreError::invalid(
            raw.id,
            format!("non-positive duration {}", raw.duration_minutes),
        ));
    }

    let attendees: Vec<Attendee> = serde_json::from_str(&raw.attendees)
        .map_err(|e| StoreError::invalid(raw.id, format!("bad attendee list: {}", e)))?;

    Ok(SlotTemplate {
        id: raw.id,
        weekday,
        start_time,
        duration: Duration::minutes(raw.duration_minutes),
        attendees,
    })
}

//! SQLite audit store.
//!
//! RULE: Only store.rs talks to the database.
//! The workshop records events and snapshots here; it never reads its
//! working state back from it.

use crate::{error::ShiftResult, event::EventLogEntry, types::Generation};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

pub struct ShiftStore {
    conn: Mutex<Connection>,
    path: Option<String>, // None for :memory:
}

impl ShiftStore {
    /// Open (or create) the audit database at `path`.
    pub fn open(path: &str) -> ShiftResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database. Everything is gone when it drops.
    pub fn in_memory() -> ShiftResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// `":memory:"` opens an in-memory store, anything else a file.
    pub fn open_or_memory(path: &str) -> ShiftResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::open(path)
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ShiftResult<()> {
        self.conn
            .lock()
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Session ────────────────────────────────────────────────

    pub fn insert_session(
        &self,
        session_id: &str,
        version: &str,
        started_at: DateTime<Utc>,
    ) -> ShiftResult<()> {
        self.conn.lock().execute(
            "INSERT INTO session (session_id, version, started_at) VALUES (?1, ?2, ?3)",
            params![session_id, version, started_at.to_rfc3339()],
        )?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> ShiftResult<()> {
        self.conn.lock().execute(
            "INSERT INTO event_log (session_id, generation, source, event_type, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.session_id,
                entry.generation as i64,
                entry.source,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    pub fn events(&self, session_id: &str) -> ShiftResult<Vec<EventLogEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, generation, source, event_type, payload
             FROM event_log WHERE session_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![session_id], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    session_id: row.get(1)?,
                    generation: row.get::<_, i64>(2)? as u64,
                    source: row.get(3)?,
                    event_type: row.get(4)?,
                    payload: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, session_id: &str, event_type: &str) -> ShiftResult<i64> {
        let count = self.conn.lock().query_row(
            "SELECT COUNT(*) FROM event_log WHERE session_id = ?1 AND event_type = ?2",
            params![session_id, event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Snapshot ───────────────────────────────────────────────

    pub fn save_snapshot(
        &self,
        session_id: &str,
        generation: Generation,
        state_json: &str,
    ) -> ShiftResult<()> {
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO schedule_snapshot (session_id, generation, state_json)
             VALUES (?1, ?2, ?3)",
            params![session_id, generation as i64, state_json],
        )?;
        Ok(())
    }

    pub fn latest_snapshot(&self, session_id: &str) -> ShiftResult<Option<(Generation, String)>> {
        let result = self
            .conn
            .lock()
            .query_row(
                "SELECT generation, state_json FROM schedule_snapshot
                 WHERE session_id = ?1
                 ORDER BY generation DESC LIMIT 1",
                params![session_id],
                |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(result)
    }
}

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::app_dirs::AppDirs;
use crate::controller::SessionListener;
use crate::error::Result;
use crate::session::{FinalStats, Mode};
use crate::util::{mean, std_dev};

/// Entries kept per identity; older ones are dropped on append.
pub const HISTORY_LIMIT: usize = 50;

const GUEST_KEY: &str = "guest";

/// One finished session as remembered in the local history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub wpm: u32,
    pub raw_wpm: u32,
    pub accuracy: u32,
    pub mode: Mode,
    pub length_label: String,
    pub timestamp: DateTime<Local>,
}

impl HistoryEntry {
    pub fn from_results(results: &FinalStats, timestamp: DateTime<Local>) -> Self {
        Self {
            wpm: results.net_wpm,
            raw_wpm: results.gross_wpm,
            accuracy: results.accuracy,
            mode: results.mode,
            length_label: results.length_label.clone(),
            timestamp,
        }
    }
}

/// Who the history belongs to: a locally entered name or the guest.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Guest,
    User(String),
}

impl Identity {
    /// Blank or missing names fall back to the guest.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(name) if !name.is_empty() => Identity::User(name.to_string()),
            _ => Identity::Guest,
        }
    }

    pub fn key(&self) -> String {
        match self {
            Identity::Guest => GUEST_KEY.to_string(),
            Identity::User(name) => format!("user:{name}"),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Identity::Guest => "guest",
            Identity::User(name) => name,
        }
    }
}

/// Append-only, capped log of results per identity.
pub trait HistoryStore {
    fn append(&mut self, identity: &Identity, entry: &HistoryEntry) -> Result<()>;
    /// Newest first, at most [`HISTORY_LIMIT`] entries.
    fn recent(&self, identity: &Identity) -> Result<Vec<HistoryEntry>>;
    /// Remove every entry for the identity, returning how many went.
    fn clear(&mut self, identity: &Identity) -> Result<usize>;
}

/// History kept in a local SQLite database.
#[derive(Debug)]
pub struct SqliteHistoryStore {
    conn: Connection,
}

impl SqliteHistoryStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    /// Database under the user's state directory.
    pub fn open_default() -> Result<Self> {
        Self::open(AppDirs::history_db_path())
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                identity TEXT NOT NULL,
                wpm INTEGER NOT NULL,
                raw_wpm INTEGER NOT NULL,
                accuracy INTEGER NOT NULL,
                mode TEXT NOT NULL,
                length_label TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_history_identity ON history(identity, id)",
            [],
        )?;

        Ok(Self { conn })
    }
}

fn parse_mode(idx: usize, value: &str) -> rusqlite::Result<Mode> {
    match value {
        "time" => Ok(Mode::Time),
        "words" => Ok(Mode::Words),
        _ => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "mode".to_string(),
            rusqlite::types::Type::Text,
        )),
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn append(&mut self, identity: &Identity, entry: &HistoryEntry) -> Result<()> {
        let key = identity.key();
        let tx = self.conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO history
            (identity, wpm, raw_wpm, accuracy, mode, length_label, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                key,
                entry.wpm,
                entry.raw_wpm,
                entry.accuracy,
                entry.mode.to_string(),
                entry.length_label,
                entry.timestamp.to_rfc3339(),
            ],
        )?;

        tx.execute(
            r#"
            DELETE FROM history
            WHERE identity = ?1 AND id NOT IN (
                SELECT id FROM history WHERE identity = ?1 ORDER BY id DESC LIMIT ?2
            )
            "#,
            params![key, HISTORY_LIMIT as i64],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn recent(&self, identity: &Identity) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT wpm, raw_wpm, accuracy, mode, length_label, timestamp
            FROM history
            WHERE identity = ?1
            ORDER BY id DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![identity.key(), HISTORY_LIMIT as i64], |row| {
            let mode: String = row.get(3)?;
            let timestamp: String = row.get(5)?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        5,
                        "timestamp".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(HistoryEntry {
                wpm: row.get(0)?,
                raw_wpm: row.get(1)?,
                accuracy: row.get(2)?,
                mode: parse_mode(3, &mode)?,
                length_label: row.get(4)?,
                timestamp,
            })
        })?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }

    fn clear(&mut self, identity: &Identity) -> Result<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM history WHERE identity = ?1", [identity.key()])?;
        Ok(removed)
    }
}

/// Records every finished session for the current identity.
pub struct HistoryRecorder<S: HistoryStore> {
    store: S,
    identity: Identity,
}

impl<S: HistoryStore> HistoryRecorder<S> {
    pub fn new(store: S, identity: Identity) -> Self {
        Self { store, identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Sign in or out; later results go to the new identity.
    pub fn set_identity(&mut self, identity: Identity) {
        info!(identity = %identity.display_name(), "history identity changed");
        self.identity = identity;
    }

    pub fn entries(&self) -> Result<Vec<HistoryEntry>> {
        self.store.recent(&self.identity)
    }

    pub fn clear(&mut self) -> Result<usize> {
        self.store.clear(&self.identity)
    }

    pub fn record(&mut self, results: &FinalStats) -> Result<()> {
        let entry = HistoryEntry::from_results(results, Local::now());
        self.store.append(&self.identity, &entry)
    }
}

impl<S: HistoryStore> SessionListener for HistoryRecorder<S> {
    fn on_session_finished(&mut self, results: &FinalStats) {
        if let Err(e) = self.record(results) {
            warn!(error = %e, "failed to save history entry");
        }
    }
}

/// Aggregate figures over a list of history entries.
#[derive(Clone, Debug, PartialEq)]
pub struct HistorySummary {
    pub runs: usize,
    pub best_wpm: u32,
    pub average_wpm: f64,
    pub wpm_spread: f64,
    pub average_accuracy: f64,
}

pub fn summarize(entries: &[HistoryEntry]) -> Option<HistorySummary> {
    let wpms: Vec<f64> = entries.iter().map(|e| e.wpm as f64).collect();
    let accuracies: Vec<f64> = entries.iter().map(|e| e.accuracy as f64).collect();

    Some(HistorySummary {
        runs: entries.len(),
        best_wpm: entries.iter().map(|e| e.wpm).max()?,
        average_wpm: mean(&wpms)?,
        wpm_spread: std_dev(&wpms)?,
        average_accuracy: mean(&accuracies)?,
    })
}

/// Write entries as CSV with a header row.
pub fn export_csv<W: Write>(entries: &[HistoryEntry], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in entries {
        wtr.serialize(entry)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv_file<P: AsRef<Path>>(entries: &[HistoryEntry], path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    export_csv(entries, File::create(path)?)
}

//! Persistent storage using SQLite (rusqlite)
//!
//! This module provides:
//! - OS-standard data directory location (via `directories` crate)
//! - SQLite database with schema versioning
//! - Word lists grouped by difficulty level
//! - Answer log feeding failure statistics
//! - Game run history and daily challenge runs

pub mod cache;

use crate::game::session::AnswerRecord;
use crate::stats::{
    aggregate_failures, failure_stats_for_level, AnswerRow, DailyAnswer, DailyRun, DailyRunDetail,
    FailedWordStat, GameRun,
};
use crate::words::import::LexiconRecord;
use crate::words::{
    DifficultyLevel, FailureStats, FailureStatsSource, WordEntry, WordId, WordSource,
};
use chrono::NaiveDate;
use directories::ProjectDirs;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Current schema version. Bump this when making schema changes.
/// Version history:
/// - v1: words, synonyms, answers and game runs
/// - v2: daily challenge runs and their answers
const SCHEMA_VERSION: u32 = 2;

/// Maximum rows returned by a word search
pub const SEARCH_LIMIT: usize = 50;

/// Date format used for challenge dates
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("could not determine data directory")]
    NoDataDirectory,

    #[error("database schema version {found} is newer than supported version {supported}")]
    FutureSchemaVersion { found: u32, supported: u32 },

    #[error("failed to create data directory: {0}")]
    CreateDirFailed(std::io::Error),

    #[error("migration from v{from} to v{to} failed: {reason}")]
    MigrationFailed { from: u32, to: u32, reason: String },

    #[error("stored row is invalid: {0}")]
    InvalidRow(String),
}

/// Outcome of saving a daily challenge run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailySave {
    Saved,
    /// The player already has a run for that date
    AlreadyPlayed,
}

/// The main storage handle.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open or create the database in the OS data directory.
    ///
    /// - Linux: `$XDG_DATA_HOME/sinonimoak/` or `~/.local/share/sinonimoak/`
    /// - macOS: `~/Library/Application Support/sinonimoak/`
    pub fn open() -> Result<Self, StorageError> {
        let data_dir = Self::data_dir()?;
        Self::open_at(&data_dir.join("sinonimoak.db"))
    }

    /// Open or create the database at a specific path
    pub fn open_at(db_path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::CreateDirFailed)?;
        }
        let conn = Connection::open(db_path)?;
        let storage = Storage { conn };
        storage.initialize_schema()?;
        info!(path = %db_path.display(), "storage opened");
        Ok(storage)
    }

    /// Open an in-memory database (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let storage = Storage { conn };
        storage.initialize_schema()?;
        Ok(storage)
    }

    /// Get the OS-standard data directory
    pub fn data_dir() -> Result<PathBuf, StorageError> {
        ProjectDirs::from("", "", "sinonimoak")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(StorageError::NoDataDirectory)
    }

    /// Get the remembered player name, if any.
    pub fn handle(&self) -> Result<Option<String>, StorageError> {
        let handle = self
            .conn
            .query_row("SELECT handle FROM meta LIMIT 1", [], |row| {
                row.get::<_, Option<String>>(0)
            })
            .optional()?;
        Ok(handle.flatten())
    }

    /// Remember the player name.
    pub fn set_handle(&self, handle: &str) -> Result<(), StorageError> {
        self.conn
            .execute("UPDATE meta SET handle = ?1", params![handle])?;
        Ok(())
    }

    // Words

    /// Number of stored words (active or not)
    pub fn word_count(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Insert or replace words. Imported words are always active.
    ///
    /// Returns the number of records written.
    pub fn import_words(&mut self, records: &[LexiconRecord]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        {
            let mut upsert = tx.prepare(
                "INSERT INTO words (id, level, headword, active) VALUES (?1, ?2, ?3, 1)
                 ON CONFLICT(id) DO UPDATE SET level = excluded.level, headword = excluded.headword, active = 1",
            )?;
            let mut clear = tx.prepare("DELETE FROM synonyms WHERE word_id = ?1")?;
            let mut add = tx.prepare(
                "INSERT INTO synonyms (word_id, position, synonym) VALUES (?1, ?2, ?3)",
            )?;

            for record in records {
                let entry = &record.entry;
                upsert.execute(params![entry.id.as_str(), record.level.get(), entry.headword])?;
                clear.execute(params![entry.id.as_str()])?;
                for (pos, synonym) in entry.synonyms.iter().enumerate() {
                    add.execute(params![entry.id.as_str(), pos as i64, synonym])?;
                }
            }
        }
        tx.commit()?;
        info!(count = records.len(), "words imported");
        Ok(records.len())
    }

    /// Import `records` only when the word table is empty.
    pub fn seed_if_empty(&mut self, records: &[LexiconRecord]) -> Result<usize, StorageError> {
        if self.word_count()? > 0 {
            return Ok(0);
        }
        debug!("empty word table, seeding");
        self.import_words(records)
    }

    /// Hide or show a word in games and searches
    pub fn set_word_active(&self, id: &WordId, active: bool) -> Result<bool, StorageError> {
        let changed = self.conn.execute(
            "UPDATE words SET active = ?1 WHERE id = ?2",
            params![active, id.as_str()],
        )?;
        Ok(changed > 0)
    }

    /// Active words of one level
    pub fn words_by_level(&self, level: DifficultyLevel) -> Result<Vec<WordEntry>, StorageError> {
        self.load_words(
            "SELECT id, headword FROM words WHERE active = 1 AND level = ?1 ORDER BY id",
            params![level.get()],
        )
    }

    /// All active words
    pub fn all_active_words(&self) -> Result<Vec<WordEntry>, StorageError> {
        self.load_words(
            "SELECT id, headword FROM words WHERE active = 1 ORDER BY id",
            [],
        )
    }

    /// Case-insensitive substring search over headwords and synonyms
    pub fn search_words(
        &self,
        term: &str,
    ) -> Result<Vec<(DifficultyLevel, WordEntry)>, StorageError> {
        let pattern = format!("%{}%", term.trim().to_lowercase());
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT w.id, w.headword, w.level FROM words w
             LEFT JOIN synonyms s ON s.word_id = w.id
             WHERE w.active = 1 AND (lower(w.headword) LIKE ?1 OR lower(s.synonym) LIKE ?1)
             ORDER BY w.headword LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![pattern, SEARCH_LIMIT as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u8>(2)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (id, headword, level) = row?;
            let Some(level) = DifficultyLevel::new(level) else {
                warn!(id = %id, level, "skipping word with invalid level");
                continue;
            };
            if let Some(entry) = self.build_entry(id, &headword)? {
                results.push((level, entry));
            }
        }
        Ok(results)
    }

    fn load_words<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<WordEntry>, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut words = Vec::new();
        for row in rows {
            let (id, headword) = row?;
            if let Some(entry) = self.build_entry(id, &headword)? {
                words.push(entry);
            }
        }
        Ok(words)
    }

    /// Attach synonyms; entries that end up without any are skipped
    fn build_entry(&self, id: String, headword: &str) -> Result<Option<WordEntry>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT synonym FROM synonyms WHERE word_id = ?1 ORDER BY position")?;
        let synonyms = stmt
            .query_map(params![id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let entry = WordEntry::new(id, headword, synonyms);
        if entry.is_none() {
            debug!(headword, "skipping word without synonyms");
        }
        Ok(entry)
    }

    // Answers and failure statistics

    /// Log one answer of a regular game
    pub fn record_answer(
        &self,
        player: &str,
        level: DifficultyLevel,
        answer: &AnswerRecord,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO game_answers (player, level, word_id, headword, chosen, correct, is_correct, answered_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                player,
                level.get(),
                answer.word_id.as_str(),
                answer.headword,
                answer.chosen,
                answer.correct,
                answer.is_correct,
                now_millis()
            ],
        )?;
        Ok(())
    }

    /// Every logged answer of a player
    pub fn answer_rows(&self, player: &str) -> Result<Vec<AnswerRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT word_id, headword, level, is_correct FROM game_answers WHERE player = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![player], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u8>(2)?,
                row.get::<_, bool>(3)?,
            ))
        })?;

        let mut answers = Vec::new();
        for row in rows {
            let (word_id, headword, level, is_correct) = row?;
            let level = DifficultyLevel::new(level)
                .ok_or_else(|| StorageError::InvalidRow(format!("answer level {}", level)))?;
            answers.push(AnswerRow {
                word_id: WordId(word_id),
                headword,
                level,
                is_correct,
            });
        }
        Ok(answers)
    }

    /// Words the player has missed, across all levels
    pub fn failed_words(&self, player: &str) -> Result<Vec<FailedWordStat>, StorageError> {
        Ok(aggregate_failures(&self.answer_rows(player)?))
    }

    // Runs

    /// Store a finished regular game
    pub fn insert_game_run(&self, player: &str, run: &GameRun) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO game_runs (player, played_at, level, total, correct, wrong, time_seconds)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                player,
                run.played_at,
                run.level.get(),
                run.total,
                run.correct,
                run.wrong,
                run.time_secs
            ],
        )?;
        Ok(())
    }

    /// A player's regular games, newest first
    pub fn game_history(&self, player: &str) -> Result<Vec<GameRun>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT played_at, level, total, correct, wrong, time_seconds FROM game_runs
             WHERE player = ?1 ORDER BY played_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![player], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, u8>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, f64>(5)?,
            ))
        })?;

        let mut runs = Vec::new();
        for row in rows {
            let (played_at, level, total, correct, wrong, time_secs) = row?;
            let level = DifficultyLevel::new(level)
                .ok_or_else(|| StorageError::InvalidRow(format!("run level {}", level)))?;
            runs.push(GameRun {
                played_at,
                level,
                total,
                correct,
                wrong,
                time_secs,
            });
        }
        Ok(runs)
    }

    /// Whether the player already has a daily run for `date`
    pub fn has_played_daily(&self, player: &str, date: NaiveDate) -> Result<bool, StorageError> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM daily_runs WHERE player = ?1 AND challenge_date = ?2 LIMIT 1",
                params![player, date.format(DATE_FORMAT).to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Store a daily run with its answers.
    ///
    /// One run per player and date; a second attempt reports `AlreadyPlayed`
    /// and stores nothing.
    pub fn save_daily_run(
        &mut self,
        run: &DailyRun,
        answers: &[AnswerRecord],
    ) -> Result<DailySave, StorageError> {
        let tx = self.conn.transaction()?;
        let inserted = tx.execute(
            "INSERT INTO daily_runs (player, challenge_date, played_at, score, correct, wrong, total, time_seconds)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                run.player,
                run.challenge_date.format(DATE_FORMAT).to_string(),
                run.played_at,
                run.score,
                run.correct,
                run.wrong,
                run.total,
                run.time_secs
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                info!(player = %run.player, date = %run.challenge_date, "daily challenge already played");
                return Ok(DailySave::AlreadyPlayed);
            }
            Err(e) => return Err(e.into()),
        }

        let run_id = tx.last_insert_rowid();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO daily_answers (run_id, question_index, word_id, headword, chosen, correct, is_correct, response_ms, points)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for a in answers {
                stmt.execute(params![
                    run_id,
                    a.question_index as i64,
                    a.word_id.as_str(),
                    a.headword,
                    a.chosen,
                    a.correct,
                    a.is_correct,
                    a.response_ms as i64,
                    a.points
                ])?;
            }
        }
        tx.commit()?;
        Ok(DailySave::Saved)
    }

    /// Daily runs with `start <= challenge_date < end`
    pub fn daily_runs_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRun>, StorageError> {
        Ok(self
            .load_daily_runs(start, end)?
            .into_iter()
            .map(|(_, run)| run)
            .collect())
    }

    /// Daily runs of one date, each with its answers ordered by question
    pub fn daily_runs_with_answers(&self, date: NaiveDate) -> Result<Vec<DailyRunDetail>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT question_index, word_id, headword, chosen, correct, is_correct, response_ms, points
             FROM daily_answers WHERE run_id = ?1 ORDER BY question_index",
        )?;

        let mut details = Vec::new();
        for (run_id, run) in self.load_daily_runs(date, date + chrono::Days::new(1))? {
            let answers = stmt
                .query_map(params![run_id], |row| {
                    Ok(DailyAnswer {
                        question_index: row.get::<_, i64>(0)? as usize,
                        word_id: WordId::new(row.get::<_, String>(1)?),
                        headword: row.get(2)?,
                        chosen: row.get(3)?,
                        correct: row.get(4)?,
                        is_correct: row.get(5)?,
                        response_ms: row.get::<_, i64>(6)? as u64,
                        points: row.get(7)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            details.push(DailyRunDetail { run, answers });
        }
        Ok(details)
    }

    /// Daily runs in a date range, with their row ids
    fn load_daily_runs(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(i64, DailyRun)>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, player, challenge_date, played_at, score, correct, wrong, total, time_seconds
             FROM daily_runs WHERE challenge_date >= ?1 AND challenge_date < ?2 ORDER BY id",
        )?;
        let rows = stmt.query_map(
            params![
                start.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string()
            ],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, u32>(4)?,
                    row.get::<_, u32>(5)?,
                    row.get::<_, u32>(6)?,
                    row.get::<_, u32>(7)?,
                    row.get::<_, f64>(8)?,
                ))
            },
        )?;

        let mut runs = Vec::new();
        for row in rows {
            let (id, player, date, played_at, score, correct, wrong, total, time_secs) = row?;
            let challenge_date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
                .map_err(|e| StorageError::InvalidRow(format!("challenge date {}: {}", date, e)))?;
            runs.push((
                id,
                DailyRun {
                    player,
                    challenge_date,
                    played_at,
                    score,
                    correct,
                    wrong,
                    total,
                    time_secs,
                },
            ));
        }
        Ok(runs)
    }

    // Private helper methods

    fn initialize_schema(&self) -> Result<(), StorageError> {
        let current_version = self.get_schema_version()?;

        if current_version == 0 {
            self.create_schema()?;
        } else if current_version < SCHEMA_VERSION {
            self.migrate_schema(current_version)?;
        } else if current_version > SCHEMA_VERSION {
            // Database is from a newer release
            return Err(StorageError::FutureSchemaVersion {
                found: current_version,
                supported: SCHEMA_VERSION,
            });
        }

        Ok(())
    }

    fn get_schema_version(&self) -> Result<u32, StorageError> {
        let table_exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='meta'",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        let version: Option<u32> = self
            .conn
            .query_row("SELECT schema_version FROM meta LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(version.unwrap_or(0))
    }

    fn create_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(SCHEMA_V1)?;
        self.conn.execute_batch(SCHEMA_V2)?;
        self.conn.execute(
            "INSERT INTO meta (schema_version, handle, created_at) VALUES (?1, NULL, ?2)",
            params![SCHEMA_VERSION, now_millis()],
        )?;
        Ok(())
    }

    fn migrate_schema(&self, from_version: u32) -> Result<(), StorageError> {
        let mut current_version = from_version;

        while current_version < SCHEMA_VERSION {
            match current_version {
                1 => {
                    self.conn.execute_batch(SCHEMA_V2)?;
                    current_version = 2;
                }
                _ => {
                    return Err(StorageError::MigrationFailed {
                        from: current_version,
                        to: SCHEMA_VERSION,
                        reason: format!("no migration path from version {}", current_version),
                    });
                }
            }
        }

        self.conn.execute(
            "UPDATE meta SET schema_version = ?1",
            params![SCHEMA_VERSION],
        )?;
        info!(from = from_version, to = SCHEMA_VERSION, "schema migrated");

        Ok(())
    }
}

impl WordSource for Storage {
    type Error = StorageError;

    fn words_by_level(&mut self, level: DifficultyLevel) -> Result<Vec<WordEntry>, StorageError> {
        Storage::words_by_level(self, level)
    }

    fn all_active_words(&mut self) -> Result<Vec<WordEntry>, StorageError> {
        Storage::all_active_words(self)
    }
}

impl FailureStatsSource for Storage {
    type Error = StorageError;

    fn failure_stats(
        &mut self,
        player: &str,
        level: DifficultyLevel,
    ) -> Result<FailureStats, StorageError> {
        Ok(failure_stats_for_level(&self.failed_words(player)?, level))
    }
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

const SCHEMA_V1: &str = r#"
    -- Meta table: schema version and remembered player name
    CREATE TABLE meta (
        schema_version INTEGER NOT NULL,
        handle TEXT,
        created_at INTEGER NOT NULL
    );

    CREATE TABLE words (
        id TEXT PRIMARY KEY,
        level INTEGER NOT NULL,
        headword TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 1
    );

    CREATE INDEX idx_words_level ON words (level, active);

    CREATE TABLE synonyms (
        word_id TEXT NOT NULL REFERENCES words (id),
        position INTEGER NOT NULL,
        synonym TEXT NOT NULL,
        PRIMARY KEY (word_id, position)
    );

    -- One row per answered question of a regular game
    CREATE TABLE game_answers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player TEXT NOT NULL,
        level INTEGER NOT NULL,
        word_id TEXT NOT NULL,
        headword TEXT NOT NULL,
        chosen TEXT NOT NULL,
        correct TEXT NOT NULL,
        is_correct INTEGER NOT NULL,
        answered_at INTEGER NOT NULL
    );

    CREATE INDEX idx_answers_player ON game_answers (player);

    CREATE TABLE game_runs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player TEXT NOT NULL,
        played_at INTEGER NOT NULL,
        level INTEGER NOT NULL,
        total INTEGER NOT NULL,
        correct INTEGER NOT NULL,
        wrong INTEGER NOT NULL,
        time_seconds REAL NOT NULL
    );
"#;

const SCHEMA_V2: &str = r#"
    -- Daily challenge: one run per player and date
    CREATE TABLE IF NOT EXISTS daily_runs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player TEXT NOT NULL,
        challenge_date TEXT NOT NULL,
        played_at INTEGER NOT NULL,
        score INTEGER NOT NULL,
        correct INTEGER NOT NULL,
        wrong INTEGER NOT NULL,
        total INTEGER NOT NULL,
        time_seconds REAL NOT NULL,
        UNIQUE (player, challenge_date)
    );

    CREATE INDEX IF NOT EXISTS idx_daily_runs_date ON daily_runs (challenge_date);

    CREATE TABLE IF NOT EXISTS daily_answers (
        run_id INTEGER NOT NULL REFERENCES daily_runs (id),
        question_index INTEGER NOT NULL,
        word_id TEXT NOT NULL,
        headword TEXT NOT NULL,
        chosen TEXT NOT NULL,
        correct TEXT NOT NULL,
        is_correct INTEGER NOT NULL,
        response_ms INTEGER NOT NULL,
        points INTEGER NOT NULL,
        PRIMARY KEY (run_id, question_index)
    );
"#;

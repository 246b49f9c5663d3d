//! Word data: entries, difficulty levels and failure statistics
//!
//! Everything the quiz core consumes is defined here. Entries are validated
//! on construction so the pool generator can rely on a non-empty synonym list.

pub mod import;
pub mod lexicon;

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Lowest selectable difficulty level
pub const MIN_LEVEL: u8 = 1;

/// Highest selectable difficulty level
pub const MAX_LEVEL: u8 = 4;

/// Opaque identifier of a word entry.
///
/// Upstream ids may be numeric or textual; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WordId(pub String);

impl WordId {
    pub fn new(id: impl Into<String>) -> Self {
        WordId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u32> for WordId {
    fn from(id: u32) -> Self {
        WordId(id.to_string())
    }
}

impl From<String> for WordId {
    fn from(id: String) -> Self {
        WordId(id)
    }
}

impl From<&str> for WordId {
    fn from(id: &str) -> Self {
        WordId(id.to_string())
    }
}

/// Difficulty level a word belongs to (1-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DifficultyLevel(u8);

impl DifficultyLevel {
    /// Create a level, rejecting values outside 1..=4
    pub fn new(level: u8) -> Option<Self> {
        (MIN_LEVEL..=MAX_LEVEL)
            .contains(&level)
            .then_some(DifficultyLevel(level))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// All levels in ascending order
    pub fn all() -> impl Iterator<Item = DifficultyLevel> {
        (MIN_LEVEL..=MAX_LEVEL).map(DifficultyLevel)
    }
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        DifficultyLevel(MIN_LEVEL)
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A headword plus its accepted synonyms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub id: WordId,
    pub headword: String,
    /// Non-empty, trimmed, unique, in source order
    pub synonyms: Vec<String>,
}

impl WordEntry {
    /// Build an entry from raw data.
    ///
    /// Returns `None` when the headword is blank or no synonym survives
    /// normalization.
    pub fn new<I, S>(id: impl Into<WordId>, headword: &str, synonyms: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let headword = headword.trim();
        if headword.is_empty() {
            return None;
        }
        let synonyms = normalize_synonyms(synonyms);
        if synonyms.is_empty() {
            return None;
        }
        Some(WordEntry {
            id: id.into(),
            headword: headword.to_string(),
            synonyms,
        })
    }

    /// Whether `candidate` is this entry's headword or one of its synonyms
    pub fn owns(&self, candidate: &str) -> bool {
        self.headword == candidate || self.synonyms.iter().any(|s| s == candidate)
    }
}

/// Trim, drop blanks and deduplicate while keeping first-seen order.
pub fn normalize_synonyms<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Historical failure counts for one word, for one player and level
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FailureStat {
    pub wrong: u32,
    pub attempts: u32,
}

impl FailureStat {
    pub fn new(wrong: u32, attempts: u32) -> Self {
        FailureStat { wrong, attempts }
    }

    /// Percentage of attempts answered wrong (0-100)
    pub fn wrong_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.wrong as f64 / self.attempts as f64 * 100.0
        }
    }
}

/// Snapshot of a player's failure statistics keyed by word
pub type FailureStats = HashMap<WordId, FailureStat>;

/// Provides word lists to a session
pub trait WordSource {
    type Error: std::error::Error;

    /// Active words of one level
    fn words_by_level(&mut self, level: DifficultyLevel) -> Result<Vec<WordEntry>, Self::Error>;

    /// Every active word regardless of level
    fn all_active_words(&mut self) -> Result<Vec<WordEntry>, Self::Error>;
}

/// Provides per-player failure statistics
pub trait FailureStatsSource {
    type Error: std::error::Error;

    fn failure_stats(
        &mut self,
        player: &str,
        level: DifficultyLevel,
    ) -> Result<FailureStats, Self::Error>;
}

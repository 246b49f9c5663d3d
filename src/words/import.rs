//! Line-based word list format
//!
//! One entry per line: `id|level|headword|syn1,syn2,...`.
//! Blank lines and lines starting with `#` are ignored.

use super::{DifficultyLevel, WordEntry};
use std::path::Path;
use thiserror::Error;

/// Field separator within a line
const FIELD_SEPARATOR: char = '|';

/// Separator between synonyms
const SYNONYM_SEPARATOR: char = ',';

/// Errors raised while reading a word list
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read word list: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected 4 fields separated by '|', found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: invalid level '{value}' (expected 1-4)")]
    InvalidLevel { line: usize, value: String },

    #[error("line {line}: entry needs a headword and at least one synonym")]
    EmptyEntry { line: usize },
}

/// A parsed entry together with the level it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconRecord {
    pub level: DifficultyLevel,
    pub entry: WordEntry,
}

/// Parse a whole word list. Fails on the first malformed line.
pub fn parse_lexicon(text: &str) -> Result<Vec<LexiconRecord>, ImportError> {
    let mut records = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        if let Some(record) = parse_line(raw, idx + 1)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Read and parse a word list file
pub fn read_lexicon_file(path: &Path) -> Result<Vec<LexiconRecord>, ImportError> {
    let text = std::fs::read_to_string(path)?;
    parse_lexicon(&text)
}

fn parse_line(raw: &str, line: usize) -> Result<Option<LexiconRecord>, ImportError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = trimmed.split(FIELD_SEPARATOR).collect();
    if fields.len() != 4 {
        return Err(ImportError::FieldCount {
            line,
            found: fields.len(),
        });
    }

    let level_str = fields[1].trim();
    let level = level_str
        .parse::<u8>()
        .ok()
        .and_then(DifficultyLevel::new)
        .ok_or_else(|| ImportError::InvalidLevel {
            line,
            value: level_str.to_string(),
        })?;

    let id = fields[0].trim();
    if id.is_empty() {
        return Err(ImportError::EmptyEntry { line });
    }

    let entry = WordEntry::new(id, fields[2], fields[3].split(SYNONYM_SEPARATOR))
        .ok_or(ImportError::EmptyEntry { line })?;

    Ok(Some(LexiconRecord { level, entry }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_valid_lines() {
        let text = "# comment\n\n1|1|etxe|bizileku, egoitza\n2|3|mendiak|gailurrak\n";
        let records = parse_lexicon(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entry.headword, "etxe");
        assert_eq!(records[0].entry.synonyms, vec!["bizileku", "egoitza"]);
        assert_eq!(records[1].level.get(), 3);
    }

    #[test]
    fn test_wrong_field_count() {
        let err = parse_lexicon("1|1|etxe").unwrap_err();
        assert!(matches!(err, ImportError::FieldCount { line: 1, found: 3 }));
    }

    #[test]
    fn test_invalid_level() {
        let err = parse_lexicon("1|9|etxe|bizileku").unwrap_err();
        assert!(matches!(err, ImportError::InvalidLevel { line: 1, .. }));
        let err = parse_lexicon("1|x|etxe|bizileku").unwrap_err();
        assert!(matches!(err, ImportError::InvalidLevel { .. }));
    }

    #[test]
    fn test_entry_without_synonyms() {
        let err = parse_lexicon("\n1|1|etxe| , ").unwrap_err();
        assert!(matches!(err, ImportError::EmptyEntry { line: 2 }));
    }

    #[test]
    fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "7|2|hasi|abiatu,ekin").unwrap();
        let records = read_lexicon_file(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entry.id.as_str(), "7");
    }

    #[test]
    fn test_missing_file() {
        let err = read_lexicon_file(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
    }
}

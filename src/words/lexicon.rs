//! Built-in seed lexicon
//!
//! Embeds a small Basque synonym list at build time so a fresh install has
//! something to play with before any word list is imported.

use super::import::{parse_lexicon, LexiconRecord};
use once_cell::sync::Lazy;

/// Embedded word list, same format as imported files
static LEXICON_DATA: &str = include_str!("../../data/lexicon.txt");

/// Parsed once on first use. A malformed embedded list yields no records.
static LEXICON: Lazy<Vec<LexiconRecord>> = Lazy::new(|| match parse_lexicon(LEXICON_DATA) {
    Ok(records) => records,
    Err(e) => {
        tracing::error!("embedded lexicon is malformed: {}", e);
        Vec::new()
    }
});

/// All records of the seed lexicon
pub fn seed_records() -> &'static [LexiconRecord] {
    &LEXICON
}

/// Returns the total number of entries in the seed lexicon
pub fn word_count() -> usize {
    LEXICON.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::DifficultyLevel;
    use std::collections::HashSet;

    #[test]
    fn test_seed_parses() {
        assert!(word_count() >= 40, "Expected 40+ entries, got {}", word_count());
    }

    #[test]
    fn test_every_level_has_words() {
        for level in DifficultyLevel::all() {
            let count = seed_records().iter().filter(|r| r.level == level).count();
            assert!(count >= 5, "Level {} has only {} words", level, count);
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<_> = seed_records().iter().map(|r| &r.entry.id).collect();
        assert_eq!(ids.len(), word_count());
    }
}

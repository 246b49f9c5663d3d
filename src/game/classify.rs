//! Coarse morphological buckets for Basque words
//!
//! A suffix heuristic, not an analyzer. It only exists so distractors tend to
//! look like the correct answer (verbs next to verbs, plurals next to plurals).

/// Suffix-derived word category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordClass {
    Verb,
    Plural,
    Abstract,
    Other,
}

const VERB_SUFFIXES: [&str; 4] = ["tu", "du", "ten", "tzen"];
const PLURAL_SUFFIXES: [&str; 2] = ["ak", "ek"];
const ABSTRACT_SUFFIXES: [&str; 3] = ["era", "ura", "tasun"];

/// Classify a word by its ending. Case-insensitive, surrounding whitespace ignored.
pub fn classify(word: &str) -> WordClass {
    let normalized = word.trim().to_lowercase();
    let ends_with_any = |suffixes: &[&str]| suffixes.iter().any(|s| normalized.ends_with(s));

    if ends_with_any(&VERB_SUFFIXES) {
        WordClass::Verb
    } else if ends_with_any(&PLURAL_SUFFIXES) {
        WordClass::Plural
    } else if ends_with_any(&ABSTRACT_SUFFIXES) {
        WordClass::Abstract
    } else {
        WordClass::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbs() {
        assert_eq!(classify("ikasten"), WordClass::Verb);
        assert_eq!(classify("laguntzen"), WordClass::Verb);
        assert_eq!(classify("aztertu"), WordClass::Verb);
        assert_eq!(classify("ikusi du"), WordClass::Verb);
    }

    #[test]
    fn test_plurals() {
        assert_eq!(classify("mendiak"), WordClass::Plural);
        assert_eq!(classify("gizonek"), WordClass::Plural);
    }

    #[test]
    fn test_abstract() {
        assert_eq!(classify("poztasun"), WordClass::Abstract);
        assert_eq!(classify("ohitura"), WordClass::Abstract);
        assert_eq!(classify("aldera"), WordClass::Abstract);
    }

    #[test]
    fn test_other() {
        assert_eq!(classify("etxe"), WordClass::Other);
        assert_eq!(classify(""), WordClass::Other);
    }

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(classify("  MENDIAK "), WordClass::Plural);
        assert_eq!(classify("IkasTEN"), WordClass::Verb);
    }
}

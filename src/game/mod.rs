//! Game logic: question pools, distractors, scoring and sessions

pub mod classify;
pub mod scoring;
pub mod session;
pub mod weights;

use crate::words::{FailureStats, WordEntry};
use classify::{classify, WordClass};
use rand::prelude::*;
use std::collections::HashSet;
use tracing::debug;
use weights::WeightedPicker;

/// Distractors shown next to the correct answer
pub const DISTRACTOR_COUNT: usize = 3;

/// Same-class candidates needed before the class filter is applied.
/// Below this the whole candidate list is used to keep some variety.
const MIN_SAME_CLASS_CANDIDATES: usize = 10;

/// One multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionItem {
    /// The word being asked about
    pub word: WordEntry,
    /// One of `word.synonyms`
    pub correct_answer: String,
    /// Correct answer plus up to 3 distractors, shuffled, no duplicates
    pub options: Vec<String>,
}

impl QuestionItem {
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

/// Generate a question pool using the thread-local RNG.
///
/// See [`generate_pool_with_rng`].
pub fn generate_pool(
    needed: usize,
    source: &[WordEntry],
    stats: Option<&FailureStats>,
) -> Vec<QuestionItem> {
    generate_pool_with_rng(needed, source, stats, &mut rand::rng())
}

/// Generate `needed` questions from `source`.
///
/// The first `min(needed, |source|)` questions use distinct words in random
/// order. Any remaining questions are drawn with replacement, weighted by
/// `stats` so frequently failed words come back more often.
///
/// Returns an empty pool when `source` is empty or `needed` is 0.
pub fn generate_pool_with_rng<R: Rng + ?Sized>(
    needed: usize,
    source: &[WordEntry],
    stats: Option<&FailureStats>,
    rng: &mut R,
) -> Vec<QuestionItem> {
    // Entries must carry at least one synonym to be askable.
    let usable: Vec<WordEntry> = source
        .iter()
        .filter(|w| !w.synonyms.is_empty())
        .cloned()
        .collect();
    if usable.is_empty() || needed == 0 {
        return Vec::new();
    }

    let mut selected: Vec<&WordEntry> = usable.iter().collect();
    selected.shuffle(rng);
    selected.truncate(needed);
    let unique = selected.len();

    if needed > unique {
        let picker = WeightedPicker::new(&usable, stats);
        while selected.len() < needed {
            match picker.pick(rng) {
                Some(entry) => selected.push(entry),
                None => break,
            }
        }
    }

    debug!(
        needed,
        unique,
        weighted = selected.len() - unique,
        source = usable.len(),
        "generated question pool"
    );

    let candidates = DistractorCandidates::new(&usable);
    selected
        .into_iter()
        .map(|word| build_question(word, &candidates, rng))
        .collect()
}

/// Every headword and synonym of a word list, classified once up front
struct DistractorCandidates<'a> {
    words: Vec<(&'a str, WordClass)>,
}

impl<'a> DistractorCandidates<'a> {
    fn new(source: &'a [WordEntry]) -> Self {
        let words = source
            .iter()
            .flat_map(|e| std::iter::once(&e.headword).chain(e.synonyms.iter()))
            .map(|w| (w.as_str(), classify(w)))
            .collect();
        Self { words }
    }

    /// Up to `count` distinct distractors for `word`, preferring its class
    fn pick<R: Rng + ?Sized>(&self, word: &WordEntry, count: usize, rng: &mut R) -> Vec<String> {
        let target = classify(&word.headword);
        let foreign: Vec<&(&str, WordClass)> =
            self.words.iter().filter(|(w, _)| !word.owns(w)).collect();
        let same_class: Vec<&(&str, WordClass)> = foreign
            .iter()
            .copied()
            .filter(|(_, class)| *class == target)
            .collect();

        let pool = if same_class.len() >= MIN_SAME_CLASS_CANDIDATES {
            same_class
        } else {
            foreign
        };

        let mut seen = HashSet::new();
        let mut distinct: Vec<&str> = pool
            .into_iter()
            .map(|(w, _)| *w)
            .filter(|w| seen.insert(*w))
            .collect();
        distinct.shuffle(rng);
        distinct.into_iter().take(count).map(str::to_string).collect()
    }
}

fn build_question<R: Rng + ?Sized>(
    word: &WordEntry,
    candidates: &DistractorCandidates<'_>,
    rng: &mut R,
) -> QuestionItem {
    let correct_answer = word.synonyms[rng.random_range(0..word.synonyms.len())].clone();
    let mut options = candidates.pick(word, DISTRACTOR_COUNT, rng);
    options.push(correct_answer.clone());
    options.shuffle(rng);

    QuestionItem {
        word: word.clone(),
        correct_answer,
        options,
    }
}

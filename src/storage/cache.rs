//! Caching decorator for word and statistics sources
//!
//! Word lists only change through the CLI subcommands, which never run next to
//! a quiz, so each level is fetched once per process. Failure statistics change
//! with every game, so they are only reused for a short TTL and only for the
//! same player and level.

use crate::words::{
    DifficultyLevel, FailureStats, FailureStatsSource, WordEntry, WordSource,
};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default lifetime of cached failure statistics
pub const DEFAULT_STATS_TTL: Duration = Duration::from_secs(30);

struct CachedStats {
    player: String,
    level: DifficultyLevel,
    fetched_at: Instant,
    stats: FailureStats,
}

/// Wraps a source and serves repeated reads from memory
pub struct CachedSource<S> {
    inner: S,
    words_by_level: HashMap<DifficultyLevel, Vec<WordEntry>>,
    all_words: Option<Vec<WordEntry>>,
    stats: Option<CachedStats>,
    stats_ttl: Duration,
}

impl<S> CachedSource<S> {
    pub fn new(inner: S, stats_ttl: Duration) -> Self {
        Self {
            inner,
            words_by_level: HashMap::new(),
            all_words: None,
            stats: None,
            stats_ttl,
        }
    }

    /// Direct access for writes that bypass the cache
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Forget cached failure statistics
    pub fn invalidate_stats(&mut self) {
        self.stats = None;
    }
}

impl<S: WordSource> WordSource for CachedSource<S> {
    type Error = S::Error;

    fn words_by_level(&mut self, level: DifficultyLevel) -> Result<Vec<WordEntry>, S::Error> {
        if let Some(words) = self.words_by_level.get(&level) {
            return Ok(words.clone());
        }
        let words = self.inner.words_by_level(level)?;
        // Empty lists are not cached so newly imported words show up
        if !words.is_empty() {
            self.words_by_level.insert(level, words.clone());
        }
        Ok(words)
    }

    fn all_active_words(&mut self) -> Result<Vec<WordEntry>, S::Error> {
        if let Some(words) = &self.all_words {
            return Ok(words.clone());
        }
        let words = self.inner.all_active_words()?;
        if !words.is_empty() {
            self.all_words = Some(words.clone());
        }
        Ok(words)
    }
}

impl<S: FailureStatsSource> FailureStatsSource for CachedSource<S> {
    type Error = S::Error;

    fn failure_stats(
        &mut self,
        player: &str,
        level: DifficultyLevel,
    ) -> Result<FailureStats, S::Error> {
        if let Some(cached) = &self.stats {
            if cached.player == player
                && cached.level == level
                && cached.fetched_at.elapsed() < self.stats_ttl
            {
                debug!(player, "failure stats served from cache");
                return Ok(cached.stats.clone());
            }
        }

        let stats = self.inner.failure_stats(player, level)?;
        self.stats = Some(CachedStats {
            player: player.to_string(),
            level,
            fetched_at: Instant::now(),
            stats: stats.clone(),
        });
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::{FailureStat, WordId};
    use std::convert::Infallible;

    /// Counts calls to the wrapped source
    #[derive(Default)]
    struct CountingSource {
        words: Vec<WordEntry>,
        word_calls: usize,
        stats_calls: usize,
    }

    impl WordSource for CountingSource {
        type Error = Infallible;

        fn words_by_level(&mut self, _level: DifficultyLevel) -> Result<Vec<WordEntry>, Infallible> {
            self.word_calls += 1;
            Ok(self.words.clone())
        }

        fn all_active_words(&mut self) -> Result<Vec<WordEntry>, Infallible> {
            self.word_calls += 1;
            Ok(self.words.clone())
        }
    }

    impl FailureStatsSource for CountingSource {
        type Error = Infallible;

        fn failure_stats(
            &mut self,
            _player: &str,
            _level: DifficultyLevel,
        ) -> Result<FailureStats, Infallible> {
            self.stats_calls += 1;
            let mut stats = FailureStats::new();
            stats.insert(WordId::new("1"), FailureStat::new(self.stats_calls as u32, 5));
            Ok(stats)
        }
    }

    fn level(n: u8) -> DifficultyLevel {
        DifficultyLevel::new(n).unwrap()
    }

    fn source_with_words() -> CountingSource {
        CountingSource {
            words: vec![WordEntry::new("1", "etxe", ["bizileku"]).unwrap()],
            ..Default::default()
        }
    }

    #[test]
    fn test_words_fetched_once_per_level() {
        let mut cache = CachedSource::new(source_with_words(), DEFAULT_STATS_TTL);
        cache.words_by_level(level(1)).unwrap();
        cache.words_by_level(level(1)).unwrap();
        cache.words_by_level(level(2)).unwrap();
        assert_eq!(cache.inner().word_calls, 2);

        cache.all_active_words().unwrap();
        cache.all_active_words().unwrap();
        assert_eq!(cache.inner().word_calls, 3);
    }

    #[test]
    fn test_empty_word_lists_not_cached() {
        let mut cache = CachedSource::new(CountingSource::default(), DEFAULT_STATS_TTL);
        assert!(cache.all_active_words().unwrap().is_empty());
        cache.inner_mut().words = source_with_words().words;
        assert_eq!(cache.all_active_words().unwrap().len(), 1);
        assert_eq!(cache.inner().word_calls, 2);
    }

    #[test]
    fn test_stats_reused_within_ttl() {
        let mut cache = CachedSource::new(CountingSource::default(), Duration::from_secs(3600));
        let a = cache.failure_stats("ane", level(1)).unwrap();
        let b = cache.failure_stats("ane", level(1)).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.inner().stats_calls, 1);
    }

    #[test]
    fn test_stats_refetched_for_other_player_or_level() {
        let mut cache = CachedSource::new(CountingSource::default(), Duration::from_secs(3600));
        cache.failure_stats("ane", level(1)).unwrap();
        cache.failure_stats("jon", level(1)).unwrap();
        cache.failure_stats("jon", level(2)).unwrap();
        assert_eq!(cache.inner().stats_calls, 3);
    }

    #[test]
    fn test_stats_expire() {
        let mut cache = CachedSource::new(CountingSource::default(), Duration::ZERO);
        cache.failure_stats("ane", level(1)).unwrap();
        let second = cache.failure_stats("ane", level(1)).unwrap();
        assert_eq!(cache.inner().stats_calls, 2);
        assert_eq!(second[&WordId::new("1")].wrong, 2);
    }

    #[test]
    fn test_invalidate_stats() {
        let mut cache = CachedSource::new(CountingSource::default(), Duration::from_secs(3600));
        cache.failure_stats("ane", level(1)).unwrap();
        cache.invalidate_stats();
        cache.failure_stats("ane", level(1)).unwrap();
        assert_eq!(cache.inner().stats_calls, 2);
    }
}

//! Statistics and leaderboards
//!
//! This module provides:
//! - Failure aggregation from raw answer rows (feeds weighted sampling)
//! - Game run history records
//! - Daily challenge leaderboard (score desc, time asc)
//! - Weekly and monthly leaderboards aggregated per player

use crate::words::{DifficultyLevel, FailureStat, FailureStats, WordId};
use chrono::{Datelike, Days, Months, NaiveDate};
use std::collections::HashMap;

/// Words need more than this many attempts before they count as "failed"
const MIN_ATTEMPTS_FOR_STATS: u32 = 1;

/// One stored answer, as far as failure statistics are concerned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRow {
    pub word_id: WordId,
    pub headword: String,
    pub level: DifficultyLevel,
    pub is_correct: bool,
}

/// Failure totals for one word at one level
#[derive(Debug, Clone, PartialEq)]
pub struct FailedWordStat {
    pub word_id: WordId,
    pub headword: String,
    pub level: DifficultyLevel,
    pub wrong: u32,
    pub attempts: u32,
}

impl FailedWordStat {
    /// Percentage of wrong attempts (0-100)
    pub fn wrong_rate(&self) -> f64 {
        FailureStat::new(self.wrong, self.attempts).wrong_rate()
    }
}

/// Group answers by (word, level) and count attempts and misses.
///
/// Words seen only once are dropped. The result is ordered by wrong rate,
/// then wrong count, both descending.
pub fn aggregate_failures(rows: &[AnswerRow]) -> Vec<FailedWordStat> {
    let mut by_key: HashMap<(WordId, DifficultyLevel), FailedWordStat> = HashMap::new();
    for row in rows {
        let stat = by_key
            .entry((row.word_id.clone(), row.level))
            .or_insert_with(|| FailedWordStat {
                word_id: row.word_id.clone(),
                headword: row.headword.clone(),
                level: row.level,
                wrong: 0,
                attempts: 0,
            });
        stat.attempts += 1;
        if !row.is_correct {
            stat.wrong += 1;
        }
    }

    let mut stats: Vec<FailedWordStat> = by_key
        .into_values()
        .filter(|s| s.attempts > MIN_ATTEMPTS_FOR_STATS)
        .collect();
    stats.sort_by(|a, b| {
        b.wrong_rate()
            .total_cmp(&a.wrong_rate())
            .then_with(|| b.wrong.cmp(&a.wrong))
            .then_with(|| a.headword.cmp(&b.headword))
    });
    stats
}

/// Sampling weights input for one level
pub fn failure_stats_for_level(stats: &[FailedWordStat], level: DifficultyLevel) -> FailureStats {
    stats
        .iter()
        .filter(|s| s.level == level)
        .map(|s| (s.word_id.clone(), FailureStat::new(s.wrong, s.attempts)))
        .collect()
}

/// A finished regular game
#[derive(Debug, Clone, PartialEq)]
pub struct GameRun {
    /// Unix timestamp in milliseconds
    pub played_at: i64,
    pub level: DifficultyLevel,
    pub total: u32,
    pub correct: u32,
    pub wrong: u32,
    pub time_secs: f64,
}

impl GameRun {
    /// Build a run from a player's totals; wrong answers are the remainder
    pub fn new(played_at: i64, level: DifficultyLevel, total: u32, correct: u32, time_secs: f64) -> Self {
        GameRun {
            played_at,
            level,
            total,
            correct,
            wrong: total.saturating_sub(correct),
            time_secs,
        }
    }
}

/// A finished daily challenge
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRun {
    pub player: String,
    pub challenge_date: NaiveDate,
    /// Unix timestamp in milliseconds
    pub played_at: i64,
    pub score: u32,
    pub correct: u32,
    pub wrong: u32,
    pub total: u32,
    pub time_secs: f64,
}

/// One stored answer of a daily run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyAnswer {
    pub question_index: usize,
    pub word_id: WordId,
    pub headword: String,
    pub chosen: String,
    pub correct: String,
    pub is_correct: bool,
    pub response_ms: u64,
    pub points: u32,
}

/// A daily run together with its answers in question order
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRunDetail {
    pub run: DailyRun,
    pub answers: Vec<DailyAnswer>,
}

/// A ranked daily run
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub run: DailyRun,
}

/// Rank daily runs: higher score first, faster time breaks ties
pub fn daily_leaderboard(mut runs: Vec<DailyRun>) -> Vec<LeaderboardEntry> {
    runs.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.time_secs.total_cmp(&b.time_secs))
    });
    runs.into_iter()
        .enumerate()
        .map(|(i, run)| LeaderboardEntry { rank: i + 1, run })
        .collect()
}

/// A player's totals over a period
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodEntry {
    pub rank: usize,
    pub player: String,
    pub games_played: u32,
    pub total_score: u32,
    pub total_correct: u32,
    pub total_questions: u32,
    pub total_time_secs: f64,
}

/// Sum daily runs per player and rank by total score, then total time
pub fn period_leaderboard(runs: &[DailyRun]) -> Vec<PeriodEntry> {
    let mut by_player: HashMap<&str, PeriodEntry> = HashMap::new();
    for run in runs {
        let entry = by_player.entry(run.player.as_str()).or_insert_with(|| PeriodEntry {
            rank: 0,
            player: run.player.clone(),
            games_played: 0,
            total_score: 0,
            total_correct: 0,
            total_questions: 0,
            total_time_secs: 0.0,
        });
        entry.games_played += 1;
        entry.total_score += run.score;
        entry.total_correct += run.correct;
        entry.total_questions += run.total;
        entry.total_time_secs += run.time_secs;
    }

    let mut entries: Vec<PeriodEntry> = by_player.into_values().collect();
    entries.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then_with(|| a.total_time_secs.total_cmp(&b.total_time_secs))
            .then_with(|| a.player.cmp(&b.player))
    });
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}

/// Monday-based week containing `date`, as `[start, end)`
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = date.weekday().num_days_from_monday() as u64;
    let start = date - Days::new(offset);
    (start, start + Days::new(7))
}

/// Calendar month containing `date`, as `[start, end)`
pub fn month_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).unwrap_or(date);
    let end = start + Months::new(1);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(n: u8) -> DifficultyLevel {
        DifficultyLevel::new(n).unwrap()
    }

    fn row(id: &str, lvl: u8, ok: bool) -> AnswerRow {
        AnswerRow {
            word_id: WordId::new(id),
            headword: format!("word-{}", id),
            level: level(lvl),
            is_correct: ok,
        }
    }

    fn run(player: &str, score: u32, time: f64) -> DailyRun {
        DailyRun {
            player: player.to_string(),
            challenge_date: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            played_at: 0,
            score,
            correct: score / 15,
            wrong: 10 - score / 15,
            total: 10,
            time_secs: time,
        }
    }

    #[test]
    fn test_aggregate_counts_per_word_and_level() {
        let rows = vec![
            row("1", 1, false),
            row("1", 1, true),
            row("1", 1, false),
            row("1", 2, false),
            row("1", 2, false),
            row("2", 1, true),
            row("2", 1, true),
        ];
        let stats = aggregate_failures(&rows);
        assert_eq!(stats.len(), 3);

        // 100% wrong first
        assert_eq!(stats[0].level, level(2));
        assert_eq!((stats[0].wrong, stats[0].attempts), (2, 2));
        assert_eq!(stats[1].level, level(1));
        assert_eq!((stats[1].wrong, stats[1].attempts), (2, 3));
        assert_eq!(stats[2].wrong_rate(), 0.0);
    }

    #[test]
    fn test_single_attempt_words_dropped() {
        let stats = aggregate_failures(&[row("1", 1, false)]);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_failure_stats_for_level() {
        let stats = aggregate_failures(&[
            row("1", 1, false),
            row("1", 1, false),
            row("2", 3, false),
            row("2", 3, true),
        ]);
        let map = failure_stats_for_level(&stats, level(1));
        assert_eq!(map.len(), 1);
        assert_eq!(map[&WordId::new("1")], FailureStat::new(2, 2));
    }

    #[test]
    fn test_game_run_wrong_is_remainder() {
        let r = GameRun::new(0, level(1), 10, 7, 42.0);
        assert_eq!(r.wrong, 3);
    }

    #[test]
    fn test_daily_leaderboard_order() {
        let board = daily_leaderboard(vec![
            run("slow", 150, 90.0),
            run("low", 100, 10.0),
            run("fast", 150, 30.0),
        ]);
        let names: Vec<_> = board.iter().map(|e| e.run.player.as_str()).collect();
        assert_eq!(names, vec!["fast", "slow", "low"]);
        assert_eq!(board[2].rank, 3);
    }

    #[test]
    fn test_period_leaderboard_sums() {
        let board = period_leaderboard(&[
            run("ane", 100, 50.0),
            run("jon", 120, 40.0),
            run("ane", 90, 45.0),
        ]);
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].player, "ane");
        assert_eq!(board[0].games_played, 2);
        assert_eq!(board[0].total_score, 190);
        assert_eq!(board[0].total_time_secs, 95.0);
        assert_eq!(board[0].total_questions, 20);
        assert_eq!(board[1].rank, 2);
    }

    #[test]
    fn test_week_range_starts_monday() {
        // 2026-10-15 is a Thursday
        let (start, end) = week_range(NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());

        // Sunday belongs to the week that started six days earlier
        let (start, _) = week_range(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
    }

    #[test]
    fn test_month_range() {
        let (start, end) = month_range(NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
    }
}

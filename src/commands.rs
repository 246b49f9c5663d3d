//! Non-interactive subcommands: import, reports and search

use chrono::{DateTime, NaiveDate, Utc};
use sinonimoak::stats::{
    daily_leaderboard, month_range, period_leaderboard, week_range, DailyAnswer,
};
use sinonimoak::words::import::read_lexicon_file;
use sinonimoak::{Storage, WordId};
use std::error::Error;
use std::path::Path;
use tracing::info;

/// Leaderboard window
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Period {
    Day,
    Week,
    Month,
}

/// Load a word list file into the store
pub fn import(storage: &mut Storage, file: &Path) -> Result<(), Box<dyn Error>> {
    let records = read_lexicon_file(file)?;
    let count = storage.import_words(&records)?;
    info!(file = %file.display(), count, "word list imported");
    println!("Imported {} words from {}", count, file.display());
    Ok(())
}

/// Take a word out of play, or put it back with `active`
pub fn set_active(storage: &Storage, id: &str, active: bool) -> Result<(), Box<dyn Error>> {
    let word_id = WordId::new(id);
    if !storage.set_word_active(&word_id, active)? {
        return Err(format!("no word with id {}", id).into());
    }
    info!(id, active, "word status changed");
    if active {
        println!("Word {} restored", id);
    } else {
        println!("Word {} deactivated", id);
    }
    Ok(())
}

/// Words the player misses most, worst first
pub fn failed(storage: &Storage, player: &str) -> Result<(), Box<dyn Error>> {
    let stats = storage.failed_words(player)?;
    if stats.is_empty() {
        println!("No failed words for {} yet", player);
        return Ok(());
    }
    println!("{:<20} {:>5} {:>6} {:>8} {:>6}", "WORD", "LEVEL", "WRONG", "ATTEMPTS", "RATE");
    for stat in stats {
        println!(
            "{:<20} {:>5} {:>6} {:>8} {:>5.0}%",
            stat.headword,
            stat.level.get(),
            stat.wrong,
            stat.attempts,
            stat.wrong_rate()
        );
    }
    Ok(())
}

/// Past regular games of a player, newest first
pub fn history(storage: &Storage, player: &str) -> Result<(), Box<dyn Error>> {
    let runs = storage.game_history(player)?;
    if runs.is_empty() {
        println!("No games recorded for {}", player);
        return Ok(());
    }
    println!("{:<17} {:>5} {:>7} {:>5} {:>8}", "PLAYED", "LEVEL", "CORRECT", "WRONG", "TIME");
    for run in runs {
        let played = DateTime::<Utc>::from_timestamp_millis(run.played_at)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{:<17} {:>5} {:>3}/{:<3} {:>5} {:>7.1}s",
            played, run.level.get(), run.correct, run.total, run.wrong, run.time_secs
        );
    }
    Ok(())
}

/// Daily challenge ranking for a day, or totals for its week or month.
///
/// With `show_answers`, each daily run is followed by its answers.
pub fn leaderboard(
    storage: &Storage,
    date: NaiveDate,
    period: Period,
    show_answers: bool,
) -> Result<(), Box<dyn Error>> {
    match period {
        Period::Day => {
            let details = storage.daily_runs_with_answers(date)?;
            let board = daily_leaderboard(details.iter().map(|d| d.run.clone()).collect());
            println!("Daily challenge {}", date);
            if board.is_empty() {
                println!("Nobody has played yet");
            }
            for entry in board {
                println!(
                    "{:>3}. {:<16} {:>5} pts  {:>2}/{:<2}  {:>6.1}s",
                    entry.rank,
                    entry.run.player,
                    entry.run.score,
                    entry.run.correct,
                    entry.run.total,
                    entry.run.time_secs
                );
                if show_answers {
                    let answers = details
                        .iter()
                        .find(|d| d.run.player == entry.run.player)
                        .map(|d| d.answers.as_slice())
                        .unwrap_or_default();
                    for answer in answers {
                        println!("{}", format_answer(answer));
                    }
                }
            }
        }
        Period::Week | Period::Month => {
            let (start, end) = if period == Period::Week {
                week_range(date)
            } else {
                month_range(date)
            };
            let board = period_leaderboard(&storage.daily_runs_between(start, end)?);
            println!("Daily challenges {} to {}", start, end.pred_opt().unwrap_or(end));
            if board.is_empty() {
                println!("Nobody has played yet");
            }
            for entry in board {
                println!(
                    "{:>3}. {:<16} {:>6} pts  {:>2} games  {:>3}/{:<3}  {:>7.1}s",
                    entry.rank,
                    entry.player,
                    entry.total_score,
                    entry.games_played,
                    entry.total_correct,
                    entry.total_questions,
                    entry.total_time_secs
                );
            }
        }
    }
    Ok(())
}

fn format_answer(answer: &DailyAnswer) -> String {
    let mark = if answer.is_correct { "✓" } else { "✗" };
    let expected = if answer.is_correct {
        String::new()
    } else {
        format!(" (expected {})", answer.correct)
    };
    format!(
        "       {:>2}. {} {:<16} -> {}{}  {:>5} ms  +{}",
        answer.question_index + 1,
        mark,
        answer.headword,
        answer.chosen,
        expected,
        answer.response_ms,
        answer.points
    )
}

/// Find words by headword or synonym
pub fn search(storage: &Storage, term: &str) -> Result<(), Box<dyn Error>> {
    let found = storage.search_words(term)?;
    if found.is_empty() {
        println!("No words match \"{}\"", term);
    }
    for (level, word) in found {
        println!("[{}] {}: {}", level, word.headword, word.synonyms.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sinonimoak::words::import::parse_lexicon;

    fn daily_answer(index: usize, ok: bool) -> DailyAnswer {
        DailyAnswer {
            question_index: index,
            word_id: WordId::new("1"),
            headword: "etxe".to_string(),
            chosen: if ok { "egoitza" } else { "mendi" }.to_string(),
            correct: "egoitza".to_string(),
            is_correct: ok,
            response_ms: 2300,
            points: if ok { 12 } else { 0 },
        }
    }

    #[test]
    fn test_set_active_toggles_word() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = Storage::open_at(&dir.path().join("quiz.db")).unwrap();
        let records = parse_lexicon("1|1|etxe|bizileku\n2|1|handi|haundi").unwrap();
        storage.import_words(&records).unwrap();

        set_active(&storage, "1", false).unwrap();
        let words = storage.all_active_words().unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].headword, "handi");

        set_active(&storage, "1", true).unwrap();
        assert_eq!(storage.all_active_words().unwrap().len(), 2);

        assert!(set_active(&storage, "99", false).is_err());
    }

    #[test]
    fn test_format_answer_marks_result() {
        let right = format_answer(&daily_answer(0, true));
        assert!(right.contains(" 1. ✓ etxe"));
        assert!(right.contains("-> egoitza"));
        assert!(!right.contains("expected"));
        assert!(right.ends_with("+12"));

        let wrong = format_answer(&daily_answer(4, false));
        assert!(wrong.contains(" 5. ✗ etxe"));
        assert!(wrong.contains("-> mendi (expected egoitza)"));
        assert!(wrong.contains("2300 ms"));
    }
}

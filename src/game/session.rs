//! Game session state
//!
//! Drives one game from pool generation to the final summary:
//! Intermission -> Playing -> (next player) Intermission -> ... -> Summary.
//! The session never reads the clock itself; elapsed times are passed in by
//! whoever owns the screen.

use super::scoring::{compute_bonus, compute_points};
use super::{generate_pool_with_rng, QuestionItem};
use crate::words::{DifficultyLevel, FailureStats, WordEntry, WordId};
use rand::Rng;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

/// Default questions each player answers in a regular game
pub const DEFAULT_QUESTIONS_PER_PLAYER: usize = 10;

/// Default questions in the daily challenge
pub const DEFAULT_DAILY_QUESTIONS: usize = 10;

/// Upper bound for questions per player, regular or daily
pub const MAX_QUESTIONS: usize = 100;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Waiting for the next player to start their turn
    Intermission,
    /// A player is answering questions
    Playing,
    /// Every player has finished
    Summary,
}

/// Regular games may be weighted and multiplayer; the daily challenge is
/// single-player and unweighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    Regular,
    Daily,
}

/// Errors that prevent a session from starting
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no words available for this configuration")]
    NoWords,

    #[error("a game needs at least one player")]
    NoPlayers,

    #[error("at most {max} questions per player, got {requested}")]
    TooManyQuestions { requested: usize, max: usize },
}

fn check_question_count(requested: usize) -> Result<(), SessionError> {
    if requested > MAX_QUESTIONS {
        return Err(SessionError::TooManyQuestions {
            requested,
            max: MAX_QUESTIONS,
        });
    }
    Ok(())
}

/// A player and their running totals
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub name: String,
    pub score: u32,
    pub correct_answers: u32,
    /// Wall-clock length of the player's turn in seconds
    pub time_secs: f64,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Player {
            name: name.into(),
            score: 0,
            correct_answers: 0,
            time_secs: 0.0,
        }
    }
}

/// Result of answering the current question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    /// Speed bonus, 0 for wrong answers
    pub bonus: u32,
    pub points: u32,
}

/// One answered question, kept for persistence and review
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub player_index: usize,
    /// Index within the player's turn
    pub question_index: usize,
    pub word_id: WordId,
    pub headword: String,
    pub chosen: String,
    pub correct: String,
    pub is_correct: bool,
    /// Response time in milliseconds, at least 1
    pub response_ms: u64,
    pub points: u32,
}

/// What happened after moving past an answered question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnProgress {
    /// Another question of the same turn is up
    NextQuestion,
    /// The turn is complete; call [`Session::finish_turn`]
    TurnOver,
    /// Nothing to advance (question not answered yet, or not playing)
    Blocked,
}

/// State of one game
#[derive(Debug, Clone)]
pub struct Session {
    mode: GameMode,
    level: Option<DifficultyLevel>,
    pool: Vec<QuestionItem>,
    players: Vec<Player>,
    questions_per_player: usize,
    status: GameStatus,
    current_player: usize,
    current_question: usize,
    /// Outcome and choice for the question on screen
    answered: Option<(AnswerOutcome, String)>,
    answers: Vec<AnswerRecord>,
}

impl Session {
    /// Start a regular game: `questions_per_player` questions for each player,
    /// biased by `stats` when the player is known.
    pub fn regular<R: Rng + ?Sized>(
        player_names: Vec<String>,
        level: DifficultyLevel,
        source: &[WordEntry],
        stats: Option<&FailureStats>,
        questions_per_player: usize,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        if player_names.is_empty() {
            return Err(SessionError::NoPlayers);
        }
        check_question_count(questions_per_player)?;
        let needed = player_names
            .len()
            .checked_mul(questions_per_player)
            .ok_or(SessionError::TooManyQuestions {
                requested: questions_per_player,
                max: MAX_QUESTIONS,
            })?;
        let pool = generate_pool_with_rng(needed, source, stats, rng);
        if pool.is_empty() {
            return Err(SessionError::NoWords);
        }
        info!(
            players = player_names.len(),
            level = level.get(),
            questions = pool.len(),
            weighted = stats.is_some(),
            "regular game started"
        );
        Ok(Self::from_pool(
            GameMode::Regular,
            Some(level),
            pool,
            player_names,
            questions_per_player,
        ))
    }

    /// Start the daily challenge for a single player over every active word
    pub fn daily<R: Rng + ?Sized>(
        player_name: String,
        source: &[WordEntry],
        questions: usize,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        check_question_count(questions)?;
        let pool = generate_pool_with_rng(questions, source, None, rng);
        if pool.is_empty() {
            return Err(SessionError::NoWords);
        }
        info!(questions = pool.len(), "daily challenge started");
        Ok(Self::from_pool(
            GameMode::Daily,
            None,
            pool,
            vec![player_name],
            questions,
        ))
    }

    fn from_pool(
        mode: GameMode,
        level: Option<DifficultyLevel>,
        pool: Vec<QuestionItem>,
        player_names: Vec<String>,
        questions_per_player: usize,
    ) -> Self {
        Self {
            mode,
            level,
            pool,
            players: player_names.into_iter().map(Player::new).collect(),
            questions_per_player,
            status: GameStatus::Intermission,
            current_player: 0,
            current_question: 0,
            answered: None,
            answers: Vec::new(),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Level of a regular game; `None` for the daily challenge
    pub fn level(&self) -> Option<DifficultyLevel> {
        self.level
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn pool(&self) -> &[QuestionItem] {
        &self.pool
    }

    pub fn questions_per_player(&self) -> usize {
        self.questions_per_player
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player)
    }

    /// Index of the question on screen within the current turn
    pub fn current_question_index(&self) -> usize {
        self.current_question
    }

    /// The question on screen, if playing
    pub fn current_question(&self) -> Option<&QuestionItem> {
        if self.status != GameStatus::Playing {
            return None;
        }
        self.pool
            .get(self.current_player * self.questions_per_player + self.current_question)
    }

    /// Outcome and chosen option for the question on screen, once answered
    pub fn last_answer(&self) -> Option<(&AnswerOutcome, &str)> {
        self.answered.as_ref().map(|(o, c)| (o, c.as_str()))
    }

    /// Every answer given so far, in order
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Begin the current player's turn
    pub fn start_turn(&mut self) {
        if self.status != GameStatus::Intermission {
            return;
        }
        self.status = GameStatus::Playing;
        self.current_question = 0;
        self.answered = None;
        debug!(player = self.current_player, "turn started");
    }

    /// Answer the question on screen.
    ///
    /// Returns `None` when not playing or the question was already answered.
    pub fn answer(&mut self, choice: &str, elapsed_secs: f64) -> Option<AnswerOutcome> {
        if self.answered.is_some() {
            return None;
        }
        let question = self.current_question()?.clone();

        let is_correct = question.is_correct(choice);
        let bonus = if is_correct { compute_bonus(elapsed_secs) } else { 0 };
        let points = compute_points(is_correct, elapsed_secs);
        let outcome = AnswerOutcome {
            is_correct,
            bonus,
            points,
        };

        if let Some(player) = self.players.get_mut(self.current_player) {
            player.score += points;
            if is_correct {
                player.correct_answers += 1;
            }
        }

        let response_ms = (elapsed_secs.max(0.0) * 1000.0).round().max(1.0) as u64;
        self.answers.push(AnswerRecord {
            player_index: self.current_player,
            question_index: self.current_question,
            word_id: question.word.id.clone(),
            headword: question.word.headword.clone(),
            chosen: choice.to_string(),
            correct: question.correct_answer.clone(),
            is_correct,
            response_ms,
            points,
        });
        self.answered = Some((outcome, choice.to_string()));
        Some(outcome)
    }

    /// Move past an answered question
    pub fn next_question(&mut self) -> TurnProgress {
        if self.status != GameStatus::Playing || self.answered.is_none() {
            return TurnProgress::Blocked;
        }
        if self.current_question + 1 < self.questions_per_player {
            self.current_question += 1;
            self.answered = None;
            TurnProgress::NextQuestion
        } else {
            TurnProgress::TurnOver
        }
    }

    /// Close the current turn, recording its duration.
    ///
    /// Moves to the next player's intermission, or to the summary after the
    /// last player.
    pub fn finish_turn(&mut self, turn_secs: f64) {
        if self.status != GameStatus::Playing {
            return;
        }
        if let Some(player) = self.players.get_mut(self.current_player) {
            player.time_secs = turn_secs.max(0.0);
        }
        self.answered = None;
        self.current_question = 0;

        if self.current_player + 1 < self.players.len() {
            self.current_player += 1;
            self.status = GameStatus::Intermission;
        } else {
            self.status = GameStatus::Summary;
            info!(mode = ?self.mode, "game finished");
        }
    }

    /// Players ordered by score (desc), then time (asc)
    pub fn ranking(&self) -> Vec<Player> {
        let mut ranked = self.players.clone();
        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.time_secs.total_cmp(&b.time_secs))
        });
        ranked
    }

    /// Distinct words of this game sorted by headword, for review.
    ///
    /// Entries sharing a headword stay apart when their ids differ.
    pub fn played_words(&self) -> Vec<WordEntry> {
        let unique: BTreeMap<&WordId, &WordEntry> =
            self.pool.iter().map(|q| (&q.word.id, &q.word)).collect();
        let mut words: Vec<WordEntry> = unique.into_values().cloned().collect();
        words.sort_by(|a, b| a.headword.cmp(&b.headword).then_with(|| a.id.cmp(&b.id)));
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn source() -> Vec<WordEntry> {
        vec![
            WordEntry::new(1u32, "etxe", ["bizileku"]).unwrap(),
            WordEntry::new(2u32, "handi", ["haundi"]).unwrap(),
            WordEntry::new(3u32, "txiki", ["ttipi"]).unwrap(),
            WordEntry::new(4u32, "azkar", ["bizkor"]).unwrap(),
        ]
    }

    fn level() -> DifficultyLevel {
        DifficultyLevel::new(1).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(17)
    }

    /// Answer every question of the current turn correctly after `secs`
    fn play_turn(session: &mut Session, secs: f64) {
        session.start_turn();
        loop {
            let correct = session.current_question().unwrap().correct_answer.clone();
            session.answer(&correct, secs).unwrap();
            if session.next_question() == TurnProgress::TurnOver {
                break;
            }
        }
    }

    #[test]
    fn test_empty_source_is_no_words() {
        let err = Session::regular(vec!["A".into()], level(), &[], None, 10, &mut rng()).unwrap_err();
        assert_eq!(err, SessionError::NoWords);
        let err = Session::daily("A".into(), &[], 10, &mut rng()).unwrap_err();
        assert_eq!(err, SessionError::NoWords);
    }

    #[test]
    fn test_no_players() {
        let err = Session::regular(vec![], level(), &source(), None, 10, &mut rng()).unwrap_err();
        assert_eq!(err, SessionError::NoPlayers);
    }

    #[test]
    fn test_pool_covers_all_players() {
        let names = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let session = Session::regular(names, level(), &source(), None, 5, &mut rng()).unwrap();
        assert_eq!(session.pool().len(), 15);
        assert_eq!(session.status(), GameStatus::Intermission);
        assert!(session.current_question().is_none());
    }

    #[test]
    fn test_correct_answer_scores() {
        let mut session = Session::regular(vec!["A".into()], level(), &source(), None, 3, &mut rng()).unwrap();
        session.start_turn();
        let correct = session.current_question().unwrap().correct_answer.clone();
        let outcome = session.answer(&correct, 1.0).unwrap();
        assert_eq!(outcome, AnswerOutcome { is_correct: true, bonus: 5, points: 15 });
        assert_eq!(session.players()[0].score, 15);
        assert_eq!(session.players()[0].correct_answers, 1);
    }

    #[test]
    fn test_wrong_answer_scores_nothing() {
        let mut session = Session::regular(vec!["A".into()], level(), &source(), None, 3, &mut rng()).unwrap();
        session.start_turn();
        let outcome = session.answer("not an option", 0.5).unwrap();
        assert_eq!(outcome, AnswerOutcome { is_correct: false, bonus: 0, points: 0 });
        assert_eq!(session.players()[0].score, 0);
        assert_eq!(session.answers().len(), 1);
        assert!(!session.answers()[0].is_correct);
    }

    #[test]
    fn test_question_answered_once() {
        let mut session = Session::regular(vec!["A".into()], level(), &source(), None, 3, &mut rng()).unwrap();
        session.start_turn();
        let correct = session.current_question().unwrap().correct_answer.clone();
        assert!(session.answer(&correct, 1.0).is_some());
        assert!(session.answer(&correct, 1.0).is_none());
        assert_eq!(session.players()[0].score, 15);
    }

    #[test]
    fn test_cannot_skip_unanswered_question() {
        let mut session = Session::regular(vec!["A".into()], level(), &source(), None, 3, &mut rng()).unwrap();
        session.start_turn();
        assert_eq!(session.next_question(), TurnProgress::Blocked);
        assert_eq!(session.current_question_index(), 0);
    }

    #[test]
    fn test_turns_rotate_to_summary() {
        let names = vec!["A".to_string(), "B".to_string()];
        let mut session = Session::regular(names, level(), &source(), None, 4, &mut rng()).unwrap();

        play_turn(&mut session, 1.0);
        session.finish_turn(12.5);
        assert_eq!(session.status(), GameStatus::Intermission);
        assert_eq!(session.current_player_index(), 1);
        assert_eq!(session.players()[0].time_secs, 12.5);

        play_turn(&mut session, 8.0);
        session.finish_turn(40.0);
        assert_eq!(session.status(), GameStatus::Summary);

        assert_eq!(session.players()[0].score, 60);
        assert_eq!(session.players()[1].score, 40);
        assert_eq!(session.answers().len(), 8);
        assert!(session.answers()[4..].iter().all(|a| a.player_index == 1));
    }

    #[test]
    fn test_second_player_gets_own_questions() {
        let names = vec!["A".to_string(), "B".to_string()];
        let mut session = Session::regular(names, level(), &source(), None, 2, &mut rng()).unwrap();
        play_turn(&mut session, 1.0);
        session.finish_turn(3.0);
        session.start_turn();
        let expected = session.pool()[2].clone();
        assert_eq!(session.current_question(), Some(&expected));
    }

    #[test]
    fn test_ranking_breaks_ties_on_time() {
        let names = vec!["Slow".to_string(), "Fast".to_string()];
        let mut session = Session::regular(names, level(), &source(), None, 2, &mut rng()).unwrap();
        play_turn(&mut session, 1.0);
        session.finish_turn(30.0);
        play_turn(&mut session, 1.0);
        session.finish_turn(10.0);

        let ranking = session.ranking();
        assert_eq!(ranking[0].name, "Fast");
        assert_eq!(ranking[1].name, "Slow");
    }

    #[test]
    fn test_daily_is_single_player() {
        let session = Session::daily("Me".into(), &source(), 10, &mut rng()).unwrap();
        assert_eq!(session.mode(), GameMode::Daily);
        assert_eq!(session.players().len(), 1);
        assert_eq!(session.pool().len(), 10);
        assert!(session.level().is_none());
    }

    #[test]
    fn test_response_ms_has_floor() {
        let mut session = Session::daily("Me".into(), &source(), 2, &mut rng()).unwrap();
        session.start_turn();
        session.answer("x", 0.0).unwrap();
        assert_eq!(session.answers()[0].response_ms, 1);
    }

    #[test]
    fn test_played_words_sorted_and_unique() {
        let session = Session::regular(vec!["A".into()], level(), &source(), None, 10, &mut rng()).unwrap();
        let words: Vec<String> = session.played_words().into_iter().map(|w| w.headword).collect();
        assert_eq!(words, vec!["azkar", "etxe", "handi", "txiki"]);
    }

    #[test]
    fn test_played_words_keeps_homographs() {
        let mut words = source();
        words.push(WordEntry::new(5u32, "etxe", ["etxebizitza"]).unwrap());
        let session = Session::regular(vec!["A".into()], level(), &words, None, 10, &mut rng()).unwrap();

        let played = session.played_words();
        let headwords: Vec<&str> = played.iter().map(|w| w.headword.as_str()).collect();
        assert_eq!(headwords, vec!["azkar", "etxe", "etxe", "handi", "txiki"]);
        assert_eq!(played[1].id, WordId::new("1"));
        assert_eq!(played[2].id, WordId::new("5"));
    }

    #[test]
    fn test_question_count_is_bounded() {
        let err = Session::regular(vec!["A".into()], level(), &source(), None, MAX_QUESTIONS + 1, &mut rng())
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::TooManyQuestions { requested: MAX_QUESTIONS + 1, max: MAX_QUESTIONS }
        );

        let err = Session::regular(vec!["A".into()], level(), &source(), None, usize::MAX, &mut rng())
            .unwrap_err();
        assert!(matches!(err, SessionError::TooManyQuestions { .. }));

        let err = Session::daily("A".into(), &source(), MAX_QUESTIONS + 1, &mut rng()).unwrap_err();
        assert!(matches!(err, SessionError::TooManyQuestions { .. }));

        let session = Session::regular(vec!["A".into()], level(), &source(), None, MAX_QUESTIONS, &mut rng()).unwrap();
        assert_eq!(session.pool().len(), MAX_QUESTIONS);
    }
}

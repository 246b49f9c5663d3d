//! Application screen state management
//!
//! Handles transitions between the quiz screens:
//! - Setup: mode, level and players
//! - Intermission: hand the keyboard to the next player
//! - Playing: one question at a time
//! - Summary: ranking and word review
//! - Error: something went wrong before the game could start

use super::state::{SetupAction, SetupForm};
use super::AppError;
use chrono::NaiveDate;
use rand::Rng;
use sinonimoak::game::session::{AnswerOutcome, TurnProgress};
use sinonimoak::stats::{DailyRun, GameRun};
use sinonimoak::words::{FailureStatsSource, WordSource};
use sinonimoak::{CachedSource, DailySave, GameMode, GameStatus, QuizConfig, Session, Storage};
use std::time::Instant;
use tracing::{info, warn};

/// A running game and its clocks
pub struct ActiveGame {
    pub session: Session,
    /// Date of the daily challenge being played
    pub challenge_date: Option<NaiveDate>,
    turn_started: Instant,
    question_started: Instant,
}

impl ActiveGame {
    fn new(session: Session, challenge_date: Option<NaiveDate>) -> Self {
        let now = Instant::now();
        Self {
            session,
            challenge_date,
            turn_started: now,
            question_started: now,
        }
    }

    /// Name that owns stored history, for single-player games only
    fn owner(&self) -> Option<&str> {
        match self.session.players() {
            [player] => Some(player.name.as_str()),
            _ => None,
        }
    }
}

/// The current application screen
pub enum Screen {
    Setup(SetupForm),
    /// Waiting for the current player to press Enter
    Intermission(ActiveGame),
    Playing(ActiveGame),
    Summary {
        game: ActiveGame,
        /// Save result or storage problem to show under the ranking
        notice: Option<String>,
    },
    Error {
        message: String,
    },
}

/// Main application coordinator
pub struct AppCoordinator {
    pub screen: Screen,
    pub should_quit: bool,
    source: CachedSource<Storage>,
    config: QuizConfig,
    /// Players of the last setup, offered again after a game
    last_players: Vec<String>,
}

impl AppCoordinator {
    pub fn new(source: CachedSource<Storage>, config: QuizConfig, players: Vec<String>) -> Self {
        let form = SetupForm::new(config.default_level(), players.clone(), config.max_players);
        Self {
            screen: Screen::Setup(form),
            should_quit: false,
            source,
            config,
            last_players: players,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Go back to the setup screen, keeping the last players
    pub fn go_to_setup(&mut self) {
        let mut form = SetupForm::new(
            self.config.default_level(),
            self.last_players.clone(),
            self.config.max_players,
        );
        if let Screen::Setup(current) = &self.screen {
            form = current.clone();
        }
        self.screen = Screen::Setup(form);
    }

    /// Setup form, if that screen is showing
    pub fn setup_mut(&mut self) -> Option<&mut SetupForm> {
        match &mut self.screen {
            Screen::Setup(form) => Some(form),
            _ => None,
        }
    }

    /// Enter on the setup screen
    pub fn setup_submit(&mut self) {
        self.setup_submit_with_rng(&mut rand::rng());
    }

    pub fn setup_submit_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let form = match &mut self.screen {
            Screen::Setup(form) => form,
            _ => return,
        };
        if form.on_submit() != SetupAction::Start {
            return;
        }
        let form = form.clone();
        self.last_players = form.players.clone();

        let started = match form.mode {
            GameMode::Regular => self.start_regular(&form, rng),
            GameMode::Daily => self.start_daily(&form, chrono::Local::now().date_naive(), rng),
        };
        self.screen = match started {
            Ok(game) => Screen::Intermission(game),
            Err(e) => {
                warn!("game could not start: {}", e);
                Screen::Error {
                    message: e.to_string(),
                }
            }
        };
    }

    fn start_regular<R: Rng + ?Sized>(
        &mut self,
        form: &SetupForm,
        rng: &mut R,
    ) -> Result<ActiveGame, AppError> {
        let words = WordSource::words_by_level(&mut self.source, form.level)?;

        // Only a solo player has a history to weight by
        let stats = match form.players.as_slice() {
            [player] => Some(FailureStatsSource::failure_stats(
                &mut self.source,
                player,
                form.level,
            )?),
            _ => None,
        };
        let stats = stats.filter(|s| !s.is_empty());

        let session = Session::regular(
            form.players.clone(),
            form.level,
            &words,
            stats.as_ref(),
            self.config.questions_per_player,
            rng,
        )?;
        if let [player] = form.players.as_slice() {
            self.remember_player(player);
        }
        Ok(ActiveGame::new(session, None))
    }

    fn start_daily<R: Rng + ?Sized>(
        &mut self,
        form: &SetupForm,
        date: NaiveDate,
        rng: &mut R,
    ) -> Result<ActiveGame, AppError> {
        let player = match form.players.as_slice() {
            [player] => player.clone(),
            _ => return Err(AppError::DailyNeedsOnePlayer),
        };
        if self.source.inner().has_played_daily(&player, date)? {
            return Err(AppError::DailyAlreadyPlayed { player, date });
        }

        let words = WordSource::all_active_words(&mut self.source)?;
        let session = Session::daily(player.clone(), &words, self.config.daily_questions, rng)?;
        self.remember_player(&player);
        Ok(ActiveGame::new(session, Some(date)))
    }

    fn remember_player(&self, player: &str) {
        if let Err(e) = self.source.inner().set_handle(player) {
            warn!("could not remember player name: {}", e);
        }
    }

    /// Enter on the intermission screen: the next player's turn begins
    pub fn begin_turn(&mut self) {
        let screen = std::mem::replace(&mut self.screen, Screen::Error { message: String::new() });
        self.screen = match screen {
            Screen::Intermission(mut game) => {
                game.session.start_turn();
                let now = Instant::now();
                game.turn_started = now;
                game.question_started = now;
                Screen::Playing(game)
            }
            other => other,
        };
    }

    /// Pick option `index` (0-based) of the question on screen
    pub fn choose_option(&mut self, index: usize) -> Option<AnswerOutcome> {
        let elapsed = match &self.screen {
            Screen::Playing(game) => game.question_started.elapsed().as_secs_f64(),
            _ => return None,
        };
        self.choose_option_after(index, elapsed)
    }

    /// Answer with an explicit response time
    pub fn choose_option_after(&mut self, index: usize, elapsed_secs: f64) -> Option<AnswerOutcome> {
        let game = match &mut self.screen {
            Screen::Playing(game) => game,
            _ => return None,
        };
        let choice = game.session.current_question()?.options.get(index)?.clone();
        let outcome = game.session.answer(&choice, elapsed_secs)?;

        // Regular solo answers feed the failure statistics
        if game.session.mode() == GameMode::Regular {
            if let (Some(owner), Some(level), Some(record)) =
                (game.owner(), game.session.level(), game.session.answers().last())
            {
                if let Err(e) = self.source.inner().record_answer(owner, level, record) {
                    warn!("answer not recorded: {}", e);
                }
            }
        }
        Some(outcome)
    }

    /// Enter after answering: next question, next player or summary
    pub fn advance(&mut self) {
        let turn_secs = match &self.screen {
            Screen::Playing(game) => game.turn_started.elapsed().as_secs_f64(),
            _ => return,
        };
        self.advance_after(turn_secs);
    }

    /// Advance with an explicit turn length
    pub fn advance_after(&mut self, turn_secs: f64) {
        let game = match &mut self.screen {
            Screen::Playing(game) => game,
            _ => return,
        };
        match game.session.next_question() {
            TurnProgress::Blocked => return,
            TurnProgress::NextQuestion => {
                game.question_started = Instant::now();
                return;
            }
            TurnProgress::TurnOver => game.session.finish_turn(turn_secs),
        }

        let screen = std::mem::replace(&mut self.screen, Screen::Error { message: String::new() });
        self.screen = match screen {
            Screen::Playing(game) if game.session.status() == GameStatus::Summary => {
                let notice = self.save_results(&game);
                Screen::Summary { game, notice }
            }
            Screen::Playing(game) => Screen::Intermission(game),
            other => other,
        };
    }

    /// Store a finished game. Returns a line for the summary screen.
    fn save_results(&mut self, game: &ActiveGame) -> Option<String> {
        let owner = game.owner()?;
        let player = game.session.players().first()?;
        let total = game.session.pool().len() as u32;
        let played_at = chrono::Utc::now().timestamp_millis();

        let result = match (game.session.mode(), game.session.level(), game.challenge_date) {
            (GameMode::Daily, _, Some(date)) => {
                let run = DailyRun {
                    player: owner.to_string(),
                    challenge_date: date,
                    played_at,
                    score: player.score,
                    correct: player.correct_answers,
                    wrong: total.saturating_sub(player.correct_answers),
                    total,
                    time_secs: player.time_secs,
                };
                self.source
                    .inner_mut()
                    .save_daily_run(&run, game.session.answers())
                    .map(|saved| match saved {
                        DailySave::Saved => "Daily result saved".to_string(),
                        DailySave::AlreadyPlayed => {
                            format!("{} already has a result for {}", owner, date)
                        }
                    })
            }
            (GameMode::Regular, Some(level), _) => {
                let run = GameRun::new(played_at, level, total, player.correct_answers, player.time_secs);
                self.source
                    .inner()
                    .insert_game_run(owner, &run)
                    .map(|_| "Game saved to history".to_string())
            }
            _ => return None,
        };

        // New answers make the cached statistics stale
        self.source.invalidate_stats();
        match result {
            Ok(notice) => {
                info!(player = owner, score = player.score, "game results saved");
                Some(notice)
            }
            Err(e) => {
                warn!("game results not saved: {}", e);
                Some(format!("Could not save results: {}", e))
            }
        }
    }
}

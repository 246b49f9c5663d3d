//! Sinonimoak - synonym quiz for the terminal
//!
//! Spot the synonym. Answer fast. Beat your friends.

mod app;
mod commands;
mod tui;

use app::{AppCoordinator, Screen};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commands::Period;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use sinonimoak::words::lexicon;
use sinonimoak::{CachedSource, GameMode, QuizConfig, Storage};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tui::Tui;

#[derive(Parser)]
#[command(name = "sinonimoak", version, about = "Synonym quiz for the terminal")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database path, overrides the config file
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the quiz (default)
    Play {
        /// Difficulty level (1-4)
        #[arg(long)]
        level: Option<u8>,

        /// Player name, repeat for hot-seat games
        #[arg(long = "player")]
        players: Vec<String>,

        /// Preselect the daily challenge
        #[arg(long)]
        daily: bool,

        /// Questions per player
        #[arg(long)]
        questions: Option<usize>,
    },

    /// Import a word list (`id|level|headword|syn1,syn2` per line)
    Import {
        file: PathBuf,
    },

    /// Take a word out of play
    Deactivate {
        /// Word id as given in the word list
        id: String,

        /// Put the word back into play instead
        #[arg(long)]
        restore: bool,
    },

    /// Show the words a player misses most
    Failed {
        #[arg(long)]
        player: String,
    },

    /// Show a player's past games
    History {
        #[arg(long)]
        player: String,
    },

    /// Daily challenge leaderboard
    Leaderboard {
        /// Day to show (YYYY-MM-DD), today by default
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, value_enum, default_value_t = Period::Day)]
        period: Period,

        /// List each player's answers (day period only)
        #[arg(long)]
        answers: bool,
    },

    /// Search words by headword or synonym
    Search {
        term: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(QuizConfig::default_path);
    let mut config = match &config_path {
        Some(path) => QuizConfig::load(path)?,
        None => QuizConfig::default(),
    };
    if let Some(database) = cli.database {
        config.database_path = Some(database);
    }

    let data_dir = Storage::data_dir()?;
    init_logging(&data_dir)?;

    let mut storage = match &config.database_path {
        Some(path) => Storage::open_at(path)?,
        None => Storage::open()?,
    };
    let seeded = storage.seed_if_empty(lexicon::seed_records())?;
    if seeded > 0 {
        info!(count = seeded, "seed lexicon loaded");
    }

    match cli.command.unwrap_or(Commands::Play {
        level: None,
        players: Vec::new(),
        daily: false,
        questions: None,
    }) {
        Commands::Play {
            level,
            players,
            daily,
            questions,
        } => {
            if let Some(level) = level {
                config.default_level = level;
            }
            if let Some(questions) = questions {
                config.questions_per_player = questions;
            }
            config.validate()?;

            let players = if players.is_empty() {
                storage.handle()?.into_iter().collect()
            } else {
                players
            };
            play(storage, config, players, daily)?;
        }
        Commands::Import { file } => commands::import(&mut storage, &file)?,
        Commands::Deactivate { id, restore } => commands::set_active(&storage, &id, restore)?,
        Commands::Failed { player } => commands::failed(&storage, &player)?,
        Commands::History { player } => commands::history(&storage, &player)?,
        Commands::Leaderboard {
            date,
            period,
            answers,
        } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            commands::leaderboard(&storage, date, period, answers)?;
        }
        Commands::Search { term } => commands::search(&storage, &term)?,
    }
    Ok(())
}

/// Log to a file in the data directory; the terminal belongs to the quiz
fn init_logging(data_dir: &Path) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(data_dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("sinonimoak.log"))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn play(
    storage: Storage,
    config: QuizConfig,
    players: Vec<String>,
    daily: bool,
) -> Result<(), Box<dyn Error>> {
    let source = CachedSource::new(storage, config.failure_stats_ttl());
    let mut app = AppCoordinator::new(source, config, players);
    if daily {
        if let Some(form) = app.setup_mut() {
            form.mode = GameMode::Daily;
        }
    }

    let mut terminal = Tui::new()?;
    terminal.enter()?;

    // Redraw at least this often so nothing looks frozen
    let tick_rate = Duration::from_millis(250);

    loop {
        terminal.draw(|frame| tui::render(frame, &app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut app, key.code);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    terminal.exit()?;
    info!("quiz closed");
    Ok(())
}

fn handle_key(app: &mut AppCoordinator, code: KeyCode) {
    match &app.screen {
        Screen::Setup(_) => {
            if code == KeyCode::Esc {
                app.quit();
                return;
            }
            if code == KeyCode::Enter {
                app.setup_submit();
                return;
            }
            if let Some(form) = app.setup_mut() {
                match code {
                    KeyCode::Up => form.focus_up(),
                    KeyCode::Down | KeyCode::Tab => form.focus_down(),
                    KeyCode::Left => form.cycle(false),
                    KeyCode::Right => form.cycle(true),
                    KeyCode::Backspace => form.on_backspace(),
                    KeyCode::Char(c) => form.on_char(c),
                    _ => {}
                }
            }
        }
        Screen::Intermission(_) => match code {
            KeyCode::Enter => app.begin_turn(),
            KeyCode::Esc => app.go_to_setup(),
            _ => {}
        },
        Screen::Playing(_) => match code {
            KeyCode::Char(c) => {
                if let Some(digit) = c.to_digit(10).filter(|d| *d >= 1) {
                    app.choose_option(digit as usize - 1);
                }
            }
            KeyCode::Enter => app.advance(),
            KeyCode::Esc => app.go_to_setup(),
            _ => {}
        },
        Screen::Summary { .. } => match code {
            KeyCode::Enter => app.go_to_setup(),
            KeyCode::Esc => app.quit(),
            _ => {}
        },
        Screen::Error { .. } => {
            if matches!(code, KeyCode::Esc | KeyCode::Enter) {
                app.go_to_setup();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_play() {
        let cli = Cli::try_parse_from(["sinonimoak"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_play_flags() {
        let cli = Cli::try_parse_from([
            "sinonimoak", "play", "--level", "3", "--player", "Ane", "--player", "Jon", "--daily",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Play { level, players, daily, .. }) => {
                assert_eq!(level, Some(3));
                assert_eq!(players, vec!["Ane", "Jon"]);
                assert!(daily);
            }
            _ => panic!("expected play"),
        }
    }

    #[test]
    fn test_cli_leaderboard_date() {
        let cli = Cli::try_parse_from([
            "sinonimoak", "leaderboard", "--date", "2026-10-15", "--period", "week",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Leaderboard { date, period, answers }) => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 10, 15));
                assert_eq!(period, Period::Week);
                assert!(!answers);
            }
            _ => panic!("expected leaderboard"),
        }
    }

    #[test]
    fn test_cli_deactivate() {
        let cli = Cli::try_parse_from(["sinonimoak", "deactivate", "w12"]).unwrap();
        match cli.command {
            Some(Commands::Deactivate { id, restore }) => {
                assert_eq!(id, "w12");
                assert!(!restore);
            }
            _ => panic!("expected deactivate"),
        }

        let cli = Cli::try_parse_from(["sinonimoak", "deactivate", "w12", "--restore"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Deactivate { restore: true, .. })));
    }

    #[test]
    fn test_cli_leaderboard_answers() {
        let cli = Cli::try_parse_from(["sinonimoak", "leaderboard", "--answers"]).unwrap();
        match cli.command {
            Some(Commands::Leaderboard { date, period, answers }) => {
                assert!(date.is_none());
                assert_eq!(period, Period::Day);
                assert!(answers);
            }
            _ => panic!("expected leaderboard"),
        }
    }
}

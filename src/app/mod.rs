//! Application state and screen flow

pub mod screen;
pub mod state;

use chrono::NaiveDate;
use sinonimoak::{SessionError, StorageError};
use thiserror::Error;

pub use screen::{AppCoordinator, Screen};
pub use state::{SetupField, SetupForm};

/// Reasons a game cannot start
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{player} already played the daily challenge for {date}")]
    DailyAlreadyPlayed { player: String, date: NaiveDate },

    #[error("the daily challenge is for exactly one player")]
    DailyNeedsOnePlayer,
}

//! Sinonimoak - a synonym quiz for the terminal
//!
//! Pick the right synonym among four options. Quick answers earn a bonus,
//! and words you keep missing come back more often.

pub mod config;
pub mod game;
pub mod stats;
pub mod storage;
pub mod words;

pub use config::{ConfigError, QuizConfig};
pub use game::classify::{classify, WordClass};
pub use game::scoring::{compute_bonus, compute_points};
pub use game::session::{GameMode, GameStatus, Session, SessionError};
pub use game::{generate_pool, generate_pool_with_rng, QuestionItem};
pub use storage::cache::CachedSource;
pub use storage::{DailySave, Storage, StorageError};
pub use words::{DifficultyLevel, FailureStat, FailureStats, WordEntry, WordId};

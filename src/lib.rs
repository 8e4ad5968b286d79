//! Lexicard - vocabulary flashcard trainer
//!
//! Lexicard keeps a deck of English words with their meanings and example
//! sentences, lets the learner browse them as flip cards and drills them in
//! five practice modes. Scores, a daily study streak and weekly activity are
//! tracked and persisted after every change.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod speech;
pub mod storage;
pub mod trainer;
pub mod transfer;

pub use config::Config;
pub use core::{
    AnswerFeedback, CardDraft, CardId, Deck, Flashcard, PracticeMode, PracticeSession, Question,
    ScoringLedger, SessionState, StudyStats,
};
pub use error::{LexiError, Result};
pub use speech::{Accent, Speaker};
pub use storage::{FileStateStore, MemoryStateStore, Snapshot, StateStore};
pub use trainer::{Clock, SystemClock, Trainer};

// CLI commands
pub use cli::{
    CardsCommand, ConfigCommand, InitCommand, PracticeCommand, ResetCommand, SpeakCommand,
    StatsCommand, TransferCommand,
};

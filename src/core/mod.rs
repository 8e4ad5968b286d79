//! Core types and logic for Lexicard.
//!
//! Flashcards and the card store, the scoring ledger and study statistics,
//! question derivation and the practice session state machine.

pub mod card;
pub mod deck;
pub mod ledger;
pub mod progress;
pub mod question;
pub mod session;
pub mod streak;

pub use card::{CardDraft, CardId, Flashcard};
pub use deck::Deck;
pub use ledger::{percentage, PracticeMode, PracticeScores, Score, ScoringLedger};
pub use progress::{last_7_day_labels, weekday_label, Insights, ProgressData};
pub use question::{Payload, Question, CHOICE_COUNT};
pub use session::{AdvanceTicket, AnswerFeedback, IdleReason, PracticeSession, SessionState};
pub use streak::StudyStats;

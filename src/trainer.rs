//! The trainer context.
//!
//! `Trainer` owns the card store, the scoring ledger, study statistics,
//! progress data and the active practice session, and persists the record
//! after every mutation. Presentation layers hold one and call into it; there
//! is no global state.

use std::time::Instant;

use chrono::{DateTime, Local, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::core::{
    AnswerFeedback, CardDraft, CardId, Deck, Flashcard, Insights, PracticeMode, PracticeSession,
    ProgressData, ScoringLedger, SessionState, StudyStats,
};
use crate::error::{FailOpen, Result};
use crate::speech::{Accent, Speaker};
use crate::storage::{Snapshot, StateStore};
use crate::transfer;

/// Source of wall-clock time. Streaks use the local calendar date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    fn today(&self) -> NaiveDate;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Flashcard trainer state plus its persistence.
pub struct Trainer<S: StateStore> {
    deck: Deck,
    ledger: ScoringLedger,
    stats: StudyStats,
    progress: ProgressData,
    session: PracticeSession,
    config: Config,
    store: S,
    rng: StdRng,
    clock: Box<dyn Clock>,
}

impl<S: StateStore> Trainer<S> {
    /// Restore the trainer from `store`. An unreadable record starts fresh.
    pub fn open(store: S, config: Config) -> Self {
        let snapshot = store.load().fail_open_default("loading state");
        tracing::debug!(cards = snapshot.flashcards.len(), "state loaded");

        Self {
            deck: Deck::from_cards(snapshot.flashcards, snapshot.current_card_index),
            ledger: ScoringLedger::from_parts(snapshot.practice_scores, snapshot.quiz_score),
            stats: snapshot.study_stats,
            progress: snapshot.progress_data,
            session: PracticeSession::new(PracticeMode::Typing),
            config,
            store,
            rng: StdRng::from_entropy(),
            clock: Box::new(SystemClock),
        }
    }

    /// Use a seeded random source.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn ledger(&self) -> &ScoringLedger {
        &self.ledger
    }

    pub fn stats(&self) -> &StudyStats {
        &self.stats
    }

    pub fn progress(&self) -> &ProgressData {
        &self.progress
    }

    pub fn session(&self) -> &PracticeSession {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn insights(&self) -> Insights {
        Insights::compute(&self.ledger, &self.progress)
    }

    /// Daily activity for the week ending today.
    pub fn weekly_activity(&self) -> Vec<(String, u32)> {
        self.progress.activity_last_7_days(self.clock.today())
    }

    /// The record as it would be persisted.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            flashcards: self.deck.cards().to_vec(),
            quiz_score: *self.ledger.quiz_score(),
            study_stats: self.stats,
            practice_scores: *self.ledger.practice_scores(),
            progress_data: self.progress.clone(),
            current_card_index: self.deck.cursor(),
        }
    }

    fn persist(&self) {
        self.store
            .save(&self.snapshot())
            .fail_open_default("saving state");
    }

    fn store_changed(&mut self) {
        self.session
            .store_changed(self.deck.cards(), &self.config.practice, &mut self.rng);
        self.persist();
    }

    // =========================================================================
    // Card store
    // =========================================================================

    pub fn add_card(&mut self, draft: CardDraft) -> Result<Flashcard> {
        let card = self.deck.add(draft)?.clone();
        tracing::info!(id = %card.id, "card added");
        self.store_changed();
        Ok(card)
    }

    /// Delete a card. Unknown ids are a no-op.
    pub fn delete_card(&mut self, id: &CardId) -> Option<Flashcard> {
        let removed = self.deck.delete(id)?;
        tracing::info!(id = %removed.id, "card deleted");
        self.store_changed();
        Some(removed)
    }

    pub fn next_card(&mut self) {
        self.deck.next();
        self.persist();
    }

    pub fn previous_card(&mut self) {
        self.deck.previous();
        self.persist();
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.deck.set_cursor(cursor);
        self.persist();
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        self.deck.set_shuffle(enabled, &mut self.rng);
        self.persist();
    }

    /// Flip the current card. Turning it back to the front counts it as
    /// studied and records a study day.
    pub fn flip(&mut self) -> bool {
        let studied = self.deck.flip();
        if studied {
            self.stats.record_card_studied(self.clock.today());
            self.persist();
        }
        studied
    }

    /// Append the cards in an exported document. Nothing is added unless every
    /// record is well formed.
    pub fn import_document(&mut self, text: &str) -> Result<Vec<CardId>> {
        let drafts = transfer::parse_import_document(text)?;
        self.import_drafts(drafts)
    }

    /// Append drafts from an import or an image extraction.
    pub fn import_drafts(&mut self, drafts: Vec<CardDraft>) -> Result<Vec<CardId>> {
        let ids = self.deck.replace_all(drafts)?;
        tracing::info!(count = ids.len(), "cards imported");
        self.store_changed();
        Ok(ids)
    }

    /// The export document and its file name.
    pub fn export_document(&self) -> Result<(String, String)> {
        let text = transfer::export_document(self.deck.cards())?;
        Ok((transfer::export_file_name(self.clock.today()), text))
    }

    // =========================================================================
    // Practice
    // =========================================================================

    /// Activate `mode` and select its first question.
    pub fn start_practice(&mut self, mode: PracticeMode) -> SessionState {
        self.session
            .switch_mode(mode, self.deck.cards(), &self.config.practice, &mut self.rng)
    }

    /// Answer the current question. A counted answer is also a study event.
    pub fn submit_answer(&mut self, input: &str, now: Instant) -> Result<Option<AnswerFeedback>> {
        let feedback =
            self.session
                .submit_answer(input, &mut self.ledger, &self.config.practice, now)?;
        if feedback.is_some() {
            self.stats.record_study(self.clock.today());
            self.persist();
        }
        Ok(feedback)
    }

    /// Fire the scheduled advance if it is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.session
            .poll(now, self.deck.cards(), &self.config.practice, &mut self.rng)
    }

    /// Speak the listening target, or the current card's word outside of a
    /// listening question.
    pub fn speak_word(&self, speaker: &dyn Speaker, accent: Option<Accent>) -> Result<()> {
        let accent = accent.unwrap_or(self.config.speech.default_accent);
        let word = self
            .session
            .speak_target()
            .or_else(|| self.deck.current().map(|c| c.word.as_str()))
            .unwrap_or_default();
        speaker.speak(word, accent)
    }

    // =========================================================================
    // Scores and progress
    // =========================================================================

    pub fn reset_score(&mut self, mode: PracticeMode) {
        self.ledger.reset(mode);
        self.persist();
    }

    pub fn reset_quiz_score(&mut self) {
        self.ledger.reset_quiz();
        self.persist();
    }

    pub fn reset_all_scores(&mut self) {
        self.ledger.reset_all();
        self.persist();
    }

    pub fn start_study_session(&mut self) {
        self.progress.start_session(self.clock.now());
        self.persist();
    }

    /// Close the open study session. Returns the seconds it lasted.
    pub fn end_study_session(&mut self) -> Option<u64> {
        let added = self
            .progress
            .end_session(self.clock.now(), self.clock.today());
        if added.is_some() {
            self.persist();
        }
        added
    }

    /// Forget everything: cards, scores, stats, progress and stored state.
    /// In-memory state is kept when the store cannot be cleared.
    pub fn clear_all(&mut self) -> Result<()> {
        self.store.clear()?;
        self.deck = Deck::new();
        self.ledger.reset_all();
        self.stats = StudyStats::default();
        self.progress = ProgressData::default();
        self.session.reset();
        tracing::info!("all data cleared");
        Ok(())
    }
}

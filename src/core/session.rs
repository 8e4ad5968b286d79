//! Practice session state machine.
//!
//! A session cycles `Idle` / `AwaitingAnswer` / `Feedback` for one practice
//! mode. After an answer is evaluated an advance to the next question is
//! scheduled; the advance is tied to a generation counter so that a mode
//! switch or store change during the feedback window discards it instead of
//! letting it fire against stale state.

use std::fmt;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::config::PracticeConfig;
use crate::core::card::Flashcard;
use crate::core::ledger::{PracticeMode, ScoringLedger};
use crate::core::question::{eligible_targets, Question};
use crate::error::{LexiError, Result};

/// Session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Idle,
    AwaitingAnswer,
    Feedback,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingAnswer => "awaiting answer",
            SessionState::Feedback => "feedback",
        };
        f.write_str(name)
    }
}

/// Why a session is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IdleReason {
    NoCards,
    NoEligibleCards,
}

impl IdleReason {
    pub fn message(&self) -> &'static str {
        match self {
            IdleReason::NoCards => "no flashcards available, add some cards first",
            IdleReason::NoEligibleCards => "no card has its word in its example",
        }
    }
}

/// Handle for a scheduled advance. Firing a ticket whose generation no
/// longer matches the session is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceTicket {
    pub due: Instant,
    generation: u64,
}

/// Outcome of a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    pub mode: PracticeMode,
    pub correct: bool,
    /// The expected word, for display.
    pub answer: String,
    #[serde(skip)]
    pub advance: AdvanceTicket,
}

/// The active practice session for one mode.
#[derive(Debug, Clone)]
pub struct PracticeSession {
    mode: PracticeMode,
    state: SessionState,
    question: Option<Question>,
    idle_reason: Option<IdleReason>,
    pending: Option<AdvanceTicket>,
    generation: u64,
}

impl PracticeSession {
    /// A fresh, idle session. Call [`select_question`](Self::select_question)
    /// to activate it.
    pub fn new(mode: PracticeMode) -> Self {
        Self {
            mode,
            state: SessionState::Idle,
            question: None,
            idle_reason: Some(IdleReason::NoCards),
            pending: None,
            generation: 0,
        }
    }

    pub fn mode(&self) -> PracticeMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn idle_reason(&self) -> Option<IdleReason> {
        self.idle_reason
    }

    pub fn pending_advance(&self) -> Option<AdvanceTicket> {
        self.pending
    }

    /// Time left before the pending advance is due.
    pub fn time_until_advance(&self, now: Instant) -> Option<Duration> {
        self.pending.map(|p| p.due.saturating_duration_since(now))
    }

    /// The word the listening mode should speak, if a question is active.
    pub fn speak_target(&self) -> Option<&str> {
        match (self.mode, &self.question) {
            (PracticeMode::Listening, Some(q)) => Some(q.card.word.as_str()),
            _ => None,
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Transition: any → AwaitingAnswer | Idle
    ///
    /// Picks a target uniformly at random from the eligible cards and derives
    /// the payload for the current mode. Cancels any pending advance.
    pub fn select_question<R: Rng + ?Sized>(
        &mut self,
        cards: &[Flashcard],
        config: &PracticeConfig,
        rng: &mut R,
    ) -> SessionState {
        self.cancel_pending();

        if cards.is_empty() {
            self.go_idle(IdleReason::NoCards);
            return self.state;
        }

        let targets = eligible_targets(self.mode, cards, config.fill_blank_unmatched);
        let Some(target) = targets.choose(rng).copied() else {
            self.go_idle(IdleReason::NoEligibleCards);
            return self.state;
        };

        let question = Question::build(self.mode, target, cards, config, rng);
        tracing::debug!(mode = %self.mode, card = %target.id, "question selected");

        self.question = Some(question);
        self.idle_reason = None;
        self.state = SessionState::AwaitingAnswer;
        self.state
    }

    /// Transition: AwaitingAnswer → Feedback
    ///
    /// Evaluates `input` (trimmed, case-insensitive), records the attempt and
    /// schedules the advance at `now + feedback delay`. A call while `Idle`
    /// does nothing and returns `Ok(None)`; a call while in `Feedback` is
    /// rejected.
    pub fn submit_answer(
        &mut self,
        input: &str,
        ledger: &mut ScoringLedger,
        config: &PracticeConfig,
        now: Instant,
    ) -> Result<Option<AnswerFeedback>> {
        match self.state {
            SessionState::Idle => return Ok(None),
            SessionState::Feedback => {
                return Err(LexiError::invalid_state(format!(
                    "Cannot submit an answer in {} state",
                    self.state
                )))
            }
            SessionState::AwaitingAnswer => {}
        }

        let Some(question) = self.question.as_ref() else {
            return Err(LexiError::invalid_state(
                "Cannot submit an answer without an active question",
            ));
        };

        let correct = question.is_correct(input);
        let answer = question.expected_answer().to_string();
        ledger.record_attempt(self.mode, correct);
        tracing::info!(mode = %self.mode, correct, "answer evaluated");

        let ticket = AdvanceTicket {
            due: now + config.feedback_delay(),
            generation: self.generation,
        };
        self.pending = Some(ticket);
        self.state = SessionState::Feedback;

        Ok(Some(AnswerFeedback {
            mode: self.mode,
            correct,
            answer,
            advance: ticket,
        }))
    }

    /// Transition: Feedback → AwaitingAnswer | Idle (scheduled advance)
    ///
    /// Returns false and changes nothing when the ticket is stale.
    pub fn fire_advance<R: Rng + ?Sized>(
        &mut self,
        ticket: AdvanceTicket,
        cards: &[Flashcard],
        config: &PracticeConfig,
        rng: &mut R,
    ) -> bool {
        if self.pending != Some(ticket) || ticket.generation != self.generation {
            tracing::debug!(mode = %self.mode, "stale advance discarded");
            return false;
        }
        self.select_question(cards, config, rng);
        true
    }

    /// Fire the pending advance if it is due at `now`.
    pub fn poll<R: Rng + ?Sized>(
        &mut self,
        now: Instant,
        cards: &[Flashcard],
        config: &PracticeConfig,
        rng: &mut R,
    ) -> bool {
        match self.pending {
            Some(ticket) if ticket.due <= now => self.fire_advance(ticket, cards, config, rng),
            _ => false,
        }
    }

    /// Transition: any → (new mode) AwaitingAnswer | Idle
    pub fn switch_mode<R: Rng + ?Sized>(
        &mut self,
        mode: PracticeMode,
        cards: &[Flashcard],
        config: &PracticeConfig,
        rng: &mut R,
    ) -> SessionState {
        self.mode = mode;
        self.select_question(cards, config, rng)
    }

    /// React to a Card Store mutation.
    ///
    /// An emptied store forces `Idle` and drops any pending advance. A session
    /// that was idle, or whose targeted card was removed, re-selects. During
    /// `Feedback` the scheduled advance will re-select anyway.
    pub fn store_changed<R: Rng + ?Sized>(
        &mut self,
        cards: &[Flashcard],
        config: &PracticeConfig,
        rng: &mut R,
    ) -> SessionState {
        if cards.is_empty() {
            self.cancel_pending();
            self.go_idle(IdleReason::NoCards);
            return self.state;
        }

        match self.state {
            SessionState::Idle => self.select_question(cards, config, rng),
            SessionState::AwaitingAnswer => {
                let target_gone = self
                    .question
                    .as_ref()
                    .map_or(true, |q| !cards.iter().any(|c| c.id == q.card.id));
                if target_gone {
                    self.select_question(cards, config, rng)
                } else {
                    self.state
                }
            }
            SessionState::Feedback => self.state,
        }
    }

    /// Tear down: cancel the pending advance and go idle.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.go_idle(IdleReason::NoCards);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn cancel_pending(&mut self) {
        if self.pending.take().is_some() {
            tracing::debug!(mode = %self.mode, "pending advance cancelled");
        }
        self.generation = self.generation.wrapping_add(1);
    }

    fn go_idle(&mut self, reason: IdleReason) {
        self.question = None;
        self.idle_reason = Some(reason);
        self.state = SessionState::Idle;
    }
}

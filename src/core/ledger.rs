//! Scoring ledger: per-mode attempt/correct counters.
//!
//! Invariant: `correct <= attempts` for every counter. Counters are only ever
//! incremented together (correct answer) or `attempts` alone (wrong answer),
//! and deserialized values are clamped.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LexiError;

/// The five practice drill formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PracticeMode {
    Typing,
    MultipleChoice,
    FillBlank,
    Scramble,
    Listening,
}

impl PracticeMode {
    pub const ALL: [PracticeMode; 5] = [
        PracticeMode::Typing,
        PracticeMode::MultipleChoice,
        PracticeMode::FillBlank,
        PracticeMode::Scramble,
        PracticeMode::Listening,
    ];

    /// Key used in the persisted record.
    pub fn key(&self) -> &'static str {
        match self {
            PracticeMode::Typing => "typing",
            PracticeMode::MultipleChoice => "multipleChoice",
            PracticeMode::FillBlank => "fillBlank",
            PracticeMode::Scramble => "scramble",
            PracticeMode::Listening => "listening",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            PracticeMode::Typing => "Typing Quiz",
            PracticeMode::MultipleChoice => "Multiple Choice",
            PracticeMode::FillBlank => "Fill in Blank",
            PracticeMode::Scramble => "Word Scramble",
            PracticeMode::Listening => "Listening",
        }
    }
}

impl fmt::Display for PracticeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PracticeMode {
    type Err = LexiError;

    /// Accepts the persisted key as well as kebab-case CLI spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "typing" | "quiz" => Ok(PracticeMode::Typing),
            "multiplechoice" | "mc" => Ok(PracticeMode::MultipleChoice),
            "fillblank" | "fb" => Ok(PracticeMode::FillBlank),
            "scramble" => Ok(PracticeMode::Scramble),
            "listening" => Ok(PracticeMode::Listening),
            other => Err(LexiError::validation(format!(
                "unknown practice mode '{}'",
                other
            ))),
        }
    }
}

/// One correct/attempts counter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawScore")]
pub struct Score {
    correct: u32,
    attempts: u32,
}

#[derive(Deserialize)]
struct RawScore {
    #[serde(default)]
    correct: u32,
    #[serde(default)]
    attempts: u32,
}

impl From<RawScore> for Score {
    fn from(raw: RawScore) -> Self {
        Self {
            correct: raw.correct.min(raw.attempts),
            attempts: raw.attempts,
        }
    }
}

impl Score {
    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn record(&mut self, is_correct: bool) {
        self.attempts = self.attempts.saturating_add(1);
        if is_correct {
            self.correct = self.correct.saturating_add(1);
        }
    }

    pub fn reset(&mut self) {
        *self = Score::default();
    }

    /// Rounded percentage, 0 when nothing was attempted.
    pub fn accuracy(&self) -> u32 {
        percentage(self.correct as u64, self.attempts as u64)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.correct, self.attempts)
    }
}

/// `round(100 * correct / attempts)` with halves rounded up, 0 for no attempts.
pub fn percentage(correct: u64, attempts: u64) -> u32 {
    if attempts == 0 {
        return 0;
    }
    ((200 * correct + attempts) / (2 * attempts)) as u32
}

/// Per-mode scores in their persisted shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PracticeScores {
    pub typing: Score,
    pub multiple_choice: Score,
    pub fill_blank: Score,
    pub scramble: Score,
    pub listening: Score,
}

impl PracticeScores {
    pub fn get(&self, mode: PracticeMode) -> &Score {
        match mode {
            PracticeMode::Typing => &self.typing,
            PracticeMode::MultipleChoice => &self.multiple_choice,
            PracticeMode::FillBlank => &self.fill_blank,
            PracticeMode::Scramble => &self.scramble,
            PracticeMode::Listening => &self.listening,
        }
    }

    fn get_mut(&mut self, mode: PracticeMode) -> &mut Score {
        match mode {
            PracticeMode::Typing => &mut self.typing,
            PracticeMode::MultipleChoice => &mut self.multiple_choice,
            PracticeMode::FillBlank => &mut self.fill_blank,
            PracticeMode::Scramble => &mut self.scramble,
            PracticeMode::Listening => &mut self.listening,
        }
    }
}

/// All scoring counters: the five practice modes plus the legacy quiz score
/// that the typing quiz also feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoringLedger {
    practice: PracticeScores,
    quiz: Score,
}

impl ScoringLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(practice: PracticeScores, quiz: Score) -> Self {
        Self { practice, quiz }
    }

    pub fn practice_scores(&self) -> &PracticeScores {
        &self.practice
    }

    pub fn quiz_score(&self) -> &Score {
        &self.quiz
    }

    pub fn score(&self, mode: PracticeMode) -> &Score {
        self.practice.get(mode)
    }

    /// Record one answered question.
    pub fn record_attempt(&mut self, mode: PracticeMode, is_correct: bool) {
        self.practice.get_mut(mode).record(is_correct);
        if mode == PracticeMode::Typing {
            self.quiz.record(is_correct);
        }
    }

    pub fn reset(&mut self, mode: PracticeMode) {
        self.practice.get_mut(mode).reset();
    }

    pub fn reset_quiz(&mut self) {
        self.quiz.reset();
    }

    pub fn reset_all(&mut self) {
        *self = ScoringLedger::default();
    }

    pub fn accuracy(&self, mode: PracticeMode) -> u32 {
        self.practice.get(mode).accuracy()
    }

    /// Accuracy over the sum of all five practice counters.
    pub fn aggregate_accuracy(&self) -> u32 {
        let (correct, attempts) = PracticeMode::ALL.iter().fold((0u64, 0u64), |acc, mode| {
            let score = self.practice.get(*mode);
            (acc.0 + score.correct as u64, acc.1 + score.attempts as u64)
        });
        percentage(correct, attempts)
    }

    /// Total attempts across the five practice modes.
    pub fn total_attempts(&self) -> u64 {
        PracticeMode::ALL
            .iter()
            .map(|m| self.practice.get(*m).attempts as u64)
            .sum()
    }
}

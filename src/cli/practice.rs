//! Practice command for Lexicard.
//!
//! Runs an interactive practice session on stdin/stdout. Each question is
//! printed, the answer is read from one input line, feedback is shown for the
//! configured delay and then the next question is selected.
//!
//! Input lines starting with `:` are commands: `:q` ends the session and
//! `:s` speaks the word again in listening mode.

use std::io::{BufRead, Write};
use std::thread;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::core::{PracticeMode, SessionState};
use crate::error::Result;
use crate::speech::{Accent, Speaker};
use crate::storage::StateStore;
use crate::trainer::Trainer;

/// Options for the practice command.
#[derive(Debug, Clone, Default)]
pub struct PracticeOptions {
    /// Output the summary as JSON.
    pub json: bool,
    /// Suppress the summary.
    pub quiet: bool,
    /// Stop after this many answers.
    pub count: Option<usize>,
    /// Accent for listening mode; the configured default when unset.
    pub accent: Option<Accent>,
}

/// Summary of a practice run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeOutput {
    /// Whether the session ran.
    pub success: bool,
    /// Practice mode key.
    pub mode: String,
    /// Answers given in this run.
    pub answered: u32,
    /// Correct answers in this run.
    pub correct: u32,
    /// Lifetime accuracy of this mode, in percent.
    pub accuracy: u32,
    /// Why no question could be asked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle: Option<String>,
    /// Seconds added to total study time.
    pub study_seconds: u64,
    /// Error message if the session failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PracticeOutput {
    pub fn failure(mode: PracticeMode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            mode: mode.key().to_string(),
            answered: 0,
            correct: 0,
            accuracy: 0,
            idle: None,
            study_seconds: 0,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Default)]
struct RunTally {
    answered: u32,
    correct: u32,
    idle: Option<String>,
}

/// The practice command implementation.
pub struct PracticeCommand<S: StateStore> {
    trainer: Trainer<S>,
    speaker: Box<dyn Speaker>,
}

impl<S: StateStore> PracticeCommand<S> {
    /// Create a new practice command.
    pub fn new(trainer: Trainer<S>, speaker: Box<dyn Speaker>) -> Self {
        Self { trainer, speaker }
    }

    pub fn trainer(&self) -> &Trainer<S> {
        &self.trainer
    }

    /// Run a session, reading answers from `input` and writing the
    /// transcript to `out`.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mode: PracticeMode,
        options: &PracticeOptions,
        input: R,
        out: &mut W,
    ) -> PracticeOutput {
        self.trainer.start_study_session();
        let result = self.drive(mode, options, input, out);
        let study_seconds = self.trainer.end_study_session().unwrap_or(0);

        match result {
            Ok(tally) => PracticeOutput {
                success: true,
                mode: mode.key().to_string(),
                answered: tally.answered,
                correct: tally.correct,
                accuracy: self.trainer.ledger().accuracy(mode),
                idle: tally.idle,
                study_seconds,
                error: None,
            },
            Err(e) => PracticeOutput::failure(mode, e.to_string()),
        }
    }

    fn drive<R: BufRead, W: Write>(
        &mut self,
        mode: PracticeMode,
        options: &PracticeOptions,
        mut input: R,
        out: &mut W,
    ) -> Result<RunTally> {
        let mut tally = RunTally::default();
        self.trainer.start_practice(mode);
        writeln!(out, "{}", mode.display_name())?;

        loop {
            if options.count.is_some_and(|n| tally.answered as usize >= n) {
                break;
            }

            if self.trainer.session().state() == SessionState::Idle {
                let reason = self
                    .trainer
                    .session()
                    .idle_reason()
                    .map(|r| r.message())
                    .unwrap_or("nothing to practice");
                writeln!(out, "{}", reason)?;
                tally.idle = Some(reason.to_string());
                break;
            }

            self.show_question(options, out)?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();
            match line {
                ":q" | ":quit" => break,
                ":s" | ":speak" => {
                    self.speak(options, out)?;
                    continue;
                }
                _ => {}
            }

            let answer = self.resolve_choice(line);
            let Some(feedback) = self.trainer.submit_answer(&answer, Instant::now())? else {
                continue;
            };

            tally.answered += 1;
            if feedback.correct {
                tally.correct += 1;
                writeln!(out, "Correct!")?;
            } else {
                writeln!(out, "Incorrect. The answer was: {}", feedback.answer)?;
            }

            if let Some(wait) = self.trainer.session().time_until_advance(Instant::now()) {
                thread::sleep(wait);
            }
            self.trainer.poll(Instant::now());
        }

        Ok(tally)
    }

    fn show_question<W: Write>(&self, options: &PracticeOptions, out: &mut W) -> Result<()> {
        let Some(question) = self.trainer.session().question() else {
            return Ok(());
        };
        writeln!(out)?;
        writeln!(out, "{}", question.prompt())?;
        if let Some(choices) = question.options() {
            for (i, choice) in choices.iter().enumerate() {
                writeln!(out, "  {}) {}", i + 1, choice)?;
            }
        }
        if question.mode == PracticeMode::Listening {
            self.speak(options, out)?;
        }
        write!(out, "> ")?;
        out.flush()?;
        Ok(())
    }

    /// Speech failures are reported in the transcript and otherwise ignored.
    fn speak<W: Write>(&self, options: &PracticeOptions, out: &mut W) -> Result<()> {
        if let Err(e) = self.trainer.speak_word(self.speaker.as_ref(), options.accent) {
            writeln!(out, "(speech unavailable: {})", e)?;
        }
        Ok(())
    }

    /// A bare option number picks that multiple-choice option.
    fn resolve_choice(&self, line: &str) -> String {
        let options = self
            .trainer
            .session()
            .question()
            .and_then(|q| q.options());
        match (options, line.parse::<usize>()) {
            (Some(options), Ok(n)) if (1..=options.len()).contains(&n) => options[n - 1].clone(),
            _ => line.to_string(),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &PracticeOutput, options: &PracticeOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &PracticeOutput) -> String {
        if !output.success {
            return format!(
                "Practice failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = vec![
            String::new(),
            format!(
                "Session: {} / {} correct ({} lifetime accuracy {}%)",
                output.correct, output.answered, output.mode, output.accuracy
            ),
        ];
        if output.study_seconds > 0 {
            lines.push(format!("Study time: {}s", output.study_seconds));
        }
        lines.join("\n")
    }
}

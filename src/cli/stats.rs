//! Stats command for Lexicard.
//!
//! Shows practice scores, the study streak and weekly progress.

use serde::{Deserialize, Serialize};

use crate::core::{Insights, PracticeMode, Score};
use crate::storage::StateStore;
use crate::trainer::Trainer;

/// Options for the stats command.
#[derive(Debug, Clone, Default)]
pub struct StatsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Score line for one counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub name: String,
    pub correct: u32,
    pub attempts: u32,
    pub accuracy: u32,
}

impl ScoreLine {
    fn new(name: &str, score: &Score) -> Self {
        Self {
            name: name.to_string(),
            correct: score.correct(),
            attempts: score.attempts(),
            accuracy: score.accuracy(),
        }
    }
}

/// Sessions on one day of the last week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayActivity {
    pub day: String,
    pub sessions: u32,
}

/// Output format for the stats command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsOutput {
    pub success: bool,
    pub card_count: usize,
    pub cards_studied: u32,
    pub study_streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_study_date: Option<String>,
    /// Legacy quiz score, fed by typing answers.
    pub quiz: ScoreLine,
    /// One line per practice mode.
    pub modes: Vec<ScoreLine>,
    /// Accuracy over all practice attempts.
    pub overall_accuracy: u32,
    pub total_attempts: u64,
    pub insights: Insights,
    pub weekly_activity: Vec<DayActivity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The stats command implementation.
pub struct StatsCommand<S: StateStore> {
    trainer: Trainer<S>,
}

impl<S: StateStore> StatsCommand<S> {
    /// Create a new stats command.
    pub fn new(trainer: Trainer<S>) -> Self {
        Self { trainer }
    }

    /// Run the stats command.
    pub fn run(&self, _options: &StatsOptions) -> StatsOutput {
        let trainer = &self.trainer;
        let ledger = trainer.ledger();
        let stats = trainer.stats();

        StatsOutput {
            success: true,
            card_count: trainer.deck().len(),
            cards_studied: stats.cards_studied,
            study_streak: stats.study_streak,
            last_study_date: stats.last_study_date.map(|d| d.to_string()),
            quiz: ScoreLine::new("Quiz", ledger.quiz_score()),
            modes: PracticeMode::ALL
                .iter()
                .map(|mode| ScoreLine::new(mode.display_name(), ledger.score(*mode)))
                .collect(),
            overall_accuracy: ledger.aggregate_accuracy(),
            total_attempts: ledger.total_attempts(),
            insights: trainer.insights(),
            weekly_activity: trainer
                .weekly_activity()
                .into_iter()
                .map(|(day, sessions)| DayActivity { day, sessions })
                .collect(),
            error: None,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StatsOutput, options: &StatsOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &StatsOutput) -> String {
        if !output.success {
            return format!(
                "Failed to compute stats: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();

        lines.push("Study".to_string());
        lines.push(format!("  Cards:         {}", output.card_count));
        lines.push(format!("  Cards studied: {}", output.cards_studied));
        lines.push(format!("  Streak:        {} day(s)", output.study_streak));
        if let Some(date) = &output.last_study_date {
            lines.push(format!("  Last studied:  {}", date));
        }
        lines.push(String::new());

        lines.push("Scores".to_string());
        for line in std::iter::once(&output.quiz).chain(&output.modes) {
            lines.push(format!(
                "  {:<16} {:>4} / {:<4} {:>3}%",
                line.name, line.correct, line.attempts, line.accuracy
            ));
        }
        lines.push(format!(
            "  Overall accuracy: {}% over {} attempt(s)",
            output.overall_accuracy, output.total_attempts
        ));
        lines.push(String::new());

        lines.push("Insights".to_string());
        match output.insights.best_mode {
            Some(mode) => lines.push(format!(
                "  Best mode:        {} ({}%)",
                mode.display_name(),
                output.insights.best_accuracy
            )),
            None => lines.push("  Best mode:        none yet".to_string()),
        }
        lines.push(format!(
            "  Average accuracy: {:.1}%",
            output.insights.average_accuracy
        ));
        lines.push(format!(
            "  Study time:       {} min",
            output.insights.study_minutes
        ));
        lines.push(String::new());

        lines.push("Last 7 days".to_string());
        for day in &output.weekly_activity {
            lines.push(format!(
                "  {}  {:<10} {}",
                day.day,
                "#".repeat(day.sessions.min(10) as usize),
                day.sessions
            ));
        }

        lines.join("\n")
    }
}

//! Study time, daily activity and derived insights.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::ledger::{PracticeMode, ScoringLedger};

/// Persisted progress record.
///
/// `daily_activity` is keyed by short weekday label (`"Mon"`..`"Sun"`), so it
/// describes a rolling week rather than calendar history.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressData {
    pub daily_activity: BTreeMap<String, u32>,
    /// Accumulated study time in seconds.
    pub study_time: u64,
    #[serde(deserialize_with = "deserialize_session_start")]
    pub session_start: Option<DateTime<Utc>>,
}

impl ProgressData {
    /// Mark the start of a study session. An already-open session is kept.
    pub fn start_session(&mut self, now: DateTime<Utc>) {
        if self.session_start.is_none() {
            self.session_start = Some(now);
        }
    }

    /// Close the open session, if any: add its length to the study time and
    /// count one session for the weekday of `today`, the learner's local
    /// date. Returns the seconds added.
    pub fn end_session(&mut self, now: DateTime<Utc>, today: NaiveDate) -> Option<u64> {
        let start = self.session_start.take()?;
        let elapsed = now.signed_duration_since(start).num_seconds().max(0) as u64;
        self.study_time = self.study_time.saturating_add(elapsed);

        let label = weekday_label(today.weekday()).to_string();
        *self.daily_activity.entry(label).or_insert(0) += 1;
        Some(elapsed)
    }

    pub fn study_minutes(&self) -> u64 {
        self.study_time / 60
    }

    /// Activity counts for the seven days ending at `today`, oldest first.
    pub fn activity_last_7_days(&self, today: NaiveDate) -> Vec<(String, u32)> {
        last_7_day_labels(today)
            .into_iter()
            .map(|label| {
                let count = self.daily_activity.get(label).copied().unwrap_or(0);
                (label.to_string(), count)
            })
            .collect()
    }
}

pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Weekday labels for the seven days ending at `today`, oldest first.
pub fn last_7_day_labels(today: NaiveDate) -> Vec<&'static str> {
    (0..7)
        .rev()
        .map(|offset| weekday_label((today - Duration::days(offset)).weekday()))
        .collect()
}

/// Summary figures shown on the progress dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    /// Mode with the highest non-zero accuracy; first listed wins ties.
    pub best_mode: Option<PracticeMode>,
    pub best_accuracy: u32,
    /// Mean of the five per-mode accuracies.
    pub average_accuracy: f64,
    pub study_minutes: u64,
}

impl Insights {
    pub fn compute(ledger: &ScoringLedger, progress: &ProgressData) -> Self {
        let mut best_mode = None;
        let mut best_accuracy = 0;
        let mut sum = 0u32;

        for mode in PracticeMode::ALL {
            let accuracy = ledger.accuracy(mode);
            sum += accuracy;
            if accuracy > best_accuracy {
                best_accuracy = accuracy;
                best_mode = Some(mode);
            }
        }

        Self {
            best_mode,
            best_accuracy,
            average_accuracy: sum as f64 / PracticeMode::ALL.len() as f64,
            study_minutes: progress.study_minutes(),
        }
    }
}

/// Lenient session start reader. Older records hold epoch milliseconds;
/// unknown shapes become `None` rather than failing the whole record.
fn deserialize_session_start<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(parse_session_start))
}

fn parse_session_start(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

//! Study statistics and the calendar-day streak.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Date format used when persisting `lastStudyDate`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Older records stored the date in this long form, e.g. `Mon Jan 01 2024`.
const LEGACY_DATE_FORMAT: &str = "%a %b %d %Y";

/// Cards studied, last study date and consecutive-day streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudyStats {
    pub cards_studied: u32,
    #[serde(
        serialize_with = "serialize_date",
        deserialize_with = "deserialize_date"
    )]
    pub last_study_date: Option<NaiveDate>,
    pub study_streak: u32,
}

impl StudyStats {
    /// Record a study event on `today` and update the streak.
    ///
    /// - first ever event, or exactly one day after the last: streak + 1
    /// - same day as the last: unchanged
    /// - more than one day after the last: streak restarts at 1
    ///
    /// A date earlier than the last recorded one (clock moved backwards)
    /// leaves everything untouched.
    pub fn record_study(&mut self, today: NaiveDate) {
        match self.last_study_date {
            None => {
                self.study_streak = self.study_streak.saturating_add(1);
            }
            Some(last) => {
                let gap = today.signed_duration_since(last).num_days();
                match gap {
                    0 => return,
                    1 => self.study_streak = self.study_streak.saturating_add(1),
                    g if g > 1 => self.study_streak = 1,
                    _ => {
                        tracing::debug!(%last, %today, "study date before last recorded date, streak unchanged");
                        return;
                    }
                }
            }
        }
        self.last_study_date = Some(today);
    }

    /// Count one flipped-through card and record the study event.
    pub fn record_card_studied(&mut self, today: NaiveDate) {
        self.cards_studied = self.cards_studied.saturating_add(1);
        self.record_study(today);
    }
}

fn serialize_date<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match date {
        Some(d) => serializer.serialize_some(&d.format(DATE_FORMAT).to_string()),
        None => serializer.serialize_none(),
    }
}

/// Lenient date reader: unknown shapes become `None` rather than failing the
/// whole record.
fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(parse_study_date))
}

/// Parse either `YYYY-MM-DD` or the legacy `Mon Jan 01 2024` form.
pub fn parse_study_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(text, LEGACY_DATE_FORMAT))
        .ok()
}

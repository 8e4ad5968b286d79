//! The persisted state record.
//!
//! Writing is plain serde. Reading is tolerant: every top-level field is
//! decoded on its own and falls back to its default when it is missing or
//! mis-shaped, so one damaged field never costs the learner their cards.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::card::{CardId, Flashcard};
use crate::core::ledger::{PracticeScores, Score};
use crate::core::progress::ProgressData;
use crate::core::streak::StudyStats;

/// Everything that survives a restart.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub flashcards: Vec<Flashcard>,
    pub quiz_score: Score,
    pub study_stats: StudyStats,
    pub practice_scores: PracticeScores,
    pub progress_data: ProgressData,
    pub current_card_index: usize,
}

impl Snapshot {
    /// Parse a stored record. Text that is not a JSON object yields the
    /// all-defaults record.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                tracing::warn!(error = %e, "state record is not valid JSON, using defaults");
                Self::default()
            }
        }
    }

    /// Decode a record field by field.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            tracing::warn!("state record is not an object, using defaults");
            return Self::default();
        };

        let flashcards = decode_cards(fields.remove("flashcards"));
        let current_card_index = decode_index(fields.remove("currentCardIndex"), flashcards.len());

        Self {
            quiz_score: decode_field(&mut fields, "quizScore"),
            study_stats: decode_field(&mut fields, "studyStats"),
            practice_scores: decode_field(&mut fields, "practiceScores"),
            progress_data: decode_field(&mut fields, "progressData"),
            flashcards,
            current_card_index,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn decode_field<T: DeserializeOwned + Default>(fields: &mut Map<String, Value>, key: &str) -> T {
    match fields.remove(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(field = key, error = %e, "malformed field in state record, using default");
            T::default()
        }),
    }
}

fn decode_index(value: Option<Value>, len: usize) -> usize {
    let index = value.as_ref().and_then(Value::as_u64).unwrap_or(0) as usize;
    if index < len {
        index
    } else {
        0
    }
}

fn decode_cards(value: Option<Value>) -> Vec<Flashcard> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().filter_map(decode_card).collect(),
        Some(_) => {
            tracing::warn!("flashcards field is not a list, ignoring it");
            Vec::new()
        }
    }
}

/// Decode one stored card. Legacy records used numeric ids; those are kept
/// as their decimal text. Cards with an empty field are dropped.
fn decode_card(value: Value) -> Option<Flashcard> {
    let Value::Object(card) = value else {
        tracing::warn!("dropping stored card that is not an object");
        return None;
    };

    let text = |key: &str| {
        card.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let (Some(word), Some(meaning), Some(example)) = (text("word"), text("meaning"), text("example"))
    else {
        tracing::warn!("dropping stored card with a missing field");
        return None;
    };

    let id = match card.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => CardId::new(s.trim()),
        Some(Value::Number(n)) => CardId::new(n.to_string()),
        _ => CardId::generate(),
    };

    Some(Flashcard {
        id,
        word,
        meaning,
        example,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::card::CardDraft;
    use crate::core::ledger::PracticeMode;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_empty_object_gives_defaults() {
        assert_eq!(Snapshot::parse("{}"), Snapshot::default());
    }

    #[test]
    fn test_garbage_gives_defaults() {
        assert_eq!(Snapshot::parse("not json at all"), Snapshot::default());
        assert_eq!(Snapshot::parse("[1, 2, 3]"), Snapshot::default());
    }

    #[test]
    fn test_persisted_key_names() {
        let snapshot = Snapshot {
            flashcards: vec![CardDraft::new("cat", "قطة", "The cat sat.").into_card(CardId::new("1"))],
            ..Default::default()
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        for key in [
            "flashcards",
            "quizScore",
            "studyStats",
            "practiceScores",
            "progressData",
            "currentCardIndex",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["flashcards"][0]["word"], "cat");
        assert_eq!(value["practiceScores"]["fillBlank"]["attempts"], 0);
    }

    #[test]
    fn test_full_record_round_trip() {
        let mut practice = PracticeScores::default();
        practice.scramble.record(true);
        let snapshot = Snapshot {
            flashcards: vec![
                CardDraft::new("cat", "m", "The cat.").into_card(CardId::new("a")),
                CardDraft::new("dog", "m", "The dog.").into_card(CardId::new("b")),
            ],
            practice_scores: practice,
            study_stats: StudyStats {
                cards_studied: 4,
                last_study_date: NaiveDate::from_ymd_opt(2024, 1, 2),
                study_streak: 2,
            },
            current_card_index: 1,
            ..Default::default()
        };
        let back = Snapshot::parse(&snapshot.to_json().unwrap());
        assert_eq!(back, snapshot);
        assert_eq!(back.practice_scores.get(PracticeMode::Scramble).correct(), 1);
    }

    #[test]
    fn test_numeric_ids_become_strings() {
        let snapshot = Snapshot::from_value(json!({
            "flashcards": [
                {"id": 1712345678901u64, "word": "cat", "meaning": "m", "example": "e"},
                {"id": 1712345678901.5, "word": "dog", "meaning": "m", "example": "e"}
            ]
        }));
        assert_eq!(snapshot.flashcards[0].id.as_str(), "1712345678901");
        assert_eq!(snapshot.flashcards[1].id.as_str(), "1712345678901.5");
    }

    #[test]
    fn test_incomplete_cards_dropped() {
        let snapshot = Snapshot::from_value(json!({
            "flashcards": [
                {"id": "1", "word": "cat", "meaning": "m", "example": "e"},
                {"id": "2", "word": "  ", "meaning": "m", "example": "e"},
                {"id": "3", "word": "dog"},
                "not a card",
                {"word": "bird", "meaning": "m", "example": "e"}
            ]
        }));
        let words: Vec<&str> = snapshot.flashcards.iter().map(|c| c.word.as_str()).collect();
        assert_eq!(words, vec!["cat", "bird"]);
        assert!(!snapshot.flashcards[1].id.as_str().is_empty());
    }

    #[test]
    fn test_malformed_field_falls_back_alone() {
        let snapshot = Snapshot::from_value(json!({
            "flashcards": [{"id": "1", "word": "cat", "meaning": "m", "example": "e"}],
            "quizScore": "lots",
            "studyStats": {"cardsStudied": 7, "studyStreak": 3},
            "practiceScores": {"typing": {"correct": 9, "attempts": 4}}
        }));
        assert_eq!(snapshot.flashcards.len(), 1);
        assert_eq!(snapshot.quiz_score, Score::default());
        assert_eq!(snapshot.study_stats.cards_studied, 7);
        assert_eq!(snapshot.study_stats.last_study_date, None);
        // correct is clamped to attempts
        assert_eq!(snapshot.practice_scores.typing.correct(), 4);
        assert_eq!(snapshot.practice_scores.typing.attempts(), 4);
    }

    #[test]
    fn test_numeric_session_start_keeps_progress() {
        let snapshot = Snapshot::parse(
            r#"{"progressData":{"dailyActivity":{"Mon":3},"studyTime":100,"sessionStart":1700000000000}}"#,
        );
        let progress = &snapshot.progress_data;
        assert_eq!(progress.daily_activity.get("Mon"), Some(&3));
        assert_eq!(progress.study_time, 100);
        assert!(progress.session_start.is_some());
    }

    #[test]
    fn test_cursor_clamped() {
        let cards = json!([
            {"id": "1", "word": "cat", "meaning": "m", "example": "e"},
            {"id": "2", "word": "dog", "meaning": "m", "example": "e"}
        ]);
        let snapshot =
            Snapshot::from_value(json!({"flashcards": cards.clone(), "currentCardIndex": 1}));
        assert_eq!(snapshot.current_card_index, 1);

        let snapshot =
            Snapshot::from_value(json!({"flashcards": cards.clone(), "currentCardIndex": 9}));
        assert_eq!(snapshot.current_card_index, 0);

        let snapshot = Snapshot::from_value(json!({"flashcards": cards, "currentCardIndex": -1}));
        assert_eq!(snapshot.current_card_index, 0);

        let snapshot = Snapshot::from_value(json!({"currentCardIndex": 3}));
        assert_eq!(snapshot.current_card_index, 0);
    }
}

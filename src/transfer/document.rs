//! Card documents: a JSON array of `{word, meaning, example}` records.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::core::card::{CardDraft, Flashcard};
use crate::error::{LexiError, Result};

#[derive(Serialize)]
struct ExportedCard<'a> {
    id: &'a str,
    word: &'a str,
    meaning: &'a str,
    example: &'a str,
}

/// Serialize the card list for export.
///
/// Exporting an empty list is refused.
pub fn export_document(cards: &[Flashcard]) -> Result<String> {
    if cards.is_empty() {
        return Err(LexiError::validation("no flashcards to export"));
    }
    let records: Vec<ExportedCard<'_>> = cards
        .iter()
        .map(|c| ExportedCard {
            id: c.id.as_str(),
            word: &c.word,
            meaning: &c.meaning,
            example: &c.example,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// File name for an export made on `date`: `flashcards_YYYY-MM-DD.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("flashcards_{}.json", date.format("%Y-%m-%d"))
}

/// Parse an import document into drafts.
///
/// The document must be a JSON array whose every element is an object with
/// non-empty `word`, `meaning` and `example` strings. Any other shape rejects
/// the whole document. Incoming ids are ignored: imported cards always get
/// fresh ones.
pub fn parse_import_document(text: &str) -> Result<Vec<CardDraft>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| LexiError::import_format(format!("not valid JSON: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(LexiError::import_format("expected a list of flashcards"));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            record_to_draft(item).ok_or_else(|| {
                LexiError::import_format(format!(
                    "record {} is not a complete flashcard (word, meaning, example)",
                    index + 1
                ))
            })
        })
        .collect()
}

/// A draft from a `{word, meaning, example}` object, if every field is a
/// non-empty string.
pub(crate) fn record_to_draft(item: &Value) -> Option<CardDraft> {
    let field = |key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };
    Some(CardDraft::new(field("word")?, field("meaning")?, field("example")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::card::CardId;

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "flashcards_2024-03-07.json");
    }

    #[test]
    fn test_export_empty_is_refused() {
        let err = export_document(&[]).unwrap_err();
        assert!(matches!(err, LexiError::Validation { .. }));
    }

    #[test]
    fn test_export_then_import() {
        let cards = vec![
            CardDraft::new("cat", "قطة", "The cat sat.").into_card(CardId::new("1")),
            CardDraft::new("dog", "كلب", "The dog ran.").into_card(CardId::new("2")),
        ];
        let text = export_document(&cards).unwrap();
        assert!(text.contains("\"id\": \"1\""));

        let drafts = parse_import_document(&text).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].word, "cat");
        assert_eq!(drafts[1].meaning, "كلب");
        assert!(drafts.iter().all(|d| d.id.is_none()));
    }

    #[test]
    fn test_import_rejects_non_list() {
        let err = parse_import_document(r#"{"word": "cat"}"#).unwrap_err();
        assert!(matches!(err, LexiError::ImportFormat { .. }));

        let err = parse_import_document("garbage").unwrap_err();
        assert!(matches!(err, LexiError::ImportFormat { .. }));
    }

    #[test]
    fn test_import_is_all_or_nothing() {
        let text = r#"[
            {"word": "cat", "meaning": "m", "example": "e"},
            {"word": "dog", "meaning": "", "example": "e"}
        ]"#;
        let err = parse_import_document(text).unwrap_err();
        assert!(matches!(err, LexiError::ImportFormat { .. }));
        assert!(err.to_string().contains("record 2"));
    }

    #[test]
    fn test_import_trims_and_accepts_extra_fields() {
        let text = r#"[{"id": 17, "word": " cat ", "meaning": "m", "example": "e", "tags": []}]"#;
        let drafts = parse_import_document(text).unwrap();
        assert_eq!(drafts[0].word, "cat");
    }

    #[test]
    fn test_import_empty_list() {
        assert!(parse_import_document("[]").unwrap().is_empty());
    }
}

//! Flashcard types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::question::contains_ignore_case;
use crate::error::{LexiError, Result};

/// Opaque, unique card identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier (e.g. one read back from storage).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A word/meaning/example triple.
///
/// Cards are immutable once created; the only way to change one is to delete
/// it and add a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: CardId,
    pub word: String,
    pub meaning: String,
    pub example: String,
}

impl Flashcard {
    /// Whether the card's word occurs in its example sentence (case-insensitive).
    pub fn word_in_example(&self) -> bool {
        contains_ignore_case(&self.example, &self.word)
    }
}

/// A card that has not been assigned to a store yet.
///
/// Drafts come from manual entry, imported documents and the image extractor.
/// The optional `id` is only a hint; the store decides whether to keep it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CardId>,
    pub word: String,
    pub meaning: String,
    pub example: String,
}

impl CardDraft {
    pub fn new(
        word: impl Into<String>,
        meaning: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            word: word.into(),
            meaning: meaning.into(),
            example: example.into(),
        }
    }

    /// Attach an id hint.
    pub fn with_id(mut self, id: CardId) -> Self {
        self.id = Some(id);
        self
    }

    /// Trim every field and reject the draft if any becomes empty.
    pub fn normalized(self) -> Result<Self> {
        let word = self.word.trim().to_string();
        let meaning = self.meaning.trim().to_string();
        let example = self.example.trim().to_string();

        let missing: Vec<&str> = [("word", &word), ("meaning", &meaning), ("example", &example)]
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(LexiError::validation(format!(
                "required field(s) empty: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            id: self.id,
            word,
            meaning,
            example,
        })
    }

    /// Turn the draft into a card with the given id.
    pub fn into_card(self, id: CardId) -> Flashcard {
        Flashcard {
            id,
            word: self.word,
            meaning: self.meaning,
            example: self.example,
        }
    }
}

impl From<&Flashcard> for CardDraft {
    fn from(card: &Flashcard) -> Self {
        Self {
            id: Some(card.id.clone()),
            word: card.word.clone(),
            meaning: card.meaning.clone(),
            example: card.example.clone(),
        }
    }
}

//! Cards command for Lexicard.
//!
//! Add, list and delete cards, and walk through them as flip cards.

use serde::{Deserialize, Serialize};

use crate::core::{CardDraft, CardId, Flashcard};
use crate::storage::StateStore;
use crate::trainer::Trainer;

/// What the cards command should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardsAction {
    Add {
        word: String,
        meaning: String,
        example: String,
    },
    List,
    Delete {
        id: String,
    },
    /// Show the current card.
    Show,
    Next,
    Previous,
    /// Jump to a 1-based position.
    Goto {
        position: usize,
    },
    Flip,
    Shuffle {
        enabled: bool,
    },
}

/// Options for the cards command.
#[derive(Debug, Clone, Default)]
pub struct CardsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Card as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    pub id: String,
    pub word: String,
    pub meaning: String,
    pub example: String,
}

impl From<&Flashcard> for CardInfo {
    fn from(card: &Flashcard) -> Self {
        Self {
            id: card.id.to_string(),
            word: card.word.clone(),
            meaning: card.meaning.clone(),
            example: card.example.clone(),
        }
    }
}

/// Output format for the cards command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardsOutput {
    /// Whether the action succeeded.
    pub success: bool,
    /// Cards listed, or the single card added or deleted.
    pub cards: Vec<CardInfo>,
    /// The card under the cursor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<CardInfo>,
    /// Position counter, e.g. `"2 / 5"`.
    pub counter: String,
    /// Whether the current card shows its back.
    pub flipped: bool,
    pub shuffled: bool,
    /// Whether next/previous lead anywhere.
    pub can_navigate: bool,
    /// Short description of what happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error message if the action failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CardsOutput {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            cards: Vec::new(),
            current: None,
            counter: "0 / 0".to_string(),
            flipped: false,
            shuffled: false,
            can_navigate: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// The cards command implementation.
pub struct CardsCommand<S: StateStore> {
    trainer: Trainer<S>,
}

impl<S: StateStore> CardsCommand<S> {
    /// Create a new cards command.
    pub fn new(trainer: Trainer<S>) -> Self {
        Self { trainer }
    }

    pub fn trainer(&self) -> &Trainer<S> {
        &self.trainer
    }

    /// Run the cards command.
    pub fn run(&mut self, action: &CardsAction) -> CardsOutput {
        let (cards, message) = match action {
            CardsAction::Add {
                word,
                meaning,
                example,
            } => match self
                .trainer
                .add_card(CardDraft::new(word.as_str(), meaning.as_str(), example.as_str()))
            {
                Ok(card) => (vec![CardInfo::from(&card)], "Card added".to_string()),
                Err(e) => return CardsOutput::failure(e.to_string()),
            },
            CardsAction::List => (
                self.trainer.deck().cards().iter().map(CardInfo::from).collect(),
                format!("{} card(s)", self.trainer.deck().len()),
            ),
            CardsAction::Delete { id } => match self.trainer.delete_card(&CardId::new(id.as_str())) {
                Some(card) => (vec![CardInfo::from(&card)], "Card deleted".to_string()),
                None => (Vec::new(), format!("No card with id {}", id)),
            },
            CardsAction::Show => (Vec::new(), String::new()),
            CardsAction::Next => {
                self.trainer.next_card();
                (Vec::new(), String::new())
            }
            CardsAction::Previous => {
                self.trainer.previous_card();
                (Vec::new(), String::new())
            }
            CardsAction::Goto { position } => {
                self.trainer.set_cursor(position.saturating_sub(1));
                (Vec::new(), String::new())
            }
            CardsAction::Flip => {
                let studied = self.trainer.flip();
                let message = if studied {
                    format!("Studied ({} total)", self.trainer.stats().cards_studied)
                } else {
                    String::new()
                };
                (Vec::new(), message)
            }
            CardsAction::Shuffle { enabled } => {
                self.trainer.set_shuffle(*enabled);
                let message = if *enabled {
                    "Shuffle on"
                } else {
                    "Shuffle off"
                };
                (Vec::new(), message.to_string())
            }
        };

        let deck = self.trainer.deck();
        let (position, total) = deck.counter();
        CardsOutput {
            success: true,
            cards,
            current: deck.current().map(CardInfo::from),
            counter: format!("{} / {}", position, total),
            flipped: deck.is_flipped(),
            shuffled: deck.is_shuffled(),
            can_navigate: deck.can_navigate(),
            message: (!message.is_empty()).then_some(message),
            error: None,
        }
    }

    /// Format output based on options.
    pub fn format_output(
        &self,
        action: &CardsAction,
        output: &CardsOutput,
        options: &CardsOptions,
    ) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(action, output)
        }
    }

    fn format_human_readable(&self, action: &CardsAction, output: &CardsOutput) -> String {
        if !output.success {
            return format!(
                "Failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();
        if let Some(message) = &output.message {
            lines.push(message.clone());
        }

        match action {
            CardsAction::List => {
                if output.cards.is_empty() {
                    lines.push("No flashcards yet. Add one with 'lexicard cards add'.".to_string());
                }
                for card in &output.cards {
                    lines.push(format!("[{}] {} - {}", card.id, card.word, card.meaning));
                    lines.push(format!("    {}", card.example));
                }
            }
            CardsAction::Add { .. } | CardsAction::Delete { .. } => {
                for card in &output.cards {
                    lines.push(format!("  [{}] {}", card.id, card.word));
                }
            }
            _ => match &output.current {
                None => lines.push("No flashcards available. Add some cards first!".to_string()),
                Some(card) => {
                    lines.push(format!("Card {}", output.counter));
                    if output.flipped {
                        lines.push(format!("  Meaning: {}", card.meaning));
                        lines.push(format!("  Example: {}", card.example));
                    } else {
                        lines.push(format!("  {}", card.word));
                    }
                }
            },
        }

        lines.join("\n")
    }
}

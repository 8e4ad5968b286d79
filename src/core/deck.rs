//! The card store.
//!
//! An ordered collection of flashcards with a cursor into whichever ordering
//! is active: the canonical insertion order, or a shuffled permutation of it.
//!
//! Cursor invariant: `cursor < len()` whenever the store is non-empty, and
//! `cursor == 0` when it is empty. Every mutating operation re-establishes it.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::card::{CardDraft, CardId, Flashcard};
use crate::error::Result;

/// Ordered card collection with an optional shuffled view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deck {
    cards: Vec<Flashcard>,
    /// Shuffled permutation of card ids, present while shuffle mode is on.
    shuffled: Option<Vec<CardId>>,
    cursor: usize,
    /// Whether the current card shows its back face.
    flipped: bool,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a deck from persisted cards.
    ///
    /// Duplicate ids are regenerated and the cursor is clamped into range.
    pub fn from_cards(cards: Vec<Flashcard>, cursor: usize) -> Self {
        let mut seen = HashSet::new();
        let cards: Vec<Flashcard> = cards
            .into_iter()
            .map(|mut card| {
                if !seen.insert(card.id.clone()) {
                    let fresh = CardId::generate();
                    tracing::warn!(old = %card.id, new = %fresh, "duplicate card id on load, regenerated");
                    seen.insert(fresh.clone());
                    card.id = fresh;
                }
                card
            })
            .collect();

        let mut deck = Self {
            cards,
            shuffled: None,
            cursor: 0,
            flipped: false,
        };
        deck.set_cursor(cursor);
        deck
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards in canonical (insertion) order.
    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn get(&self, id: &CardId) -> Option<&Flashcard> {
        self.cards.iter().find(|c| &c.id == id)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled.is_some()
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Move the cursor, clamping out-of-range positions to 0.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = if cursor < self.cards.len() { cursor } else { 0 };
        self.flipped = false;
    }

    /// The card under the cursor in the active ordering.
    pub fn current(&self) -> Option<&Flashcard> {
        match &self.shuffled {
            Some(order) => order.get(self.cursor).and_then(|id| self.get(id)),
            None => self.cards.get(self.cursor),
        }
    }

    /// Position counter for display, e.g. `(3, 10)`. `(0, 0)` when empty.
    pub fn counter(&self) -> (usize, usize) {
        if self.cards.is_empty() {
            (0, 0)
        } else {
            (self.cursor + 1, self.cards.len())
        }
    }

    /// Whether next/previous would move to a different card.
    pub fn can_navigate(&self) -> bool {
        self.cards.len() > 1
    }

    /// Validate a draft and append it with a fresh id.
    pub fn add(&mut self, draft: CardDraft) -> Result<&Flashcard> {
        let draft = draft.normalized()?;
        let card = draft.into_card(CardId::generate());
        tracing::debug!(id = %card.id, word = %card.word, "card added");

        if let Some(order) = self.shuffled.as_mut() {
            order.push(card.id.clone());
        }
        self.cards.push(card);
        if self.cards.len() == 1 {
            self.cursor = 0;
            self.flipped = false;
        }

        Ok(&self.cards[self.cards.len() - 1])
    }

    /// Remove a card from both orderings. Absent ids are a no-op.
    ///
    /// The cursor keeps pointing at the same card when an earlier card is
    /// removed; when the cursored card itself goes, the cursor moves onto its
    /// successor, or onto the new last card if it was at the end.
    pub fn delete(&mut self, id: &CardId) -> Option<Flashcard> {
        let canonical_pos = self.cards.iter().position(|c| &c.id == id)?;
        let active_pos = match &self.shuffled {
            Some(order) => order.iter().position(|o| o == id),
            None => Some(canonical_pos),
        };

        let removed = self.cards.remove(canonical_pos);
        if let Some(order) = self.shuffled.as_mut() {
            order.retain(|o| o != id);
        }

        if let Some(pos) = active_pos {
            if pos < self.cursor {
                self.cursor -= 1;
            } else if pos == self.cursor {
                self.flipped = false;
            }
        }
        if self.cards.is_empty() {
            self.cursor = 0;
        } else if self.cursor >= self.cards.len() {
            self.cursor = self.cards.len() - 1;
        }

        tracing::debug!(id = %removed.id, "card deleted");
        Some(removed)
    }

    /// Turn shuffle mode on or off. Resets the cursor either way.
    ///
    /// Enabling computes a uniform random permutation (Fisher-Yates).
    pub fn set_shuffle<R: Rng + ?Sized>(&mut self, enabled: bool, rng: &mut R) {
        if enabled {
            let mut order: Vec<CardId> = self.cards.iter().map(|c| c.id.clone()).collect();
            order.shuffle(rng);
            self.shuffled = Some(order);
        } else {
            self.shuffled = None;
        }
        self.cursor = 0;
        self.flipped = false;
    }

    /// Advance the cursor, wrapping from the last card to the first.
    pub fn next(&mut self) {
        if self.cards.is_empty() {
            return;
        }
        self.cursor = (self.cursor + 1) % self.cards.len();
        self.flipped = false;
    }

    /// Retreat the cursor, wrapping from the first card to the last.
    pub fn previous(&mut self) {
        if self.cards.is_empty() {
            return;
        }
        self.cursor = if self.cursor == 0 {
            self.cards.len() - 1
        } else {
            self.cursor - 1
        };
        self.flipped = false;
    }

    /// Toggle the current card's face. Returns `true` when the card was turned
    /// back to its front, which is what counts as having studied it.
    pub fn flip(&mut self) -> bool {
        if self.cards.is_empty() {
            return false;
        }
        self.flipped = !self.flipped;
        !self.flipped
    }

    /// Bulk append. Drafts keep their id hint unless it is missing or already
    /// taken; existing cards are never removed.
    ///
    /// All drafts are validated before any is appended.
    pub fn replace_all(&mut self, drafts: Vec<CardDraft>) -> Result<Vec<CardId>> {
        let drafts = drafts
            .into_iter()
            .map(CardDraft::normalized)
            .collect::<Result<Vec<_>>>()?;

        let mut taken: HashSet<CardId> = self.cards.iter().map(|c| c.id.clone()).collect();
        let mut added = Vec::with_capacity(drafts.len());

        for mut draft in drafts {
            let id = match draft.id.take() {
                Some(hint) if !taken.contains(&hint) => hint,
                _ => CardId::generate(),
            };
            taken.insert(id.clone());
            if let Some(order) = self.shuffled.as_mut() {
                order.push(id.clone());
            }
            added.push(id.clone());
            self.cards.push(draft.into_card(id));
        }

        tracing::info!(count = added.len(), "cards appended");
        Ok(added)
    }

    /// Remove every card and reset the cursor.
    pub fn clear(&mut self) {
        self.cards.clear();
        if let Some(order) = self.shuffled.as_mut() {
            order.clear();
        }
        self.cursor = 0;
        self.flipped = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexiError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn deck_with(words: &[&str]) -> Deck {
        let mut deck = Deck::new();
        for w in words {
            deck.add(CardDraft::new(*w, format!("meaning of {w}"), format!("A {w} here.")))
                .unwrap();
        }
        deck
    }

    fn current_word(deck: &Deck) -> &str {
        deck.current().map(|c| c.word.as_str()).unwrap_or("")
    }

    #[test]
    fn test_add_first_card_sets_cursor() {
        let mut deck = Deck::new();
        let card = deck.add(CardDraft::new("cat", "قطة", "The cat sat.")).unwrap();
        assert_eq!(card.word, "cat");
        assert_eq!(deck.len(), 1);
        assert_eq!(deck.cursor(), 0);
        assert_eq!(current_word(&deck), "cat");
    }

    #[test]
    fn test_add_rejects_empty_fields() {
        let mut deck = Deck::new();
        let err = deck.add(CardDraft::new("cat", "  ", "x")).unwrap_err();
        assert!(matches!(err, LexiError::Validation { .. }));
        assert!(deck.is_empty());
    }

    #[test]
    fn test_add_appends_to_end() {
        let deck = deck_with(&["a", "b", "c"]);
        let words: Vec<&str> = deck.cards().iter().map(|c| c.word.as_str()).collect();
        assert_eq!(words, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_next_and_previous_wrap() {
        let mut deck = deck_with(&["a", "b", "c"]);
        deck.previous();
        assert_eq!(deck.cursor(), 2);
        deck.next();
        assert_eq!(deck.cursor(), 0);
        deck.next();
        deck.next();
        assert_eq!(current_word(&deck), "c");
    }

    #[test]
    fn test_navigation_on_empty_is_noop() {
        let mut deck = Deck::new();
        deck.next();
        deck.previous();
        assert_eq!(deck.cursor(), 0);
        assert!(deck.current().is_none());
        assert_eq!(deck.counter(), (0, 0));
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let mut deck = deck_with(&["a", "b"]);
        assert!(deck.delete(&CardId::new("missing")).is_none());
        assert_eq!(deck.len(), 2);
    }

    #[test]
    fn test_delete_last_cursored_card_clamps() {
        let mut deck = deck_with(&["a", "b", "c"]);
        deck.previous(); // cursor on "c"
        let id = deck.current().unwrap().id.clone();
        deck.delete(&id);
        assert_eq!(deck.cursor(), 1);
        assert_eq!(current_word(&deck), "b");
    }

    #[test]
    fn test_delete_cursored_card_moves_to_successor() {
        let mut deck = deck_with(&["a", "b", "c"]);
        deck.next(); // "b"
        let id = deck.current().unwrap().id.clone();
        deck.delete(&id);
        assert_eq!(current_word(&deck), "c");
    }

    #[test]
    fn test_delete_earlier_card_keeps_current() {
        let mut deck = deck_with(&["a", "b", "c"]);
        deck.next();
        deck.next(); // "c"
        let first = deck.cards()[0].id.clone();
        deck.delete(&first);
        assert_eq!(current_word(&deck), "c");
        assert_eq!(deck.cursor(), 1);
    }

    #[test]
    fn test_delete_only_card_resets_cursor() {
        let mut deck = deck_with(&["a"]);
        let id = deck.cards()[0].id.clone();
        deck.delete(&id);
        assert!(deck.is_empty());
        assert_eq!(deck.cursor(), 0);
    }

    #[test]
    fn test_shuffle_is_permutation_and_resets_cursor() {
        let mut deck = deck_with(&["a", "b", "c", "d", "e"]);
        deck.next();
        let mut rng = StdRng::seed_from_u64(7);
        deck.set_shuffle(true, &mut rng);
        assert!(deck.is_shuffled());
        assert_eq!(deck.cursor(), 0);

        let mut seen = Vec::new();
        for _ in 0..deck.len() {
            seen.push(current_word(&deck).to_string());
            deck.next();
        }
        seen.sort();
        assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);

        deck.set_shuffle(false, &mut rng);
        assert!(!deck.is_shuffled());
        assert_eq!(current_word(&deck), "a");
    }

    #[test]
    fn test_delete_in_shuffle_mode_removes_from_both() {
        let mut deck = deck_with(&["a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(1);
        deck.set_shuffle(true, &mut rng);
        let id = deck.current().unwrap().id.clone();
        deck.delete(&id);
        assert_eq!(deck.len(), 2);
        for _ in 0..4 {
            assert_ne!(deck.current().unwrap().id, id);
            deck.next();
        }
    }

    #[test]
    fn test_add_in_shuffle_mode_is_reachable() {
        let mut deck = deck_with(&["a", "b"]);
        let mut rng = StdRng::seed_from_u64(3);
        deck.set_shuffle(true, &mut rng);
        deck.add(CardDraft::new("z", "m", "z z")).unwrap();
        let reached = (0..deck.len()).any(|_| {
            let hit = current_word(&deck) == "z";
            deck.next();
            hit
        });
        assert!(reached);
    }

    #[test]
    fn test_flip_counts_on_return_to_front() {
        let mut deck = deck_with(&["a"]);
        assert!(!deck.flip());
        assert!(deck.is_flipped());
        assert!(deck.flip());
        assert!(!deck.is_flipped());
    }

    #[test]
    fn test_navigation_resets_flip() {
        let mut deck = deck_with(&["a", "b"]);
        deck.flip();
        deck.next();
        assert!(!deck.is_flipped());
    }

    #[test]
    fn test_replace_all_appends_with_unique_ids() {
        let mut deck = deck_with(&["a", "b", "c"]);
        let original: Vec<CardId> = deck.cards().iter().map(|c| c.id.clone()).collect();
        let colliding = original[0].clone();

        let added = deck
            .replace_all(vec![
                CardDraft::new("d", "m", "d d").with_id(colliding.clone()),
                CardDraft::new("e", "m", "e e"),
            ])
            .unwrap();

        assert_eq!(deck.len(), 5);
        assert_eq!(added.len(), 2);
        for id in &original {
            assert!(deck.get(id).is_some());
        }
        assert!(!added.contains(&colliding));
        let unique: HashSet<&CardId> = deck.cards().iter().map(|c| &c.id).collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_replace_all_keeps_free_id_hint() {
        let mut deck = Deck::new();
        let added = deck
            .replace_all(vec![CardDraft::new("a", "m", "a").with_id(CardId::new("42"))])
            .unwrap();
        assert_eq!(added, vec![CardId::new("42")]);
    }

    #[test]
    fn test_replace_all_is_all_or_nothing() {
        let mut deck = deck_with(&["a"]);
        let result = deck.replace_all(vec![
            CardDraft::new("b", "m", "b"),
            CardDraft::new("", "m", "c"),
        ]);
        assert!(result.is_err());
        assert_eq!(deck.len(), 1);
    }

    #[test]
    fn test_can_navigate() {
        let mut deck = Deck::new();
        assert!(!deck.can_navigate());
        deck.add(CardDraft::new("cat", "m", "e")).unwrap();
        assert!(!deck.can_navigate());
        deck.add(CardDraft::new("dog", "m", "e")).unwrap();
        assert!(deck.can_navigate());
    }

    #[test]
    fn test_clear() {
        let mut deck = deck_with(&["a", "b"]);
        deck.next();
        deck.clear();
        assert!(deck.is_empty());
        assert_eq!(deck.cursor(), 0);
    }

    #[test]
    fn test_from_cards_clamps_cursor_and_dedupes() {
        let cards = vec![
            CardDraft::new("a", "m", "a").into_card(CardId::new("1")),
            CardDraft::new("b", "m", "b").into_card(CardId::new("1")),
        ];
        let deck = Deck::from_cards(cards, 9);
        assert_eq!(deck.cursor(), 0);
        assert_ne!(deck.cards()[0].id, deck.cards()[1].id);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add,
            DeleteCurrent,
            DeleteFirst,
            Next,
            Previous,
            Shuffle(bool),
            Clear,
        }

        fn arb_op() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => Just(Op::Add),
                2 => Just(Op::DeleteCurrent),
                1 => Just(Op::DeleteFirst),
                2 => Just(Op::Next),
                2 => Just(Op::Previous),
                1 => any::<bool>().prop_map(Op::Shuffle),
                1 => Just(Op::Clear),
            ]
        }

        proptest! {
            // Property: cursor stays in range after any operation sequence
            #[test]
            fn prop_cursor_always_in_range(ops in prop::collection::vec(arb_op(), 0..60), seed in any::<u64>()) {
                let mut deck = Deck::new();
                let mut rng = StdRng::seed_from_u64(seed);
                for (i, op) in ops.into_iter().enumerate() {
                    match op {
                        Op::Add => {
                            deck.add(CardDraft::new(format!("w{i}"), "m", "e")).unwrap();
                        }
                        Op::DeleteCurrent => {
                            if let Some(id) = deck.current().map(|c| c.id.clone()) {
                                deck.delete(&id);
                            }
                        }
                        Op::DeleteFirst => {
                            if let Some(id) = deck.cards().first().map(|c| c.id.clone()) {
                                deck.delete(&id);
                            }
                        }
                        Op::Next => deck.next(),
                        Op::Previous => deck.previous(),
                        Op::Shuffle(on) => deck.set_shuffle(on, &mut rng),
                        Op::Clear => deck.clear(),
                    }
                    if deck.is_empty() {
                        prop_assert_eq!(deck.cursor(), 0);
                        prop_assert!(deck.current().is_none());
                    } else {
                        prop_assert!(deck.cursor() < deck.len());
                        prop_assert!(deck.current().is_some());
                    }
                }
            }

            // Property: next then previous (and vice versa) is the identity
            #[test]
            fn prop_next_previous_inverse(size in 1usize..20, steps in 0usize..40) {
                let mut deck = Deck::new();
                for i in 0..size {
                    deck.add(CardDraft::new(format!("w{i}"), "m", "e")).unwrap();
                }
                for _ in 0..steps {
                    deck.next();
                }
                let start = deck.cursor();
                deck.next();
                deck.previous();
                prop_assert_eq!(deck.cursor(), start);
                deck.previous();
                deck.next();
                prop_assert_eq!(deck.cursor(), start);
            }
        }
    }
}

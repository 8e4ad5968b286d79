//! Question payload derivation for the practice modes.
//!
//! Pure functions over cards plus an injected random source, so that every
//! mode can be driven deterministically in tests.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::config::{FillBlankPolicy, PracticeConfig};
use crate::core::card::Flashcard;
use crate::core::ledger::PracticeMode;

/// Number of options shown in a multiple-choice question.
pub const CHOICE_COUNT: usize = 4;

/// Mode-specific material shown to the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Payload {
    /// Type the word for the meaning.
    Typing { meaning: String },
    /// Hear the word, type it. The meaning is shown as a hint.
    Listening { meaning: String },
    /// Pick the word for the meaning among the options.
    MultipleChoice { meaning: String, options: Vec<String> },
    /// Complete the example sentence. `blanked` is false when the word did
    /// not occur in the sentence and it is shown as-is.
    FillBlank { sentence: String, blanked: bool },
    /// Unscramble the letters into the word for the meaning.
    Scramble { meaning: String, letters: String },
}

/// One question: the targeted card and its derived payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub mode: PracticeMode,
    pub card: Flashcard,
    pub payload: Payload,
}

impl Question {
    /// Derive a question for `card` in `mode`.
    pub fn build<R: Rng + ?Sized>(
        mode: PracticeMode,
        card: &Flashcard,
        all_cards: &[Flashcard],
        config: &PracticeConfig,
        rng: &mut R,
    ) -> Self {
        let payload = match mode {
            PracticeMode::Typing => Payload::Typing {
                meaning: card.meaning.clone(),
            },
            PracticeMode::Listening => Payload::Listening {
                meaning: card.meaning.clone(),
            },
            PracticeMode::MultipleChoice => Payload::MultipleChoice {
                meaning: card.meaning.clone(),
                options: choice_options(card, all_cards, &config.filler_words, rng),
            },
            PracticeMode::FillBlank => {
                let (sentence, blanked) =
                    blank_sentence(&card.example, &card.word, &config.blank_marker);
                Payload::FillBlank { sentence, blanked }
            }
            PracticeMode::Scramble => Payload::Scramble {
                meaning: card.meaning.clone(),
                letters: scramble_word(&card.word, config.avoid_identity_scramble, rng),
            },
        };

        Self {
            mode,
            card: card.clone(),
            payload,
        }
    }

    /// The string a submitted answer is compared against.
    pub fn expected_answer(&self) -> &str {
        &self.card.word
    }

    /// Whether `input` answers the question (trimmed, case-insensitive).
    pub fn is_correct(&self, input: &str) -> bool {
        normalize_answer(input) == normalize_answer(self.expected_answer())
    }

    /// The prompt line for display.
    pub fn prompt(&self) -> String {
        match &self.payload {
            Payload::Typing { meaning } | Payload::MultipleChoice { meaning, .. } => {
                format!("What is the English word for: {}?", meaning)
            }
            Payload::Listening { meaning } => {
                format!("Listen and type the word for: {}", meaning)
            }
            Payload::FillBlank { sentence, .. } => format!("Complete the sentence: {}", sentence),
            Payload::Scramble { meaning, letters } => {
                format!("Unscramble the word for: {}\n    {}", meaning, letters)
            }
        }
    }

    /// Multiple-choice options, if this is a multiple-choice question.
    pub fn options(&self) -> Option<&[String]> {
        match &self.payload {
            Payload::MultipleChoice { options, .. } => Some(options),
            _ => None,
        }
    }
}

/// Trim and lowercase an answer for comparison.
pub fn normalize_answer(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Cards eligible as targets in `mode` under the given policy.
pub fn eligible_targets<'a>(
    mode: PracticeMode,
    cards: &'a [Flashcard],
    policy: FillBlankPolicy,
) -> Vec<&'a Flashcard> {
    match (mode, policy) {
        (PracticeMode::FillBlank, FillBlankPolicy::Skip) => {
            cards.iter().filter(|c| c.word_in_example()).collect()
        }
        _ => cards.iter().collect(),
    }
}

/// Build exactly [`CHOICE_COUNT`] distinct options containing the target word.
///
/// Distractors are other cards' words drawn without replacement; when there
/// are not enough, filler words pad the set. Distinctness is case-insensitive.
pub fn choice_options<R: Rng + ?Sized>(
    target: &Flashcard,
    cards: &[Flashcard],
    fillers: &[String],
    rng: &mut R,
) -> Vec<String> {
    let mut options = vec![target.word.clone()];
    let mut seen: HashSet<String> = HashSet::from([normalize_answer(&target.word)]);

    let mut others: Vec<&Flashcard> = cards.iter().filter(|c| c.id != target.id).collect();
    others.shuffle(rng);
    for card in others {
        if options.len() == CHOICE_COUNT {
            break;
        }
        if seen.insert(normalize_answer(&card.word)) {
            options.push(card.word.clone());
        }
    }

    let mut pool: Vec<&String> = fillers.iter().collect();
    pool.shuffle(rng);
    for filler in pool {
        if options.len() == CHOICE_COUNT {
            break;
        }
        if !filler.trim().is_empty() && seen.insert(normalize_answer(filler)) {
            options.push(filler.clone());
        }
    }

    // Filler list exhausted by collisions or misconfiguration.
    let mut n = 1;
    while options.len() < CHOICE_COUNT {
        let placeholder = format!("option {}", n);
        if seen.insert(placeholder.clone()) {
            options.push(placeholder);
        }
        n += 1;
    }

    options.shuffle(rng);
    options
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn match_at(haystack: &[char], at: usize, needle: &[char]) -> bool {
    at + needle.len() <= haystack.len()
        && needle
            .iter()
            .zip(&haystack[at..])
            .all(|(n, h)| chars_eq_ignore_case(*n, *h))
}

/// Whether `needle` occurs in `haystack`, ignoring case.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let hay: Vec<char> = haystack.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return false;
    }
    (0..hay.len()).any(|i| match_at(&hay, i, &needle))
}

/// Replace every case-insensitive occurrence of `word` in `example` with
/// `marker`. Returns the sentence and whether anything was replaced.
pub fn blank_sentence(example: &str, word: &str, marker: &str) -> (String, bool) {
    let hay: Vec<char> = example.chars().collect();
    let needle: Vec<char> = word.chars().collect();
    if needle.is_empty() {
        return (example.to_string(), false);
    }

    let mut out = String::with_capacity(example.len());
    let mut replaced = false;
    let mut i = 0;
    while i < hay.len() {
        if match_at(&hay, i, &needle) {
            out.push_str(marker);
            replaced = true;
            i += needle.len();
        } else {
            out.push(hay[i]);
            i += 1;
        }
    }
    (out, replaced)
}

/// Shuffle the letters of `word` and uppercase them.
///
/// With `avoid_identity`, a shuffle that reproduces the original order is
/// rotated by one position, which always differs when the word has at least
/// two distinct letters.
pub fn scramble_word<R: Rng + ?Sized>(word: &str, avoid_identity: bool, rng: &mut R) -> String {
    let original: Vec<char> = word.chars().collect();
    let mut letters = original.clone();
    letters.shuffle(rng);

    if avoid_identity && letters == original {
        let distinct: HashSet<char> = original.iter().copied().collect();
        if distinct.len() > 1 {
            letters.rotate_left(1);
        }
    }

    letters.into_iter().flat_map(char::to_uppercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::card::{CardDraft, CardId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn card(id: &str, word: &str) -> Flashcard {
        CardDraft::new(word, format!("meaning of {word}"), format!("I like {word}."))
            .into_card(CardId::new(id))
    }

    fn fillers() -> Vec<String> {
        PracticeConfig::default().filler_words
    }

    fn lower_set(options: &[String]) -> HashSet<String> {
        options.iter().map(|o| normalize_answer(o)).collect()
    }

    #[test]
    fn test_blank_sentence_replaces_all_occurrences() {
        let (s, blanked) = blank_sentence("The cat sat.", "cat", "_____");
        assert_eq!(s, "The _____ sat.");
        assert!(blanked);

        let (s, _) = blank_sentence("Cat and CAT and cat", "cat", "__");
        assert_eq!(s, "__ and __ and __");
    }

    #[test]
    fn test_blank_sentence_without_match() {
        let (s, blanked) = blank_sentence("A dog barked.", "cat", "_____");
        assert_eq!(s, "A dog barked.");
        assert!(!blanked);
    }

    #[test]
    fn test_blank_sentence_treats_word_literally() {
        let (s, blanked) = blank_sentence("Use a.b here, not axb.", "a.b", "_");
        assert_eq!(s, "Use _ here, not axb.");
        assert!(blanked);
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("The Cat sat", "cAT"));
        assert!(!contains_ignore_case("The dog", "cat"));
        assert!(!contains_ignore_case("anything", ""));
    }

    #[test]
    fn test_choice_options_with_many_cards() {
        let cards: Vec<Flashcard> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .enumerate()
            .map(|(i, w)| card(&i.to_string(), w))
            .collect();
        let mut rng = StdRng::seed_from_u64(11);
        let options = choice_options(&cards[0], &cards, &fillers(), &mut rng);

        assert_eq!(options.len(), CHOICE_COUNT);
        assert!(options.contains(&"a".to_string()));
        assert_eq!(lower_set(&options).len(), CHOICE_COUNT);
        // Enough cards, so no filler words
        for o in &options {
            assert!(cards.iter().any(|c| &c.word == o));
        }
    }

    #[test]
    fn test_choice_options_single_card_padded() {
        let cards = vec![card("1", "hello")];
        let mut rng = StdRng::seed_from_u64(5);
        let options = choice_options(&cards[0], &cards, &fillers(), &mut rng);
        assert_eq!(options.len(), CHOICE_COUNT);
        assert_eq!(lower_set(&options).len(), CHOICE_COUNT);
        assert_eq!(options.iter().filter(|o| o.as_str() == "hello").count(), 1);
    }

    #[test]
    fn test_choice_options_dedupes_duplicate_words() {
        let cards = vec![card("1", "cat"), card("2", "Cat"), card("3", "dog")];
        let mut rng = StdRng::seed_from_u64(2);
        let options = choice_options(&cards[0], &cards, &fillers(), &mut rng);
        assert_eq!(lower_set(&options).len(), CHOICE_COUNT);
    }

    #[test]
    fn test_choice_options_with_no_fillers() {
        let cards = vec![card("1", "cat")];
        let mut rng = StdRng::seed_from_u64(2);
        let options = choice_options(&cards[0], &cards, &[], &mut rng);
        assert_eq!(options.len(), CHOICE_COUNT);
        assert_eq!(lower_set(&options).len(), CHOICE_COUNT);
    }

    #[test]
    fn test_scramble_avoids_identity() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..200 {
            let s = scramble_word("ab", true, &mut rng);
            assert_eq!(s, "BA");
        }
    }

    #[test]
    fn test_scramble_single_letter_and_repeats() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(scramble_word("a", true, &mut rng), "A");
        assert_eq!(scramble_word("aaa", true, &mut rng), "AAA");
        assert_eq!(scramble_word("", true, &mut rng), "");
    }

    #[test]
    fn test_eligible_targets_policy() {
        let cards = vec![
            CardDraft::new("cat", "m", "The cat sat.").into_card(CardId::new("1")),
            CardDraft::new("dog", "m", "No match here.").into_card(CardId::new("2")),
        ];
        let skip = eligible_targets(PracticeMode::FillBlank, &cards, FillBlankPolicy::Skip);
        assert_eq!(skip.len(), 1);
        assert_eq!(skip[0].word, "cat");

        let all = eligible_targets(PracticeMode::FillBlank, &cards, FillBlankPolicy::Unblanked);
        assert_eq!(all.len(), 2);

        let typing = eligible_targets(PracticeMode::Typing, &cards, FillBlankPolicy::Skip);
        assert_eq!(typing.len(), 2);
    }

    #[test]
    fn test_question_build_per_mode() {
        let cards = vec![CardDraft::new("cat", "قطة", "The cat sat.").into_card(CardId::new("1"))];
        let config = PracticeConfig::default();
        let mut rng = StdRng::seed_from_u64(9);

        let q = Question::build(PracticeMode::FillBlank, &cards[0], &cards, &config, &mut rng);
        assert_eq!(
            q.payload,
            Payload::FillBlank {
                sentence: "The _____ sat.".to_string(),
                blanked: true
            }
        );
        assert!(q.prompt().contains("The _____ sat."));

        let q = Question::build(PracticeMode::Typing, &cards[0], &cards, &config, &mut rng);
        assert!(q.prompt().contains("قطة"));
        assert!(q.options().is_none());

        let q = Question::build(PracticeMode::MultipleChoice, &cards[0], &cards, &config, &mut rng);
        assert_eq!(q.options().map(|o| o.len()), Some(CHOICE_COUNT));

        let q = Question::build(PracticeMode::Scramble, &cards[0], &cards, &config, &mut rng);
        match &q.payload {
            Payload::Scramble { letters, .. } => {
                assert_ne!(letters, "CAT");
                assert_eq!(letters.len(), 3);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_is_correct_normalizes() {
        let cards = vec![card("1", "Cat")];
        let mut rng = StdRng::seed_from_u64(1);
        let q = Question::build(
            PracticeMode::Typing,
            &cards[0],
            &cards,
            &PracticeConfig::default(),
            &mut rng,
        );
        assert!(q.is_correct("  cAt \n"));
        assert!(!q.is_correct("cats"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Property: option set is always 4 distinct strings including the word
            #[test]
            fn prop_choice_options_shape(
                words in prop::collection::vec("[a-z]{1,6}", 1..10),
                seed in any::<u64>(),
            ) {
                let cards: Vec<Flashcard> = words
                    .iter()
                    .enumerate()
                    .map(|(i, w)| card(&i.to_string(), w))
                    .collect();
                let mut rng = StdRng::seed_from_u64(seed);
                let options = choice_options(&cards[0], &cards, &fillers(), &mut rng);
                prop_assert_eq!(options.len(), CHOICE_COUNT);
                prop_assert_eq!(lower_set(&options).len(), CHOICE_COUNT);
                prop_assert!(options.contains(&cards[0].word));
            }

            // Property: scrambling preserves the letter multiset
            #[test]
            fn prop_scramble_preserves_letters(word in "[a-zA-Z]{2,12}", seed in any::<u64>()) {
                let mut rng = StdRng::seed_from_u64(seed);
                let scrambled = scramble_word(&word, true, &mut rng);
                let mut got: Vec<char> = scrambled.chars().collect();
                let mut want: Vec<char> = word.to_uppercase().chars().collect();
                got.sort_unstable();
                want.sort_unstable();
                prop_assert_eq!(got, want);
            }

            // Property: with two or more distinct letters the scramble differs
            #[test]
            fn prop_scramble_not_identity(word in "[a-z]{2,8}", seed in any::<u64>()) {
                let distinct: HashSet<char> = word.chars().collect();
                prop_assume!(distinct.len() > 1);
                let mut rng = StdRng::seed_from_u64(seed);
                prop_assert_ne!(scramble_word(&word, true, &mut rng), word.to_uppercase());
            }
        }
    }
}

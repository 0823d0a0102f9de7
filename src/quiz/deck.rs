use indexmap::IndexSet;
use rand::Rng;
use rand::seq::SliceRandom;

/// Active session words plus the words pending a retry.
///
/// `wrong` is always a subset of `active`.
#[derive(Clone, Debug, Default)]
pub struct QuestionDeck {
    active: IndexSet<String>,
    wrong: IndexSet<String>,
}

impl QuestionDeck {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            active: words.into_iter().map(Into::into).collect(),
            wrong: IndexSet::new(),
        }
    }

    /// Replace the retry set with `words`, keeping only words in the deck.
    /// Returns the words that were dropped.
    pub fn restore_wrong<I, S>(&mut self, words: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wrong.clear();
        let mut dropped = Vec::new();
        for word in words {
            let word = word.into();
            if self.active.contains(&word) {
                self.wrong.insert(word);
            } else {
                dropped.push(word);
            }
        }
        dropped
    }

    /// Words for the next round in uniformly random order: the retry set
    /// when it is non-empty, otherwise every active word.
    pub fn next_round_words<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        let source = if self.wrong.is_empty() {
            &self.active
        } else {
            &self.wrong
        };
        let mut words: Vec<String> = source.iter().cloned().collect();
        words.shuffle(rng);
        words
    }

    pub fn mark_correct(&mut self, word: &str) {
        self.wrong.shift_remove(word);
    }

    /// Queue `word` for retry. Words outside the deck are ignored and
    /// reported with `false`.
    pub fn mark_incorrect(&mut self, word: &str) -> bool {
        if !self.active.contains(word) {
            return false;
        }
        self.wrong.insert(word.to_string());
        true
    }

    pub fn has_pending_retries(&self) -> bool {
        !self.wrong.is_empty()
    }

    pub fn active_words(&self) -> &IndexSet<String> {
        &self.active
    }

    pub fn wrong_words(&self) -> &IndexSet<String> {
        &self.wrong
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn deck(words: &[&str]) -> QuestionDeck {
        QuestionDeck::new(words.iter().copied())
    }

    #[test]
    fn test_round_words_are_a_permutation() {
        let deck = deck(&["a", "b", "c", "d", "e"]);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut words = deck.next_round_words(&mut rng);
            assert_eq!(words.len(), 5);
            words.sort();
            assert_eq!(words, vec!["a", "b", "c", "d", "e"]);
        }
    }

    #[test]
    fn test_shuffle_is_roughly_uniform() {
        let deck = deck(&["a", "b", "c"]);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut seen: HashMap<Vec<String>, usize> = HashMap::new();
        let draws = 6000;
        for _ in 0..draws {
            *seen.entry(deck.next_round_words(&mut rng)).or_default() += 1;
        }
        // 3! orderings, each expected ~1000 times
        assert_eq!(seen.len(), 6);
        for count in seen.values() {
            assert!(
                (800..1200).contains(count),
                "ordering count {count} is far from uniform"
            );
        }
    }

    #[test]
    fn test_retry_set_takes_priority() {
        let mut deck = deck(&["a", "b", "c"]);
        deck.mark_incorrect("b");
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(deck.next_round_words(&mut rng), vec!["b"]);
    }

    #[test]
    fn test_mark_incorrect_is_idempotent() {
        let mut deck = deck(&["a", "b"]);
        assert!(deck.mark_incorrect("a"));
        assert!(deck.mark_incorrect("a"));
        assert_eq!(deck.wrong_words().len(), 1);
        assert!(deck.has_pending_retries());
    }

    #[test]
    fn test_mark_incorrect_rejects_unknown_word() {
        let mut deck = deck(&["a"]);
        assert!(!deck.mark_incorrect("zzz"));
        assert!(!deck.has_pending_retries());
    }

    #[test]
    fn test_mark_correct_clears_and_tolerates_absent() {
        let mut deck = deck(&["a", "b"]);
        deck.mark_incorrect("a");
        deck.mark_correct("b");
        deck.mark_correct("a");
        assert!(!deck.has_pending_retries());
    }

    #[test]
    fn test_empty_deck_yields_empty_round() {
        let deck = QuestionDeck::default();
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(deck.active_words().is_empty());
        assert!(deck.next_round_words(&mut rng).is_empty());
    }

    #[test]
    fn test_restore_wrong_drops_unknown_words() {
        let mut deck = deck(&["dog", "cat"]);
        let dropped = deck.restore_wrong(["dog", "ghost"]);
        assert_eq!(dropped, vec!["ghost".to_string()]);
        assert_eq!(deck.wrong_words().len(), 1);
        assert!(deck.wrong_words().contains("dog"));
    }
}

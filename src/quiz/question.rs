use indexmap::IndexSet;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::dictionary::Dictionary;
use crate::quiz::error::QuizError;
use crate::quiz::timer::QuestionId;

pub const CHOICE_COUNT: usize = 4;

/// One presented word with its shuffled answer options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub word: String,
    pub answer: String,
    pub choices: Vec<String>,
}

impl Question {
    /// Build a question for `word`: its translation plus up to three distinct
    /// wrong translations drawn without replacement, in random order.
    pub fn build<R: Rng + ?Sized>(
        id: QuestionId,
        word: &str,
        dictionary: &Dictionary,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        let answer = dictionary
            .translation(word)
            .ok_or_else(|| QuizError::MissingTranslation(word.to_string()))?;

        let pool: Vec<&str> = dictionary
            .translations()
            .filter(|t| *t != answer)
            .collect::<IndexSet<&str>>()
            .into_iter()
            .collect();

        let mut choices: Vec<String> = pool
            .choose_multiple(rng, CHOICE_COUNT - 1)
            .map(|t| t.to_string())
            .collect();
        choices.push(answer.to_string());
        choices.shuffle(rng);

        Ok(Self {
            id,
            word: word.to_string(),
            answer: answer.to_string(),
            choices,
        })
    }

    /// Whether the 1-based `choice` picks the right translation.
    pub fn is_correct(&self, choice: usize) -> bool {
        choice
            .checked_sub(1)
            .and_then(|i| self.choices.get(i))
            .is_some_and(|c| *c == self.answer)
    }

    pub fn answer_position(&self) -> usize {
        self.choices
            .iter()
            .position(|c| *c == self.answer)
            .map_or(0, |i| i + 1)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn dict() -> Dictionary {
        Dictionary::from_entries([
            ("a", "x"),
            ("b", "y"),
            ("c", "z"),
            ("d", "w"),
            ("e", "v"),
            ("f", "y"),
        ])
        .unwrap()
    }

    #[test]
    fn test_four_distinct_choices_with_one_answer() {
        let dict = dict();
        let mut rng = SmallRng::seed_from_u64(11);
        for i in 0..100 {
            let q = Question::build(QuestionId(i), "b", &dict, &mut rng).unwrap();
            assert_eq!(q.choices.len(), CHOICE_COUNT);
            let unique: IndexSet<&String> = q.choices.iter().collect();
            assert_eq!(unique.len(), CHOICE_COUNT);
            assert_eq!(q.choices.iter().filter(|c| **c == "y").count(), 1);
            assert!(q.is_correct(q.answer_position()));
        }
    }

    #[test]
    fn test_answer_position_varies() {
        let dict = dict();
        let mut rng = SmallRng::seed_from_u64(5);
        let positions: IndexSet<usize> = (0..200)
            .map(|i| {
                Question::build(QuestionId(i), "a", &dict, &mut rng)
                    .unwrap()
                    .answer_position()
            })
            .collect();
        assert_eq!(positions.len(), CHOICE_COUNT);
    }

    #[test]
    fn test_small_dictionary_offers_fewer_choices() {
        let dict = Dictionary::from_entries([("a", "x"), ("b", "y")]).unwrap();
        let mut rng = SmallRng::seed_from_u64(2);
        let q = Question::build(QuestionId(0), "a", &dict, &mut rng).unwrap();
        assert_eq!(q.choices.len(), 2);
        assert!(!q.is_correct(0));
        assert!(!q.is_correct(3));
    }

    #[test]
    fn test_missing_word_is_an_error() {
        let dict = dict();
        let mut rng = SmallRng::seed_from_u64(2);
        let err = Question::build(QuestionId(0), "nope", &dict, &mut rng).unwrap_err();
        assert!(matches!(err, QuizError::MissingTranslation(w) if w == "nope"));
    }
}

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use wordrush::dictionary::{DEFAULT_DICTIONARY, Dictionary};
use wordrush::quiz::deck::QuestionDeck;
use wordrush::quiz::question::Question;
use wordrush::quiz::timer::QuestionId;

fn bench_round_order(c: &mut Criterion) {
    let dict = Dictionary::load_bundled(DEFAULT_DICTIONARY).unwrap();
    let deck = QuestionDeck::new(dict.words());
    let mut rng = SmallRng::seed_from_u64(7);

    c.bench_function("next_round_words (bundled dictionary)", |b| {
        b.iter(|| deck.next_round_words(black_box(&mut rng)))
    });

    let mut retry_deck = QuestionDeck::new(dict.words());
    for word in dict.words().step_by(3) {
        retry_deck.mark_incorrect(word);
    }
    c.bench_function("next_round_words (retry round)", |b| {
        b.iter(|| retry_deck.next_round_words(black_box(&mut rng)))
    });
}

fn bench_question_build(c: &mut Criterion) {
    let dict = Dictionary::load_bundled(DEFAULT_DICTIONARY).unwrap();
    let words: Vec<String> = dict.words().map(String::from).collect();
    let mut rng = SmallRng::seed_from_u64(11);

    c.bench_function("Question::build (bundled dictionary)", |b| {
        let mut i = 0;
        b.iter(|| {
            let word = &words[i % words.len()];
            i += 1;
            Question::build(QuestionId(i as u64), black_box(word), &dict, &mut rng)
        })
    });
}

criterion_group!(benches, bench_round_order, bench_question_build);
criterion_main!(benches);

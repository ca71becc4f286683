use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::core::Corpus;
use crate::error::{Error, Result};
use crate::session::{Mode, SessionConfig};

/// Sentences drawn for a time-limited session.
pub const TIME_MODE_SENTENCES: usize = 5;

/// Builds target texts for new sessions from a fixed corpus.
#[derive(Debug)]
pub struct TextGenerator {
    corpus: Corpus,
    rng: StdRng,
}

impl TextGenerator {
    pub fn new(corpus: Corpus) -> Self {
        Self {
            corpus,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for reproducible time-mode texts.
    pub fn seeded(corpus: Corpus, seed: u64) -> Self {
        Self {
            corpus,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn generate(&mut self, config: &SessionConfig) -> Result<String> {
        let text = match config.mode {
            Mode::Words => leading_words(&self.corpus, config.length as usize),
            Mode::Time => self.random_sentences(TIME_MODE_SENTENCES),
        };

        if text.is_empty() {
            return Err(Error::EmptyTarget);
        }
        Ok(text)
    }

    fn random_sentences(&mut self, count: usize) -> String {
        (0..count)
            .filter_map(|_| self.corpus.sentences().choose(&mut self.rng))
            .join(" ")
    }
}

/// First `limit` words of the corpus in order, or the whole corpus when it
/// holds fewer words than requested.
pub fn leading_words(corpus: &Corpus, limit: usize) -> String {
    corpus
        .sentences()
        .iter()
        .flat_map(|s| s.split_whitespace())
        .take(limit)
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_corpus() -> Corpus {
        Corpus::new(
            "small",
            vec![
                "The quick brown fox jumps over the lazy dog.".to_string(),
                "A journey begins with a single step.".to_string(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_words_mode_takes_leading_words() {
        let mut generator = TextGenerator::seeded(small_corpus(), 1);
        let text = generator.generate(&SessionConfig::words(5).unwrap()).unwrap();

        assert_eq!(text, "The quick brown fox jumps");
    }

    #[test]
    fn test_words_mode_spans_sentences() {
        let mut generator = TextGenerator::seeded(small_corpus(), 1);
        let text = generator
            .generate(&SessionConfig::words(11).unwrap())
            .unwrap();

        assert_eq!(text, "The quick brown fox jumps over the lazy dog. A journey");
    }

    #[test]
    fn test_words_mode_exhausts_corpus() {
        let corpus = small_corpus();
        let total = corpus.word_count();
        let mut generator = TextGenerator::seeded(corpus, 1);
        let text = generator
            .generate(&SessionConfig::words(1000).unwrap())
            .unwrap();

        assert_eq!(text.split(' ').count(), total);
        assert!(text.ends_with("single step."));
    }

    #[test]
    fn test_builtin_words_mode() {
        let mut generator = TextGenerator::new(Corpus::builtin().unwrap());
        let text = generator.generate(&SessionConfig::words(50).unwrap()).unwrap();

        assert_eq!(text.split(' ').count(), 50);
        assert!(text.starts_with("The quick brown fox jumps over the lazy dog"));
    }

    #[test]
    fn test_time_mode_joins_five_sentences() {
        let corpus = Corpus::builtin().unwrap();
        let mut generator = TextGenerator::seeded(corpus.clone(), 42);
        let text = generator.generate(&SessionConfig::timed(30).unwrap()).unwrap();

        let sentence_ends = text.matches(". ").count() + 1;
        assert_eq!(sentence_ends, TIME_MODE_SENTENCES);
        assert!(text.ends_with('.'));
        assert!(!text.contains("  "));
    }

    #[test]
    fn test_time_mode_is_reproducible_with_seed() {
        let corpus = Corpus::builtin().unwrap();
        let config = SessionConfig::timed(30).unwrap();

        let a = TextGenerator::seeded(corpus.clone(), 7).generate(&config).unwrap();
        let b = TextGenerator::seeded(corpus, 7).generate(&config).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_single_sentence_corpus_repeats_with_replacement() {
        let corpus = Corpus::new("one", vec!["Hi there.".to_string()]).unwrap();
        let mut generator = TextGenerator::seeded(corpus, 3);
        let text = generator.generate(&SessionConfig::timed(15).unwrap()).unwrap();

        assert_eq!(text, "Hi there. Hi there. Hi there. Hi there. Hi there.");
    }
}

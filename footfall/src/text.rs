//! Markov-chain text synthesis for post and topic bodies.
//!
//! Simulated users need bodies of realistic, variable prose; a word-level
//! Markov model trained on a fixed corpus produces text that exercises the
//! target's parsing and storage paths without shipping a real dataset.

use std::collections::HashMap;

use rand::Rng;

use crate::error::GenerationExhausted;

/// Minimum length of a generated post body, in characters.
pub const MIN_BODY_LEN: usize = 800;

/// Word cap per sentence; keeps a corpus without terminal punctuation from
/// walking forever.
const MAX_SENTENCE_WORDS: usize = 64;

/// Sentence budget per passage. Past this the corpus is considered unable
/// to reach the requested length.
const MAX_PASSAGE_SENTENCES: usize = 10_000;

/// Order-2 Markov word model, trained once over a fixed corpus.
///
/// The model is immutable after [`learn`](Self::learn), so one instance can
/// be shared across workers (behind an `Arc`) without locking. Callers
/// bring their own [`Rng`], which keeps generation reproducible under a
/// fixed seed and independent of wall-clock time.
#[derive(Debug, Clone)]
pub struct TextGenerator {
    chain: HashMap<(String, String), Vec<String>>,
    starts: Vec<(String, String)>,
}

impl TextGenerator {
    /// Train on `corpus`. One-shot: there is no way to feed more text in
    /// afterwards.
    pub fn learn(corpus: &str) -> Self {
        let words: Vec<&str> = corpus.split_whitespace().collect();
        let mut chain: HashMap<(String, String), Vec<String>> = HashMap::new();
        let mut starts = Vec::new();

        for i in 0..words.len().saturating_sub(1) {
            let bigram = (words[i].to_owned(), words[i + 1].to_owned());
            if i == 0 || ends_sentence(words[i - 1]) {
                starts.push(bigram.clone());
            }
            if let Some(&next) = words.get(i + 2) {
                chain.entry(bigram).or_default().push(next.to_owned());
            }
        }

        Self { chain, starts }
    }

    /// One generated sentence. Length is not bounded below — it may be
    /// short or long — and a degenerate corpus yields an empty string.
    pub fn sentence<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        if self.starts.is_empty() {
            return String::new();
        }
        let (first, second) = self.starts[rng.random_range(0..self.starts.len())].clone();
        let mut words = vec![first, second];

        loop {
            let last = &words[words.len() - 1];
            if ends_sentence(last) || words.len() >= MAX_SENTENCE_WORDS {
                break;
            }
            let key = (words[words.len() - 2].clone(), last.clone());
            match self.chain.get(&key) {
                Some(next) if !next.is_empty() => {
                    words.push(next[rng.random_range(0..next.len())].clone());
                }
                _ => break,
            }
        }

        words.join(" ")
    }

    /// Accumulate newline-separated sentences until the passage is longer
    /// than `min_len`. Fails with [`GenerationExhausted`] instead of
    /// spinning when the corpus cannot get there within the sentence
    /// budget.
    pub fn passage<R: Rng + ?Sized>(
        &self,
        min_len: usize,
        rng: &mut R,
    ) -> Result<String, GenerationExhausted> {
        let mut out = String::new();
        for _ in 0..MAX_PASSAGE_SENTENCES {
            let sentence = self.sentence(rng);
            if !sentence.is_empty() {
                out.push_str(&sentence);
                out.push('\n');
            }
            if out.len() > min_len {
                return Ok(out);
            }
        }
        Err(GenerationExhausted {
            attempts: MAX_PASSAGE_SENTENCES,
            produced: out.len(),
            wanted: min_len,
        })
    }
}

fn ends_sentence(word: &str) -> bool {
    word.trim_end_matches(['"', '\'', ')', ']'])
        .ends_with(['.', '!', '?'])
}

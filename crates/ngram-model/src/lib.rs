//! Context-scoped bigram/trigram frequency model.
//!
//! An [`NGramModel`] is built fresh from one block of retrieved text and thrown
//! away after the generation call that needed it. It is never global: two
//! queries with different retrieval context get two different models.
//!
//! Punctuation (`. , ! ? ; :`) is split off into standalone words before
//! counting, so sentence boundaries show up as ordinary transitions and the
//! generator can end a sentence by sampling a `.`.

use std::collections::{BTreeMap, HashMap};

/// Punctuation marks that are tokenized as standalone words.
pub const PUNCTUATION: [char; 6] = ['.', ',', '!', '?', ';', ':'];

/// Words that end a sentence.
pub const SENTENCE_END: [&str; 3] = [".", "!", "?"];

/// Whether `word` is a sentence-ending punctuation mark.
#[inline]
pub fn is_sentence_end(word: &str) -> bool {
    SENTENCE_END.contains(&word)
}

/// Split text into words, isolating [`PUNCTUATION`] as separate words.
///
/// # Examples
///
/// ```
/// use ngram_model::split_words;
///
/// assert_eq!(split_words("Hi, there."), vec!["Hi", ",", "there", "."]);
/// ```
pub fn split_words(text: &str) -> Vec<String> {
    let mut spaced = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        if PUNCTUATION.contains(&c) {
            spaced.push(' ');
            spaced.push(c);
            spaced.push(' ');
        } else {
            spaced.push(c);
        }
    }
    spaced.split_whitespace().map(str::to_string).collect()
}

/// Observed follow-up counts for one n-gram context.
///
/// Candidates are kept in a `BTreeMap` so iteration order is stable, which
/// keeps seeded sampling reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<String, u32>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more occurrence of `word`.
    pub fn observe(&mut self, word: &str) {
        *self.counts.entry(word.to_string()).or_insert(0) += 1;
    }

    /// Raw count for `word` (0 if never observed).
    pub fn count(&self, word: &str) -> u32 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Number of distinct candidates.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| c as u64).sum()
    }

    /// Iterate `(candidate, count)` pairs in candidate order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(w, &c)| (w.as_str(), c))
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for (word, count) in iter {
            *table.counts.entry(word.into()).or_insert(0) += count;
        }
        table
    }
}

/// Bigram and trigram frequency tables plus the set of sentence starters.
#[derive(Debug, Clone, Default)]
pub struct NGramModel {
    word_count: usize,
    /// Keyed by the single preceding word.
    bigrams: HashMap<String, FrequencyTable>,
    /// Keyed by the two preceding words joined with one space.
    trigrams: HashMap<String, FrequencyTable>,
    /// Distinct starter words in first-seen order.
    starters: Vec<String>,
}

impl NGramModel {
    /// Build a model from one context string.
    ///
    /// For every position `i` with two words after it, counts the bigram
    /// `w[i] -> w[i+1]` and the trigram `w[i] w[i+1] -> w[i+2]`. `w[i]` is
    /// registered as a starter when it opens the text or follows `.`, `!` or
    /// `?`. If nothing qualifies, the first word becomes the only starter.
    pub fn build(context: &str) -> Self {
        let words = split_words(context);
        let mut model = NGramModel::default();

        for i in 0..words.len().saturating_sub(2) {
            let (w0, w1, w2) = (&words[i], &words[i + 1], &words[i + 2]);

            model.bigrams.entry(w0.clone()).or_default().observe(w1);
            model
                .trigrams
                .entry(trigram_key(w0, w1))
                .or_default()
                .observe(w2);

            if (i == 0 || is_sentence_end(&words[i - 1])) && !model.starters.contains(w0) {
                model.starters.push(w0.clone());
            }
        }

        if model.starters.is_empty()
            && let Some(first) = words.first()
        {
            model.starters.push(first.clone());
        }

        model.word_count = words.len();
        model
    }

    /// Follow-up table for a single preceding word.
    pub fn bigram(&self, word: &str) -> Option<&FrequencyTable> {
        self.bigrams.get(word)
    }

    /// Follow-up table for two preceding words.
    pub fn trigram(&self, previous: &str, current: &str) -> Option<&FrequencyTable> {
        self.trigrams.get(&trigram_key(previous, current))
    }

    pub fn starters(&self) -> &[String] {
        &self.starters
    }

    /// Whether the context contained no words at all.
    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }
}

fn trigram_key(previous: &str, current: &str) -> String {
    let mut key = String::with_capacity(previous.len() + current.len() + 1);
    key.push_str(previous);
    key.push(' ');
    key.push_str(current);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- split_words ---

    #[test]
    fn split_isolates_all_punctuation() {
        assert_eq!(
            split_words("a;b:c!d?e,f.g"),
            vec!["a", ";", "b", ":", "c", "!", "d", "?", "e", ",", "f", ".", "g"]
        );
    }

    #[test]
    fn split_drops_empty_words() {
        assert_eq!(split_words("  one   two  "), vec!["one", "two"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn split_keeps_case_and_apostrophes() {
        assert_eq!(split_words("Rust's Borrow"), vec!["Rust's", "Borrow"]);
    }

    // --- FrequencyTable ---

    #[test]
    fn table_observe_and_count() {
        let mut table = FrequencyTable::new();
        table.observe("cat");
        table.observe("cat");
        table.observe("dog");
        assert_eq!(table.count("cat"), 2);
        assert_eq!(table.count("dog"), 1);
        assert_eq!(table.count("eel"), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.total(), 3);
    }

    #[test]
    fn table_from_iter_merges_duplicates() {
        let table: FrequencyTable = [("a", 2), ("b", 1), ("a", 3)].into_iter().collect();
        assert_eq!(table.count("a"), 5);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn table_iterates_in_stable_order() {
        let table: FrequencyTable = [("pear", 1), ("apple", 1), ("fig", 1)].into_iter().collect();
        let order: Vec<&str> = table.iter().map(|(w, _)| w).collect();
        assert_eq!(order, vec!["apple", "fig", "pear"]);
    }

    // --- NGramModel ---

    #[test]
    fn build_counts_bigrams_and_trigrams() {
        let model = NGramModel::build("the cat sat on the cat mat");
        let after_the = model.bigram("the").unwrap();
        assert_eq!(after_the.count("cat"), 2);

        let after_the_cat = model.trigram("the", "cat").unwrap();
        assert_eq!(after_the_cat.count("sat"), 1);
        assert_eq!(after_the_cat.count("mat"), 1);
    }

    #[test]
    fn build_stops_two_before_the_end() {
        let model = NGramModel::build("a b c");
        assert_eq!(model.bigram("a").unwrap().count("b"), 1);
        // "b -> c" would need a third word after it.
        assert!(model.bigram("b").is_none());
        assert_eq!(model.trigram("a", "b").unwrap().count("c"), 1);
    }

    #[test]
    fn starters_follow_sentence_ends() {
        let model = NGramModel::build("Rust is fast. It is safe! Why not? Because.");
        assert_eq!(model.starters(), ["Rust", "It", "Why"]);
    }

    #[test]
    fn starters_are_distinct() {
        let model = NGramModel::build("Go now. Go later. Go never.");
        assert_eq!(model.starters(), ["Go"]);
    }

    #[test]
    fn starter_fallback_is_first_word() {
        let model = NGramModel::build("hello world");
        assert_eq!(model.starters(), ["hello"]);
        assert!(model.bigram("hello").is_none());
    }

    #[test]
    fn empty_context_builds_empty_model() {
        let model = NGramModel::build("   ");
        assert!(model.is_empty());
        assert!(model.starters().is_empty());
    }

    #[test]
    fn single_word_context_is_not_empty() {
        let model = NGramModel::build("hello");
        assert!(!model.is_empty());
        assert!(model.bigram("hello").is_none());
        assert_eq!(model.starters(), ["hello"]);
    }

    #[test]
    fn punctuation_participates_in_ngrams() {
        let model = NGramModel::build("one, two. three");
        assert_eq!(model.bigram("one").unwrap().count(","), 1);
        assert_eq!(model.trigram(",", "two").unwrap().count("."), 1);
    }

    #[test]
    fn sentence_end_detection() {
        assert!(is_sentence_end("."));
        assert!(is_sentence_end("!"));
        assert!(is_sentence_end("?"));
        assert!(!is_sentence_end(","));
        assert!(!is_sentence_end("end"));
    }
}

//! Guahh text generation: n-gram walk, output validation, and formatting.
//!
//! Generation turns a block of retrieved answer text into a new passage:
//!
//! 1. **Build** an [`NGramModel`] from the context.
//! 2. **Seed** with a sentence starter picked uniformly at random.
//! 3. **Walk**: at each step prefer the trigram table for the last two words,
//!    fall back to the bigram table for the last word, and stop at a dead end.
//!    Once at least [`MIN_WORDS_BEFORE_STOP`] words are out, a sentence-ending
//!    mark ends the walk.
//! 4. **Format**: join words, pull punctuation back onto the preceding word,
//!    capitalize the first letter.
//! 5. **Validate** with [`validate`]. A rejected passage is regenerated, up to
//!    [`MAX_ATTEMPTS`] attempts in total. The last attempt is returned even if
//!    imperfect, flagged as not accepted.

use std::collections::HashSet;

use ngram_model::{NGramModel, PUNCTUATION, is_sentence_end};
use rand::Rng;

pub use nucleus_sampler::Sampler;

/// Minimum words produced before a sentence end may stop the walk.
pub const MIN_WORDS_BEFORE_STOP: usize = 16;

/// Total generation attempts per call (first try plus one retry).
pub const MAX_ATTEMPTS: usize = 2;

/// Outputs shorter than this many characters are rejected.
pub const MIN_OUTPUT_CHARS: usize = 10;

/// Outputs with a lower distinct-word ratio are rejected as repetitive.
pub const MIN_UNIQUE_RATIO: f64 = 0.3;

/// Outputs more similar than this to a recent output are rejected.
pub const MAX_RECENT_SIMILARITY: f64 = 0.7;

/// Why the validator rejected a passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooShort,
    Repetitive,
    TooSimilar,
}

impl Rejection {
    pub fn reason(self) -> &'static str {
        match self {
            Rejection::TooShort => "output too short",
            Rejection::Repetitive => "output too repetitive",
            Rejection::TooSimilar => "output too similar to a recent response",
        }
    }
}

/// Jaccard index of the lowercase whitespace-separated word sets of `a` and `b`.
///
/// Two empty texts have similarity 0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let set_a = word_set(a);
    let set_b = word_set(b);
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    set_a.intersection(&set_b).count() as f64 / union as f64
}

fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Check a generated passage against the quality rules.
///
/// `recent` holds previously accepted outputs, newest last.
pub fn validate<'a>(
    text: &str,
    recent: impl IntoIterator<Item = &'a str>,
) -> Result<(), Rejection> {
    if text.chars().count() < MIN_OUTPUT_CHARS {
        return Err(Rejection::TooShort);
    }

    let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
    if words.is_empty() {
        return Err(Rejection::TooShort);
    }
    let distinct: HashSet<&str> = words.iter().map(String::as_str).collect();
    if (distinct.len() as f64 / words.len() as f64) < MIN_UNIQUE_RATIO {
        return Err(Rejection::Repetitive);
    }

    if recent
        .into_iter()
        .any(|prev| similarity(text, prev) > MAX_RECENT_SIMILARITY)
    {
        return Err(Rejection::TooSimilar);
    }

    Ok(())
}

/// Join words into display text.
///
/// Punctuation words attach to the word before them and the first character
/// is uppercased.
pub fn format_words(words: &[String]) -> String {
    let mut out = String::new();
    for word in words {
        let is_punct = {
            let mut chars = word.chars();
            matches!((chars.next(), chars.next()), (Some(c), None) if PUNCTUATION.contains(&c))
        };
        if !out.is_empty() && !is_punct {
            out.push(' ');
        }
        out.push_str(word);
    }
    capitalize_first(&out)
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Result of one [`Generator::generate`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    /// Whether the returned text passed validation.
    pub accepted: bool,
    /// Attempts made; 0 when the context had no words.
    pub attempts: usize,
    /// Rejection of the final attempt, if any.
    pub rejection: Option<Rejection>,
}

/// Drives model building, sampling and validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Generator {
    sampler: Sampler,
}

impl Generator {
    pub fn new(sampler: Sampler) -> Self {
        Generator { sampler }
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// Generate a passage of up to `target_len` sampled words from `context`.
    ///
    /// If the context holds no words it is returned unchanged with
    /// `attempts == 0`; callers are expected to guard against that case.
    pub fn generate<'a, R: Rng>(
        &self,
        context: &str,
        target_len: usize,
        recent: impl IntoIterator<Item = &'a str> + Clone,
        rng: &mut R,
    ) -> Generation {
        let model = NGramModel::build(context);
        if model.is_empty() {
            return Generation {
                text: context.to_string(),
                accepted: false,
                attempts: 0,
                rejection: None,
            };
        }

        let mut text = String::new();
        let mut rejection = None;
        for attempt in 1..=MAX_ATTEMPTS {
            text = self.walk(&model, target_len, rng);
            match validate(&text, recent.clone()) {
                Ok(()) => {
                    return Generation {
                        text,
                        accepted: true,
                        attempts: attempt,
                        rejection: None,
                    };
                }
                Err(r) => rejection = Some(r),
            }
        }

        Generation {
            text,
            accepted: false,
            attempts: MAX_ATTEMPTS,
            rejection,
        }
    }

    /// One unvalidated walk through `model`, formatted for display.
    pub fn walk<R: Rng>(&self, model: &NGramModel, target_len: usize, rng: &mut R) -> String {
        let starters = model.starters();
        if starters.is_empty() {
            return String::new();
        }

        let start = starters[rng.random_range(0..starters.len())].clone();
        let mut words = vec![start.clone()];
        let mut previous: Option<String> = None;
        let mut current = start;

        for _ in 0..target_len {
            let table = previous
                .as_deref()
                .and_then(|prev| model.trigram(prev, &current))
                .filter(|t| !t.is_empty())
                .or_else(|| model.bigram(&current).filter(|t| !t.is_empty()));

            // Dead end: neither context has been seen.
            let Some(table) = table else { break };
            let Some(next) = self.sampler.sample(table, rng) else {
                break;
            };

            words.push(next.clone());
            previous = Some(std::mem::replace(&mut current, next));

            if words.len() >= MIN_WORDS_BEFORE_STOP && is_sentence_end(&current) {
                break;
            }
        }

        format_words(&words)
    }
}

//! Guahh text normalization: index-term tokenization and query preprocessing.
//!
//! Two entry points:
//!
//! - [`tokenize`] turns arbitrary text into index terms (lowercase ASCII
//!   alphanumeric words longer than two characters). Both corpus questions and
//!   user queries go through it, so matching is symmetric.
//! - [`preprocess_query`] normalizes a raw query before any intent checks and
//!   expands a fixed set of abbreviations and contractions.
//!
//! This crate has no dependencies on other guahh crates. It is a pure text
//! processing utility that produces `Vec<String>` / `String`.

/// Tokens of this length or shorter are dropped as noise.
pub const MIN_TERM_LEN: usize = 3;

/// Whole-word expansions applied by [`preprocess_query`], in order.
pub const EXPANSIONS: &[(&str, &str)] = &[
    ("ai", "artificial intelligence"),
    ("what's", "what is"),
    ("who's", "who is"),
    ("how's", "how is"),
];

/// Tokenize text into index terms.
///
/// 1. Converts to lowercase.
/// 2. Drops every character outside `[a-z0-9]` and whitespace.
/// 3. Splits on whitespace.
/// 4. Discards tokens of length <= 2.
///
/// # Examples
///
/// ```
/// use guahh_tokenizer::tokenize;
///
/// assert_eq!(tokenize("AI is Great!!"), vec!["great"]);
/// assert_eq!(tokenize("What's Rust 2024?"), vec!["whats", "rust", "2024"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|tok| tok.len() >= MIN_TERM_LEN)
        .map(str::to_string)
        .collect()
}

/// Normalize a raw query: lowercase, trim, then expand [`EXPANSIONS`].
///
/// Expansion is whole-word only, so "ai" inside "said" or "maid" is left
/// untouched, while "ai?" or "(ai)" are expanded.
///
/// # Examples
///
/// ```
/// use guahh_tokenizer::preprocess_query;
///
/// assert_eq!(preprocess_query("  What's AI?  "), "what is artificial intelligence?");
/// ```
pub fn preprocess_query(text: &str) -> String {
    let mut query = text.trim().to_lowercase();
    for (word, replacement) in EXPANSIONS {
        query = replace_whole_word(&query, word, replacement);
    }
    query
}

/// Replace every whole-word occurrence of `word` in `text`.
///
/// A match is whole when the characters on either side (if any) are not
/// word characters (ASCII alphanumerics or apostrophe).
fn replace_whole_word(text: &str, word: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(word) {
        let end = pos + word.len();
        let before = rest[..pos].chars().next_back();
        let after = rest[end..].chars().next();

        out.push_str(&rest[..pos]);
        if !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char) {
            out.push_str(replacement);
        } else {
            out.push_str(word);
        }
        rest = &rest[end..];
    }

    out.push_str(rest);
    out
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '\''
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_short_tokens_and_punctuation() {
        assert_eq!(tokenize("AI is Great!!"), vec!["great"]);
    }

    #[test]
    fn lowercases_everything() {
        assert_eq!(tokenize("Rust LANGUAGE"), vec!["rust", "language"]);
    }

    #[test]
    fn strips_apostrophes_inside_words() {
        assert_eq!(tokenize("don't won't"), vec!["dont", "wont"]);
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(tokenize("year 1984 or 42"), vec!["year", "1984"]);
    }

    #[test]
    fn non_ascii_letters_are_removed() {
        // Accented letters are dropped, not transliterated.
        assert_eq!(tokenize("café naïve"), vec!["caf", "nave"]);
    }

    #[test]
    fn empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n").is_empty());
    }

    #[test]
    fn every_token_is_normalized() {
        let tokens = tokenize("Hello, World! The QUICK brown-fox #42 jumps_over 3rd");
        for tok in &tokens {
            assert!(tok.len() > 2, "too short: {tok}");
            assert!(
                tok.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()),
                "not normalized: {tok}"
            );
        }
        assert!(tokens.contains(&"brownfox".to_string()));
        assert!(tokens.contains(&"jumpsover".to_string()));
    }

    #[test]
    fn preprocess_trims_and_lowercases() {
        assert_eq!(preprocess_query("  Hello There  "), "hello there");
    }

    #[test]
    fn preprocess_expands_contractions() {
        assert_eq!(preprocess_query("What's up"), "what is up");
        assert_eq!(preprocess_query("who's there"), "who is there");
        assert_eq!(preprocess_query("how's it going"), "how is it going");
    }

    #[test]
    fn preprocess_expands_ai_as_whole_word() {
        assert_eq!(preprocess_query("ai"), "artificial intelligence");
        assert_eq!(
            preprocess_query("tell me about ai."),
            "tell me about artificial intelligence."
        );
    }

    #[test]
    fn preprocess_leaves_embedded_ai_alone() {
        assert_eq!(preprocess_query("she said aim"), "she said aim");
    }

    #[test]
    fn preprocess_does_not_drop_stopwords() {
        assert_eq!(preprocess_query("what is the time"), "what is the time");
    }
}

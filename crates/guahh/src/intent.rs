//! Query intent detection and response-mode selection.

use corpus_index::{CorpusIndex, DictionaryEntry};

use crate::config::EngineConfig;

/// Phrases that mark a query as being about the engine itself.
pub const META_PATTERNS: &[&str] = &[
    "who are you",
    "what are you",
    "your name",
    "what can you do",
    "who made you",
    "who created you",
    "introduce yourself",
    "about yourself",
];

/// Words that ask for a longer, composed answer.
pub const LONG_FORM_MARKERS: &[&str] = &[
    "write",
    "story",
    "essay",
    "article",
    "explain",
    "detail",
    "elaborate",
];

/// Whether a normalized query asks about the engine itself. Patterns match
/// whole words only, so "who made youtube" is not meta.
pub fn is_meta(query: &str) -> bool {
    META_PATTERNS.iter().any(|p| contains_phrase(query, p))
}

fn contains_phrase(text: &str, phrase: &str) -> bool {
    text.match_indices(phrase).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + phrase.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Whether a query asks for long-form output. Markers match anywhere, so
/// "explained" and "rewrite" count too.
pub fn is_long_form(query: &str) -> bool {
    let lowered = query.to_lowercase();
    LONG_FORM_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Reduce a query to ASCII letters and single spaces.
pub fn clean_for_dictionary(query: &str) -> String {
    let letters: String = query
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphabetic() {
                Some(c.to_ascii_lowercase())
            } else if c.is_whitespace() {
                Some(' ')
            } else {
                None
            }
        })
        .collect();
    letters.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Find a definition for the whole cleaned query or, failing that, its last
/// word.
pub fn find_definition<'a>(query: &str, index: &'a CorpusIndex) -> Option<&'a DictionaryEntry> {
    let cleaned = clean_for_dictionary(query);
    if cleaned.is_empty() {
        return None;
    }
    index.dictionary_lookup(&cleaned).or_else(|| {
        cleaned
            .rsplit(' ')
            .next()
            .filter(|last| *last != cleaned)
            .and_then(|last| index.dictionary_lookup(last))
    })
}

/// Render a definition as `**word** (pos): definition`.
pub fn format_definition(entry: &DictionaryEntry) -> String {
    format!(
        "**{}** ({}): {}",
        entry.word, entry.part_of_speech, entry.definition
    )
}

/// How to answer from local memory, given the best relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Nothing scored high enough to use.
    NoMatch,
    /// A weak match that is not worth building on.
    LowConfidence,
    /// Return the top entry's answer as-is.
    Verbatim,
    /// Generate `target_len` words from the top `context_size` answers.
    Generate {
        target_len: usize,
        context_size: usize,
    },
}

/// Pick the response mode for a top relevance score.
///
/// Scores below `min_score` are no match. A short-form query scoring above
/// `verbatim_threshold` gets the entry verbatim. Above `generate_threshold`,
/// or for any long-form query with a usable match, the engine generates.
/// Everything else is low confidence, including both `min_score` and
/// `generate_threshold` exactly.
pub fn choose_mode(top: f64, long_form: bool, config: &EngineConfig) -> ResponseMode {
    if top < config.min_score {
        return ResponseMode::NoMatch;
    }
    if top > config.verbatim_threshold && !long_form {
        return ResponseMode::Verbatim;
    }
    if top > config.generate_threshold || long_form {
        let (target_len, context_size) = if long_form {
            (config.long_form_length, config.long_form_context)
        } else {
            (config.standard_length, config.standard_context)
        };
        return ResponseMode::Generate {
            target_len,
            context_size,
        };
    }
    ResponseMode::LowConfidence
}

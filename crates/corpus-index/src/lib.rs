//! Static question/answer corpus with a dictionary lookup table.
//!
//! The index is built once from a load payload: a heterogeneous sequence of
//! [`Record`]s. Dictionary records are merged into a word-keyed table (last
//! write wins), every other record shape becomes one or more [`CorpusEntry`]
//! values whose question text is tokenized up front.
//!
//! Entries are immutable after construction. Document frequency is derived on
//! demand via [`document_frequency`] rather than stored, since the corpus never
//! changes within a session.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use guahh_tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One question/answer pair with its precomputed index terms.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusEntry {
    question: String,
    answer: String,
    tokens: Vec<String>,
}

impl CorpusEntry {
    /// Create an entry, tokenizing the question text.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        let question = question.into();
        let tokens = tokenize(&question);
        CorpusEntry {
            question,
            answer: answer.into(),
            tokens,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Index terms of the question, in order of appearance.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// A short dictionary definition, keyed by its lowercase word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub word: String,
    pub part_of_speech: String,
    pub definition: String,
}

/// Marker for dictionary records (`"type": "dict"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictTag {
    Dict,
}

/// One turn of a chat-style record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// A single load-payload record.
///
/// Deserialization is shape-based: the first variant whose fields are all
/// present wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    /// `{"type": "dict", "word": .., "pos": .., "def": ..}`
    Dict {
        #[serde(rename = "type")]
        kind: DictTag,
        word: String,
        pos: String,
        def: String,
    },
    /// `{"q": .., "a": ..}`
    Qa { q: String, a: String },
    /// `{"prompt": .., "completion": ..}`
    PromptCompletion { prompt: String, completion: String },
    /// `{"messages": [{"role": .., "content": ..}, ..]}`
    Conversation { messages: Vec<Message> },
}

impl Record {
    pub fn dict(word: impl Into<String>, pos: impl Into<String>, def: impl Into<String>) -> Self {
        Record::Dict {
            kind: DictTag::Dict,
            word: word.into(),
            pos: pos.into(),
            def: def.into(),
        }
    }

    pub fn qa(q: impl Into<String>, a: impl Into<String>) -> Self {
        Record::Qa {
            q: q.into(),
            a: a.into(),
        }
    }
}

/// Holds the loaded corpus entries and dictionary table.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    entries: Vec<CorpusEntry>,
    dictionary: HashMap<String, DictionaryEntry>,
}

impl CorpusIndex {
    /// Build an index from payload records. O(total corpus tokens).
    pub fn build(records: impl IntoIterator<Item = Record>) -> Self {
        let mut index = CorpusIndex::default();

        for record in records {
            match record {
                Record::Dict { word, pos, def, .. } => {
                    let key = word.trim().to_lowercase();
                    index.dictionary.insert(
                        key.clone(),
                        DictionaryEntry {
                            word: key,
                            part_of_speech: pos,
                            definition: def,
                        },
                    );
                }
                Record::Qa { q, a } => index.entries.push(CorpusEntry::new(q, a)),
                Record::PromptCompletion { prompt, completion } => {
                    index.entries.push(CorpusEntry::new(prompt, completion));
                }
                Record::Conversation { messages } => {
                    for pair in messages.windows(2) {
                        let (user, assistant) = (&pair[0], &pair[1]);
                        if user.role.eq_ignore_ascii_case("user")
                            && assistant.role.eq_ignore_ascii_case("assistant")
                        {
                            index
                                .entries
                                .push(CorpusEntry::new(&user.content, &assistant.content));
                        }
                    }
                }
            }
        }

        index
    }

    /// All corpus entries in load order.
    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// Look up a dictionary word (case-insensitive).
    pub fn dictionary_lookup(&self, word: &str) -> Option<&DictionaryEntry> {
        self.dictionary.get(&word.trim().to_lowercase())
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn dictionary_len(&self) -> usize {
        self.dictionary.len()
    }

    /// Whether the index holds neither entries nor definitions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.dictionary.is_empty()
    }
}

/// Count, for every term, how many entries contain it at least once.
pub fn document_frequency(entries: &[CorpusEntry]) -> HashMap<&str, usize> {
    let mut df: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        let mut seen: Vec<&str> = Vec::with_capacity(entry.tokens.len());
        for tok in &entry.tokens {
            if !seen.contains(&tok.as_str()) {
                seen.push(tok);
                *df.entry(tok).or_insert(0) += 1;
            }
        }
    }
    df
}

/// Errors raised while reading a payload file.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("failed to read payload {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `line` is 1-based for JSONL input and 0 for a JSON array document.
    #[error("malformed payload record at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported payload format {0:?} (expected .json or .jsonl)")]
    UnsupportedFormat(PathBuf),
}

/// Load payload records from a `.json` array file or a `.jsonl` file.
pub fn load_payload(path: &Path) -> Result<Vec<Record>, PayloadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let parse: fn(&str) -> Result<Vec<Record>, PayloadError> = match extension.as_deref() {
        Some("json") => parse_json,
        Some("jsonl") => parse_jsonl,
        _ => return Err(PayloadError::UnsupportedFormat(path.to_path_buf())),
    };

    let content = fs::read_to_string(path).map_err(|source| PayloadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content)
}

/// Parse a JSON document holding an array of records.
pub fn parse_json(content: &str) -> Result<Vec<Record>, PayloadError> {
    serde_json::from_str(content).map_err(|source| PayloadError::Json { line: 0, source })
}

/// Parse JSON Lines: one record per line, blank lines skipped.
pub fn parse_jsonl(content: &str) -> Result<Vec<Record>, PayloadError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| PayloadError::Json {
                line: idx + 1,
                source,
            })
        })
        .collect()
}

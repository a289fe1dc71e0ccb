//! External knowledge boundary.
//!
//! A [`KnowledgeSource`] answers a topic with a short summary, or nothing.
//! The engine wraps it in a [`CachedKnowledge`], which strips question
//! wording from the query, remembers successful lookups, and turns every
//! failure into "no answer" so the local pipeline can take over.

use std::future::Future;

use thiserror::Error;

use crate::cache::FifoCache;
use crate::log::{LogLevel, LogSink};

/// Question openers removed before a topic is looked up. Each must be
/// followed by whitespace or end the query.
pub const QUESTION_PREFIXES: &[&str] = &[
    "tell me about",
    "what are",
    "what is",
    "what's",
    "who was",
    "who is",
    "who's",
    "define",
    "explain",
];

/// Why a lookup produced no summary.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("knowledge source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed knowledge response: {0}")]
    Malformed(String),
}

/// Anything that can summarize a topic.
pub trait KnowledgeSource {
    /// Look up `topic`. `Ok(None)` means the source has nothing on it.
    fn lookup(
        &self,
        topic: &str,
    ) -> impl Future<Output = Result<Option<String>, KnowledgeError>> + Send;
}

/// A source that never knows anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKnowledge;

impl KnowledgeSource for NoKnowledge {
    async fn lookup(&self, _topic: &str) -> Result<Option<String>, KnowledgeError> {
        Ok(None)
    }
}

/// Reduce a question to the topic it asks about.
///
/// Lowercases, drops trailing `?`, `.` and `!`, and removes one leading
/// [question prefix](QUESTION_PREFIXES).
///
/// # Examples
///
/// ```
/// use guahh::strip_question_prefix;
///
/// assert_eq!(strip_question_prefix("What is Quantum Computing?"), "quantum computing");
/// assert_eq!(strip_question_prefix("rust"), "rust");
/// ```
pub fn strip_question_prefix(query: &str) -> String {
    let lowered = query.trim().to_lowercase();
    let trimmed = lowered.trim_end_matches(['?', '.', '!']).trim_end();

    for prefix in QUESTION_PREFIXES {
        if let Some(rest) = trimmed.strip_prefix(prefix)
            && (rest.is_empty() || rest.starts_with(char::is_whitespace))
        {
            return rest.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// A knowledge source behind a FIFO cache of successful lookups.
#[derive(Debug)]
pub struct CachedKnowledge<K> {
    source: K,
    /// Keyed by the raw query, valued by the summary.
    cache: FifoCache<String, String>,
}

impl<K: KnowledgeSource> CachedKnowledge<K> {
    pub fn new(source: K, capacity: usize) -> Self {
        CachedKnowledge {
            source,
            cache: FifoCache::new(capacity),
        }
    }

    /// Summary for `query`, or `None` when the source has nothing or fails.
    ///
    /// Failures are reported to `log` as warnings and are not cached, so the
    /// next call asks the source again.
    pub async fn lookup(&mut self, query: &str, log: &dyn LogSink) -> Option<String> {
        if let Some(summary) = self.cache.get(query) {
            log.log("Knowledge cache hit", LogLevel::Data);
            return Some(summary.clone());
        }

        let topic = strip_question_prefix(query);
        if topic.is_empty() {
            return None;
        }

        log.log(&format!("Looking up \"{topic}\""), LogLevel::Process);
        match self.source.lookup(&topic).await {
            Ok(Some(summary)) if !summary.trim().is_empty() => {
                self.cache.insert(query.to_string(), summary.clone());
                Some(summary)
            }
            Ok(_) => None,
            Err(err) => {
                log.log(&format!("Knowledge lookup failed: {err}"), LogLevel::Warning);
                None
            }
        }
    }

    pub fn source(&self) -> &K {
        &self.source
    }

    pub fn cache(&self) -> &FifoCache<String, String> {
        &self.cache
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

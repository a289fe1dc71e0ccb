//! Guahh answer engine: retrieval first, generation when retrieval is not
//! enough.
//!
//! This is the facade crate that wires the lower-level components together:
//! - [`guahh_tokenizer`]: query normalization and index terms
//! - [`corpus_index`]: payload records, corpus entries and the dictionary
//! - [`relevance`]: rarity-weighted overlap ranking
//! - [`guahh_gen`]: n-gram generation with nucleus sampling and validation
//!
//! An [`Engine`] answers a query by trying, in order: the session cache, the
//! engine's self-description for meta questions, the dictionary, an external
//! [`KnowledgeSource`], and finally the local corpus, where the top relevance
//! score decides between a verbatim answer, a generated one, or an honest
//! "don't know".
//!
//! # Quick Start
//!
//! ```
//! use guahh::{Engine, EngineConfig, NoKnowledge, Outcome, Record};
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! let mut engine = Engine::new(EngineConfig::default(), SmallRng::seed_from_u64(42), NoKnowledge);
//! engine.init(Some(vec![Record::qa(
//!     "what is rust",
//!     "Rust is a systems programming language focused on safety.",
//! )]));
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let answer = runtime.block_on(engine.answer("What is Rust?"));
//! assert_eq!(answer.outcome, Outcome::Verbatim);
//! println!("{}", answer.text);
//! ```

mod answer;
mod cache;
mod config;
mod history;
mod intent;
mod knowledge;
mod log;

use corpus_index::CorpusIndex;
use guahh_gen::{Generator, Sampler};
use guahh_tokenizer::{preprocess_query, tokenize};
use rand::Rng;

pub use answer::{
    Answer, IDENTITY_TEXT, LOW_CONFIDENCE_TEXT, NO_MATCH_TEXT, NOT_READY_TEXT, Outcome,
    Provenance, Sources,
};
pub use cache::{BoundedLog, FifoCache};
pub use config::{ConfigError, EngineConfig};
pub use corpus_index::{PayloadError, Record, load_payload};
pub use history::HistoryRecord;
pub use intent::{ResponseMode, choose_mode, is_long_form, is_meta};
pub use knowledge::{
    CachedKnowledge, KnowledgeError, KnowledgeSource, NoKnowledge, strip_question_prefix,
};
pub use log::{LogLevel, LogSink, NoopSink, TracingSink};

/// Generated text shorter than this falls back to the best match verbatim.
pub const MIN_GENERATED_CHARS: usize = 20;

/// Number of top relevance scores reported with a generated answer.
pub const REPORTED_SCORES: usize = 3;

/// The Guahh engine.
///
/// Generic over the PRNG `R`, so seeded runs are reproducible, and over the
/// external knowledge source `K`.
pub struct Engine<R: Rng, K: KnowledgeSource = NoKnowledge> {
    /// Thresholds, lengths and capacities.
    config: EngineConfig,
    /// Loaded corpus; `None` until [`Engine::init`] gets a payload.
    index: Option<CorpusIndex>,
    /// Sampling parameters for generated answers.
    generator: Generator,
    /// External lookups behind their own FIFO cache.
    knowledge: CachedKnowledge<K>,
    /// Normalized query to answer.
    session_cache: FifoCache<String, Answer>,
    /// Latest answer texts, used to reject near-repeat generations.
    recent_outputs: BoundedLog<String>,
    history: BoundedLog<HistoryRecord>,
    log: Box<dyn LogSink>,
    rng: R,
}

impl<R: Rng, K: KnowledgeSource> Engine<R, K> {
    /// Create an engine with no corpus loaded. Logs go to `tracing` until
    /// replaced with [`Engine::with_log_sink`].
    pub fn new(config: EngineConfig, rng: R, knowledge: K) -> Self {
        Engine {
            generator: Generator::new(Sampler::new(config.temperature, config.top_p)),
            knowledge: CachedKnowledge::new(knowledge, config.knowledge_cache_capacity),
            session_cache: FifoCache::new(config.session_cache_capacity),
            recent_outputs: BoundedLog::new(config.recent_outputs_capacity),
            history: BoundedLog::new(config.history_capacity),
            index: None,
            log: Box::new(TracingSink),
            config,
            rng,
        }
    }

    /// Replace the log sink.
    pub fn with_log_sink(mut self, sink: Box<dyn LogSink>) -> Self {
        self.log = sink;
        self
    }

    /// Load a payload, replacing any previous corpus and clearing session
    /// state. Returns `false` iff `payload` is `None`, which leaves the engine
    /// not ready. An empty payload is a valid, empty corpus.
    pub fn init(&mut self, payload: Option<Vec<Record>>) -> bool {
        self.clear_session();

        let Some(records) = payload else {
            self.index = None;
            self.log.log(
                "No payload supplied; memory not initialized",
                LogLevel::Error,
            );
            return false;
        };

        let index = CorpusIndex::build(records);
        self.log.log(
            &format!(
                "Memory loaded: {} entries, {} definitions",
                index.entry_count(),
                index.dictionary_len()
            ),
            LogLevel::Success,
        );
        self.index = Some(index);
        true
    }

    /// Answer a query. Never fails: every path ends in an [`Answer`], whose
    /// [`Outcome`] tells how it was reached.
    pub async fn answer(&mut self, query: &str) -> Answer {
        self.log.log(&format!("Query: {query}"), LogLevel::Input);

        // Step 1: nothing to answer from yet.
        if self.index.is_none() {
            self.log.log(
                "Query received before initialization",
                LogLevel::Warning,
            );
            return Answer::not_ready();
        }

        // Step 2: repeat queries come straight from the session cache.
        let normalized = preprocess_query(query);
        if let Some(cached) = self.session_cache.get(&normalized) {
            self.log.log("Session cache hit", LogLevel::Data);
            return cached.clone();
        }

        // Steps 3-6: first matching strategy wins.
        let answer = self.resolve(query, &normalized).await;

        // Step 7: remember everything except the fallback messages.
        if answer.outcome.is_cacheable() {
            self.remember(normalized, query, &answer);
            self.log.log(
                &format!("Answered via {:?}", answer.outcome),
                LogLevel::Success,
            );
        } else {
            self.log
                .log(&format!("No answer: {:?}", answer.outcome), LogLevel::Info);
        }
        answer
    }

    async fn resolve(&mut self, query: &str, normalized: &str) -> Answer {
        if is_meta(normalized) {
            return self.answer_meta(normalized);
        }
        if let Some(answer) = self.answer_definition(normalized) {
            return answer;
        }
        // The external source sees the raw query; its cache is keyed on it.
        if let Some(summary) = self.knowledge.lookup(query, &*self.log).await {
            self.log.log("Answered from external knowledge", LogLevel::Process);
            return Answer::tagged(summary, Provenance::External, Outcome::External);
        }
        self.answer_locally(normalized)
    }

    fn answer_meta(&self, normalized: &str) -> Answer {
        self.log.log("Meta query detected", LogLevel::Process);
        let tokens = tokenize(normalized);
        let top = self
            .index
            .as_ref()
            .and_then(|index| relevance::rank(&tokens, index.entries()).into_iter().next());

        match top {
            Some(hit) if hit.score > self.config.meta_threshold => Answer::tagged(
                hit.entry.answer(),
                Provenance::LocalMemory,
                Outcome::LocalMemory,
            ),
            _ => Answer::identity(),
        }
    }

    fn answer_definition(&self, normalized: &str) -> Option<Answer> {
        let entry = intent::find_definition(normalized, self.index.as_ref()?)?;
        self.log.log(
            &format!("Dictionary match: {}", entry.word),
            LogLevel::Process,
        );
        Some(Answer::tagged(
            intent::format_definition(entry),
            Provenance::Dictionary,
            Outcome::Dictionary,
        ))
    }

    fn answer_locally(&mut self, normalized: &str) -> Answer {
        let Some(index) = self.index.as_ref() else {
            return Answer::not_ready();
        };

        let tokens = tokenize(normalized);
        let ranked = relevance::rank(&tokens, index.entries());
        let Some(best) = ranked.first() else {
            return Answer::no_match();
        };

        let long_form = is_long_form(normalized);
        let mode = choose_mode(best.score, long_form, &self.config);
        self.log.log(
            &format!("Top score {:.3} of {} matches: {mode:?}", best.score, ranked.len()),
            LogLevel::Process,
        );

        match mode {
            ResponseMode::NoMatch => Answer::no_match(),
            ResponseMode::LowConfidence => Answer::low_confidence(),
            ResponseMode::Verbatim => Answer::tagged(
                best.entry.answer(),
                Provenance::LocalMemory,
                Outcome::Verbatim,
            ),
            ResponseMode::Generate {
                target_len,
                context_size,
            } => {
                let context = ranked
                    .iter()
                    .take(context_size)
                    .map(|s| s.entry.answer())
                    .collect::<Vec<_>>()
                    .join(" ");
                let scores: Vec<f64> = ranked
                    .iter()
                    .take(REPORTED_SCORES)
                    .map(|s| s.score)
                    .collect();

                let generation = self.generator.generate(
                    &context,
                    target_len,
                    self.recent_outputs.iter().map(String::as_str),
                    &mut self.rng,
                );

                if generation.accepted && generation.text.chars().count() >= MIN_GENERATED_CHARS {
                    Answer::scored(generation.text, scores, Outcome::Generated)
                } else {
                    let reason = generation.rejection.map_or("too short", |r| r.reason());
                    self.log.log(
                        &format!("Generation unusable ({reason}); using best match"),
                        LogLevel::Warning,
                    );
                    Answer::scored(best.entry.answer(), scores, Outcome::Verbatim)
                }
            }
        }
    }

    fn remember(&mut self, normalized: String, query: &str, answer: &Answer) {
        self.session_cache.insert(normalized, answer.clone());
        self.recent_outputs.push(answer.text.clone());
        self.history.push(HistoryRecord::now(query, answer.text.clone()));
    }

    /// Whether a payload has been loaded.
    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    /// The loaded corpus, if any.
    pub fn index(&self) -> Option<&CorpusIndex> {
        self.index.as_ref()
    }

    /// Answered exchanges, oldest first.
    pub fn history(&self) -> &BoundedLog<HistoryRecord> {
        &self.history
    }

    /// Texts of the latest answers, oldest first.
    pub fn recent_outputs(&self) -> &BoundedLog<String> {
        &self.recent_outputs
    }

    pub fn session_cache_len(&self) -> usize {
        self.session_cache.len()
    }

    /// Forget cached answers, recent outputs, history and cached lookups.
    /// The corpus stays loaded.
    pub fn clear_session(&mut self) {
        self.session_cache.clear();
        self.recent_outputs.clear();
        self.history.clear();
        self.knowledge.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn test_engine() -> Engine<SmallRng> {
        Engine::new(
            EngineConfig::default(),
            SmallRng::seed_from_u64(42),
            NoKnowledge,
        )
        .with_log_sink(Box::new(NoopSink))
    }

    fn rust_corpus() -> Vec<Record> {
        vec![
            Record::qa(
                "how does rust manage memory",
                "Rust manages memory through ownership. Every value has a single owner, \
                 and the value is dropped when the owner goes out of scope.",
            ),
            Record::qa(
                "what is ownership in rust",
                "Ownership is a set of rules that govern how a Rust program manages memory. \
                 The compiler checks these rules at compile time.",
            ),
            Record::qa(
                "what is the capital of france",
                "The capital of France is Paris.",
            ),
            Record::dict("banana", "noun", "a fruit"),
        ]
    }

    // --- lifecycle ---

    #[test]
    fn new_engine_is_not_ready() {
        let engine = test_engine();
        assert!(!engine.is_ready());
        assert!(engine.index().is_none());
    }

    #[test]
    fn init_without_payload_fails() {
        let mut engine = test_engine();
        assert!(!engine.init(None));
        assert!(!engine.is_ready());
    }

    #[test]
    fn init_with_empty_payload_is_ready() {
        let mut engine = test_engine();
        assert!(engine.init(Some(Vec::new())));
        assert!(engine.is_ready());
    }

    #[test]
    fn init_indexes_records() {
        let mut engine = test_engine();
        engine.init(Some(rust_corpus()));
        let index = engine.index().unwrap();
        assert_eq!(index.entry_count(), 3);
        assert_eq!(index.dictionary_len(), 1);
    }

    #[test]
    fn engine_uses_configured_sampling() {
        let config = EngineConfig {
            temperature: 1.3,
            top_p: 0.5,
            ..EngineConfig::default()
        };
        let engine: Engine<SmallRng> = Engine::new(config, SmallRng::seed_from_u64(1), NoKnowledge);
        assert_eq!(engine.generator.sampler().temperature(), 1.3);
        assert_eq!(engine.generator.sampler().top_p(), 0.5);
    }

    // --- answering ---

    #[tokio::test]
    async fn not_ready_answer_is_not_cached() {
        let mut engine = test_engine();
        let answer = engine.answer("hello").await;
        assert_eq!(answer.outcome, Outcome::NotReady);
        assert_eq!(answer.text, NOT_READY_TEXT);
        assert_eq!(engine.session_cache_len(), 0);
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn dictionary_answer() {
        let mut engine = test_engine();
        engine.init(Some(rust_corpus()));
        let answer = engine.answer("Banana").await;
        assert_eq!(answer.text, "**banana** (noun): a fruit");
        assert_eq!(answer.sources, Sources::Tags(vec![Provenance::Dictionary]));
    }

    #[tokio::test]
    async fn unrelated_query_has_no_match() {
        let mut engine = test_engine();
        engine.init(Some(rust_corpus()));
        let answer = engine.answer("zebra stripes").await;
        assert_eq!(answer.outcome, Outcome::NoMatch);
        assert_eq!(answer.text, NO_MATCH_TEXT);
        assert_eq!(engine.session_cache_len(), 0);
    }

    #[tokio::test]
    async fn moderate_match_generates_with_scores() {
        let mut engine = test_engine();
        engine.init(Some(rust_corpus()));
        let answer = engine.answer("rust memory").await;
        assert!(
            matches!(answer.outcome, Outcome::Generated | Outcome::Verbatim),
            "{:?}",
            answer.outcome
        );
        match &answer.sources {
            Sources::Scores(scores) => {
                assert!(!scores.is_empty() && scores.len() <= REPORTED_SCORES);
                assert!(scores.windows(2).all(|w| w[0] >= w[1]));
            }
            other => panic!("expected scores, got {other:?}"),
        }
        assert!(answer.text.chars().count() >= MIN_GENERATED_CHARS);
    }

    #[tokio::test]
    async fn answers_are_recorded() {
        let mut engine = test_engine();
        engine.init(Some(rust_corpus()));
        let answer = engine.answer("banana").await;
        assert_eq!(engine.session_cache_len(), 1);
        assert_eq!(engine.recent_outputs().latest(), Some(&answer.text));
        let record = engine.history().latest().unwrap();
        assert_eq!(record.query, "banana");
        assert_eq!(record.response, answer.text);
    }

    #[tokio::test]
    async fn clear_session_keeps_corpus() {
        let mut engine = test_engine();
        engine.init(Some(rust_corpus()));
        engine.answer("banana").await;
        engine.clear_session();
        assert_eq!(engine.session_cache_len(), 0);
        assert!(engine.history().is_empty());
        assert!(engine.recent_outputs().is_empty());
        assert!(engine.is_ready());
    }

    #[tokio::test]
    async fn reinit_clears_session() {
        let mut engine = test_engine();
        engine.init(Some(rust_corpus()));
        engine.answer("banana").await;
        assert!(engine.init(Some(Vec::new())));
        assert_eq!(engine.session_cache_len(), 0);
        let answer = engine.answer("banana").await;
        assert_eq!(answer.outcome, Outcome::NoMatch);
    }

    #[tokio::test]
    async fn same_seed_same_answers() {
        let run = || async {
            let mut engine = test_engine();
            engine.init(Some(rust_corpus()));
            let mut texts = Vec::new();
            for q in ["rust memory", "ownership rules", "explain rust memory"] {
                texts.push(engine.answer(q).await.text);
            }
            texts
        };
        assert_eq!(run().await, run().await);
    }
}

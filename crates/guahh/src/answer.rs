//! What a query produces.

use std::fmt;

use serde::Serialize;

/// Where a tagged answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Provenance {
    #[serde(rename = "Local Memory")]
    LocalMemory,
    #[serde(rename = "Dictionary")]
    Dictionary,
    #[serde(rename = "Wikipedia")]
    External,
    #[serde(rename = "Core Identity")]
    CoreIdentity,
}

impl Provenance {
    pub fn label(self) -> &'static str {
        match self {
            Provenance::LocalMemory => "Local Memory",
            Provenance::Dictionary => "Dictionary",
            Provenance::External => "Wikipedia",
            Provenance::CoreIdentity => "Core Identity",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Supporting evidence: provenance tags, or the relevance scores of the
/// entries a generated answer was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sources {
    Tags(Vec<Provenance>),
    Scores(Vec<f64>),
}

impl Sources {
    pub fn is_empty(&self) -> bool {
        match self {
            Sources::Tags(tags) => tags.is_empty(),
            Sources::Scores(scores) => scores.is_empty(),
        }
    }
}

impl fmt::Display for Sources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sources::Tags(tags) => {
                f.write_str("source: ")?;
                for (i, tag) in tags.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{tag}")?;
                }
            }
            Sources::Scores(scores) => {
                f.write_str("scores: ")?;
                for (i, score) in scores.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{score:.3}")?;
                }
            }
        }
        Ok(())
    }
}

/// Which path through the pipeline produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    NotReady,
    /// Meta query answered with the built-in description.
    Identity,
    /// Meta query answered from a strongly matching corpus entry.
    LocalMemory,
    Dictionary,
    External,
    /// Top entry returned as-is.
    Verbatim,
    Generated,
    NoMatch,
    LowConfidence,
}

impl Outcome {
    /// Whether answers with this outcome go into the session cache, the
    /// recent-output window and the history.
    pub fn is_cacheable(self) -> bool {
        !matches!(
            self,
            Outcome::NotReady | Outcome::NoMatch | Outcome::LowConfidence
        )
    }
}

/// Reply text plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    pub sources: Sources,
    pub outcome: Outcome,
}

/// Reply while no corpus has been loaded.
pub const NOT_READY_TEXT: &str = "My memory is not initialized yet. Load a corpus and ask again.";

/// Reply when nothing in memory relates to the query.
pub const NO_MATCH_TEXT: &str = "I don't have enough information about that yet.";

/// Reply when the best match is too weak to build on.
pub const LOW_CONFIDENCE_TEXT: &str =
    "I'm not confident I understood that. Could you rephrase it or add more detail?";

/// Built-in self-description for meta queries.
pub const IDENTITY_TEXT: &str = "I'm Guahh, a small question-answering engine. \
I answer from a local memory of questions, answers and word definitions, \
and I can write new text in the style of what I remember.";

impl Answer {
    pub fn tagged(text: impl Into<String>, tag: Provenance, outcome: Outcome) -> Self {
        Answer {
            text: text.into(),
            sources: Sources::Tags(vec![tag]),
            outcome,
        }
    }

    pub fn scored(text: impl Into<String>, scores: Vec<f64>, outcome: Outcome) -> Self {
        Answer {
            text: text.into(),
            sources: Sources::Scores(scores),
            outcome,
        }
    }

    fn untagged(text: &str, outcome: Outcome) -> Self {
        Answer {
            text: text.to_string(),
            sources: Sources::Tags(Vec::new()),
            outcome,
        }
    }

    pub fn not_ready() -> Self {
        Answer::untagged(NOT_READY_TEXT, Outcome::NotReady)
    }

    pub fn no_match() -> Self {
        Answer::untagged(NO_MATCH_TEXT, Outcome::NoMatch)
    }

    pub fn low_confidence() -> Self {
        Answer::untagged(LOW_CONFIDENCE_TEXT, Outcome::LowConfidence)
    }

    pub fn identity() -> Self {
        Answer::tagged(IDENTITY_TEXT, Provenance::CoreIdentity, Outcome::Identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_labels() {
        assert_eq!(Provenance::LocalMemory.to_string(), "Local Memory");
        assert_eq!(Provenance::External.to_string(), "Wikipedia");
        assert_eq!(Provenance::CoreIdentity.to_string(), "Core Identity");
    }

    #[test]
    fn sources_display() {
        let tags = Sources::Tags(vec![Provenance::LocalMemory, Provenance::Dictionary]);
        assert_eq!(tags.to_string(), "source: Local Memory, Dictionary");
        let scores = Sources::Scores(vec![0.5, 0.25]);
        assert_eq!(scores.to_string(), "scores: 0.500, 0.250");
    }

    #[test]
    fn serializes_with_display_labels() {
        let answer = Answer::tagged("hi", Provenance::LocalMemory, Outcome::Verbatim);
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["sources"]["tags"][0], "Local Memory");
        assert_eq!(json["outcome"], "verbatim");
    }

    #[test]
    fn fallback_outcomes_are_not_cacheable() {
        assert!(!Answer::not_ready().outcome.is_cacheable());
        assert!(!Answer::no_match().outcome.is_cacheable());
        assert!(!Answer::low_confidence().outcome.is_cacheable());
        assert!(Answer::identity().outcome.is_cacheable());
        assert!(Outcome::Generated.is_cacheable());
    }

    #[test]
    fn fallback_answers_carry_no_sources() {
        assert!(Answer::no_match().sources.is_empty());
        assert!(!Answer::identity().sources.is_empty());
    }
}

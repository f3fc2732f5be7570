//! Construction errors.
//!
//! Matching never fails: text without an address yields an empty iterator and a missing
//! optional component is an omitted field. Only building a grammar can go wrong.

use crate::components::Field;
use crate::vocabulary::Category;
use thiserror::Error;

/// The vocabulary handed to the grammar builder is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyError {
    #[error("{category} vocabulary is empty")]
    Empty { category: Category },

    #[error("{category} vocabulary term #{index} ({term:?}) is malformed: {reason}")]
    MalformedTerm {
        category: Category,
        index: usize,
        term: String,
        reason: &'static str,
    },
}

/// The assembled grammar cannot be turned into a matcher.
#[derive(Debug, Error)]
pub enum PatternCompilationError {
    #[error("grammar `{grammar}` exceeds the compiled size limit of {limit} bytes")]
    TooLarge { grammar: String, limit: usize },

    #[error("grammar `{grammar}` nests {depth} groups deep (limit {limit})")]
    TooDeep {
        grammar: String,
        depth: u32,
        limit: u32,
    },

    #[error("grammar `{grammar}` has an invalid repetition bound {{{min},{max}}}")]
    InvalidBound { grammar: String, min: u32, max: u32 },

    #[error("grammar `{grammar}` repeats up to {max} times (ceiling {ceiling})")]
    RepeatTooLarge {
        grammar: String,
        max: u32,
        ceiling: u32,
    },

    #[error("grammar `{grammar}` defines field `{name}` more than once")]
    DuplicateField { grammar: String, name: String },

    #[error("component `{component}` depends on `{dependency}`, which is not placed before it")]
    DependencyOrder { component: Field, dependency: Field },

    #[error("grammar `{grammar}` was rejected by the regex engine")]
    Engine {
        grammar: String,
        #[source]
        source: regex::Error,
    },
}

/// Any failure of [`crate::build_grammar`].
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),

    #[error(transparent)]
    Compilation(#[from] PatternCompilationError),
}

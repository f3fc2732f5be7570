//! Grammar Compiler
//!
//!     Validates a [`Node`] tree against [`GrammarOptions`] and compiles it once into a
//!     [`Regex`]. Anything that would make matching expensive or ambiguous is rejected here,
//!     at construction time, never at query time.

use super::ir::Node;
use crate::error::PatternCompilationError;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use tracing::debug;

/// Engine budget applied to every compiled grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarOptions {
    /// Upper bound on the compiled program size, in bytes.
    pub size_limit: usize,
    /// Upper bound on the lazy DFA cache, in bytes.
    pub dfa_size_limit: usize,
    /// Maximum group nesting.
    pub nest_limit: u32,
    /// Largest `{min,max}` bound a grammar may use.
    pub max_repeat: u32,
}

impl Default for GrammarOptions {
    fn default() -> Self {
        Self {
            size_limit: 256 * (1 << 20),
            dfa_size_limit: 16 * (1 << 20),
            nest_limit: 64,
            max_repeat: 64,
        }
    }
}

/// Validate `node` and compile it.
///
/// `grammar` is a label used in errors and logs.
pub fn compile(
    grammar: &str,
    node: &Node,
    options: &GrammarOptions,
) -> Result<Regex, PatternCompilationError> {
    validate(grammar, node, options)?;

    let pattern = node.render();
    debug!(
        grammar,
        pattern_bytes = pattern.len(),
        depth = node.depth(),
        "compiling grammar"
    );

    RegexBuilder::new(&pattern)
        .size_limit(options.size_limit)
        .dfa_size_limit(options.dfa_size_limit)
        .nest_limit(options.nest_limit * 2)
        .build()
        .map_err(|err| match err {
            regex::Error::CompiledTooBig(limit) => PatternCompilationError::TooLarge {
                grammar: grammar.to_string(),
                limit,
            },
            source => PatternCompilationError::Engine {
                grammar: grammar.to_string(),
                source,
            },
        })
}

/// Structural checks that do not need the engine.
pub fn validate(
    grammar: &str,
    node: &Node,
    options: &GrammarOptions,
) -> Result<(), PatternCompilationError> {
    let depth = node.depth();
    if depth > options.nest_limit {
        return Err(PatternCompilationError::TooDeep {
            grammar: grammar.to_string(),
            depth,
            limit: options.nest_limit,
        });
    }

    let mut bound_error = None;
    node.walk(&mut |n| {
        if bound_error.is_some() {
            return;
        }
        if let Node::Repeat { min, max, .. } = n {
            if min > max || *max == 0 {
                bound_error = Some(PatternCompilationError::InvalidBound {
                    grammar: grammar.to_string(),
                    min: *min,
                    max: *max,
                });
            } else if *max > options.max_repeat {
                bound_error = Some(PatternCompilationError::RepeatTooLarge {
                    grammar: grammar.to_string(),
                    max: *max,
                    ceiling: options.max_repeat,
                });
            }
        }
    });
    if let Some(err) = bound_error {
        return Err(err);
    }

    let mut seen = HashSet::new();
    for name in node.capture_names() {
        if !seen.insert(name) {
            return Err(PatternCompilationError::DuplicateField {
                grammar: grammar.to_string(),
                name: name.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ir::CharClass;

    #[test]
    fn compiles_a_bounded_grammar() {
        let node = Node::seq([
            Node::WordBoundary,
            Node::capture("code", Node::repeat(Node::class(CharClass::digit()), 5, 5)),
            Node::WordBoundary,
        ]);
        let regex = compile("postal", &node, &GrammarOptions::default()).unwrap();
        let caps = regex.captures("cedex 75002 paris").unwrap();
        assert_eq!(&caps["code"], "75002");
    }

    #[test]
    fn rejects_inverted_bounds() {
        let node = Node::repeat(Node::literal("a"), 3, 2);
        let err = validate("bad", &node, &GrammarOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PatternCompilationError::InvalidBound { min: 3, max: 2, .. }
        ));
    }

    #[test]
    fn rejects_bounds_above_ceiling() {
        let node = Node::repeat(Node::literal("a"), 1, 500);
        let err = validate("wide", &node, &GrammarOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PatternCompilationError::RepeatTooLarge { max: 500, .. }
        ));
    }

    #[test]
    fn rejects_duplicate_capture_names() {
        let node = Node::seq([
            Node::capture("commune", Node::literal("a")),
            Node::capture("commune", Node::literal("b")),
        ]);
        let err = validate("dup", &node, &GrammarOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PatternCompilationError::DuplicateField { ref name, .. } if name == "commune"
        ));
    }

    #[test]
    fn rejects_deep_nesting() {
        let mut node = Node::literal("a");
        for _ in 0..10 {
            node = Node::optional(node);
        }
        let options = GrammarOptions {
            nest_limit: 4,
            ..GrammarOptions::default()
        };
        let err = validate("deep", &node, &options).unwrap_err();
        assert!(matches!(err, PatternCompilationError::TooDeep { depth: 10, .. }));
    }

    #[test]
    fn reports_engine_size_limit() {
        let words: Vec<Node> = (0..2000)
            .map(|i| Node::literal(format!("commune{i}")))
            .collect();
        let node = Node::alt(words);
        let options = GrammarOptions {
            size_limit: 1024,
            ..GrammarOptions::default()
        };
        let err = compile("huge", &node, &options).unwrap_err();
        assert!(matches!(err, PatternCompilationError::TooLarge { .. }));
    }
}

//! Lexical Normalizer
//!
//!     Turns a vocabulary list into one alternation that matches every term regardless of
//!     case and of French diacritics, anchored on word boundaries:
//!
//!     - terms are canonicalized (trimmed, inner whitespace collapsed, lowercased) and
//!       deduplicated; two terms that differ only by accents or separators collapse into one
//!     - spaces, apostrophes and hyphens inside a term become optional, so
//!       `Zone d'activité` also matches `Zone d activité` and `Zone dactivité`
//!     - each letter becomes a character class holding both cases of every member of its
//!       diacritic family (see [`LETTER_FAMILIES`])
//!     - branches are ordered longest first, then lexicographically, so a longer term wins
//!       over its prefix and rebuilding from the same list renders the same pattern
//!     - a trailing run of up to two `.`, `,` or space characters is absorbed after the
//!       alternation so the assembler does not see it as a separator

use crate::error::VocabularyError;
use crate::grammar::{CharClass, Node};
use crate::vocabulary::{Category, Vocabulary};
use once_cell::sync::Lazy;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

/// Letters that are interchangeable for matching. The first member is the ASCII fold.
pub const LETTER_FAMILIES: &[&str] = &["aàâä", "cç", "eéèêë", "iîï", "oôö", "uùûü", "yÿ"];

/// Characters inside a term that may be present, absent or swapped for one another.
const TERM_SEPARATORS: &str = " '’-";

/// Punctuation absorbed after a vocabulary match.
const TRAILING_PUNCTUATION: &str = ". ,";
const MAX_TRAILING: u32 = 2;

static FAMILY_OF: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    LETTER_FAMILIES
        .iter()
        .flat_map(|family| family.chars().map(move |c| (c, *family)))
        .collect()
});

/// A compiled-ready alternation over one vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternationFragment {
    category: Category,
    terms: Vec<String>,
    alternation: Node,
}

impl AlternationFragment {
    pub fn category(&self) -> Category {
        self.category
    }

    /// Canonical terms in branch order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// The anchored alternation, without the trailing punctuation run.
    pub fn alternation(&self) -> &Node {
        &self.alternation
    }

    /// The punctuation run absorbed after a match.
    pub fn trailing() -> Node {
        Node::repeat(
            Node::class(CharClass::new().chars(TRAILING_PUNCTUATION)),
            0,
            MAX_TRAILING,
        )
    }

    /// Alternation followed by the trailing run.
    pub fn to_node(&self) -> Node {
        Node::seq([self.alternation.clone(), Self::trailing()])
    }
}

/// Build the alternation for `vocabulary`.
pub fn alternation(vocabulary: &Vocabulary) -> Result<AlternationFragment, VocabularyError> {
    vocabulary.validate()?;

    let mut unique: BTreeMap<String, String> = BTreeMap::new();
    for term in vocabulary.terms() {
        let canonical = canonical(term);
        let key = dedup_key(&canonical);
        unique
            .entry(key)
            .and_modify(|kept| {
                if canonical < *kept {
                    *kept = canonical.clone();
                }
            })
            .or_insert(canonical);
    }

    let mut terms: Vec<String> = unique.into_values().collect();
    terms.sort_by(|a, b| {
        (Reverse(a.chars().count()), a.as_str()).cmp(&(Reverse(b.chars().count()), b.as_str()))
    });

    let alternation = Node::alt(terms.iter().map(|term| keyword(term)));
    Ok(AlternationFragment {
        category: vocabulary.category(),
        terms,
        alternation,
    })
}

/// A single term as a boundary-anchored, case- and accent-insensitive node.
///
/// A boundary is only asserted on a side where the term starts or ends with a word
/// character; `n°` gets a leading boundary only.
pub fn keyword(term: &str) -> Node {
    let canonical = canonical(term);
    let mut nodes = Vec::with_capacity(3);
    if canonical.chars().next().is_some_and(is_word_char) {
        nodes.push(Node::WordBoundary);
    }
    nodes.push(fold_term(&canonical));
    if canonical.chars().last().is_some_and(is_word_char) {
        nodes.push(Node::WordBoundary);
    }
    Node::seq(nodes)
}

/// A term as an unanchored sequence of letter classes, optional separators and literals.
pub fn fold_term(term: &str) -> Node {
    Node::seq(term.chars().map(|c| {
        if TERM_SEPARATORS.contains(c) {
            Node::optional(Node::class(CharClass::new().chars(TERM_SEPARATORS)))
        } else if let Some(class) = letter_class(c) {
            Node::class(class)
        } else {
            Node::literal(c.to_string())
        }
    }))
}

/// Class matching `c` in either case and, for French letters, every diacritic variant.
///
/// Returns `None` for anything that is not a letter.
pub fn letter_class(c: char) -> Option<CharClass> {
    let lower = to_lower(c);
    if !lower.is_alphabetic() {
        return None;
    }
    let members = FAMILY_OF.get(&lower).copied();
    let mut class = CharClass::new();
    match members {
        Some(family) => {
            for member in family.chars() {
                class = with_cases(class, member);
            }
        }
        None => class = with_cases(class, lower),
    }
    Some(class)
}

/// Strip French diacritics, keeping case: `Saint-Étienne` becomes `Saint-Etienne`.
pub fn ascii_fold(text: &str) -> String {
    text.chars()
        .map(|c| {
            let lower = to_lower(c);
            match FAMILY_OF.get(&lower).and_then(|family| family.chars().next()) {
                Some(base) if c.is_uppercase() => base.to_ascii_uppercase(),
                Some(base) => base,
                None => c,
            }
        })
        .collect()
}

fn with_cases(class: CharClass, lower: char) -> CharClass {
    let mut upper = lower.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(up), None) if up != lower => class.char(lower).char(up),
        _ => class.char(lower),
    }
}

fn to_lower(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

fn canonical(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn dedup_key(canonical: &str) -> String {
    ascii_fold(canonical)
        .chars()
        .map(|c| if TERM_SEPARATORS.contains(c) { ' ' } else { c })
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

//! # adresse
//!
//! Extracts structured postal-address components from unstructured French text.
//!
//! A grammar is built once from two vocabularies (street types and commune names) and then
//! queried any number of times:
//!
//!     let grammar = adresse::build_grammar(&["Rue", "Avenue"], &["Paris"])?;
//!     for address in adresse::find_addresses(&grammar, "12 Rue de la Paix, 75002 Paris") {
//!         println!("{:?}", address.value(adresse::Field::PostalCode));
//!     }
//!
//! Pipeline, leaf first:
//!
//! - [`normalizer`]: vocabulary terms to case- and diacritic-insensitive alternations
//! - [`numeric`]: digit and spelled-out number literals
//! - [`components`]: one sub-grammar per address field
//! - [`assembler`]: the ordered composite grammar and its variants
//! - [`grammar`]: the node tree everything is expressed in, and its compiler
//! - [`matching`]: lazy iteration over match results
//!
//! The crate performs no I/O. Loading reference data is left to the caller (see the
//! `adresse-cli` crate).

pub mod assembler;
pub mod components;
pub mod error;
pub mod grammar;
pub mod matching;
pub mod normalizer;
pub mod numeric;
pub mod vocabulary;

pub use assembler::{CompositeGrammar, Layout, VariantKind};
pub use components::{Field, UnknownField};
pub use error::{GrammarError, PatternCompilationError, VocabularyError};
pub use grammar::GrammarOptions;
pub use matching::{FieldMatch, MatchResult, Matches};
pub use vocabulary::{Category, Vocabulary, STREET_TYPES};

/// Iterator over full-address matches.
pub type Addresses<'g, 't> = Matches<'g, 't>;

/// Build the address grammar with default engine limits.
pub fn build_grammar<S: AsRef<str>, T: AsRef<str>>(
    street_types: &[S],
    communes: &[T],
) -> Result<CompositeGrammar, GrammarError> {
    build_grammar_with(street_types, communes, &GrammarOptions::default())
}

/// Build the address grammar with explicit engine limits.
pub fn build_grammar_with<S: AsRef<str>, T: AsRef<str>>(
    street_types: &[S],
    communes: &[T],
    options: &GrammarOptions,
) -> Result<CompositeGrammar, GrammarError> {
    assembler::build_from_terms(street_types, communes, options)
}

/// Non-overlapping full addresses (postal code and commune present) in `text`.
pub fn find_addresses<'g, 't>(grammar: &'g CompositeGrammar, text: &'t str) -> Addresses<'g, 't> {
    grammar.find_addresses(text)
}

/// Street-level partial matches, for text without postal code or commune.
pub fn find_streets<'g, 't>(grammar: &'g CompositeGrammar, text: &'t str) -> Matches<'g, 't> {
    grammar.find_streets(text)
}

/// Matches of a single component's sub-grammar.
pub fn find_component<'g, 't>(
    grammar: &'g CompositeGrammar,
    field: Field,
    text: &'t str,
) -> Matches<'g, 't> {
    grammar.find_component(field, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn grammar_is_shareable() {
        assert_send_sync::<CompositeGrammar>();
    }

    #[test]
    fn empty_commune_list_fails() {
        let communes: [&str; 0] = [];
        let err = build_grammar(STREET_TYPES, &communes).unwrap_err();
        assert!(matches!(
            err,
            GrammarError::Vocabulary(VocabularyError::Empty {
                category: Category::Commune
            })
        ));
    }
}

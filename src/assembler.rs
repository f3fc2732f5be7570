//! Composite Assembler
//!
//!     Orders the component fragments into address-level grammars:
//!
//!     ```text
//!     [po_box] [floor] [occupancy] [building_id] [street_number] [street_type] [street_name]
//!         postal_code commune
//!     ```
//!
//!     Every bracketed component is optional; an optional separator may sit between any two
//!     adjacent components. The street-level part is captured as `full_street`.
//!
//!     A street name may contain digits only when a street number precedes it. The regex
//!     engine has no conditional groups, so each grammar is assembled twice and the two
//!     variants are tried in priority order:
//!
//!     1. numbered: street_number is required and street_name depends on it (digits allowed)
//!     2. plain: no street_number, and street_name cannot contain digits, so a bare numeral
//!        can never be read as a name
//!
//!     At a given position the earliest match wins; ties go to the numbered variant.

use crate::components::{self, ComponentSpec, Field};
use crate::error::{GrammarError, PatternCompilationError};
use crate::grammar::{compile, CharClass, GrammarOptions, Node};
use crate::matching::{Matcher, Matches, Variant};
use crate::normalizer::{self, AlternationFragment};
use crate::numeric;
use crate::vocabulary::{Category, Vocabulary};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

const SEPARATOR_CHARS: &str = ", .-";
const MAX_SEPARATOR: u32 = 3;

/// Which of the two priority-ordered grammar variants a layout belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Numbered,
    Plain,
}

impl VariantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariantKind::Numbered => "numbered",
            VariantKind::Plain => "plain",
        }
    }
}

/// Ordered components of one grammar variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub kind: VariantKind,
    /// Number of leading components that make up the street-level part.
    pub street_len: usize,
    pub components: Vec<ComponentSpec>,
}

impl Layout {
    pub fn street(&self) -> &[ComponentSpec] {
        &self.components[..self.street_len]
    }

    pub fn fields(&self) -> Vec<Field> {
        self.components.iter().map(|spec| spec.field).collect()
    }
}

/// The immutable, compiled address grammar.
///
/// Built once by [`crate::build_grammar`], then shared by reference.
#[derive(Debug)]
pub struct CompositeGrammar {
    layouts: Vec<Layout>,
    addresses: Matcher,
    streets: Matcher,
    standalone: BTreeMap<Field, Matcher>,
}

impl CompositeGrammar {
    /// The address-level layouts, numbered first.
    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    /// Full addresses (postal code and commune required).
    pub fn find_addresses<'g, 't>(&'g self, text: &'t str) -> Matches<'g, 't> {
        self.addresses.find_iter(text)
    }

    /// Street-level partial matches: everything before the postal code.
    pub fn find_streets<'g, 't>(&'g self, text: &'t str) -> Matches<'g, 't> {
        self.streets.find_iter(text)
    }

    /// A single component, matched on its own.
    ///
    /// [`Field::FullStreet`] is the same as [`CompositeGrammar::find_streets`].
    pub fn find_component<'g, 't>(&'g self, field: Field, text: &'t str) -> Matches<'g, 't> {
        match field {
            Field::FullStreet => self.streets.find_iter(text),
            field => self.standalone[&field].find_iter(text),
        }
    }

    /// Rendered regex of every compiled variant, keyed by grammar label.
    pub fn patterns(&self) -> Vec<(String, &str)> {
        let mut patterns = Vec::new();
        for (prefix, matcher) in [("address", &self.addresses), ("street", &self.streets)] {
            for variant in matcher.variants() {
                patterns.push((format!("{prefix}/{}", variant.label()), variant.pattern()));
            }
        }
        for (field, matcher) in &self.standalone {
            for variant in matcher.variants() {
                patterns.push((format!("component/{field}"), variant.pattern()));
            }
        }
        patterns
    }
}

/// Vocabulary-derived fragments shared by every variant.
#[derive(Debug, Clone)]
pub struct Fragments {
    pub street_types: AlternationFragment,
    pub communes: AlternationFragment,
}

impl Fragments {
    pub fn new(street_types: &Vocabulary, communes: &Vocabulary) -> Result<Self, GrammarError> {
        Ok(Self {
            street_types: normalizer::alternation(street_types)?,
            communes: normalizer::alternation(communes)?,
        })
    }
}

/// Build and compile the complete grammar.
pub fn build(
    street_types: &Vocabulary,
    communes: &Vocabulary,
    options: &GrammarOptions,
) -> Result<CompositeGrammar, GrammarError> {
    let fragments = Fragments::new(street_types, communes)?;
    debug!(
        street_types = fragments.street_types.terms().len(),
        communes = fragments.communes.terms().len(),
        "normalized vocabularies"
    );

    let layouts = vec![
        address_layout(VariantKind::Numbered, &fragments),
        address_layout(VariantKind::Plain, &fragments),
    ];
    for layout in &layouts {
        check_dependencies(&layout.components)?;
    }

    let addresses = compile_matcher("address", &layouts, options)?;

    let street_layouts: Vec<Layout> = layouts
        .iter()
        .map(|layout| Layout {
            kind: layout.kind,
            street_len: layout.street_len,
            components: layout.street().to_vec(),
        })
        .collect();
    let streets = compile_matcher("street", &street_layouts, options)?;

    let mut standalone = BTreeMap::new();
    for spec in standalone_components(&fragments) {
        let label = format!("component/{}", spec.field);
        let regex = compile(&label, &spec.to_node(), options)?;
        let variant = Variant::new(spec.field.as_str(), regex, vec![spec.field]);
        standalone.insert(spec.field, Matcher::new(vec![variant]));
    }

    Ok(CompositeGrammar {
        layouts,
        addresses,
        streets,
        standalone,
    })
}

/// Components in grammar order for one variant.
pub fn address_layout(kind: VariantKind, fragments: &Fragments) -> Layout {
    let numbered = kind == VariantKind::Numbered;
    let mut specs = vec![
        ComponentSpec::new(Field::PoBox, components::po_box()),
        ComponentSpec::new(Field::Floor, components::floor()),
        ComponentSpec::new(Field::Occupancy, components::occupancy()),
        ComponentSpec::new(Field::BuildingId, components::building_id()),
    ];
    if numbered {
        specs.push(
            ComponentSpec::new(Field::StreetNumber, numeric::street_number()).required(),
        );
    }
    specs.push(
        ComponentSpec::new(Field::StreetType, fragments.street_types.alternation().clone())
            .with_trailing(AlternationFragment::trailing()),
    );
    let name = ComponentSpec::new(Field::StreetName, components::street_name(numbered));
    specs.push(if numbered {
        name.depends_on(Field::StreetNumber)
    } else {
        name
    });
    let street_len = specs.len();

    specs.push(ComponentSpec::new(Field::PostalCode, components::postal_code()).required());
    specs.push(
        ComponentSpec::new(Field::Commune, fragments.communes.alternation().clone())
            .with_trailing(AlternationFragment::trailing())
            .required(),
    );

    Layout {
        kind,
        street_len,
        components: specs,
    }
}

/// Every dependency must name a component placed earlier; names must be unique.
pub fn check_dependencies(specs: &[ComponentSpec]) -> Result<(), PatternCompilationError> {
    let mut placed = HashSet::new();
    for spec in specs {
        if let Some(dependency) = spec.dependency {
            if !placed.contains(&dependency) {
                return Err(PatternCompilationError::DependencyOrder {
                    component: spec.field,
                    dependency,
                });
            }
        }
        if !placed.insert(spec.field) {
            return Err(PatternCompilationError::DuplicateField {
                grammar: "layout".to_string(),
                name: spec.field.to_string(),
            });
        }
    }
    Ok(())
}

/// Separator between adjacent components.
///
/// At most three of `,` `.` `-` or space, with a comma somewhere whenever there is more
/// than one character: `,`, ` `, `, `, ` , `, `.,`, `,--`.
pub fn separator() -> Node {
    let punct = || Node::class(CharClass::new().chars(SEPARATOR_CHARS));
    let comma = || Node::literal(",");
    Node::optional(Node::alt([
        Node::seq([comma(), Node::repeat(punct(), 0, MAX_SEPARATOR - 1)]),
        Node::seq([punct(), comma(), punct()]),
        Node::seq([Node::repeat(punct(), 1, MAX_SEPARATOR - 1), comma()]),
        punct(),
    ]))
}

/// Sequence the components with separators; the street part is captured as `full_street`.
pub fn layout_node(layout: &Layout) -> Node {
    let piece = |spec: &ComponentSpec, last: bool| {
        let body = if last {
            spec.to_node()
        } else {
            Node::seq([spec.to_node(), separator()])
        };
        if spec.optional {
            Node::optional(body)
        } else {
            body
        }
    };

    let total = layout.components.len();
    let street = Node::seq(
        layout
            .street()
            .iter()
            .enumerate()
            .map(|(i, spec)| piece(spec, i + 1 == total)),
    );
    let rest = layout.components[layout.street_len..]
        .iter()
        .enumerate()
        .map(|(i, spec)| piece(spec, layout.street_len + i + 1 == total));

    Node::seq(std::iter::once(Node::capture(Field::FullStreet.as_str(), street)).chain(rest))
}

fn compile_matcher(
    prefix: &str,
    layouts: &[Layout],
    options: &GrammarOptions,
) -> Result<Matcher, PatternCompilationError> {
    let mut variants = Vec::with_capacity(layouts.len());
    for layout in layouts {
        let label = format!("{prefix}/{}", layout.kind.as_str());
        let regex = compile(&label, &layout_node(layout), options)?;
        let mut fields = layout.fields();
        fields.push(Field::FullStreet);
        variants.push(Variant::new(layout.kind.as_str(), regex, fields));
    }
    Ok(Matcher::new(variants))
}

fn standalone_components(fragments: &Fragments) -> Vec<ComponentSpec> {
    vec![
        ComponentSpec::new(Field::PoBox, components::po_box()),
        ComponentSpec::new(Field::Floor, components::floor()),
        ComponentSpec::new(Field::Occupancy, components::occupancy()),
        ComponentSpec::new(Field::BuildingId, components::building_id()),
        ComponentSpec::new(Field::StreetNumber, numeric::street_number()),
        ComponentSpec::new(Field::StreetType, fragments.street_types.alternation().clone()),
        ComponentSpec::new(Field::StreetName, components::street_name(false)),
        ComponentSpec::new(Field::PostDirection, components::post_direction()),
        ComponentSpec::new(Field::PostalCode, components::postal_code()),
        ComponentSpec::new(Field::Commune, fragments.communes.alternation().clone()),
    ]
}

/// Convenience for [`build`] from raw term lists.
pub fn build_from_terms<S: AsRef<str>, T: AsRef<str>>(
    street_types: &[S],
    communes: &[T],
    options: &GrammarOptions,
) -> Result<CompositeGrammar, GrammarError> {
    build(
        &Vocabulary::new(Category::StreetType, street_types),
        &Vocabulary::new(Category::Commune, communes),
        options,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments() -> Fragments {
        Fragments::new(
            &Vocabulary::street_types(),
            &Vocabulary::new(Category::Commune, &["Paris", "Lyon"]),
        )
        .unwrap()
    }

    #[test]
    fn numbered_layout_order() {
        let layout = address_layout(VariantKind::Numbered, &fragments());
        assert_eq!(
            layout.fields(),
            vec![
                Field::PoBox,
                Field::Floor,
                Field::Occupancy,
                Field::BuildingId,
                Field::StreetNumber,
                Field::StreetType,
                Field::StreetName,
                Field::PostalCode,
                Field::Commune,
            ]
        );
        assert_eq!(layout.street().len(), 7);
        assert!(layout.components.iter().all(|spec| match spec.field {
            Field::StreetNumber | Field::PostalCode | Field::Commune => !spec.optional,
            _ => spec.optional,
        }));
    }

    #[test]
    fn plain_layout_has_no_street_number() {
        let layout = address_layout(VariantKind::Plain, &fragments());
        assert!(!layout.fields().contains(&Field::StreetNumber));
        assert_eq!(layout.street().last().map(|spec| spec.field), Some(Field::StreetName));
        assert!(layout.components.iter().all(|spec| spec.dependency.is_none()));
    }

    #[test]
    fn dependency_must_be_placed_first() {
        let specs = vec![
            ComponentSpec::new(Field::StreetName, components::street_name(true))
                .depends_on(Field::StreetNumber),
            ComponentSpec::new(Field::StreetNumber, numeric::street_number()).required(),
        ];
        let err = check_dependencies(&specs).unwrap_err();
        assert!(matches!(
            err,
            PatternCompilationError::DependencyOrder {
                component: Field::StreetName,
                dependency: Field::StreetNumber,
            }
        ));
    }

    #[test]
    fn duplicate_components_are_rejected() {
        let specs = vec![
            ComponentSpec::new(Field::PostalCode, components::postal_code()),
            ComponentSpec::new(Field::PostalCode, components::postal_code()),
        ];
        assert!(matches!(
            check_dependencies(&specs),
            Err(PatternCompilationError::DuplicateField { .. })
        ));
    }

    #[test]
    fn separator_forms() {
        let node = Node::seq([
            Node::literal("a"),
            separator(),
            Node::literal("b"),
        ]);
        let regex = compile("separator", &node, &GrammarOptions::default()).unwrap();
        for text in ["ab", "a b", "a,b", "a , b", "a,,b", "a-b", "a.b", "a.,b", "a,--b"] {
            assert!(regex.is_match(text), "{text:?}");
        }
        for text in ["a.-,-.b", "a , , b", "a  b", "a\tb", "a;b", "a--b"] {
            assert!(!regex.is_match(text), "{text:?}");
        }
    }

    #[test]
    fn every_pattern_compiles_once() {
        let grammar = build(
            &Vocabulary::street_types(),
            &Vocabulary::new(Category::Commune, &["Paris"]),
            &GrammarOptions::default(),
        )
        .unwrap();
        let labels: Vec<String> = grammar.patterns().into_iter().map(|(l, _)| l).collect();
        assert!(labels.contains(&"address/numbered".to_string()));
        assert!(labels.contains(&"street/plain".to_string()));
        assert!(labels.contains(&"component/post_direction".to_string()));
        assert_eq!(labels.len(), 4 + Field::ALL.len() - 1);
    }
}

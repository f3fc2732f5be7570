//! Regression corpus
//!
//! The rendered extraction of a fixed corpus is snapshotted; rebuilding the grammar from
//! the same vocabulary must reproduce it, pattern for pattern.

use adresse::{build_grammar, find_addresses, CompositeGrammar, MatchResult, STREET_TYPES};

const COMMUNES: &[&str] = &["Paris", "Marseille", "BESANCON", "Lyon"];

const CORPUS: &[&str] = &[
    "12 Rue de la Paix, 75002 Paris",
    "Rue du Marché, 13001 Marseille",
    "BP 4021, 25000 Besançon",
    "Bâtiment B, 3ème étage",
];

fn describe(result: &MatchResult) -> String {
    result
        .fields
        .iter()
        .map(|(field, found)| format!("{field}={}", found.value))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn extract(grammar: &CompositeGrammar) -> String {
    let mut lines = Vec::new();
    for text in CORPUS {
        lines.push(text.to_string());
        let found: Vec<String> = find_addresses(grammar, text).map(|m| describe(&m)).collect();
        if found.is_empty() {
            lines.push("=> (none)".to_string());
        }
        for result in found {
            lines.push(format!("=> {result}"));
        }
    }
    lines.join("\n")
}

#[test]
fn corpus_extraction() {
    let grammar = build_grammar(STREET_TYPES, COMMUNES).unwrap();
    insta::assert_snapshot!(extract(&grammar), @r"
    12 Rue de la Paix, 75002 Paris
    => street_number=12 | street_type=Rue | street_name=de la Paix | postal_code=75002 | commune=Paris | full_street=12 Rue de la Paix
    Rue du Marché, 13001 Marseille
    => street_type=Rue | street_name=du Marché | postal_code=13001 | commune=Marseille | full_street=Rue du Marché
    BP 4021, 25000 Besançon
    => po_box=BP 4021 | postal_code=25000 | commune=Besançon | full_street=BP 4021
    Bâtiment B, 3ème étage
    => (none)
    ");
}

#[test]
fn rebuilding_is_deterministic() {
    let first = build_grammar(STREET_TYPES, COMMUNES).unwrap();
    let mut shuffled: Vec<&str> = COMMUNES.to_vec();
    shuffled.reverse();
    let second = build_grammar(STREET_TYPES, &shuffled).unwrap();

    assert_eq!(first.patterns(), second.patterns());
    assert_eq!(extract(&first), extract(&second));
    for text in CORPUS {
        let a: Vec<MatchResult> = find_addresses(&first, text).collect();
        let b: Vec<MatchResult> = find_addresses(&second, text).collect();
        assert_eq!(a, b);
    }
}

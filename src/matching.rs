//! Query layer
//!
//!     Runs the compiled variants of a grammar over a text and yields [`MatchResult`]s.
//!
//!     Each variant keeps a lookahead: the leftmost match it has at or after the current
//!     position. At every step the earliest non-empty lookahead wins (ties go to the
//!     variant declared first), the position moves past it, and only lookaheads that now
//!     start before the position are searched again. Matches never overlap.
//!
//!     Grammars where every component is optional can match the empty string. Empty
//!     matches are never reported; the scan steps past them one character at a time.

use crate::components::Field;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

/// A matched piece of the query text.
///
/// `start` and `end` are byte offsets into the query text and delimit `value` exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    pub value: String,
    pub start: usize,
    pub end: usize,
}

/// One address found in the text.
///
/// Missing optional components are absent from `fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub span: FieldMatch,
    pub fields: BTreeMap<Field, FieldMatch>,
}

impl MatchResult {
    pub fn get(&self, field: Field) -> Option<&FieldMatch> {
        self.fields.get(&field)
    }

    /// Matched text of `field`, if present.
    pub fn value(&self, field: Field) -> Option<&str> {
        self.get(field).map(|m| m.value.as_str())
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    /// The whole matched text.
    pub fn as_str(&self) -> &str {
        &self.span.value
    }
}

/// One compiled grammar variant and the fields it can report.
#[derive(Debug)]
pub struct Variant {
    label: &'static str,
    regex: Regex,
    fields: Vec<Field>,
}

impl Variant {
    pub fn new(label: &'static str, regex: Regex, fields: Vec<Field>) -> Self {
        Self {
            label,
            regex,
            fields,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    fn candidate(&self, text: &str, caps: &Captures<'_>) -> Option<Candidate> {
        let whole = caps.get(0)?;
        let span = trimmed_span(text, whole.start(), whole.end());
        let result = span.map(|span| {
            let mut fields = BTreeMap::new();
            for &field in &self.fields {
                if let Some(m) = caps.name(field.as_str()) {
                    if let Some(found) = trimmed(text, m.start(), m.end()) {
                        fields.entry(field).or_insert(found);
                    }
                }
            }
            MatchResult { span, fields }
        });
        Some(Candidate {
            start: whole.start(),
            end: whole.end(),
            result,
        })
    }
}

/// Priority-ordered variants of one grammar.
#[derive(Debug)]
pub struct Matcher {
    variants: Vec<Variant>,
}

impl Matcher {
    pub fn new(variants: Vec<Variant>) -> Self {
        Self { variants }
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn find_iter<'g, 't>(&'g self, text: &'t str) -> Matches<'g, 't> {
        Matches {
            matcher: self,
            text,
            pos: 0,
            lookahead: vec![Lookahead::Pending; self.variants.len()],
        }
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    start: usize,
    end: usize,
    /// `None` when the match is empty once padding is trimmed.
    result: Option<MatchResult>,
}

impl Candidate {
    fn is_empty(&self) -> bool {
        self.result.is_none() || self.start == self.end
    }
}

#[derive(Debug, Clone)]
enum Lookahead {
    Pending,
    Found(Candidate),
    Exhausted,
}

/// Lazy iterator over non-overlapping matches.
///
/// Cloning it restarts nothing: the clone continues from the same position. Call the
/// query function again to start over.
#[derive(Debug, Clone)]
pub struct Matches<'g, 't> {
    matcher: &'g Matcher,
    text: &'t str,
    pos: usize,
    lookahead: Vec<Lookahead>,
}

impl Matches<'_, '_> {
    fn refresh(&mut self, index: usize) {
        let stale = match &self.lookahead[index] {
            Lookahead::Pending => true,
            Lookahead::Found(candidate) => candidate.start < self.pos,
            Lookahead::Exhausted => false,
        };
        if !stale {
            return;
        }
        let variant = &self.matcher.variants[index];
        self.lookahead[index] = variant
            .regex
            .captures_at(self.text, self.pos)
            .and_then(|caps| variant.candidate(self.text, &caps))
            .map_or(Lookahead::Exhausted, Lookahead::Found);
    }

    fn step_past(&self, offset: usize) -> usize {
        self.text[offset..]
            .chars()
            .next()
            .map_or(offset + 1, |c| offset + c.len_utf8())
    }
}

impl Iterator for Matches<'_, '_> {
    type Item = MatchResult;

    fn next(&mut self) -> Option<MatchResult> {
        loop {
            if self.pos > self.text.len() {
                return None;
            }
            for index in 0..self.lookahead.len() {
                self.refresh(index);
            }

            let mut best: Option<(usize, usize)> = None;
            let mut empty: Option<usize> = None;
            for (index, lookahead) in self.lookahead.iter().enumerate() {
                let Lookahead::Found(candidate) = lookahead else {
                    continue;
                };
                if candidate.is_empty() {
                    empty = Some(empty.map_or(candidate.start, |e| e.min(candidate.start)));
                    continue;
                }
                if best.map_or(true, |(start, _)| candidate.start < start) {
                    best = Some((candidate.start, index));
                }
            }

            match (best, empty) {
                (Some((start, _)), Some(empty_at)) if empty_at < start => {
                    self.pos = self.step_past(empty_at);
                }
                (Some((_, index)), _) => {
                    let Lookahead::Found(candidate) =
                        std::mem::replace(&mut self.lookahead[index], Lookahead::Pending)
                    else {
                        continue;
                    };
                    self.pos = candidate.end;
                    let variant = self.matcher.variants[index].label;
                    trace!(variant, start = candidate.start, end = candidate.end, "match");
                    return candidate.result;
                }
                (None, Some(empty_at)) => {
                    self.pos = self.step_past(empty_at);
                }
                (None, None) => return None,
            }
        }
    }
}

fn is_padding(c: char) -> bool {
    c.is_whitespace() || c == ','
}

/// Trim whitespace and commas off both ends of `text[start..end]`.
fn trimmed(text: &str, start: usize, end: usize) -> Option<FieldMatch> {
    trim_with(text, start, end, is_padding)
}

/// Like [`trimmed`], but a whole match also drops the trailing periods absorbed after
/// its last component.
fn trimmed_span(text: &str, start: usize, end: usize) -> Option<FieldMatch> {
    trim_with(text, start, end, |c| is_padding(c) || c == '.')
}

fn trim_with(
    text: &str,
    start: usize,
    end: usize,
    trailing: impl Fn(char) -> bool,
) -> Option<FieldMatch> {
    let raw = &text[start..end];
    let lead = raw.len() - raw.trim_start_matches(is_padding).len();
    let value = raw[lead..].trim_end_matches(trailing);
    if value.is_empty() {
        return None;
    }
    Some(FieldMatch {
        value: value.to_string(),
        start: start + lead,
        end: start + lead + value.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{compile, CharClass, GrammarOptions, Node};

    fn digits_matcher(min: u32) -> Matcher {
        let node = Node::capture(
            "postal_code",
            Node::repeat(Node::class(CharClass::digit()), min, 5),
        );
        let regex = compile("digits", &node, &GrammarOptions::default()).unwrap();
        Matcher::new(vec![Variant::new("digits", regex, vec![Field::PostalCode])])
    }

    #[test]
    fn trims_padding_and_keeps_offsets() {
        let text = "a , Paris, ";
        let found = trimmed(text, 1, text.len()).unwrap();
        assert_eq!(found.value, "Paris");
        assert_eq!(&text[found.start..found.end], "Paris");
        assert_eq!(trimmed(text, 1, 3), None);
    }

    #[test]
    fn span_drops_trailing_periods() {
        let text = "75002 Paris. ";
        let span = trimmed_span(text, 0, text.len()).unwrap();
        assert_eq!(span.value, "75002 Paris");
        assert_eq!(span.end, 11);
        assert_eq!(trimmed(text, 0, text.len()).unwrap().value, "75002 Paris.");
    }

    #[test]
    fn yields_non_overlapping_matches() {
        let matcher = digits_matcher(1);
        let values: Vec<String> = matcher
            .find_iter("12 345 6789012")
            .map(|m| m.span.value)
            .collect();
        assert_eq!(values, vec!["12", "345", "67890", "12"]);
    }

    #[test]
    fn skips_empty_matches() {
        let matcher = digits_matcher(0);
        let values: Vec<String> = matcher
            .find_iter("ab 12 é 7")
            .map(|m| m.span.value)
            .collect();
        assert_eq!(values, vec!["12", "7"]);
    }

    #[test]
    fn earliest_variant_wins_and_ties_prefer_first() {
        let letters = compile(
            "letters",
            &Node::capture(
                "commune",
                Node::repeat(Node::class(CharClass::ascii_letter()), 1, 10),
            ),
            &GrammarOptions::default(),
        )
        .unwrap();
        let alnum = compile(
            "alnum",
            &Node::capture(
                "street_name",
                Node::repeat(
                    Node::class(CharClass::ascii_letter().range('0', '9')),
                    1,
                    10,
                ),
            ),
            &GrammarOptions::default(),
        )
        .unwrap();
        let matcher = Matcher::new(vec![
            Variant::new("letters", letters, vec![Field::Commune]),
            Variant::new("alnum", alnum, vec![Field::StreetName]),
        ]);
        let results: Vec<MatchResult> = matcher.find_iter("9a bc").collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].value(Field::StreetName), Some("9a"));
        assert_eq!(results[1].value(Field::Commune), Some("bc"));
        assert!(!results[1].contains(Field::StreetName));
    }
}

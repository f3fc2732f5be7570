//! Numeric-Literal Grammar
//!
//!     Cardinal quantities in two mutually exclusive forms:
//!
//!     - digits: one to five digits, an optional single-letter suffix that must end the word
//!       (attached `12B` or detached `12 B`), and an optional hyphenated second group of the
//!       same shape (`85-1190`)
//!     - spelled: one to five number words (`one thousand twenty two`), each followed by
//!       at least one space
//!
//!     The "suffix not followed by a digit or letter" rule is a word-boundary assertion after
//!     the suffix, so `1022A3` never yields `1022A`.

use crate::grammar::{CharClass, Node};
use crate::normalizer::{fold_term, keyword};

/// Longest digit run accepted anywhere a number is expected.
pub const MAX_DIGITS: u32 = 5;
/// Longest run of spelled number words.
pub const MAX_SPELLED_WORDS: u32 = 5;
/// Longest run of spaces/tabs inside a component.
pub const MAX_SPACES: u32 = 3;

const ZERO_TO_NINETEEN: &[&str] = &[
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

const TENS: &[&str] = &[
    "twenty", "thirty", "forty", "fourty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const MAGNITUDES: &[&str] = &["hundred", "thousand", "and"];

/// Keywords that may introduce a street number.
const NUMBER_QUALIFIERS: &[&str] = &["number", "num", "nr", "no", "n°"];

/// One to three spaces or tabs.
pub fn space() -> Node {
    Node::repeat(Node::class(CharClass::new().chars(" \t")), 1, MAX_SPACES)
}

/// Zero to three spaces or tabs.
pub fn optional_space() -> Node {
    Node::repeat(Node::class(CharClass::new().chars(" \t")), 0, MAX_SPACES)
}

/// `1` to `max` ASCII digits.
pub fn digits(min: u32, max: u32) -> Node {
    Node::repeat(Node::class(CharClass::digit()), min, max)
}

/// A digit group with its optional letter suffix.
fn digit_group() -> Node {
    let letter = || Node::class(CharClass::ascii_letter());
    Node::seq([
        digits(1, MAX_DIGITS),
        Node::alt([
            Node::seq([letter(), Node::WordBoundary]),
            Node::seq([
                Node::WordBoundary,
                Node::optional(Node::seq([space(), letter(), Node::WordBoundary])),
            ]),
        ]),
    ])
}

/// Digits, with an optional hyphenated range: `12`, `12B`, `12 B`, `85-1190`.
pub fn digit_number() -> Node {
    Node::seq([
        Node::WordBoundary,
        digit_group(),
        Node::optional(Node::seq([
            optional_space(),
            Node::literal("-"),
            optional_space(),
            digit_group(),
        ])),
    ])
}

/// Spelled-out number words: `one thousand twenty two `.
pub fn spelled_number() -> Node {
    let words = ZERO_TO_NINETEEN
        .iter()
        .chain(TENS)
        .chain(MAGNITUDES)
        .map(|word| Node::seq([fold_term(word), space()]));
    Node::seq([
        Node::WordBoundary,
        Node::repeat(Node::alt(words), 1, MAX_SPELLED_WORDS),
    ])
}

/// Either numeric form.
pub fn numeric_literal() -> Node {
    Node::alt([digit_number(), spelled_number()])
}

/// A street number: optional qualifier (`No`, `Num.`, `#`, `N°` ...) then a numeric literal.
pub fn street_number() -> Node {
    let qualifier = Node::seq([
        Node::alt(
            NUMBER_QUALIFIERS
                .iter()
                .map(|word| keyword(word))
                .chain([Node::literal("#")]),
        ),
        Node::optional(Node::literal(".")),
        optional_space(),
    ]);
    Node::seq([Node::optional(qualifier), numeric_literal()])
}

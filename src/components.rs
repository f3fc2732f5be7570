//! Component Sub-Patterns
//!
//!     One grammar fragment per address field. Fragments are plain [`Node`] trees without
//!     captures; the assembler wraps each one in a capture named after its [`Field`].
//!
//!     | field          | keyword                                    | value                          |
//!     |----------------|--------------------------------------------|--------------------------------|
//!     | po_box         | P.O. Box, BP, boîte postale                | 1-6 digits                     |
//!     | floor          | floor, étage, etg (before or after value)  | 1-3 digits + ordinal/letters   |
//!     | occupancy      | suite, apt, appartement, porte, `#` ...    | optional 1-7 chars             |
//!     | building_id    | building, bldg, bâtiment, bât              | numeric literal or `\d{0,4}[A-Za-z]?` |
//!     | street_number  | optional No/Num/N°/#                       | numeric literal                |
//!     | street_type    | street-type vocabulary                     |                                |
//!     | street_name    |                                            | 3-40 name units, letter first  |
//!     | post_direction | north/south/east/west, NW/NE/SW/SE, N/S/E/W |                               |
//!     | postal_code    |                                            | exactly 5 digits               |
//!     | commune        | commune vocabulary                         |                                |

use crate::grammar::{CharClass, Node};
use crate::normalizer::{fold_term, keyword};
use crate::numeric::{digits, numeric_literal, optional_space, space};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// An output field. Declaration order is the order fields are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    PoBox,
    Floor,
    Occupancy,
    BuildingId,
    StreetNumber,
    StreetType,
    StreetName,
    PostDirection,
    PostalCode,
    Commune,
    /// The street-level portion of a match.
    FullStreet,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::PoBox,
        Field::Floor,
        Field::Occupancy,
        Field::BuildingId,
        Field::StreetNumber,
        Field::StreetType,
        Field::StreetName,
        Field::PostDirection,
        Field::PostalCode,
        Field::Commune,
        Field::FullStreet,
    ];

    /// Field key, also used as the capture group name.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::PoBox => "po_box",
            Field::Floor => "floor",
            Field::Occupancy => "occupancy",
            Field::BuildingId => "building_id",
            Field::StreetNumber => "street_number",
            Field::StreetType => "street_type",
            Field::StreetName => "street_name",
            Field::PostDirection => "post_direction",
            Field::PostalCode => "postal_code",
            Field::Commune => "commune",
            Field::FullStreet => "full_street",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field `{}`", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// One slot of a composite grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSpec {
    pub field: Field,
    /// The captured part.
    pub fragment: Node,
    /// Matched after the capture but not reported, e.g. punctuation after a vocabulary term.
    pub trailing: Node,
    pub optional: bool,
    /// A field that must be placed earlier in the same grammar.
    pub dependency: Option<Field>,
}

impl ComponentSpec {
    pub fn new(field: Field, fragment: Node) -> Self {
        Self {
            field,
            fragment,
            trailing: Node::Empty,
            optional: true,
            dependency: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.optional = false;
        self
    }

    pub fn with_trailing(mut self, trailing: Node) -> Self {
        self.trailing = trailing;
        self
    }

    pub fn depends_on(mut self, field: Field) -> Self {
        self.dependency = Some(field);
        self
    }

    pub fn name(&self) -> &'static str {
        self.field.as_str()
    }

    /// Capture around the fragment, followed by the trailing part.
    pub fn to_node(&self) -> Node {
        Node::seq([
            Node::capture(self.name(), self.fragment.clone()),
            self.trailing.clone(),
        ])
    }
}

const FLOOR_KEYWORDS: &[&str] = &["floor", "étage", "etg"];
const ORDINAL_SUFFIXES: &[&str] = &["ème", "ère", "er", "re", "e", "nd", "st", "rd", "th"];
const OCCUPANCY_KEYWORDS: &[&str] = &[
    "appartement",
    "apartment",
    "studio",
    "suite",
    "porte",
    "room",
    "flat",
    "appt",
    "app",
    "apt",
    "ste",
    "stu",
    "std",
    "rm",
];
const BUILDING_KEYWORDS: &[&str] = &["bâtiment", "building", "bldg", "bât"];
const LONG_DIRECTIONS: &[&str] = &["north", "south", "east", "west"];

/// Longest street name, in characters.
pub const MAX_STREET_NAME: u32 = 40;
const MIN_STREET_NAME: u32 = 3;
const MAX_FLOOR_DIGITS: u32 = 3;
const MAX_PO_BOX_DIGITS: u32 = 6;
const MAX_OCCUPANCY_VALUE: u32 = 7;
const MAX_BUILDING_DIGITS: u32 = 4;
const MAX_NAME_DIGITS: u32 = 4;

fn alt_keywords(words: &[&str]) -> Node {
    Node::alt(words.iter().map(|word| keyword(word)))
}

fn dot() -> Node {
    Node::optional(Node::literal("."))
}

/// `P.O. Box 12`, `PO 12`, `BP 1234`, `Boîte postale 7`.
pub fn po_box() -> Node {
    let letter = |c: char| Node::class(CharClass::new().char(c).char(c.to_ascii_uppercase()));
    let dotted_pair = |first: char, second: char| {
        Node::seq([
            Node::WordBoundary,
            letter(first),
            dot(),
            optional_space(),
            letter(second),
            dot(),
            optional_space(),
        ])
    };
    Node::seq([
        Node::alt([
            Node::seq([
                dotted_pair('p', 'o'),
                Node::optional(Node::seq([keyword("box"), optional_space()])),
            ]),
            dotted_pair('b', 'p'),
            Node::seq([keyword("boîte postale"), optional_space()]),
        ]),
        digits(1, MAX_PO_BOX_DIGITS),
        Node::WordBoundary,
    ])
}

/// `3ème étage`, `2nd floor`, `Floor 4`, `étage 1`.
pub fn floor() -> Node {
    let value = || {
        Node::seq([
            Node::WordBoundary,
            digits(1, MAX_FLOOR_DIGITS),
            Node::optional(Node::alt([
                Node::alt(ORDINAL_SUFFIXES.iter().map(|suffix| fold_term(suffix))),
                Node::repeat(Node::class(CharClass::ascii_letter()), 1, 2),
            ])),
            Node::WordBoundary,
        ])
    };
    Node::alt([
        Node::seq([value(), dot(), space(), alt_keywords(FLOOR_KEYWORDS)]),
        Node::seq([alt_keywords(FLOOR_KEYWORDS), space(), value()]),
    ])
}

/// `Suite 12`, `Apt. 4B`, `Appartement 12`, `#3`, or a bare keyword.
pub fn occupancy() -> Node {
    let value = CharClass::ascii_letter().range('0', '9').chars("#&-");
    Node::seq([
        Node::alt([
            alt_keywords(OCCUPANCY_KEYWORDS),
            Node::literal("#"),
        ]),
        dot(),
        Node::optional(Node::seq([
            optional_space(),
            Node::repeat(Node::class(value), 1, MAX_OCCUPANCY_VALUE),
        ])),
    ])
}

/// `Bâtiment B`, `Building 12`, `Bldg two `.
pub fn building_id() -> Node {
    Node::seq([
        alt_keywords(BUILDING_KEYWORDS),
        dot(),
        space(),
        Node::alt([
            numeric_literal(),
            Node::seq([
                digits(0, MAX_BUILDING_DIGITS),
                Node::optional(Node::class(CharClass::ascii_letter())),
                Node::WordBoundary,
            ]),
        ]),
    ])
}

/// `North`, `SW`, `E.`
pub fn post_direction() -> Node {
    Node::alt([
        alt_keywords(LONG_DIRECTIONS),
        Node::seq([
            Node::WordBoundary,
            Node::alt(["NW", "NE", "SW", "SE"].map(Node::literal)),
            Node::WordBoundary,
        ]),
        Node::seq([
            Node::WordBoundary,
            Node::class(CharClass::new().chars("NSEW")),
            Node::alt([Node::literal("."), Node::WordBoundary]),
        ]),
    ])
}

/// Characters allowed inside a street name. Digits come in separately, as whole groups.
pub fn street_name_class() -> CharClass {
    name_letters().chars(" .'’-")
}

fn name_letters() -> CharClass {
    CharClass::ascii_letter()
        .range('À', 'Ö')
        .range('Ø', 'ö')
        .range('ø', 'ÿ')
        .chars("ŒœŸ")
}

/// A standalone run of one to four digits, as in `du 8 Mai 1945`.
///
/// Five digits never fit, so a postal code cannot be read as part of a name.
fn name_digits() -> Node {
    Node::seq([
        Node::WordBoundary,
        digits(1, MAX_NAME_DIGITS),
        Node::WordBoundary,
    ])
}

/// 3 to 40 name units, starting on a word boundary with a letter and ending on a letter.
///
/// With `allow_digits`, a digit group counts as one unit and may also end the name.
pub fn street_name(allow_digits: bool) -> Node {
    let (unit, last) = if allow_digits {
        (
            Node::alt([Node::class(street_name_class()), name_digits()]),
            Node::alt([Node::class(name_letters()), name_digits()]),
        )
    } else {
        (
            Node::class(street_name_class()),
            Node::class(name_letters()),
        )
    };
    Node::seq([
        Node::WordBoundary,
        Node::class(name_letters()),
        Node::repeat(unit, MIN_STREET_NAME - 2, MAX_STREET_NAME - 2),
        last,
    ])
}

/// Exactly five digits.
pub fn postal_code() -> Node {
    Node::seq([Node::WordBoundary, digits(5, 5), Node::WordBoundary])
}

//! Grammar Intermediate Representation
//!
//!     Every address sub-grammar is built as a tree of [`Node`]s instead of a formatted regex
//!     string. The tree is validated (bounded repetition, unique capture names, nesting depth)
//!     and only then rendered into the regex crate's syntax by [`Node::render`].
//!
//!     Repetition is always bounded: [`Node::Repeat`] carries both a minimum and a maximum,
//!     so an unbounded quantifier (`*`, `+`, `{n,}`) cannot be expressed at all.

use std::fmt::Write as _;

/// One item of a character class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassItem {
    Char(char),
    Range(char, char),
}

/// A positive character class such as `[A-Za-z0-9]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharClass {
    items: Vec<ClassItem>,
}

impl CharClass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every char of `chars`, skipping duplicates.
    pub fn chars(mut self, chars: &str) -> Self {
        for c in chars.chars() {
            self = self.char(c);
        }
        self
    }

    pub fn char(mut self, c: char) -> Self {
        let item = ClassItem::Char(c);
        if !self.items.contains(&item) {
            self.items.push(item);
        }
        self
    }

    pub fn range(mut self, from: char, to: char) -> Self {
        let item = ClassItem::Range(from, to);
        if !self.items.contains(&item) {
            self.items.push(item);
        }
        self
    }

    /// ASCII digits `0-9`.
    pub fn digit() -> Self {
        Self::new().range('0', '9')
    }

    /// ASCII letters `A-Za-z`.
    pub fn ascii_letter() -> Self {
        Self::new().range('A', 'Z').range('a', 'z')
    }

    pub fn items(&self) -> &[ClassItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn render(&self, out: &mut String) {
        out.push('[');
        for item in &self.items {
            match item {
                ClassItem::Char(c) => push_escaped(out, *c),
                ClassItem::Range(from, to) => {
                    push_escaped(out, *from);
                    out.push('-');
                    push_escaped(out, *to);
                }
            }
        }
        out.push(']');
    }
}

fn push_escaped(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// A grammar node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Matches the empty string.
    Empty,
    /// Literal text, escaped on render.
    Literal(String),
    Class(CharClass),
    Sequence(Vec<Node>),
    /// Ordered alternation: earlier branches are preferred.
    Alternation(Vec<Node>),
    /// Greedy bounded repetition `{min,max}`.
    Repeat { node: Box<Node>, min: u32, max: u32 },
    /// Named capture; the name becomes an output field key.
    Capture { name: String, node: Box<Node> },
    /// Zero-width word-boundary assertion.
    WordBoundary,
}

impl Node {
    pub fn literal(text: impl Into<String>) -> Self {
        Node::Literal(text.into())
    }

    pub fn class(class: CharClass) -> Self {
        Node::Class(class)
    }

    pub fn seq(nodes: impl IntoIterator<Item = Node>) -> Self {
        Node::Sequence(nodes.into_iter().collect())
    }

    pub fn alt(nodes: impl IntoIterator<Item = Node>) -> Self {
        Node::Alternation(nodes.into_iter().collect())
    }

    pub fn repeat(node: Node, min: u32, max: u32) -> Self {
        Node::Repeat {
            node: Box::new(node),
            min,
            max,
        }
    }

    pub fn optional(node: Node) -> Self {
        Self::repeat(node, 0, 1)
    }

    pub fn capture(name: impl Into<String>, node: Node) -> Self {
        Node::Capture {
            name: name.into(),
            node: Box::new(node),
        }
    }

    /// Capture names in the order they appear when rendered.
    pub fn capture_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.walk(&mut |node| {
            if let Node::Capture { name, .. } = node {
                names.push(name.as_str());
            }
        });
        names
    }

    /// Largest repetition bound anywhere in the tree.
    pub fn max_repeat(&self) -> u32 {
        let mut max = 0;
        self.walk(&mut |node| {
            if let Node::Repeat { max: bound, .. } = node {
                max = max.max(*bound);
            }
        });
        max
    }

    /// Nesting depth of group-forming nodes.
    pub fn depth(&self) -> u32 {
        match self {
            Node::Empty | Node::Literal(_) | Node::Class(_) | Node::WordBoundary => 0,
            Node::Sequence(nodes) => nodes.iter().map(Node::depth).max().unwrap_or(0),
            Node::Alternation(nodes) => 1 + nodes.iter().map(Node::depth).max().unwrap_or(0),
            Node::Repeat { node, .. } | Node::Capture { node, .. } => 1 + node.depth(),
        }
    }

    /// Pre-order traversal.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(self);
        match self {
            Node::Sequence(nodes) | Node::Alternation(nodes) => {
                for node in nodes {
                    node.walk(visit);
                }
            }
            Node::Repeat { node, .. } | Node::Capture { node, .. } => node.walk(visit),
            Node::Empty | Node::Literal(_) | Node::Class(_) | Node::WordBoundary => {}
        }
    }

    /// Render into regex crate syntax.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Node::Empty => {}
            Node::Literal(text) => out.push_str(&regex::escape(text)),
            Node::Class(class) => class.render(out),
            Node::Sequence(nodes) => {
                for node in nodes {
                    node.render_into(out);
                }
            }
            Node::Alternation(nodes) => {
                out.push_str("(?:");
                for (i, node) in nodes.iter().enumerate() {
                    if i > 0 {
                        out.push('|');
                    }
                    node.render_into(out);
                }
                out.push(')');
            }
            Node::Repeat { node, min, max } => {
                if node.is_atom() {
                    node.render_into(out);
                } else {
                    out.push_str("(?:");
                    node.render_into(out);
                    out.push(')');
                }
                match (min, max) {
                    (0, 1) => out.push('?'),
                    (min, max) if min == max => {
                        let _ = write!(out, "{{{min}}}");
                    }
                    (min, max) => {
                        let _ = write!(out, "{{{min},{max}}}");
                    }
                }
            }
            Node::Capture { name, node } => {
                let _ = write!(out, "(?P<{name}>");
                node.render_into(out);
                out.push(')');
            }
            Node::WordBoundary => out.push_str(r"\b"),
        }
    }

    /// Whether a quantifier can follow the rendered node without an extra group.
    fn is_atom(&self) -> bool {
        match self {
            Node::Class(_) | Node::Alternation(_) | Node::Capture { .. } => true,
            Node::Literal(text) => text.chars().count() == 1,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_escaped_literals() {
        assert_eq!(Node::literal("a.b").render(), r"a\.b");
        assert_eq!(Node::literal("#").render(), r"\#");
    }

    #[test]
    fn renders_classes_with_ranges() {
        let class = CharClass::digit().chars(" -");
        assert_eq!(Node::class(class).render(), r"[0-9 \-]");
    }

    #[test]
    fn class_skips_duplicates() {
        let class = CharClass::new().chars("aab");
        assert_eq!(class.items().len(), 2);
    }

    #[test]
    fn groups_multi_char_repeats() {
        let node = Node::repeat(Node::literal("ab"), 1, 5);
        assert_eq!(node.render(), "(?:ab){1,5}");
        let node = Node::repeat(Node::class(CharClass::digit()), 5, 5);
        assert_eq!(node.render(), "[0-9]{5}");
        let node = Node::optional(Node::literal("."));
        assert_eq!(node.render(), r"\.?");
    }

    #[test]
    fn renders_alternation_and_capture() {
        let node = Node::capture(
            "kind",
            Node::alt([Node::literal("a"), Node::literal("b")]),
        );
        assert_eq!(node.render(), "(?P<kind>(?:a|b))");
    }

    #[test]
    fn collects_capture_names_in_order() {
        let node = Node::seq([
            Node::capture("first", Node::literal("a")),
            Node::optional(Node::capture("second", Node::literal("b"))),
        ]);
        assert_eq!(node.capture_names(), vec!["first", "second"]);
    }

    #[test]
    fn measures_depth_and_repeats() {
        let node = Node::seq([
            Node::WordBoundary,
            Node::repeat(Node::alt([Node::literal("x"), Node::literal("y")]), 1, 40),
        ]);
        assert_eq!(node.depth(), 2);
        assert_eq!(node.max_repeat(), 40);
    }
}

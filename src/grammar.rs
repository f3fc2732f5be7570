//! Grammar construction primitives.
//!
//! Sub-grammars are assembled as [`ir::Node`] trees and compiled once through
//! [`compiler::compile`].

pub mod compiler;
pub mod ir;

pub use compiler::{compile, GrammarOptions};
pub use ir::{CharClass, ClassItem, Node};

//! Common types shared between the sources, the tokenizer and the parser

use serde_json::Value;

/// The quotation mark wrapping quoted cells
pub(crate) const QUOTE: char = '"';

/// One unit produced by a character source
///
/// `End` is terminal: once a source yields it, every later read yields it
/// again without consuming anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Char(char),
    End,
}

impl Unit {
    /// Returns the character, or `None` for `End`
    pub fn as_char(&self) -> Option<char> {
        match self {
            Unit::Char(c) => Some(*c),
            Unit::End => None,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Unit::End)
    }
}

impl From<char> for Unit {
    fn from(c: char) -> Self {
        Unit::Char(c)
    }
}

/// Ordered cell values of a single CSV row (always at least one cell)
pub type Row = Vec<String>;

/// A row keyed by header names, in header order
///
/// Every value is a `Value::String`.
pub type RowObject = serde_json::Map<String, Value>;

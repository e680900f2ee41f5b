//! Error types for every layer of the reader stack.

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// An error returned by a character source.
#[derive(Debug, Clone, Error)]
pub enum ReadError {
    /// Upstream delivered a chunk which is not text. The source is torn down.
    #[error("Expected a text chunk, received {found}")]
    ChunkType { found: &'static str },
    /// Another read on the same source has not completed yet.
    #[error("Another read operation is not yet completed")]
    ConcurrentRead,
    /// The upstream producer failed.
    #[error("Upstream failure: {0}")]
    Upstream(Arc<io::Error>),
}

/// An error returned to the producer feeding a stream source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The source was closed, finished or poisoned and accepts no more chunks.
    #[error("Character source is no longer accepting chunks")]
    Closed,
    /// The chunk was rejected and the source has been torn down.
    #[error("Expected a text chunk, sent {found}")]
    ChunkType { found: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushbackError {
    /// `End` can only be pushed back after it has been read from the source.
    #[error("Can not push `End` at this state")]
    UnableToPushEnd,
}

/// An error that can occur while splitting the input into CSV tokens.
#[derive(Debug, Clone, Error)]
pub enum TokenizeError {
    /// The configured column separator is not a single character.
    #[error("Column separator's length must be 1, got {length}")]
    InvalidSeparator { length: usize },
    /// A quotation mark appeared inside an unquoted cell.
    #[error("Quotation mark characters must be wrapped and escaped by double quotation marks")]
    UnescapedQuote,
    /// The input ended inside a quoted cell.
    #[error("No ending found for quoted string before the end")]
    UnterminatedQuote,
    /// A quoted string was requested but the next character is not a quote.
    #[error("Expected quotation character (\")")]
    ExpectedQuote,
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Pushback(#[from] PushbackError),
}

/// An error that can occur while reading rows through a [`Parser`](crate::Parser).
#[derive(Debug, Clone, Error)]
pub enum ParserError {
    /// `set_header` or `read_header` called when a header exists.
    #[error("A header was already defined/read")]
    HeaderAlreadySet,
    /// Rows were requested before any header was defined.
    #[error("No header was defined/read yet")]
    MissingHeader,
    /// The document ended before a header line.
    #[error("No header found before end of the CSV document")]
    NoHeaderBeforeEnd,
    /// A row has a different number of cells than the header.
    #[error("Row {row} has {found} columns, header has {expected}")]
    InvalidColumns {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
}

//! # streamcsv_rs
//!
//! A streaming CSV reader which consumes its input character by character.
//!
//! The input flows through four layers, each owning the one below it:
//!
//! - a [`CharSource`]: [`StringSource`] for in-memory text, [`StreamSource`]
//!   for chunks pushed by a producer, with bounded buffering and backpressure
//! - a [`PushbackBuffer`], which can return the last unit read to the stream
//! - the [`Tokenizer`], splitting characters into cells, separators and rows
//! - the [`Parser`], which manages the header and validates every row
//!
//! Quoted cells follow the usual CSV rules: a doubled quote is a literal
//! quote, separators and line breaks inside quotes are content. Rows end at
//! `\n`, `\r` or `\r\n`, and a blank line ends the document.
//!
//! ## Example
//!
//! ```rust
//! use streamcsv_rs::{Parser, StringSource, TokenizerOptions};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), streamcsv_rs::ParserError> {
//! let source = StringSource::new("email,text\nalice@example.com,\"Hi, Alice\"\n");
//! let mut parser = Parser::from_source(source, &TokenizerOptions::default())?;
//!
//! parser.read_header().await?;
//! assert!(parser.has_header_columns(&["email", "text"]));
//!
//! let row = parser.read_row_object().await?.unwrap();
//! assert_eq!(
//!     serde_json::Value::Object(row),
//!     json!({"email": "alice@example.com", "text": "Hi, Alice"})
//! );
//! assert_eq!(parser.read_row().await?, None);
//! # Ok(())
//! # }
//! ```

mod common;
mod error;
mod parser;
mod pushback;
mod source;
mod stream;
mod tokenizer;

// Re-export public API
pub use common::{Row, RowObject, Unit};
pub use error::{ParserError, PushbackError, ReadError, SendError, TokenizeError};
pub use parser::{parse_str, Parser};
pub use pushback::PushbackBuffer;
pub use source::{CharSource, StringSource};
pub use stream::{
    Chunk, ChunkSender, StreamOptions, StreamSource, DEFAULT_CAPACITY, DEFAULT_READ_SIZE,
};
pub use tokenizer::{Line, Token, Tokenizer, TokenizerOptions};

//! CSV tokenizer: characters to cells, separators and rows

use serde::Deserialize;
use tracing::trace;

use crate::common::{Row, Unit, QUOTE};
use crate::error::TokenizeError;
use crate::pushback::PushbackBuffer;
use crate::source::CharSource;

/// Tokenizer configuration options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenizerOptions {
    /// Column separator, exactly one character (default: ",")
    pub column_separator: String,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            column_separator: ",".to_string(),
        }
    }
}

/// A single CSV token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Content of a cell, already unquoted and unescaped
    Content(String),
    ColumnSeparator,
    RowSeparator,
    End,
}

/// Result of reading one line of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Row(Row),
    /// End of the document: the input is exhausted or a blank line was found
    CsvEnd,
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    separator: char,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self { separator: ',' }
    }
}

impl Tokenizer {
    pub fn new(options: &TokenizerOptions) -> Result<Self, TokenizeError> {
        let mut chars = options.column_separator.chars();
        match (chars.next(), chars.next()) {
            (Some(separator), None) => Ok(Self { separator }),
            _ => Err(TokenizeError::InvalidSeparator {
                length: options.column_separator.chars().count(),
            }),
        }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    fn is_terminator(&self, c: char) -> bool {
        c == self.separator || c == '\r' || c == '\n'
    }

    /// Reads the cells of the next row.
    ///
    /// Returns [`Line::CsvEnd`] if the row has no cell at all, i.e. the input
    /// is exhausted or the line is blank. A separator directly before the end
    /// of the row, after another separator or at the start of the row stands
    /// for an empty cell.
    pub async fn read_row<S: CharSource>(
        &self,
        reader: &mut PushbackBuffer<S>,
    ) -> Result<Line, TokenizeError> {
        let mut cells = Row::new();
        let mut was_separator = false;

        loop {
            match self.read_token(reader).await? {
                Token::RowSeparator | Token::End => {
                    if was_separator {
                        cells.push(String::new());
                    } else if cells.is_empty() {
                        return Ok(Line::CsvEnd);
                    }
                    break;
                }
                Token::ColumnSeparator => {
                    if cells.is_empty() || was_separator {
                        cells.push(String::new());
                    }
                    was_separator = true;
                }
                Token::Content(content) => {
                    cells.push(content);
                    was_separator = false;
                }
            }
        }

        trace!(cells = cells.len(), "row read");
        Ok(Line::Row(cells))
    }

    /// Reads one token.
    ///
    /// The unit terminating a raw cell is pushed back so that it is read
    /// again as a token of its own.
    pub async fn read_token<S: CharSource>(
        &self,
        reader: &mut PushbackBuffer<S>,
    ) -> Result<Token, TokenizeError> {
        let c = match reader.read().await? {
            Unit::End => return Ok(Token::End),
            Unit::Char(c) => c,
        };

        if c == QUOTE {
            return Ok(Token::Content(Self::read_quoted_content(reader).await?));
        }
        if c == self.separator {
            return Ok(Token::ColumnSeparator);
        }
        match c {
            '\r' => {
                let next = reader.read().await?;
                if next != Unit::Char('\n') {
                    reader.push(next)?;
                }
                Ok(Token::RowSeparator)
            }
            '\n' => Ok(Token::RowSeparator),
            _ => {
                let mut content = String::from(c);
                loop {
                    match reader.read().await? {
                        Unit::Char(c) if !self.is_terminator(c) => {
                            if c == QUOTE {
                                return Err(TokenizeError::UnescapedQuote);
                            }
                            content.push(c);
                        }
                        terminator => {
                            reader.push(terminator)?;
                            break;
                        }
                    }
                }
                Ok(Token::Content(content))
            }
        }
    }

    /// Reads a quoted string, opening quote included, and returns its
    /// unescaped content
    pub async fn read_quoted<S: CharSource>(
        reader: &mut PushbackBuffer<S>,
    ) -> Result<String, TokenizeError> {
        match reader.read().await? {
            Unit::Char(QUOTE) => Self::read_quoted_content(reader).await,
            _ => Err(TokenizeError::ExpectedQuote),
        }
    }

    /// Reads what follows an opening quote up to the closing one. A doubled
    /// quote is one literal quote; separators and line breaks are content.
    async fn read_quoted_content<S: CharSource>(
        reader: &mut PushbackBuffer<S>,
    ) -> Result<String, TokenizeError> {
        let mut content = String::new();
        loop {
            match reader.read().await? {
                Unit::Char(QUOTE) => match reader.read().await? {
                    Unit::Char(QUOTE) => content.push(QUOTE),
                    next => {
                        reader.push(next)?;
                        return Ok(content);
                    }
                },
                Unit::Char(c) => content.push(c),
                Unit::End => return Err(TokenizeError::UnterminatedQuote),
            }
        }
    }
}

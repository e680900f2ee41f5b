//! Header-aware CSV row parser

use serde_json::Value;
use tracing::debug;

use crate::common::{Row, RowObject};
use crate::error::{ParserError, TokenizeError};
use crate::pushback::PushbackBuffer;
use crate::source::{CharSource, StringSource};
use crate::tokenizer::{Line, Tokenizer, TokenizerOptions};

/// Parse an in-memory CSV document whose first line is the header
pub async fn parse_str(
    input: &str,
    options: &TokenizerOptions,
) -> Result<Vec<RowObject>, ParserError> {
    let mut parser = Parser::from_source(StringSource::new(input), options)?;
    parser.read_header().await?;

    let mut rows = Vec::new();
    while let Some(row) = parser.read_row_object().await? {
        rows.push(row);
    }
    Ok(rows)
}

/// Reads rows of a CSV document and validates them against a header.
///
/// The header is either read from the document with [`read_header`] or
/// given with [`set_header`]; once defined it never changes. Every row
/// returned afterwards has as many cells as the header.
///
/// [`read_header`]: Parser::read_header
/// [`set_header`]: Parser::set_header
#[derive(Debug)]
pub struct Parser<S> {
    tokenizer: Tokenizer,
    source: PushbackBuffer<S>,
    header: Option<Row>,
    rows_read: usize,
}

impl<S: CharSource> Parser<S> {
    pub fn new(tokenizer: Tokenizer, source: PushbackBuffer<S>) -> Self {
        Self {
            tokenizer,
            source,
            header: None,
            rows_read: 0,
        }
    }

    pub fn from_source(source: S, options: &TokenizerOptions) -> Result<Self, TokenizeError> {
        Ok(Self::new(Tokenizer::new(options)?, PushbackBuffer::new(source)))
    }

    /// Closes the underlying source
    pub fn close(&mut self) {
        self.source.close();
    }

    pub fn header(&self) -> Result<&Row, ParserError> {
        self.header.as_ref().ok_or(ParserError::MissingHeader)
    }

    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }

    /// Checks that every one of `columns` is present in the header.
    /// Returns false if no header is defined yet.
    pub fn has_header_columns(&self, columns: &[&str]) -> bool {
        match &self.header {
            Some(header) => columns
                .iter()
                .all(|column| header.iter().any(|name| name == column)),
            None => false,
        }
    }

    pub fn set_header<I, T>(&mut self, header: I) -> Result<&mut Self, ParserError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        if self.header.is_some() {
            return Err(ParserError::HeaderAlreadySet);
        }
        self.install_header(header.into_iter().map(Into::into).collect());
        Ok(self)
    }

    /// Reads the next row as the header, taking its cells as column names
    pub async fn read_header(&mut self) -> Result<(), ParserError> {
        if self.header.is_some() {
            return Err(ParserError::HeaderAlreadySet);
        }
        match self.tokenizer.read_row(&mut self.source).await? {
            Line::CsvEnd => Err(ParserError::NoHeaderBeforeEnd),
            Line::Row(row) => {
                self.rows_read += 1;
                self.install_header(row);
                Ok(())
            }
        }
    }

    fn install_header(&mut self, header: Row) {
        debug!(columns = header.len(), "header defined");
        self.header = Some(header);
    }

    /// Reads the next row, or `None` at the end of the document.
    ///
    /// Fails with [`ParserError::InvalidColumns`] if the row does not have
    /// as many cells as the header.
    pub async fn read_row(&mut self) -> Result<Option<Row>, ParserError> {
        let expected = self.header()?.len();
        let row = match self.tokenizer.read_row(&mut self.source).await? {
            Line::CsvEnd => return Ok(None),
            Line::Row(row) => row,
        };
        self.rows_read += 1;

        if row.len() != expected {
            return Err(ParserError::InvalidColumns {
                row: self.rows_read,
                expected,
                found: row.len(),
            });
        }
        Ok(Some(row))
    }

    /// Does what [`read_row`](Parser::read_row) does, pairing the cells with
    /// the column names of the header
    pub async fn read_row_object(&mut self) -> Result<Option<RowObject>, ParserError> {
        let row = match self.read_row().await? {
            Some(row) => row,
            None => return Ok(None),
        };
        let header = self.header()?;

        let mut obj = RowObject::new();
        for (name, value) in header.iter().zip(row) {
            obj.insert(name.clone(), Value::String(value));
        }
        Ok(Some(obj))
    }
}

//! The character source abstraction and its in-memory implementation

use async_trait::async_trait;

use crate::common::Unit;
use crate::error::ReadError;

/// Something which produces characters one at a time.
///
/// Implementations must keep returning [`Unit::End`] once they have returned
/// it. Reads are sequential: a source serves one consumer.
#[async_trait]
pub trait CharSource: Send {
    /// Reads the next character, or `End` when the source is exhausted.
    async fn read(&mut self) -> Result<Unit, ReadError>;

    /// Releases the resources held by the source.
    fn close(&mut self);
}

#[async_trait]
impl<S: CharSource + ?Sized> CharSource for Box<S> {
    async fn read(&mut self) -> Result<Unit, ReadError> {
        (**self).read().await
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Deterministic cursor over a fixed string
#[derive(Debug, Clone)]
pub struct StringSource {
    source: String,
    offset: usize,
}

impl StringSource {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            offset: 0,
        }
    }

    /// Returns the not yet read part of the string
    pub fn remaining(&self) -> &str {
        &self.source[self.offset..]
    }
}

impl From<&str> for StringSource {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<String> for StringSource {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

#[async_trait]
impl CharSource for StringSource {
    async fn read(&mut self) -> Result<Unit, ReadError> {
        match self.remaining().chars().next() {
            Some(c) => {
                self.offset += c.len_utf8();
                Ok(Unit::Char(c))
            }
            None => Ok(Unit::End),
        }
    }

    /// Nothing to release for an in-memory string
    fn close(&mut self) {}
}

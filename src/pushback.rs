//! One-unit pushback on top of a character source

use async_trait::async_trait;

use crate::common::Unit;
use crate::error::{PushbackError, ReadError};
use crate::source::CharSource;

/// Wraps a [`CharSource`] and lets the caller return the unit it just read.
///
/// At most one unit is held back. Pushing a character replaces whatever
/// would have been read next, so a caller may also rewrite the stream.
/// `End` stays buffered once it has been read from the source, which is what
/// makes pushing it back legal.
#[derive(Debug)]
pub struct PushbackBuffer<S> {
    source: S,
    pending: Option<Unit>,
}

impl<S: CharSource> PushbackBuffer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            pending: None,
        }
    }

    /// Reads the pushed back unit if any, otherwise the next one of the source
    pub async fn read(&mut self) -> Result<Unit, ReadError> {
        match self.pending {
            Some(Unit::End) => Ok(Unit::End),
            Some(unit) => {
                self.pending = None;
                Ok(unit)
            }
            None => {
                let unit = self.source.read().await?;
                if unit.is_end() {
                    self.pending = Some(Unit::End);
                }
                Ok(unit)
            }
        }
    }

    /// Makes `unit` the next one to be read.
    ///
    /// Fails for `End` unless the source has been exhausted and that `End`
    /// has been read already.
    pub fn push(&mut self, unit: Unit) -> Result<(), PushbackError> {
        match unit {
            Unit::End if self.pending != Some(Unit::End) => Err(PushbackError::UnableToPushEnd),
            Unit::End => Ok(()),
            c => {
                self.pending = Some(c);
                Ok(())
            }
        }
    }

    /// Closes the wrapped source
    pub fn close(&mut self) {
        self.source.close();
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

#[async_trait]
impl<S: CharSource> CharSource for PushbackBuffer<S> {
    async fn read(&mut self) -> Result<Unit, ReadError> {
        PushbackBuffer::read(self).await
    }

    fn close(&mut self) {
        PushbackBuffer::close(self)
    }
}

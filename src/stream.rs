//! Chunk-fed character source with bounded buffering.
//!
//! A [`StreamSource`] is fed by a producer through its [`ChunkSender`].
//! Characters of delivered chunks wait in a queue until they are read. When
//! the queue holds `capacity` characters or more, the sender stops accepting
//! chunks until the consumer has read enough to fall below that threshold.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{watch, Notify};
use tracing::{debug, warn};

use crate::common::Unit;
use crate::error::{ReadError, SendError};
use crate::source::CharSource;

/// Default number of buffered characters at which delivery is paused
pub const DEFAULT_CAPACITY: usize = 4096;

/// Default number of bytes requested per read by [`StreamSource::from_reader`]
pub const DEFAULT_READ_SIZE: usize = 8192;

/// Stream source configuration options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    /// Buffered characters at which upstream delivery pauses (default: 4096, minimum: 1)
    pub capacity: usize,
    /// Bytes per read when pumping an `AsyncRead` (default: 8192)
    pub read_size: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            read_size: DEFAULT_READ_SIZE,
        }
    }
}

/// A piece of input delivered by the producer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Text(String),
    Binary(Vec<u8>),
}

impl Chunk {
    fn kind(&self) -> &'static str {
        match self {
            Chunk::Text(_) => "text",
            Chunk::Binary(_) => "binary",
        }
    }
}

impl From<&str> for Chunk {
    fn from(text: &str) -> Self {
        Chunk::Text(text.to_string())
    }
}

impl From<String> for Chunk {
    fn from(text: String) -> Self {
        Chunk::Text(text)
    }
}

#[derive(Debug)]
enum Status {
    Open,
    Finished,
    Closed,
    Failed(ReadError),
}

#[derive(Debug)]
struct State {
    queue: VecDeque<char>,
    status: Status,
    reading: bool,
}

impl State {
    /// Outcome of a read at this instant, `None` if it has to wait
    fn poll_unit(&mut self) -> Option<Result<Unit, ReadError>> {
        match &self.status {
            Status::Failed(err) => Some(Err(err.clone())),
            Status::Closed => Some(Ok(Unit::End)),
            Status::Open | Status::Finished => match self.queue.pop_front() {
                Some(c) => Some(Ok(Unit::Char(c))),
                None if matches!(self.status, Status::Finished) => Some(Ok(Unit::End)),
                None => None,
            },
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<State>,
    available: Notify,
    paused: watch::Sender<bool>,
    capacity: usize,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pauses or resumes delivery according to the buffered count
    fn control_flow(&self, buffered: usize) {
        let pause = buffered >= self.capacity;
        self.paused.send_if_modified(|paused| {
            if *paused == pause {
                return false;
            }
            *paused = pause;
            if pause {
                debug!(buffered, capacity = self.capacity, "pausing upstream delivery");
            } else {
                debug!(buffered, capacity = self.capacity, "resuming upstream delivery");
            }
            true
        });
    }

    /// Moves an open source to a terminal status and wakes everyone up
    fn terminate(&self, status: Status) {
        let mut state = self.lock();
        if !matches!(state.status, Status::Open | Status::Finished) {
            return;
        }
        if matches!(state.status, Status::Finished) && matches!(status, Status::Finished) {
            return;
        }
        match &status {
            Status::Failed(err) => warn!(error = %err, "character source poisoned"),
            Status::Closed => debug!(discarded = state.queue.len(), "character source closed"),
            Status::Finished => debug!(buffered = state.queue.len(), "upstream finished"),
            Status::Open => {}
        }
        if !matches!(status, Status::Finished) {
            state.queue.clear();
        }
        state.status = status;
        self.control_flow(state.queue.len());
        drop(state);
        self.available.notify_one();
    }
}

/// Character source reading from chunks pushed by a producer
#[derive(Debug)]
pub struct StreamSource {
    shared: Arc<Shared>,
}

/// Producer half of a [`StreamSource`]
///
/// Dropping the sender signals completion.
#[derive(Debug)]
pub struct ChunkSender {
    shared: Arc<Shared>,
}

/// Clears the in-flight flag when a read completes or is dropped
struct ReadGuard<'a> {
    shared: &'a Shared,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.shared.lock().reading = false;
    }
}

impl StreamSource {
    /// Creates a connected source and producer pair
    pub fn channel(options: &StreamOptions) -> (StreamSource, ChunkSender) {
        let (paused, _) = watch::channel(false);
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                status: Status::Open,
                reading: false,
            }),
            available: Notify::new(),
            paused,
            capacity: options.capacity.max(1),
        });
        (
            StreamSource {
                shared: Arc::clone(&shared),
            },
            ChunkSender { shared },
        )
    }

    /// Creates a source fed from a UTF-8 encoded reader.
    ///
    /// The reader is pumped by a task spawned on the current Tokio runtime,
    /// so this must be called from within one.
    pub fn from_reader<R>(reader: R, options: &StreamOptions) -> StreamSource
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (source, sender) = Self::channel(options);
        tokio::spawn(pump(reader, sender, options.read_size.max(4)));
        source
    }

    /// Reads the next character.
    ///
    /// Waits until a character is queued, the producer finishes or fails, or
    /// the source is closed. Fails with [`ReadError::ConcurrentRead`] if
    /// another read is still in flight.
    pub async fn read(&self) -> Result<Unit, ReadError> {
        let _guard = self.begin_read()?;
        loop {
            {
                let mut state = self.shared.lock();
                if let Some(outcome) = state.poll_unit() {
                    self.shared.control_flow(state.queue.len());
                    return outcome;
                }
            }
            self.shared.available.notified().await;
        }
    }

    fn begin_read(&self) -> Result<ReadGuard<'_>, ReadError> {
        let mut state = self.shared.lock();
        if state.reading {
            return Err(ReadError::ConcurrentRead);
        }
        state.reading = true;
        Ok(ReadGuard {
            shared: &self.shared,
        })
    }

    /// Discards buffered characters; pending and future reads yield `End`
    pub fn close(&self) {
        self.shared.terminate(Status::Closed);
    }

    /// Number of characters delivered but not read yet
    pub fn buffered(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Whether upstream delivery is currently paused
    pub fn is_paused(&self) -> bool {
        *self.shared.paused.borrow()
    }

    /// Buffered characters at which delivery pauses, never less than 1
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

impl Drop for StreamSource {
    fn drop(&mut self) {
        StreamSource::close(self);
    }
}

#[async_trait]
impl CharSource for StreamSource {
    async fn read(&mut self) -> Result<Unit, ReadError> {
        StreamSource::read(self).await
    }

    fn close(&mut self) {
        StreamSource::close(self)
    }
}

impl ChunkSender {
    /// Delivers a chunk, waiting first while delivery is paused.
    ///
    /// A [`Chunk::Binary`] tears the source down.
    pub async fn send(&mut self, chunk: impl Into<Chunk>) -> Result<(), SendError> {
        let chunk = chunk.into();
        let mut flow = self.shared.paused.subscribe();
        let resumed = flow.wait_for(|paused| !*paused).await.is_ok();
        if !resumed || self.is_closed() {
            return Err(SendError::Closed);
        }

        let text = match chunk {
            Chunk::Text(text) => text,
            other => {
                let found = other.kind();
                self.shared
                    .terminate(Status::Failed(ReadError::ChunkType { found }));
                return Err(SendError::ChunkType { found });
            }
        };

        let mut state = self.shared.lock();
        if !matches!(state.status, Status::Open) {
            return Err(SendError::Closed);
        }
        if text.is_empty() {
            return Ok(());
        }
        state.queue.extend(text.chars());
        self.shared.control_flow(state.queue.len());
        drop(state);
        self.shared.available.notify_one();
        Ok(())
    }

    /// Signals that no more chunks will be delivered
    pub fn finish(self) {
        drop(self);
    }

    /// Signals an upstream failure; every read from now on returns it
    pub fn fail(self, err: io::Error) {
        self.shared
            .terminate(Status::Failed(ReadError::Upstream(Arc::new(err))));
    }

    /// Whether the source stopped accepting chunks
    pub fn is_closed(&self) -> bool {
        !matches!(self.shared.lock().status, Status::Open)
    }
}

impl Drop for ChunkSender {
    fn drop(&mut self) {
        self.shared.terminate(Status::Finished);
    }
}

async fn pump<R>(mut reader: R, mut sender: ChunkSender, read_size: usize)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; read_size];
    let mut pending = Vec::new();
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(n) => n,
            Err(err) => return sender.fail(err),
        };
        if n == 0 {
            break;
        }
        pending.extend_from_slice(&buf[..n]);
        let text = match take_utf8_prefix(&mut pending) {
            Ok(text) => text,
            Err(err) => return sender.fail(err),
        };
        if sender.send(Chunk::Text(text)).await.is_err() {
            return;
        }
    }
    if !pending.is_empty() {
        return sender.fail(io::Error::new(
            io::ErrorKind::InvalidData,
            "stream ended inside a UTF-8 sequence",
        ));
    }
    sender.finish();
}

/// Splits off the longest valid UTF-8 prefix, keeping an incomplete trailing
/// sequence in `pending` for the next read
fn take_utf8_prefix(pending: &mut Vec<u8>) -> io::Result<String> {
    let valid = match std::str::from_utf8(pending) {
        Ok(_) => pending.len(),
        Err(err) if err.error_len().is_none() => err.valid_up_to(),
        Err(err) => return Err(io::Error::new(io::ErrorKind::InvalidData, err)),
    };
    let rest = pending.split_off(valid);
    let bytes = std::mem::replace(pending, rest);
    String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

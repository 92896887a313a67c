//! I/O primitives for the engine's interactive console.
//!
//! The engine writes unstructured text to both stdout and stderr. Each stream
//! is pumped by a background task into one chunk channel, so the reader sees a
//! single merged stream, as it would through a terminal.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::{timeout, timeout_at, Instant};

use crate::{Error, Result};

/// Maximum bytes forwarded per read.
pub const READ_CHUNK_SIZE: usize = 8192;

/// Capacity of the chunk channel between pump tasks and the reader.
const CHUNK_CHANNEL_CAPACITY: usize = 256;

/// Result of waiting for one of several sentinels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Sentinel `index` matched; `before` is everything read ahead of it.
    Matched { index: usize, before: String },
    /// No sentinel appeared within the deadline.
    Timeout { before: String },
    /// All output streams closed without a sentinel.
    Eof { before: String },
}

impl ReadOutcome {
    /// Text captured ahead of the outcome.
    pub fn before(&self) -> &str {
        match self {
            ReadOutcome::Matched { before, .. }
            | ReadOutcome::Timeout { before }
            | ReadOutcome::Eof { before } => before,
        }
    }
}

/// Accumulates console output and scans it for sentinels.
#[derive(Debug)]
pub struct ConsoleReader {
    rx: mpsc::Receiver<Vec<u8>>,
    buffer: Vec<u8>,
    eof: bool,
}

impl ConsoleReader {
    /// Create a reader over a chunk channel.
    pub fn new(rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            buffer: Vec::with_capacity(READ_CHUNK_SIZE),
            eof: false,
        }
    }

    /// Create a chunk channel sized for console traffic.
    pub fn channel() -> (mpsc::Sender<Vec<u8>>, mpsc::Receiver<Vec<u8>>) {
        mpsc::channel(CHUNK_CHANNEL_CAPACITY)
    }

    /// Whether every output stream has closed.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Read until one of `patterns` appears, the deadline passes, or output ends.
    ///
    /// When several patterns are present, the one that starts earliest in the
    /// stream wins. Matched text and everything before it are consumed; bytes
    /// after the match stay buffered for the next call.
    pub async fn expect(&mut self, patterns: &[&str], wait: Duration) -> Result<ReadOutcome> {
        let deadline = Instant::now() + wait;
        let overlap = patterns.iter().map(|p| p.len()).max().unwrap_or(0).saturating_sub(1);
        // Bytes below this offset hold no complete match.
        let mut scanned: usize = 0;

        loop {
            let from = scanned.saturating_sub(overlap);
            if let Some((index, pos)) = earliest_match(&self.buffer, patterns, from) {
                let end = pos + patterns[index].len();
                let before = String::from_utf8_lossy(&self.buffer[..pos]).into_owned();
                self.buffer.drain(..end);
                return Ok(ReadOutcome::Matched { index, before });
            }

            scanned = self.buffer.len();

            if self.eof {
                return Ok(ReadOutcome::Eof {
                    before: self.take_buffer(),
                });
            }

            match timeout_at(deadline, self.rx.recv()).await {
                Ok(Some(chunk)) => self.buffer.extend_from_slice(&chunk),
                Ok(None) => self.eof = true,
                Err(_) => {
                    return Ok(ReadOutcome::Timeout {
                        before: self.take_buffer(),
                    })
                }
            }
        }
    }

    /// Discard buffered and pending output.
    ///
    /// Keeps reading until no chunk arrives for `grace` or output ends.
    /// Returns the number of bytes discarded.
    pub async fn drain(&mut self, grace: Duration) -> usize {
        let mut discarded = self.buffer.len();
        self.buffer.clear();

        while !self.eof {
            match timeout(grace, self.rx.recv()).await {
                Ok(Some(chunk)) => discarded += chunk.len(),
                Ok(None) => self.eof = true,
                Err(_) => break,
            }
        }
        discarded
    }

    fn take_buffer(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        text
    }
}

/// Find the pattern whose first occurrence at or after `from` starts earliest.
///
/// Ties go to the pattern listed first. Positions are offsets into `haystack`.
fn earliest_match(haystack: &[u8], patterns: &[&str], from: usize) -> Option<(usize, usize)> {
    let window = haystack.get(from..)?;
    patterns
        .iter()
        .enumerate()
        .filter_map(|(index, pattern)| {
            find(window, pattern.as_bytes()).map(|pos| (index, from + pos))
        })
        .min_by_key(|&(index, pos)| (pos, index))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Writes request lines to the engine stdin.
pub struct ConsoleWriter {
    inner: Box<dyn AsyncWrite + Send + Sync + Unpin>,
}

impl ConsoleWriter {
    pub fn new(inner: impl AsyncWrite + Send + Sync + Unpin + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Write `line` followed by a newline and flush.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
        self.inner.write_all(&bytes).await.map_err(Error::io)?;
        self.inner.flush().await.map_err(Error::io)?;
        Ok(())
    }
}

impl std::fmt::Debug for ConsoleWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleWriter").finish_non_exhaustive()
    }
}

/// The engine's console: a line writer plus a sentinel-scanning reader.
#[derive(Debug)]
pub struct Console {
    pub reader: ConsoleReader,
    pub writer: ConsoleWriter,
    in_flight: bool,
}

impl Console {
    pub fn new(reader: ConsoleReader, writer: ConsoleWriter) -> Self {
        Self {
            reader,
            writer,
            in_flight: false,
        }
    }

    /// Whether a request was written and its outcome never classified.
    ///
    /// Stays set when an exchange is abandoned mid-way (its future dropped),
    /// in which case the engine may still answer the old request.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub(crate) fn begin_exchange(&mut self) {
        self.in_flight = true;
    }

    pub(crate) fn end_exchange(&mut self) {
        self.in_flight = false;
    }
}

/// Forward everything read from `source` into `tx` until EOF, error, or the
/// receiver goes away.
pub(crate) async fn pump<R>(mut source: R, tx: mpsc::Sender<Vec<u8>>, stream: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    loop {
        match source.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(stream, error = %e, "engine output read failed");
                break;
            }
        }
    }
    tracing::trace!(stream, "engine output closed");
}

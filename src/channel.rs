//! The request/response exchange with the engine console.
//!
//! One exchange is: drain stale output, write one normalized line, then read
//! until the prompt (success), the out-of-memory warning, a timeout, or the end
//! of the output streams. The channel never retries; recovery belongs to
//! [`Session`](crate::Session).

use std::fmt;
use std::time::Duration;

use crate::config::SessionConfig;
use crate::error::{FailureKind, SessionFailure};
use crate::process::{Console, ReadOutcome};
use crate::Result;

/// Start of the XML declaration that opens every engine response.
///
/// Includes `version` so processing instructions such as `<?xml-stylesheet`
/// are not mistaken for a declaration.
pub const XML_DECLARATION: &str = "<?xml version";

/// A single line of input for the engine.
///
/// Line breaks are replaced with spaces and surrounding whitespace is trimmed,
/// since the console treats each line as a separate command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Request(String);

impl Request {
    pub fn new(text: &str) -> Self {
        Request(normalize(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Request {
    fn from(text: &str) -> Self {
        Request::new(text)
    }
}

/// Replace `\r` and `\n` with spaces and trim.
pub fn normalize(text: &str) -> String {
    text.replace(['\r', '\n'], " ").trim().to_string()
}

/// The engine's markup payload, starting at its XML declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse(String);

impl RawResponse {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RawResponse {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Collapse whitespace runs and cut everything before the first XML declaration.
///
/// Returns `None` when the captured text contains no declaration.
pub fn extract_xml(captured: &str) -> Option<RawResponse> {
    let collapsed = captured.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .find(XML_DECLARATION)
        .map(|start| RawResponse(collapsed[start..].to_string()))
}

/// Per-request timeout: `max(floor, chars / chars_per_second)`.
pub fn adaptive_timeout(char_len: usize, floor: Duration, chars_per_second: f64) -> Duration {
    let scaled = char_len as f64 / chars_per_second;
    floor.max(Duration::from_secs_f64(scaled))
}

/// Drives one exchange at a time over an engine console.
#[derive(Debug, Clone)]
pub struct SessionChannel {
    prompt: String,
    oom_pattern: String,
    timeout_floor: Duration,
    chars_per_second: f64,
    drain_grace: Duration,
    log_payloads: bool,
}

impl SessionChannel {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            prompt: config.prompt.clone(),
            oom_pattern: config.oom_pattern.clone(),
            timeout_floor: config.timeout_floor,
            chars_per_second: config.chars_per_second,
            drain_grace: config.drain_grace,
            log_payloads: config.log_payloads,
        }
    }

    /// The timeout this channel applies to `request`.
    pub fn timeout_for(&self, request: &Request) -> Duration {
        adaptive_timeout(request.char_len(), self.timeout_floor, self.chars_per_second)
    }

    /// Send one request and wait for its response payload.
    ///
    /// Failures come back as [`Error::Session`](crate::Error::Session) carrying
    /// the request and the output captured so far. I/O errors on the write side
    /// are returned as [`Error::Io`](crate::Error::Io).
    pub async fn send(&self, console: &mut Console, request: &Request) -> Result<RawResponse> {
        let stale = console.reader.drain(self.drain_grace).await;
        if stale > 0 {
            tracing::debug!(bytes = stale, "discarded stale engine output");
        }

        console.begin_exchange();
        console.writer.send_line(request.as_str()).await?;

        let timeout = self.timeout_for(request);
        tracing::debug!(chars = request.char_len(), ?timeout, "sent request");

        let outcome = console
            .reader
            .expect(&[self.prompt.as_str(), self.oom_pattern.as_str()], timeout)
            .await?;
        console.end_exchange();

        let (kind, output) = match outcome {
            ReadOutcome::Matched { index: 0, before } => {
                if self.log_payloads {
                    tracing::trace!(output = %before, "engine response");
                }
                return match extract_xml(&before) {
                    Some(raw) => Ok(raw),
                    None => Err(self
                        .fail(
                            FailureKind::MalformedResponse("no XML declaration in response".into()),
                            request,
                            before,
                        )
                        .into()),
                };
            }
            ReadOutcome::Matched { before, .. } => (FailureKind::OutOfMemory, before),
            ReadOutcome::Timeout { before } => {
                console.reader.drain(self.drain_grace).await;
                (FailureKind::Timeout(timeout), before)
            }
            ReadOutcome::Eof { before } => (FailureKind::ProcessTerminated, before),
        };

        Err(self.fail(kind, request, output).into())
    }

    fn fail(&self, kind: FailureKind, request: &Request, output: String) -> SessionFailure {
        tracing::warn!(
            error = %kind,
            input = %request.as_str().chars().take(200).collect::<String>(),
            output = %output.chars().take(200).collect::<String>(),
            "engine exchange failed"
        );
        SessionFailure::new(kind, request.as_str(), output)
    }
}

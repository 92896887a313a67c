use std::time::Duration;

/// Errors that can occur when driving a CoreNLP engine.
///
/// Errors are organized by category:
/// - Configuration errors: detected at `build()` time
/// - Launch errors: the engine could not be spawned or never became ready
/// - IO errors: communication failures with the subprocess
/// - Session failures: a single exchange failed (see [`SessionFailure`])
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // -------------------------------------------------------------------------
    // Configuration errors (detected at build() time)
    // -------------------------------------------------------------------------
    /// A required configuration file (e.g. the engine properties) is missing.
    #[error("configuration not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration provided to builder.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -------------------------------------------------------------------------
    // Launch errors
    // -------------------------------------------------------------------------
    /// Engine launcher binary not found.
    #[error("engine launcher not found: {program}")]
    EngineNotFound { program: String },

    /// Failed to spawn the engine subprocess.
    #[error("failed to spawn engine process: {0}")]
    ProcessSpawn(#[source] std::io::Error),

    /// A warm-up marker was not observed in time.
    #[error("engine did not report {marker:?} within {timeout:?}")]
    WarmupTimeout {
        marker: String,
        timeout: Duration,
        output: String,
    },

    /// The engine exited while it was still warming up.
    #[error("engine exited while waiting for {marker:?}")]
    WarmupTerminated { marker: String, output: String },

    // -------------------------------------------------------------------------
    // IO errors
    // -------------------------------------------------------------------------
    /// IO error communicating with the engine subprocess.
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // Runtime errors
    // -------------------------------------------------------------------------
    /// A request/response exchange failed.
    #[error(transparent)]
    Session(#[from] SessionFailure),

    /// No engine process is currently running.
    #[error("engine process is not running")]
    NotRunning,
}

/// A specialized Result type for libcorenlp operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an IO error.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io(source)
    }

    /// Check if this error prevented a session from starting at all.
    pub fn is_launch_error(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound { .. }
                | Error::InvalidConfig(_)
                | Error::EngineNotFound { .. }
                | Error::ProcessSpawn(_)
                | Error::WarmupTimeout { .. }
                | Error::WarmupTerminated { .. }
        )
    }

    /// Check if the engine process must be restarted before the next request.
    pub fn requires_restart(&self) -> bool {
        match self {
            Error::Session(failure) => failure.kind.requires_restart(),
            Error::Io(_) | Error::NotRunning => true,
            _ => false,
        }
    }

    /// The session failure carried by this error, if any.
    pub fn failure(&self) -> Option<&SessionFailure> {
        match self {
            Error::Session(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// Classification of a failed exchange.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// No sentinel was seen before the adaptive timeout expired.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// The engine's output stream closed mid-request.
    #[error("engine process terminated abnormally while parsing")]
    ProcessTerminated,
    /// The engine reported that it ran out of memory on this request.
    #[error("engine ran out of memory while processing the request")]
    OutOfMemory,
    /// The payload did not have the expected structure.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl FailureKind {
    /// Whether this failure leaves the engine process unusable.
    pub fn requires_restart(&self) -> bool {
        !matches!(self, FailureKind::MalformedResponse(_))
    }
}

/// A failed exchange, with the request and whatever output was captured.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} (input: {:?})", preview(.request))]
pub struct SessionFailure {
    /// What went wrong.
    pub kind: FailureKind,
    /// The normalized request text that was sent.
    pub request: String,
    /// Output captured before the failure was classified.
    pub output: String,
}

impl SessionFailure {
    pub fn new(kind: FailureKind, request: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            kind,
            request: request.into(),
            output: output.into(),
        }
    }
}

/// First 100 characters of a request, for error messages.
fn preview(request: &str) -> String {
    request.chars().take(100).collect()
}

/// The engine's markup did not match the expected analysis structure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed response: {reason}")]
pub struct MalformedResponse {
    pub reason: String,
}

impl MalformedResponse {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

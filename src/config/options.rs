//! Console protocol constants and warm-up markers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Prompt printed by the engine when it is ready for the next line.
pub const DEFAULT_PROMPT: &str = "\nNLP> ";

/// Warning line the engine prints when a sentence could not be parsed for lack of memory.
///
/// This text is specific to the engine version; override it with
/// [`SessionConfigBuilder::oom_pattern`](super::SessionConfigBuilder::oom_pattern).
pub const DEFAULT_OOM_PATTERN: &str =
    "\nWARNING: Parsing of sentence failed, possibly because of out of memory.";

/// Marker printed once all annotators are loaded.
pub const INTERACTIVE_SHELL_MARKER: &str = "Entering interactive shell.";

/// Marker printed after each model finishes loading.
pub const MODEL_LOADED_MARKER: &str = "done.";

/// Lower bound for the per-request timeout.
pub const DEFAULT_TIMEOUT_FLOOR: Duration = Duration::from_secs(300);

/// Characters of input the engine is assumed to process per second.
pub const DEFAULT_CHARS_PER_SECOND: f64 = 3.0;

/// How long the drain step waits for more stale output before giving up.
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_millis(100);

/// How long to wait for the prompt after warm-up markers (or after spawn, if none).
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(600);

/// Polling interval while waiting for the engine to exit.
pub const DEFAULT_TERMINATE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long a graceful terminate waits before escalating to kill.
pub const DEFAULT_TERMINATE_GRACE: Duration = Duration::from_secs(1);

/// An output pattern expected during engine warm-up, with its own timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmupMarker {
    /// Literal text to wait for.
    pub pattern: String,
    /// How long to wait for it.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl WarmupMarker {
    pub fn new(pattern: impl Into<String>, timeout: Duration) -> Self {
        Self {
            pattern: pattern.into(),
            timeout,
        }
    }

    /// The load sequence of the default CoreNLP pipeline.
    ///
    /// POS tagger (~5s), three NER classifiers (~33s, ~60s, ~50s) and the PCFG
    /// parser (~3s), followed by the interactive shell banner.
    pub fn corenlp_defaults() -> Vec<Self> {
        let mut markers: Vec<Self> = [20, 200, 600, 600, 20]
            .into_iter()
            .map(|secs| Self::new(MODEL_LOADED_MARKER, Duration::from_secs(secs)))
            .collect();
        markers.push(Self::new(INTERACTIVE_SHELL_MARKER, Duration::from_secs(20)));
        markers
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

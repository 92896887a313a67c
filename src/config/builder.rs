//! Session configuration and builder.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use libcorenlp::config::{LaunchCommand, SessionConfig, WarmupMarker};
//!
//! let config = SessionConfig::builder()
//!     .launch(LaunchCommand::parse(
//!         "java -Xmx3g -cp corenlp.jar edu.stanford.nlp.pipeline.StanfordCoreNLP",
//!     )?)
//!     .warmup_markers(WarmupMarker::corenlp_defaults())
//!     .timeout_floor(Duration::from_secs(120))
//!     .build()?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::launch::LaunchCommand;
use super::options::{
    WarmupMarker, DEFAULT_CHARS_PER_SECOND, DEFAULT_DRAIN_GRACE, DEFAULT_OOM_PATTERN,
    DEFAULT_PROMPT, DEFAULT_READY_TIMEOUT, DEFAULT_TERMINATE_GRACE,
    DEFAULT_TERMINATE_POLL_INTERVAL, DEFAULT_TIMEOUT_FLOOR,
};
use crate::observer::WarmupObserver;
use crate::{Error, Result};

/// Configuration for a CoreNLP session.
///
/// Use [`SessionConfig::builder()`] to create a new configuration.
#[derive(Clone)]
pub struct SessionConfig {
    // Launch
    pub(crate) launch: LaunchCommand,
    pub(crate) working_directory: Option<PathBuf>,
    pub(crate) env_vars: HashMap<String, String>,

    // Warm-up
    pub(crate) warmup_markers: Vec<WarmupMarker>,
    pub(crate) ready_timeout: Duration,
    pub(crate) warmup_observer: Option<Arc<dyn WarmupObserver>>,

    // Console protocol
    pub(crate) prompt: String,
    pub(crate) oom_pattern: String,
    pub(crate) timeout_floor: Duration,
    pub(crate) chars_per_second: f64,
    pub(crate) drain_grace: Duration,

    // Termination
    pub(crate) terminate_poll_interval: Duration,
    pub(crate) terminate_grace: Duration,

    // Diagnostics
    pub(crate) log_payloads: bool,
}

impl SessionConfig {
    /// Create a new builder for SessionConfig.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Get the launch command.
    pub fn launch(&self) -> &LaunchCommand {
        &self.launch
    }

    /// Get the configured warm-up markers.
    pub fn warmup_markers(&self) -> &[WarmupMarker] {
        &self.warmup_markers
    }

    /// Get the warm-up observer if set.
    pub fn warmup_observer(&self) -> Option<&Arc<dyn WarmupObserver>> {
        self.warmup_observer.as_ref()
    }

    /// Get the success prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Get the out-of-memory warning pattern.
    pub fn oom_pattern(&self) -> &str {
        &self.oom_pattern
    }

    /// Get the timeout floor.
    pub fn timeout_floor(&self) -> Duration {
        self.timeout_floor
    }

    /// Get the working directory if set.
    pub fn working_directory(&self) -> Option<&PathBuf> {
        self.working_directory.as_ref()
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("launch", &self.launch)
            .field("working_directory", &self.working_directory)
            .field("env_vars", &self.env_vars)
            .field("warmup_markers", &self.warmup_markers)
            .field("ready_timeout", &self.ready_timeout)
            .field("warmup_observer", &self.warmup_observer.is_some())
            .field("prompt", &self.prompt)
            .field("oom_pattern", &self.oom_pattern)
            .field("timeout_floor", &self.timeout_floor)
            .field("chars_per_second", &self.chars_per_second)
            .field("drain_grace", &self.drain_grace)
            .field("terminate_poll_interval", &self.terminate_poll_interval)
            .field("terminate_grace", &self.terminate_grace)
            .field("log_payloads", &self.log_payloads)
            .finish()
    }
}

/// Builder for [`SessionConfig`].
///
/// Validation happens in [`build()`](SessionConfigBuilder::build); the engine
/// itself is only spawned by [`Session::start`](crate::Session::start).
#[derive(Clone)]
pub struct SessionConfigBuilder {
    launch: Option<LaunchCommand>,
    working_directory: Option<PathBuf>,
    env_vars: HashMap<String, String>,
    warmup_markers: Vec<WarmupMarker>,
    ready_timeout: Duration,
    warmup_observer: Option<Arc<dyn WarmupObserver>>,
    prompt: String,
    oom_pattern: String,
    timeout_floor: Duration,
    chars_per_second: f64,
    drain_grace: Duration,
    terminate_poll_interval: Duration,
    terminate_grace: Duration,
    log_payloads: bool,
}

impl Default for SessionConfigBuilder {
    fn default() -> Self {
        Self {
            launch: None,
            working_directory: None,
            env_vars: HashMap::new(),
            warmup_markers: Vec::new(),
            ready_timeout: DEFAULT_READY_TIMEOUT,
            warmup_observer: None,
            prompt: DEFAULT_PROMPT.to_string(),
            oom_pattern: DEFAULT_OOM_PATTERN.to_string(),
            timeout_floor: DEFAULT_TIMEOUT_FLOOR,
            chars_per_second: DEFAULT_CHARS_PER_SECOND,
            drain_grace: DEFAULT_DRAIN_GRACE,
            terminate_poll_interval: DEFAULT_TERMINATE_POLL_INTERVAL,
            terminate_grace: DEFAULT_TERMINATE_GRACE,
            log_payloads: false,
        }
    }
}

impl fmt::Debug for SessionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfigBuilder")
            .field("launch", &self.launch)
            .field("warmup_markers", &self.warmup_markers.len())
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}

impl SessionConfigBuilder {
    // -------------------------------------------------------------------------
    // Launch
    // -------------------------------------------------------------------------

    /// Command used to start the engine (required).
    pub fn launch(mut self, command: LaunchCommand) -> Self {
        self.launch = Some(command);
        self
    }

    /// Working directory for the engine process.
    pub fn working_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(path.into());
        self
    }

    /// Add/override environment variable for the engine process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    // -------------------------------------------------------------------------
    // Warm-up
    // -------------------------------------------------------------------------

    /// Markers to wait for, in order, before looking for the prompt.
    pub fn warmup_markers(mut self, markers: impl IntoIterator<Item = WarmupMarker>) -> Self {
        self.warmup_markers = markers.into_iter().collect();
        self
    }

    /// How long to wait for the first prompt once warm-up markers are done.
    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Receive warm-up progress callbacks.
    pub fn warmup_observer(mut self, observer: Arc<dyn WarmupObserver>) -> Self {
        self.warmup_observer = Some(observer);
        self
    }

    // -------------------------------------------------------------------------
    // Console protocol
    // -------------------------------------------------------------------------

    /// Prompt that marks a completed exchange.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Warning line that marks an out-of-memory failure.
    pub fn oom_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.oom_pattern = pattern.into();
        self
    }

    /// Minimum per-request timeout.
    pub fn timeout_floor(mut self, floor: Duration) -> Self {
        self.timeout_floor = floor;
        self
    }

    /// Input characters per second used to scale the per-request timeout.
    pub fn chars_per_second(mut self, rate: f64) -> Self {
        self.chars_per_second = rate;
        self
    }

    /// Quiet period that ends the stale-output drain before each request.
    pub fn drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    // -------------------------------------------------------------------------
    // Termination
    // -------------------------------------------------------------------------

    /// Interval between liveness checks while terminating.
    pub fn terminate_poll_interval(mut self, interval: Duration) -> Self {
        self.terminate_poll_interval = interval;
        self
    }

    /// How long a graceful terminate waits before escalating to kill.
    pub fn terminate_grace(mut self, grace: Duration) -> Self {
        self.terminate_grace = grace;
        self
    }

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------

    /// Log full engine payloads at trace level.
    pub fn log_payloads(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    // -------------------------------------------------------------------------
    // Build
    // -------------------------------------------------------------------------

    /// Build the configuration.
    ///
    /// This validates:
    /// - A launch command is set
    /// - The rate is positive and the sentinels are non-empty
    /// - The working directory exists if set
    pub fn build(self) -> Result<SessionConfig> {
        let launch = self
            .launch
            .ok_or_else(|| Error::InvalidConfig("launch command is required".into()))?;

        if !(self.chars_per_second.is_finite() && self.chars_per_second > 0.0) {
            return Err(Error::InvalidConfig(
                "chars_per_second must be positive".into(),
            ));
        }
        if self.prompt.is_empty() {
            return Err(Error::InvalidConfig("prompt must not be empty".into()));
        }
        if self.oom_pattern.is_empty() {
            return Err(Error::InvalidConfig("oom_pattern must not be empty".into()));
        }
        if let Some(marker) = self.warmup_markers.iter().find(|m| m.pattern.is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "warm-up marker with timeout {:?} has an empty pattern",
                marker.timeout
            )));
        }
        if self.terminate_poll_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "terminate_poll_interval must be non-zero".into(),
            ));
        }

        if let Some(ref dir) = self.working_directory {
            if !dir.exists() {
                return Err(Error::InvalidConfig(format!(
                    "working directory does not exist: {}",
                    dir.display()
                )));
            }
        }

        Ok(SessionConfig {
            launch,
            working_directory: self.working_directory,
            env_vars: self.env_vars,
            warmup_markers: self.warmup_markers,
            ready_timeout: self.ready_timeout,
            warmup_observer: self.warmup_observer,
            prompt: self.prompt,
            oom_pattern: self.oom_pattern,
            timeout_floor: self.timeout_floor,
            chars_per_second: self.chars_per_second,
            drain_grace: self.drain_grace,
            terminate_poll_interval: self.terminate_poll_interval,
            terminate_grace: self.terminate_grace,
            log_payloads: self.log_payloads,
        })
    }
}

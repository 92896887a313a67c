//! Warm-up observer trait and implementations.

/// Observer for engine warm-up events.
///
/// # Implementation Notes
///
/// - Implementations must be lightweight; they run inside the startup read loop.
/// - Methods have default empty implementations for selective observation.
pub trait WarmupObserver: Send + Sync {
    /// Called after the warm-up marker at `index` (zero-based) was observed.
    ///
    /// # Arguments
    ///
    /// * `index` - Position of the marker in the configured sequence
    /// * `total` - Number of configured markers
    /// * `pattern` - The marker text that matched (e.g. `"done."`)
    fn on_marker(&self, index: usize, total: usize, pattern: &str) {
        let _ = (index, total, pattern);
    }

    /// Called once the interactive prompt has been seen and the engine accepts requests.
    fn on_ready(&self, pid: Option<u32>) {
        let _ = pid;
    }
}

/// Simple observer that reports warm-up progress using tracing.
#[derive(Debug, Clone, Default)]
pub struct LoggingObserver {
    level: LogLevel,
}

/// Log level for LoggingObserver.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogLevel {
    /// Log at trace level.
    Trace,
    /// Log at debug level (default).
    #[default]
    Debug,
    /// Log at info level.
    Info,
}

impl LoggingObserver {
    /// Create a new logging observer with debug level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging observer with a specific level.
    pub fn with_level(level: LogLevel) -> Self {
        Self { level }
    }
}

impl WarmupObserver for LoggingObserver {
    fn on_marker(&self, index: usize, total: usize, pattern: &str) {
        let step = index + 1;
        match self.level {
            LogLevel::Trace => tracing::trace!(step, total, %pattern, "loading models"),
            LogLevel::Debug => tracing::debug!(step, total, %pattern, "loading models"),
            LogLevel::Info => tracing::info!(step, total, %pattern, "loading models"),
        }
    }

    fn on_ready(&self, pid: Option<u32>) {
        match self.level {
            LogLevel::Trace => tracing::trace!(?pid, "engine ready"),
            LogLevel::Debug => tracing::debug!(?pid, "engine ready"),
            LogLevel::Info => tracing::info!(?pid, "engine ready"),
        }
    }
}

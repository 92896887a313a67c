//! Configuration for a CoreNLP session.
//!
//! This module provides:
//!
//! - [`SessionConfig`] and [`SessionConfigBuilder`] for configuring a session
//! - [`LaunchCommand`] and [`CoreNlpLaunch`] for describing how to start the engine
//! - [`WarmupMarker`] and the console protocol defaults
//!
//! # Example
//!
//! ```ignore
//! use libcorenlp::config::{CoreNlpLaunch, SessionConfig, WarmupMarker};
//!
//! let launch = CoreNlpLaunch::new("default.properties")
//!     .memory("3g")
//!     .classpath(jars)
//!     .build()?;
//!
//! let config = SessionConfig::builder()
//!     .launch(launch)
//!     .warmup_markers(WarmupMarker::corenlp_defaults())
//!     .build()?;
//! ```

pub mod builder;
pub mod launch;
pub mod options;

pub use builder::{SessionConfig, SessionConfigBuilder};
pub use launch::{CoreNlpLaunch, LaunchCommand, CORENLP_MAIN_CLASS};
pub use options::{
    WarmupMarker, DEFAULT_CHARS_PER_SECOND, DEFAULT_DRAIN_GRACE, DEFAULT_OOM_PATTERN,
    DEFAULT_PROMPT, DEFAULT_READY_TIMEOUT, DEFAULT_TERMINATE_GRACE,
    DEFAULT_TERMINATE_POLL_INTERVAL, DEFAULT_TIMEOUT_FLOOR, INTERACTIVE_SHELL_MARKER,
    MODEL_LOADED_MARKER,
};

//! Warm-up progress observation.
//!
//! Loading the engine's models can take minutes. This module provides the
//! [`WarmupObserver`] trait so callers can follow progress while a
//! [`Session`](crate::Session) starts or restarts. Rendering (progress bars,
//! spinners) is left to the caller; the crate only reports events.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use libcorenlp::{LaunchCommand, SessionConfig, WarmupMarker, WarmupObserver};
//!
//! struct Dots;
//!
//! impl WarmupObserver for Dots {
//!     fn on_marker(&self, _index: usize, _total: usize, _pattern: &str) {
//!         eprint!(".");
//!     }
//! }
//!
//! let config = SessionConfig::builder()
//!     .launch(LaunchCommand::parse(
//!         "java -cp corenlp.jar edu.stanford.nlp.pipeline.StanfordCoreNLP",
//!     )?)
//!     .warmup_markers(WarmupMarker::corenlp_defaults())
//!     .warmup_observer(Arc::new(Dots))
//!     .build()?;
//! ```

mod warmup;

pub use warmup::{LogLevel, LoggingObserver, WarmupObserver};

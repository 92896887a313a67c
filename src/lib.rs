//! # libcorenlp
//!
//! Async Rust driver for the Stanford CoreNLP interactive console.
//!
//! This library keeps one engine process warm and feeds it requests one line
//! at a time, supporting:
//! - Warm-up tracking with per-stage timeouts and progress callbacks
//! - Adaptive per-request timeouts and out-of-memory detection
//! - Automatic restart after a failed exchange
//! - Typed analysis results (tokens, parse, dependencies, entities)
//!
//! ## Quick Start
//!
//! ```ignore
//! use libcorenlp::{CoreNlpLaunch, Result, Session, SessionConfig, WarmupMarker};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let launch = CoreNlpLaunch::new("default.properties")
//!         .memory("3g")
//!         .classpath(["stanford-corenlp.jar", "stanford-corenlp-models.jar"])
//!         .build()?;
//!
//!     let config = SessionConfig::builder()
//!         .launch(launch)
//!         .warmup_markers(WarmupMarker::corenlp_defaults())
//!         .build()?;
//!
//!     let session = Session::start(config).await?;
//!     let result = session.analyze("Dr. Smith went to Washington.").await?;
//!     for token in &result.sentences[0].tokens {
//!         println!("{}\t{}\t{}", token.word, token.pos, token.ner);
//!     }
//!     session.shutdown().await
//! }
//! ```
//!
//! ## Batches
//!
//! ```ignore
//! use futures::StreamExt;
//!
//! let mut results = session.analyze_all(["First text.", "Second text."]);
//! while let Some(result) = results.next().await {
//!     match result {
//!         Ok(analysis) => println!("{} sentences", analysis.sentences.len()),
//!         Err(e) => eprintln!("failed: {e}"),
//!     }
//! }
//! ```
//!
//! ## Failures
//!
//! A failed exchange comes back as [`Error::Session`] carrying a
//! [`SessionFailure`]. The engine has already been restarted by then; the
//! request itself is never retried.
//!
//! ```ignore
//! use libcorenlp::{Error, FailureKind};
//!
//! match session.analyze(text).await {
//!     Err(Error::Session(f)) if f.kind == FailureKind::OutOfMemory => {
//!         // split the text and resubmit
//!     }
//!     other => { /* ... */ }
//! }
//! ```

pub mod channel;
pub mod config;
mod error;
pub mod observer;
pub mod process;
pub mod protocol;
mod session;
mod supervisor;

pub use error::{Error, FailureKind, MalformedResponse, Result, SessionFailure};

pub use session::Session;
pub use supervisor::ProcessSupervisor;

// Re-export commonly used config types at crate root
pub use config::{CoreNlpLaunch, LaunchCommand, SessionConfig, SessionConfigBuilder, WarmupMarker};

pub use channel::{RawResponse, Request, SessionChannel};

pub use observer::{LogLevel, LoggingObserver, WarmupObserver};

pub use process::EngineProcess;

pub use protocol::{transcode, AnalysisResult, Sentence, Token};

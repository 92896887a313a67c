//! Process management for the CoreNLP engine.
//!
//! This module handles spawning the engine and talking to its interactive
//! console. One engine process serves many requests, one at a time.
//!
//! # Architecture
//!
//! ```text
//! libcorenlp                          CoreNLP (JVM)
//! ┌──────────────┐                   ┌─────────────┐
//! │ ConsoleWriter│───stdin (line)───▶│             │
//! │ ConsoleReader│◀──stdout (text)───│  NLP>       │
//! │              │◀──stderr (logs)───│             │
//! └──────────────┘                   └─────────────┘
//! ```
//!
//! # Input Protocol
//!
//! - One request per line, newline-terminated, no embedded line breaks
//!
//! # Output Protocol
//!
//! Unstructured text. An exchange ends when the prompt (`"\nNLP> "`) appears,
//! when the engine prints its out-of-memory warning, when output stops for
//! longer than the request timeout, or when the streams close.

mod io;
mod spawn;

pub use io::{Console, ConsoleReader, ConsoleWriter, ReadOutcome, READ_CHUNK_SIZE};
pub use spawn::EngineProcess;

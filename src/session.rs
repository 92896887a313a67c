//! Request orchestration over one long-lived engine.
//!
//! This module provides [`Session`], the entry point for analyzing text. A
//! session starts the engine once, then runs each request as a single
//! exchange over its console. When an exchange fails, the engine is
//! restarted and the original failure is returned. The failed request is not
//! retried; the caller decides whether to resubmit.
//!
//! # Example
//!
//! ```ignore
//! use libcorenlp::{CoreNlpLaunch, Result, Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let launch = CoreNlpLaunch::new("corenlp.properties")
//!         .memory("3g")
//!         .classpath(["stanford-corenlp.jar", "stanford-corenlp-models.jar"])
//!         .build()?;
//!     let session = Session::start(SessionConfig::builder().launch(launch).build()?).await?;
//!
//!     let result = session.analyze("Dr. Smith went to Washington.").await?;
//!     println!("{} tokens", result.token_count());
//!
//!     session.shutdown().await
//! }
//! ```

use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use tokio::sync::Mutex;

use crate::channel::{RawResponse, Request, SessionChannel};
use crate::config::SessionConfig;
use crate::error::{FailureKind, SessionFailure};
use crate::protocol::{transcode, AnalysisResult};
use crate::supervisor::ProcessSupervisor;
use crate::Result;

/// A running engine plus the logic to talk to it.
///
/// # Thread Safety
///
/// `Session` is `Send + Sync` and can be shared across tasks. Concurrent
/// calls to [`analyze`](Self::analyze) are serialized internally, in the
/// order they acquire the session, since the console is half-duplex.
#[derive(Debug)]
pub struct Session {
    config: Arc<SessionConfig>,
    channel: SessionChannel,
    supervisor: Mutex<ProcessSupervisor>,
}

impl Session {
    /// Start the engine and wait until it is ready for requests.
    ///
    /// Fails with a launch error (see [`Error::is_launch_error`](crate::Error::is_launch_error))
    /// if the engine cannot be spawned or does not finish warm-up in time.
    pub async fn start(config: SessionConfig) -> Result<Self> {
        let config = Arc::new(config);
        let supervisor = ProcessSupervisor::start(config.clone()).await?;
        Ok(Self {
            channel: SessionChannel::new(&config),
            config,
            supervisor: Mutex::new(supervisor),
        })
    }

    /// Analyze `text` and return the structured result.
    ///
    /// A response that is not the expected XML shape fails with
    /// [`FailureKind::MalformedResponse`]. The engine stays up in that case.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult> {
        let raw = self.analyze_raw(text).await?;
        transcode(&raw).map_err(|e| {
            tracing::warn!(error = %e, "could not transcode engine response");
            SessionFailure::new(
                FailureKind::MalformedResponse(e.reason),
                Request::new(text).as_str(),
                raw.into_string(),
            )
            .into()
        })
    }

    /// Analyze `text` and return the engine's XML payload untouched.
    ///
    /// On any exchange failure the engine is restarted before the error is
    /// returned, so the next request starts from a clean process.
    pub async fn analyze_raw(&self, text: &str) -> Result<RawResponse> {
        let request = Request::new(text);
        let mut supervisor = self.supervisor.lock().await;
        supervisor.ensure_running().await?;

        let outcome = {
            let process = supervisor.process_mut()?;
            self.channel.send(process.console_mut(), &request).await
        };

        if let Err(err) = &outcome {
            tracing::info!(error = %err, "restarting engine after failed exchange");
            if let Err(restart) = supervisor.restart().await {
                tracing::error!(error = %restart, "engine restart failed");
            }
        }
        outcome
    }

    /// Analyze each text in order, one request at a time.
    ///
    /// A failed item is yielded as an `Err` and the stream carries on with
    /// the next text.
    pub fn analyze_all<'a, I>(&'a self, texts: I) -> impl Stream<Item = Result<AnalysisResult>> + 'a
    where
        I: IntoIterator + 'a,
        I::IntoIter: 'a,
        I::Item: AsRef<str> + 'a,
    {
        stream::iter(texts).then(move |text| async move { self.analyze(text.as_ref()).await })
    }

    /// Terminate the engine gracefully.
    pub async fn shutdown(self) -> Result<()> {
        let mut supervisor = self.supervisor.into_inner();
        tracing::info!(pid = ?supervisor.pid(), "shutting down engine");
        supervisor.terminate(false).await
    }

    /// Whether the engine process is currently running.
    pub async fn is_alive(&self) -> bool {
        self.supervisor.lock().await.is_alive()
    }

    /// Process ID of the current engine.
    pub async fn pid(&self) -> Option<u32> {
        self.supervisor.lock().await.pid()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Session>();
    }

    #[test]
    fn analyze_futures_are_send() {
        fn assert_send<T: Send>(_: &T) {}
        fn check(session: &Session) {
            assert_send(&session.analyze("x"));
            assert_send(&session.analyze_raw("x"));
        }
        let _ = check;
    }

    #[tokio::test]
    async fn start_fails_for_missing_engine() {
        let config = SessionConfig::builder()
            .launch(crate::config::LaunchCommand::new("/nonexistent/corenlp"))
            .build()
            .unwrap();
        let err = Session::start(config).await.unwrap_err();
        assert!(matches!(err, crate::Error::EngineNotFound { .. }));
    }
}

//! Engine lifecycle: start, terminate, restart.
//!
//! The supervisor exclusively owns at most one [`EngineProcess`]. A restart
//! replaces it as a unit; the old process is confirmed dead before the new
//! one is spawned, so stale output can never reach the next exchange.

use std::sync::Arc;
use std::time::Duration;

use crate::config::SessionConfig;
use crate::process::{EngineProcess, ReadOutcome};
use crate::{Error, Result};

/// Owns the engine process for one session.
#[derive(Debug)]
pub struct ProcessSupervisor {
    config: Arc<SessionConfig>,
    process: Option<EngineProcess>,
}

impl ProcessSupervisor {
    /// Spawn the engine and wait until it shows its prompt.
    ///
    /// Each configured warm-up marker must appear, in order, within its own
    /// timeout; then the prompt must appear within the ready timeout.
    pub async fn start(config: Arc<SessionConfig>) -> Result<Self> {
        let process = spawn_ready(&config).await?;
        Ok(Self {
            config,
            process: Some(process),
        })
    }

    /// Terminate the engine and wait until it is gone.
    ///
    /// A no-op when no process is running. The process stays owned by the
    /// supervisor until its exit is confirmed.
    pub async fn terminate(&mut self, force: bool) -> Result<()> {
        let Some(process) = self.process.as_mut() else {
            return Ok(());
        };
        let pid = process.pid();
        process
            .terminate(
                force,
                self.config.terminate_grace,
                self.config.terminate_poll_interval,
            )
            .await?;
        self.process = None;
        tracing::info!(?pid, force, "engine terminated");
        Ok(())
    }

    /// Force-terminate the current engine and start a fresh one.
    pub async fn restart(&mut self) -> Result<()> {
        tracing::info!(pid = ?self.pid(), "restarting engine");
        self.terminate(true).await?;
        self.process = Some(spawn_ready(&self.config).await?);
        Ok(())
    }

    /// Make sure a ready engine is available for the next exchange.
    ///
    /// Starts an engine if none is running (e.g. after a failed restart) and
    /// replaces one whose previous exchange was abandoned, since its late
    /// answer would otherwise be read as the next response.
    pub async fn ensure_running(&mut self) -> Result<()> {
        if let Some(process) = self.process.as_mut() {
            if process.console_mut().in_flight() {
                tracing::info!(pid = ?process.pid(), "previous exchange was abandoned");
            } else if process.is_alive() {
                return Ok(());
            }
        }
        self.restart().await
    }

    /// The running process, for one exchange.
    pub fn process_mut(&mut self) -> Result<&mut EngineProcess> {
        self.process.as_mut().ok_or(Error::NotRunning)
    }

    /// Whether an engine process exists and has not exited.
    pub fn is_alive(&mut self) -> bool {
        self.process.as_mut().is_some_and(|p| p.is_alive())
    }

    /// Process ID of the current engine.
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().and_then(EngineProcess::pid)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

/// Spawn a process and walk it through warm-up.
///
/// A process that fails warm-up is killed and reaped before the error is
/// returned.
async fn spawn_ready(config: &SessionConfig) -> Result<EngineProcess> {
    let mut process = EngineProcess::spawn(config)?;
    match warm_up(&mut process, config).await {
        Ok(()) => Ok(process),
        Err(err) => {
            tracing::debug!(pid = ?process.pid(), error = %err, "engine failed warm-up");
            if let Err(kill) = process
                .terminate(true, Duration::ZERO, config.terminate_poll_interval)
                .await
            {
                tracing::warn!(error = %kill, "could not confirm engine exit after failed warm-up");
            }
            Err(err)
        }
    }
}

async fn warm_up(process: &mut EngineProcess, config: &SessionConfig) -> Result<()> {
    let observer = config.warmup_observer();
    let total = config.warmup_markers.len();

    for (index, marker) in config.warmup_markers.iter().enumerate() {
        let outcome = process
            .console_mut()
            .reader
            .expect(&[marker.pattern.as_str()], marker.timeout)
            .await?;
        check_warmup(outcome, &marker.pattern, marker.timeout)?;
        if let Some(observer) = observer {
            observer.on_marker(index, total, &marker.pattern);
        }
    }

    let outcome = process
        .console_mut()
        .reader
        .expect(&[config.prompt()], config.ready_timeout)
        .await?;
    check_warmup(outcome, config.prompt(), config.ready_timeout)?;

    tracing::info!(pid = ?process.pid(), "engine ready");
    if let Some(observer) = observer {
        observer.on_ready(process.pid());
    }
    Ok(())
}

fn check_warmup(outcome: ReadOutcome, marker: &str, timeout: Duration) -> Result<()> {
    match outcome {
        ReadOutcome::Matched { .. } => Ok(()),
        ReadOutcome::Timeout { before } => Err(Error::WarmupTimeout {
            marker: marker.to_string(),
            timeout,
            output: before,
        }),
        ReadOutcome::Eof { before } => Err(Error::WarmupTerminated {
            marker: marker.to_string(),
            output: before,
        }),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::config::{LaunchCommand, WarmupMarker};
    use crate::observer::WarmupObserver;

    fn config_for(script: &str) -> crate::config::SessionConfigBuilder {
        SessionConfig::builder()
            .launch(LaunchCommand::new("sh").arg("-c").arg(script))
            .ready_timeout(Duration::from_secs(5))
            .terminate_poll_interval(Duration::from_millis(10))
    }

    #[derive(Default)]
    struct Counter {
        markers: AtomicUsize,
        ready: AtomicUsize,
    }

    impl WarmupObserver for Counter {
        fn on_marker(&self, _index: usize, _total: usize, _pattern: &str) {
            self.markers.fetch_add(1, Ordering::SeqCst);
        }

        fn on_ready(&self, _pid: Option<u32>) {
            self.ready.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn start_walks_warmup_markers() {
        let counter = Arc::new(Counter::default());
        let config = config_for(
            "echo 'Loading tagger ... done.' >&2; echo 'Loading NER ... done.' >&2; \
             echo 'Entering interactive shell.' >&2; sleep 0.1; printf '\\nNLP> '; exec cat",
        )
        .warmup_markers([
            WarmupMarker::new("done.", Duration::from_secs(5)),
            WarmupMarker::new("done.", Duration::from_secs(5)),
            WarmupMarker::new("Entering interactive shell.", Duration::from_secs(5)),
        ])
        .warmup_observer(counter.clone())
        .build()
        .unwrap();

        let mut supervisor = ProcessSupervisor::start(Arc::new(config)).await.unwrap();
        assert!(supervisor.is_alive());
        assert_eq!(counter.markers.load(Ordering::SeqCst), 3);
        assert_eq!(counter.ready.load(Ordering::SeqCst), 1);

        supervisor.terminate(false).await.unwrap();
        assert!(!supervisor.is_alive());
        assert!(matches!(supervisor.process_mut(), Err(Error::NotRunning)));

        // Idempotent.
        supervisor.terminate(true).await.unwrap();
    }

    #[tokio::test]
    async fn start_fails_when_marker_missing() {
        let config = config_for("printf 'no markers here'; exec sleep 30")
            .warmup_markers([WarmupMarker::new("done.", Duration::from_millis(500))])
            .build()
            .unwrap();

        let err = ProcessSupervisor::start(Arc::new(config)).await.unwrap_err();
        match err {
            Error::WarmupTimeout { marker, output, .. } => {
                assert_eq!(marker, "done.");
                assert_eq!(output, "no markers here");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_warmup_reaps_process() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("engine.pid");
        let config = config_for("echo $$ > \"$PID_FILE\"; exec sleep 30")
            .env("PID_FILE", pid_file.to_string_lossy())
            .warmup_markers([WarmupMarker::new("done.", Duration::from_millis(500))])
            .build()
            .unwrap();

        let err = ProcessSupervisor::start(Arc::new(config)).await.unwrap_err();
        assert!(matches!(err, Error::WarmupTimeout { .. }));

        let pid: libc::pid_t = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        // SAFETY: signal 0 only checks whether the pid exists.
        assert_eq!(unsafe { libc::kill(pid, 0) }, -1, "engine {pid} still running");
    }

    #[tokio::test]
    async fn interrupted_terminate_keeps_process() {
        let config = config_for("trap '' TERM; printf '\\nNLP> '; while :; do sleep 1; done")
            .terminate_grace(Duration::from_secs(5))
            .build()
            .unwrap();
        let mut supervisor = ProcessSupervisor::start(Arc::new(config)).await.unwrap();
        let pid = supervisor.pid();

        let interrupted =
            tokio::time::timeout(Duration::from_millis(50), supervisor.terminate(false)).await;
        assert!(interrupted.is_err());
        assert!(supervisor.is_alive());
        assert_eq!(supervisor.pid(), pid);

        supervisor.terminate(true).await.unwrap();
        assert!(supervisor.pid().is_none());
    }

    #[tokio::test]
    async fn ensure_running_replaces_engine_with_abandoned_exchange() {
        let config = config_for("printf '\\nNLP> '; exec cat").build().unwrap();
        let mut supervisor = ProcessSupervisor::start(Arc::new(config)).await.unwrap();
        let first = supervisor.pid();

        supervisor.ensure_running().await.unwrap();
        assert_eq!(supervisor.pid(), first);

        supervisor.process_mut().unwrap().console_mut().begin_exchange();
        supervisor.ensure_running().await.unwrap();
        assert_ne!(supervisor.pid(), first);
        assert!(!supervisor.process_mut().unwrap().console_mut().in_flight());

        supervisor.terminate(true).await.unwrap();
    }

    #[tokio::test]
    async fn start_fails_when_engine_exits() {
        let config = config_for("echo 'Error: could not load models'; exit 1")
            .build()
            .unwrap();

        let err = ProcessSupervisor::start(Arc::new(config)).await.unwrap_err();
        assert!(matches!(err, Error::WarmupTerminated { .. }));
        assert!(err.is_launch_error());
    }

    #[tokio::test]
    async fn restart_replaces_process() {
        let config = config_for("printf '\\nNLP> '; exec cat").build().unwrap();
        let mut supervisor = ProcessSupervisor::start(Arc::new(config)).await.unwrap();
        let first = supervisor.pid();

        supervisor.restart().await.unwrap();
        assert!(supervisor.is_alive());
        assert_ne!(supervisor.pid(), first);

        supervisor.terminate(true).await.unwrap();
        supervisor.ensure_running().await.unwrap();
        assert!(supervisor.is_alive());
        supervisor.terminate(true).await.unwrap();
    }
}

//! Engine process spawning and lifecycle management.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::{sleep, Instant};

use super::io::{pump, Console, ConsoleReader, ConsoleWriter};
use crate::config::SessionConfig;
use crate::{Error, Result};

/// A running engine process and its console.
///
/// # Cancellation
///
/// Dropping an `EngineProcess` will kill the subprocess if it's still running.
#[derive(Debug)]
pub struct EngineProcess {
    child: Child,
    console: Console,
}

impl EngineProcess {
    /// Spawn the engine described by `config` and attach to its streams.
    ///
    /// This does not wait for the engine to become ready; see
    /// [`ProcessSupervisor::start`](crate::ProcessSupervisor::start).
    pub fn spawn(config: &SessionConfig) -> Result<Self> {
        let launch = config.launch();
        let mut cmd = build_command(config);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::EngineNotFound {
                    program: launch.program().to_string(),
                }
            } else {
                Error::ProcessSpawn(e)
            }
        })?;

        let stdio = (child.stdin.take(), child.stdout.take(), child.stderr.take());
        let (stdin, stdout, stderr) = match stdio {
            (Some(stdin), Some(stdout), Some(stderr)) => (stdin, stdout, stderr),
            _ => {
                let _ = child.start_kill();
                return Err(Error::ProcessSpawn(std::io::Error::other(
                    "engine stdio was not captured",
                )));
            }
        };

        let (tx, rx) = ConsoleReader::channel();
        tokio::spawn(pump(stdout, tx.clone(), "stdout"));
        tokio::spawn(pump(stderr, tx, "stderr"));

        tracing::debug!(pid = ?child.id(), command = %launch, "spawned engine process");

        Ok(Self {
            child,
            console: Console::new(ConsoleReader::new(rx), ConsoleWriter::new(stdin)),
        })
    }

    /// Get the process ID, if the process has not been reaped.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Check whether the process is still running.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Mutable access to the console for one exchange.
    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Terminate the process and wait until it is confirmed dead.
    ///
    /// Without `force`, the engine gets a termination signal and `grace` to
    /// exit before termination escalates to kill. Kill is reissued every
    /// `poll_interval` until the process has exited.
    pub async fn terminate(
        &mut self,
        force: bool,
        grace: Duration,
        poll_interval: Duration,
    ) -> Result<()> {
        let pid = self.child.id();
        if !force {
            self.signal_terminate();
            let deadline = Instant::now() + grace;
            while Instant::now() < deadline {
                if self.child.try_wait().map_err(Error::io)?.is_some() {
                    tracing::debug!(?pid, "engine exited after termination signal");
                    return Ok(());
                }
                sleep(poll_interval).await;
            }
            tracing::debug!(?pid, ?grace, "engine ignored termination signal, killing");
        }

        loop {
            if let Some(status) = self.child.try_wait().map_err(Error::io)? {
                tracing::debug!(?pid, %status, "engine process exited");
                return Ok(());
            }
            if let Err(e) = self.child.start_kill() {
                tracing::debug!(?pid, error = %e, "kill request failed");
            }
            sleep(poll_interval).await;
        }
    }

    #[cfg(unix)]
    fn signal_terminate(&mut self) {
        if let Some(pid) = self.child.id() {
            // SAFETY: pid belongs to a child we own and have not reaped yet.
            let ret = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
            if ret != 0 {
                tracing::debug!(
                    pid,
                    error = %std::io::Error::last_os_error(),
                    "SIGTERM to engine failed"
                );
            }
        }
    }

    #[cfg(not(unix))]
    fn signal_terminate(&mut self) {
        let _ = self.child.start_kill();
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
    }
}

/// Build a tokio Command from the config.
fn build_command(config: &SessionConfig) -> Command {
    let launch = config.launch();
    let mut cmd = Command::new(launch.program());
    cmd.args(launch.arguments());

    if let Some(dir) = config.working_directory() {
        cmd.current_dir(dir);
    }
    for (key, value) in &config.env_vars {
        cmd.env(key, value);
    }

    cmd
}

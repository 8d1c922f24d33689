//! The process-launch collaborator.
//!
//! `!cmd` and shell-bodied user commands hand an argv to a
//! [`ProcessLauncher`]. Foreground launches block until the child exits;
//! background launches return as soon as the child is spawned and nobody
//! waits on the result except a reaper task.

use std::io;
use std::process::Stdio;

use tokio::process::Command;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

/// Outcome of a launch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launched {
    /// Foreground child exited with this code (-1 when killed by a signal).
    Finished(i32),
    /// Background child is running on its own.
    Detached,
}

/// Spawns external programs on behalf of the engine.
pub trait ProcessLauncher: Send + Sync {
    /// Launch `argv[0]` with the remaining arguments.
    fn spawn(&self, argv: &[String], background: bool) -> io::Result<Launched>;
}

/// Launcher backed by a private tokio runtime.
///
/// The engine itself is synchronous, so the runtime is owned here rather
/// than by the caller. One worker thread is enough to reap detached
/// children.
pub struct TokioLauncher {
    runtime: Runtime,
}

impl TokioLauncher {
    pub fn new() -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("excmd-launcher")
            .enable_all()
            .build()?;
        Ok(Self { runtime })
    }
}

impl ProcessLauncher for TokioLauncher {
    fn spawn(&self, argv: &[String], background: bool) -> io::Result<Launched> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty argv"))?;

        let mut cmd = Command::new(program);
        cmd.args(args);
        if background {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }

        // Child reaping registers with the runtime's driver.
        let mut child = {
            let _guard = self.runtime.enter();
            cmd.spawn()?
        };

        if background {
            let program = program.clone();
            debug!(%program, pid = ?child.id(), "spawned background job");
            self.runtime.spawn(async move {
                match child.wait().await {
                    Ok(status) => debug!(%program, %status, "background job exited"),
                    Err(e) => warn!(%program, error = %e, "failed to wait on background job"),
                }
            });
            return Ok(Launched::Detached);
        }

        let status = self.runtime.block_on(child.wait())?;
        Ok(Launched::Finished(status.code().unwrap_or(-1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_argv_is_rejected() {
        let launcher = TokioLauncher::new().unwrap();
        let err = launcher.spawn(&[], false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let launcher = TokioLauncher::new().unwrap();
        let argv = vec!["/nonexistent/excmd-test-program".to_string()];
        assert!(launcher.spawn(&argv, false).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn foreground_reports_exit_code() {
        let launcher = TokioLauncher::new().unwrap();
        let argv: Vec<String> = ["/bin/sh", "-c", "exit 3"].map(String::from).to_vec();
        assert_eq!(launcher.spawn(&argv, false).unwrap(), Launched::Finished(3));
    }

    #[cfg(unix)]
    #[test]
    fn background_returns_immediately() {
        let launcher = TokioLauncher::new().unwrap();
        let argv: Vec<String> = ["/bin/sh", "-c", "sleep 0"].map(String::from).to_vec();
        assert_eq!(launcher.spawn(&argv, true).unwrap(), Launched::Detached);
    }
}

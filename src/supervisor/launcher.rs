use async_trait::async_trait;
use parking_lot::Mutex;
use std::io;
use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::debug;

#[cfg(unix)]
use crate::error::{validate_pid, validate_pid_for_check};
#[cfg(unix)]
use nix::sys::signal::{self, Signal};

/// Windows `CREATE_NO_WINDOW`: the helper runs without a console.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Spawns the helper executable.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    async fn launch(&self, exe: &Path, args: &[String]) -> io::Result<Box<dyn ManagedChild>>;
}

/// A launched process, owned by exactly one supervisor.
#[async_trait]
pub trait ManagedChild: Send + Sync {
    fn id(&self) -> Option<u32>;

    /// Whether the OS still knows the process. Cheap; no signal is sent.
    fn is_alive(&self) -> bool;

    /// Liveness probe; the error describes why the process is gone.
    fn probe(&self) -> io::Result<()>;

    /// Ask the process to exit.
    fn terminate(&mut self) -> io::Result<()>;

    /// Force the process to exit.
    fn kill(&mut self) -> io::Result<()>;

    /// Wait for exit, returning the exit code when there is one.
    async fn wait(&mut self) -> io::Result<Option<i32>>;
}

/// Launches real processes through `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioLauncher;

#[async_trait]
impl ProcessLauncher for TokioLauncher {
    async fn launch(&self, exe: &Path, args: &[String]) -> io::Result<Box<dyn ManagedChild>> {
        let mut cmd = Command::new(exe);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        let child = cmd.spawn()?;
        let pid = child.id();
        debug!("Spawned {:?} {:?} (pid {:?})", exe, args, pid);

        Ok(Box::new(TokioChild {
            pid,
            child: Mutex::new(child),
        }))
    }
}

struct TokioChild {
    pid: Option<u32>,
    // Locked only from `&self` methods; `&mut self` methods use `get_mut`.
    child: Mutex<Child>,
}

impl TokioChild {
    fn exited(&self) -> io::Result<Option<std::process::ExitStatus>> {
        self.child.lock().try_wait()
    }
}

#[async_trait]
impl ManagedChild for TokioChild {
    fn id(&self) -> Option<u32> {
        self.pid
    }

    fn is_alive(&self) -> bool {
        self.pid.is_some() && matches!(self.exited(), Ok(None))
    }

    fn probe(&self) -> io::Result<()> {
        if let Some(status) = self.exited()? {
            return Err(io::Error::other(format!("process exited with {}", status)));
        }

        #[cfg(unix)]
        {
            let pid = self
                .pid
                .and_then(validate_pid_for_check)
                .ok_or_else(|| io::Error::other("process has no valid pid"))?;
            signal::kill(pid, None).map_err(io::Error::from)?;
        }

        Ok(())
    }

    fn terminate(&mut self) -> io::Result<()> {
        // A reaped pid may already belong to another process.
        if self.child.get_mut().try_wait()?.is_some() {
            return Ok(());
        }

        #[cfg(unix)]
        {
            if let Some(pid) = self.pid {
                let pid = validate_pid(pid)?;
                return signal::kill(pid, Signal::SIGTERM).map_err(io::Error::from);
            }
        }

        self.child.get_mut().start_kill()
    }

    fn kill(&mut self) -> io::Result<()> {
        self.child.get_mut().start_kill()
    }

    async fn wait(&mut self) -> io::Result<Option<i32>> {
        let status = self.child.get_mut().wait().await?;
        Ok(status.code())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn terminate_after_reaped_exit_sends_no_signal() {
        let mut child = TokioLauncher
            .launch(Path::new("true"), &[])
            .await
            .unwrap();

        for _ in 0..100 {
            if !child.is_alive() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!child.is_alive(), "`true` should have exited");
        assert!(child.probe().is_err());

        child.terminate().unwrap();
        child.kill().unwrap();
        assert_eq!(child.wait().await.unwrap(), Some(0));
    }
}

//! Engine subprocess management.
//!
//! [`EngineProcess`] owns a spawned engine and everything it drags along:
//! its pipes and the OS container (process group or job object) that lets a
//! single call reach the engine and any helpers it started. The container is
//! provided by a per-platform [`ProcessGroup`] implementation chosen at build
//! time:
//!
//! - unix: the child leads a new process group; signals go to `-pid`.
//! - windows: the child is created suspended, placed in a kill-on-close job
//!   object, then resumed.
//! - anything else: plain `Child` control; `terminate` is a no-op.
//!
//! Lifecycle: `terminate` and `kill` only request a state change. `wait`
//! consumes the handle, blocks until exit and releases the container, which
//! also ends any helpers the engine left behind.

use std::io::{self, Read, Write};
use std::process::{self, Child, ChildStderr, ChildStdin, ChildStdout, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::error::ProcessError;

#[cfg(not(any(unix, windows)))]
mod fallback;
#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(not(any(unix, windows)))]
use fallback::Group;
#[cfg(unix)]
use unix::Group;
#[cfg(windows)]
use windows::Group;

/// Poll interval used by [`EngineProcess::shutdown`]
const SHUTDOWN_POLL_MS: u64 = 10;

/// Platform contract for containing an engine and its descendants.
pub(crate) trait ProcessGroup: Sized + Send {
    /// Adjust the command before it is spawned.
    fn prepare(command: &mut process::Command);

    /// Bind the freshly spawned child to its container.
    ///
    /// On error the caller kills and reaps the child.
    fn attach(child: &Child) -> io::Result<Self>;

    /// Ask the contained processes to exit. Must not block.
    fn terminate(&self, child: &Child) -> io::Result<()>;

    /// End the contained processes immediately.
    fn kill(&self, child: &mut Child) -> io::Result<()>;

    /// Free the container and end anything still inside it.
    ///
    /// Called once the child has been reaped.
    fn release(&mut self);
}

/// A running engine process.
pub struct EngineProcess {
    child: Child,
    group: Group,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    reaped: bool,
}

fn taken(stream: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::BrokenPipe,
        format!("engine {stream} has been taken"),
    )
}

impl EngineProcess {
    /// Start the engine described by `config` with all three streams piped.
    pub fn spawn(config: &EngineConfig) -> Result<Self, ProcessError> {
        let mut cmd = config.command();
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        Group::prepare(&mut cmd);

        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            program: config.program.clone(),
            source,
        })?;

        let group = match Group::attach(&child) {
            Ok(group) => group,
            Err(source) => {
                let mut cleanup = Vec::new();
                if let Err(e) = child.kill() {
                    cleanup.push(e);
                }
                if let Err(e) = child.wait() {
                    cleanup.push(e);
                }
                return Err(ProcessError::PlatformSetup { source, cleanup });
            }
        };

        log::debug!(
            "spawned engine '{}' (pid {})",
            config.program.display(),
            child.id()
        );

        Ok(EngineProcess {
            stdin: child.stdin.take(),
            stdout: child.stdout.take(),
            stderr: child.stderr.take(),
            child,
            group,
            reaped: false,
        })
    }

    /// OS process id of the engine.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdin.as_mut().ok_or_else(|| taken("stdin"))?.write(buf)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.stdin.as_mut().ok_or_else(|| taken("stdin"))?.flush()
    }

    pub fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stdout.as_mut().ok_or_else(|| taken("stdout"))?.read(buf)
    }

    pub fn read_err(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stderr.as_mut().ok_or_else(|| taken("stderr"))?.read(buf)
    }

    /// Detach stdin; later writes through the handle fail with `BrokenPipe`.
    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.stdin.take()
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// Request a graceful shutdown. Returns immediately.
    pub fn terminate(&mut self) -> Result<(), ProcessError> {
        log::debug!("terminating engine (pid {})", self.child.id());
        self.group.terminate(&self.child)?;
        Ok(())
    }

    /// End the engine and its descendants immediately.
    pub fn kill(&mut self) -> Result<(), ProcessError> {
        log::debug!("killing engine (pid {})", self.child.id());
        self.group.kill(&mut self.child)?;
        Ok(())
    }

    /// Check for exit without blocking. Does not release the container.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>, ProcessError> {
        Ok(self.child.try_wait()?)
    }

    /// Block until the engine exits, then release platform resources.
    ///
    /// A non-zero exit is reported as [`ProcessError::Exited`].
    pub fn wait(mut self) -> Result<ExitStatus, ProcessError> {
        self.stdin.take();
        let status = self.child.wait();
        self.group.release();
        self.reaped = true;

        let status = status?;
        log::debug!("engine (pid {}) exited with {status}", self.child.id());
        if status.success() {
            Ok(status)
        } else {
            Err(ProcessError::Exited(status))
        }
    }

    /// Terminate, give the engine `grace` to exit, then kill and wait.
    pub fn shutdown(mut self, grace: Duration) -> Result<ExitStatus, ProcessError> {
        self.terminate()?;
        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            if self.try_wait()?.is_some() {
                return self.wait();
            }
            thread::sleep(Duration::from_millis(SHUTDOWN_POLL_MS));
        }
        log::warn!(
            "engine (pid {}) ignored terminate for {grace:?}, killing",
            self.child.id()
        );
        self.kill()?;
        self.wait()
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        log::warn!(
            "engine (pid {}) dropped without wait, killing",
            self.child.id()
        );
        if let Err(e) = self.group.kill(&mut self.child) {
            log::warn!("failed to kill engine on drop: {e}");
        }
        if let Err(e) = self.child.wait() {
            log::warn!("failed to reap engine on drop: {e}");
        }
        self.group.release();
    }
}

impl Read for EngineProcess {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        EngineProcess::read(self, buf)
    }
}

impl Write for EngineProcess {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        EngineProcess::write(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        EngineProcess::flush(self)
    }
}

//! Process-group containment for unix targets.

use std::io;
use std::os::unix::process::CommandExt;
use std::process::{self, Child};

use super::ProcessGroup;

/// The engine's process group; its id equals the engine's pid.
pub(crate) struct Group {
    pgid: libc::pid_t,
    released: bool,
}

impl Group {
    fn signal(&self, signal: libc::c_int) -> io::Result<()> {
        // SAFETY: kill(2) has no memory-safety preconditions.
        let rc = unsafe { libc::kill(-self.pgid, signal) };
        if rc == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        // Every member has already exited
        if err.raw_os_error() == Some(libc::ESRCH) {
            return Ok(());
        }
        Err(err)
    }
}

impl ProcessGroup for Group {
    fn prepare(command: &mut process::Command) {
        command.process_group(0);
    }

    fn attach(child: &Child) -> io::Result<Self> {
        let pgid = libc::pid_t::try_from(child.id())
            .map_err(|_| io::Error::other(format!("pid {} out of range", child.id())))?;
        Ok(Group {
            pgid,
            released: false,
        })
    }

    fn terminate(&self, _child: &Child) -> io::Result<()> {
        self.signal(libc::SIGTERM)
    }

    fn kill(&self, _child: &mut Child) -> io::Result<()> {
        self.signal(libc::SIGKILL)
    }

    /// Kill whatever is left of the group once the leader has been reaped.
    fn release(&mut self) {
        if std::mem::replace(&mut self.released, true) {
            return;
        }
        if let Err(e) = self.signal(libc::SIGKILL) {
            log::warn!("failed to clear process group {}: {e}", self.pgid);
        }
    }
}

//! Containment for targets without process groups or job objects.
//!
//! Only the direct child is controlled; graceful termination is unavailable
//! and reported as success.

use std::io;
use std::process::{self, Child};

use super::ProcessGroup;

pub(crate) struct Group;

impl ProcessGroup for Group {
    fn prepare(_command: &mut process::Command) {}

    fn attach(_child: &Child) -> io::Result<Self> {
        Ok(Group)
    }

    fn terminate(&self, _child: &Child) -> io::Result<()> {
        Ok(())
    }

    fn kill(&self, child: &mut Child) -> io::Result<()> {
        match child.kill() {
            // Already exited and reaped
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            other => other,
        }
    }

    fn release(&mut self) {}
}

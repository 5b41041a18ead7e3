//! Job-object containment for windows targets.
//!
//! The engine is created suspended so it cannot run, spawn helpers or exit
//! before it has been placed in the job. Only after assignment are its
//! threads resumed.

use std::io;
use std::mem;
use std::os::windows::io::{AsRawHandle, FromRawHandle, OwnedHandle, RawHandle};
use std::os::windows::process::CommandExt;
use std::process::{self, Child};

use windows_sys::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::System::Console::{GenerateConsoleCtrlEvent, CTRL_BREAK_EVENT};
use windows_sys::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Thread32First, Thread32Next, TH32CS_SNAPTHREAD, THREADENTRY32,
};
use windows_sys::Win32::System::JobObjects::{
    AssignProcessToJobObject, CreateJobObjectW, JobObjectExtendedLimitInformation,
    SetInformationJobObject, TerminateJobObject, JOBOBJECT_EXTENDED_LIMIT_INFORMATION,
    JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE,
};
use windows_sys::Win32::System::Threading::{
    OpenThread, ResumeThread, CREATE_NEW_PROCESS_GROUP, CREATE_SUSPENDED, THREAD_SUSPEND_RESUME,
};

use super::ProcessGroup;

/// Exit code given to processes ended through the job
const KILLED_EXIT_CODE: u32 = 1;

/// Take ownership of a raw handle, treating null and invalid as failure.
fn owned(handle: HANDLE) -> io::Result<OwnedHandle> {
    if handle == 0 || handle == INVALID_HANDLE_VALUE {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: the handle was just returned to us by the OS and is not shared.
    Ok(unsafe { OwnedHandle::from_raw_handle(handle as RawHandle) })
}

fn raw(handle: &OwnedHandle) -> HANDLE {
    handle.as_raw_handle() as HANDLE
}

fn check(ok: i32) -> io::Result<()> {
    if ok == 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Job object that holds the engine and every process it starts.
pub(crate) struct Group {
    job: Option<OwnedHandle>,
}

fn create_job() -> io::Result<OwnedHandle> {
    // SAFETY: null attributes and name are documented as valid.
    let job = owned(unsafe { CreateJobObjectW(std::ptr::null(), std::ptr::null()) })?;

    // SAFETY: the struct is plain data; all-zero is a valid starting value.
    let mut limits: JOBOBJECT_EXTENDED_LIMIT_INFORMATION = unsafe { mem::zeroed() };
    limits.BasicLimitInformation.LimitFlags = JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE;
    // SAFETY: `limits` outlives the call and the size matches the class.
    check(unsafe {
        SetInformationJobObject(
            raw(&job),
            JobObjectExtendedLimitInformation,
            std::ptr::addr_of!(limits).cast(),
            mem::size_of::<JOBOBJECT_EXTENDED_LIMIT_INFORMATION>() as u32,
        )
    })?;
    Ok(job)
}

/// Resume every thread owned by `pid`, returning how many were resumed.
fn resume_threads(pid: u32) -> io::Result<usize> {
    // SAFETY: plain snapshot request, the handle is owned below.
    let snapshot = owned(unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPTHREAD, 0) })?;

    // SAFETY: zeroed THREADENTRY32 with dwSize set is the documented input.
    let mut entry: THREADENTRY32 = unsafe { mem::zeroed() };
    entry.dwSize = mem::size_of::<THREADENTRY32>() as u32;

    let mut resumed = 0;
    // SAFETY: `entry` is a valid, correctly sized THREADENTRY32.
    let mut more = unsafe { Thread32First(raw(&snapshot), &mut entry) } != 0;
    while more {
        if entry.th32OwnerProcessID == pid {
            // SAFETY: opening a thread by id has no memory-safety preconditions.
            let thread = owned(unsafe { OpenThread(THREAD_SUSPEND_RESUME, 0, entry.th32ThreadID) })?;
            // SAFETY: `thread` was opened with THREAD_SUSPEND_RESUME.
            if unsafe { ResumeThread(raw(&thread)) } == u32::MAX {
                return Err(io::Error::last_os_error());
            }
            resumed += 1;
        }
        // SAFETY: as above.
        more = unsafe { Thread32Next(raw(&snapshot), &mut entry) } != 0;
    }
    Ok(resumed)
}

impl ProcessGroup for Group {
    fn prepare(command: &mut process::Command) {
        command.creation_flags(CREATE_SUSPENDED | CREATE_NEW_PROCESS_GROUP);
    }

    fn attach(child: &Child) -> io::Result<Self> {
        let job = create_job()?;
        // SAFETY: both handles are live for the duration of the call.
        check(unsafe { AssignProcessToJobObject(raw(&job), child.as_raw_handle() as HANDLE) })?;

        match resume_threads(child.id())? {
            0 => Err(io::Error::other(format!(
                "no threads found for suspended process {}",
                child.id()
            ))),
            _ => Ok(Group { job: Some(job) }),
        }
    }

    fn terminate(&self, child: &Child) -> io::Result<()> {
        // The child leads its own console process group, so its pid is the group id
        // SAFETY: no memory-safety preconditions.
        check(unsafe { GenerateConsoleCtrlEvent(CTRL_BREAK_EVENT, child.id()) })
    }

    fn kill(&self, child: &mut Child) -> io::Result<()> {
        match &self.job {
            // SAFETY: the job handle is owned by `self` and still open.
            Some(job) => check(unsafe { TerminateJobObject(raw(job), KILLED_EXIT_CODE) }),
            None => child.kill(),
        }
    }

    fn release(&mut self) {
        // Closing the last handle kills anything still inside the job
        self.job.take();
    }
}

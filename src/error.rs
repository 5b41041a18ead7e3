//! Error types for engine process management and queue waits.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Error type for engine process lifecycle operations
#[derive(Debug)]
pub enum ProcessError {
    /// The executable could not be started (bad path, pipe creation, exec failure)
    Spawn { program: PathBuf, source: io::Error },
    /// Job object or process group setup failed after the child was created.
    ///
    /// The half-started child has been killed; `cleanup` holds any errors
    /// raised while tearing it down.
    PlatformSetup {
        source: io::Error,
        cleanup: Vec<io::Error>,
    },
    /// Signalling or reaping the process failed
    Io(io::Error),
    /// The engine exited with a non-zero status
    Exited(ExitStatus),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Spawn { program, source } => {
                write!(f, "Failed to spawn '{}': {source}", program.display())
            }
            ProcessError::PlatformSetup { source, cleanup } => {
                write!(f, "Failed to set up process containment: {source}")?;
                for err in cleanup {
                    write!(f, "; cleanup: {err}")?;
                }
                Ok(())
            }
            ProcessError::Io(e) => write!(f, "Process I/O error: {e}"),
            ProcessError::Exited(status) => write!(f, "Engine exited with {status}"),
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Spawn { source, .. } | ProcessError::PlatformSetup { source, .. } => {
                Some(source)
            }
            ProcessError::Io(e) => Some(e),
            ProcessError::Exited(_) => None,
        }
    }
}

impl From<io::Error> for ProcessError {
    fn from(e: io::Error) -> Self {
        ProcessError::Io(e)
    }
}

/// Outcome of a queue wait that returned without an item.
///
/// Nothing is consumed when a wait fails; items pushed afterwards are still
/// delivered to the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    /// The deadline passed before an item arrived
    Timeout,
    /// The cancel token was triggered before an item arrived
    Cancelled,
}

impl fmt::Display for WaitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitError::Timeout => write!(f, "Timed out waiting for queue item"),
            WaitError::Cancelled => write!(f, "Queue wait was cancelled"),
        }
    }
}

impl std::error::Error for WaitError {}

/// Error type for UCI move notation parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// Move string has invalid length (must be 4-5 characters)
    InvalidLength { len: usize },
    /// Invalid square notation in move
    InvalidSquare { notation: String },
    /// Invalid promotion piece
    InvalidPromotion { char: char },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => {
                write!(f, "Move must be 4-5 characters, found {len}")
            }
            MoveParseError::InvalidSquare { notation } => {
                write!(f, "Invalid square notation in '{notation}'")
            }
            MoveParseError::InvalidPromotion { char } => {
                write!(f, "Invalid promotion piece '{char}'")
            }
        }
    }
}

impl std::error::Error for MoveParseError {}

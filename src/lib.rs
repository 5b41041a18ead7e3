//! Host side of the Universal Chess Interface.
//!
//! Runs a UCI engine as a child process, keeps a transcript of everything
//! exchanged with it, and decodes its output into typed [`Command`]s.

pub mod config;
pub mod connection;
pub mod error;
pub mod notation;
pub mod process;
pub mod queue;
pub mod sync;
pub mod transcript;
pub mod uci;

pub use config::EngineConfig;
pub use connection::EngineConnection;
pub use error::{MoveParseError, ProcessError, WaitError};
pub use notation::Move;
pub use process::EngineProcess;
pub use queue::{OverwriteQueue, UnboundedQueue};
pub use sync::CancelToken;
pub use transcript::{Direction, Transcript};
pub use uci::{parse_command, Command, Info, Score};

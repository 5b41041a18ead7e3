//! A running engine wired to the parser and queues.
//!
//! [`EngineConnection`] spawns an engine, drains stdout and stderr on
//! background threads, records all traffic in a [`Transcript`], and routes
//! parsed stdout lines:
//!
//! - `info` records go to a bounded [`OverwriteQueue`]; a lagging consumer
//!   only loses stale progress reports;
//! - every other command, unknown lines included, goes to an
//!   [`UnboundedQueue`] and is never dropped.
//!
//! Stderr lines are recorded and logged but not parsed. Deciding what to send
//! and when (handshakes, timeouts, board state) is left to the caller.

use std::io::{self, Write};
use std::process::{ChildStdin, ExitStatus};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::error::{ProcessError, WaitError};
use crate::process::EngineProcess;
use crate::queue::{OverwriteQueue, UnboundedQueue};
use crate::transcript::{spawn_reader, Direction, Transcript};
use crate::uci::{parse_command, Command, Info};

pub struct EngineConnection {
    process: EngineProcess,
    stdin: ChildStdin,
    transcript: Transcript,
    info: Arc<OverwriteQueue<Info>>,
    messages: Arc<UnboundedQueue<Command>>,
    readers: Vec<JoinHandle<io::Result<()>>>,
}

fn missing(stream: &str) -> ProcessError {
    ProcessError::Io(io::Error::new(
        io::ErrorKind::BrokenPipe,
        format!("engine {stream} is not piped"),
    ))
}

impl EngineConnection {
    /// Spawn the engine and start its reader threads.
    pub fn start(config: &EngineConfig, transcript: Transcript) -> Result<Self, ProcessError> {
        let mut process = EngineProcess::spawn(config)?;
        let stdin = process.take_stdin().ok_or_else(|| missing("stdin"))?;
        let stdout = process.take_stdout().ok_or_else(|| missing("stdout"))?;
        let stderr = process.take_stderr().ok_or_else(|| missing("stderr"))?;

        let info = Arc::new(OverwriteQueue::new(config.info_capacity));
        let messages = Arc::new(UnboundedQueue::new());

        let route = {
            let info = Arc::clone(&info);
            let messages = Arc::clone(&messages);
            move |line: &str| match parse_command(line) {
                Command::Info(record) => {
                    info.push(record);
                }
                Command::Unknown(text) => {
                    log::trace!("unrecognised engine output: {text}");
                    messages.push(Command::Unknown(text));
                }
                command => messages.push(command),
            }
        };

        let readers = vec![
            spawn_reader(stdout, Direction::Stdout, transcript.clone(), route)?,
            spawn_reader(stderr, Direction::Stderr, transcript.clone(), |line: &str| {
                log::debug!("engine stderr: {line}");
            })?,
        ];

        Ok(EngineConnection {
            process,
            stdin,
            transcript,
            info,
            messages,
            readers,
        })
    }

    /// Send one command line to the engine.
    ///
    /// Trailing line terminators are stripped; exactly one `\n` is appended.
    pub fn send(&mut self, line: &str) -> io::Result<()> {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Err(e) = self.transcript.record(Direction::Sent, line) {
            log::warn!("transcript write failed for stdin: {e}");
        }
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()
    }

    /// Shared handle to the `info` queue.
    #[must_use]
    pub fn info_queue(&self) -> Arc<OverwriteQueue<Info>> {
        Arc::clone(&self.info)
    }

    /// Shared handle to the queue of non-`info` commands.
    #[must_use]
    pub fn message_queue(&self) -> Arc<UnboundedQueue<Command>> {
        Arc::clone(&self.messages)
    }

    /// Block until the next `info` record.
    pub fn next_info(&self) -> Info {
        self.info.next()
    }

    /// Block until the next non-`info` command.
    pub fn next_message(&self) -> Command {
        self.messages.next()
    }

    pub fn next_message_timeout(&self, timeout: Duration) -> Result<Command, WaitError> {
        self.messages.next_timeout(timeout)
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.process.id()
    }

    pub fn terminate(&mut self) -> Result<(), ProcessError> {
        self.process.terminate()
    }

    pub fn kill(&mut self) -> Result<(), ProcessError> {
        self.process.kill()
    }

    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>, ProcessError> {
        self.process.try_wait()
    }

    /// Close stdin, wait for the engine to exit, then join the reader threads.
    pub fn wait(self) -> Result<ExitStatus, ProcessError> {
        let EngineConnection {
            process,
            stdin,
            readers,
            ..
        } = self;
        drop(stdin);
        let status = process.wait();
        join_readers(readers);
        status
    }

    /// Close stdin and run [`EngineProcess::shutdown`], then join the readers.
    pub fn shutdown(self, grace: Duration) -> Result<ExitStatus, ProcessError> {
        let EngineConnection {
            process,
            stdin,
            readers,
            ..
        } = self;
        drop(stdin);
        let status = process.shutdown(grace);
        join_readers(readers);
        status
    }
}

fn join_readers(readers: Vec<JoinHandle<io::Result<()>>>) {
    for reader in readers {
        match reader.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::debug!("engine reader ended with error: {e}"),
            Err(_) => log::warn!("engine reader thread panicked"),
        }
    }
}

//! Line splitting and the shared transcript of engine traffic.
//!
//! Every line crossing the engine's standard streams is written to a single
//! [`Transcript`] sink with a direction prefix:
//!
//! ```text
//! >>> uci            sent to the engine
//! <<< uciok          received on stdout
//! !<! warning: ...   received on stderr
//! ```
//!
//! Each output stream is drained by its own reader thread; the sink lock
//! keeps records from different threads from interleaving.

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

const READ_CHUNK: usize = 4096;

/// Which stream a transcript record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Written to the engine's stdin
    Sent,
    /// Read from the engine's stdout
    Stdout,
    /// Read from the engine's stderr
    Stderr,
}

impl Direction {
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Direction::Sent => ">>> ",
            Direction::Stdout => "<<< ",
            Direction::Stderr => "!<! ",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Direction::Sent => "stdin",
            Direction::Stdout => "stdout",
            Direction::Stderr => "stderr",
        }
    }
}

/// Cloneable handle to a serialized transcript sink.
#[derive(Clone)]
pub struct Transcript {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Transcript {
    pub fn new<W: Write + Send + 'static>(sink: W) -> Self {
        Transcript {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    /// A transcript that discards everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(io::sink())
    }

    /// Write one newline-terminated record.
    pub fn record(&self, direction: Direction, line: &str) -> io::Result<()> {
        self.write_record(direction, line, true)
    }

    /// Write the unterminated tail of a closed stream, without a newline.
    pub fn record_fragment(&self, direction: Direction, fragment: &str) -> io::Result<()> {
        self.write_record(direction, fragment, false)
    }

    fn write_record(&self, direction: Direction, text: &str, newline: bool) -> io::Result<()> {
        let prefix = direction.prefix();
        let mut record = Vec::with_capacity(prefix.len() + text.len() + 1);
        record.extend_from_slice(prefix.as_bytes());
        record.extend_from_slice(text.as_bytes());
        if newline {
            record.push(b'\n');
        }

        let mut sink = self.sink.lock();
        sink.write_all(&record)?;
        sink.flush()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcript").finish_non_exhaustive()
    }
}

/// Accumulates bytes and yields complete lines.
///
/// A trailing `\r` is dropped from each line so CRLF engines read the same
/// as LF ones. Invalid UTF-8 is replaced rather than rejected.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // `pending` never holds a newline between calls, so only the new bytes are scanned
        let scanned = self.pending.len();
        self.pending.extend_from_slice(chunk);
        let Some(last) = self.pending[scanned..].iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        let end = scanned + last;
        let lines = self.pending[..end]
            .split(|&b| b == b'\n')
            .map(decode_line)
            .collect();
        self.pending.drain(..=end);
        lines
    }

    /// Take the unterminated remainder, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(decode_line(&rest))
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

fn log_sink_error(result: io::Result<()>, direction: Direction) {
    if let Err(e) = result {
        log::warn!("transcript write failed for {}: {e}", direction.label());
    }
}

/// Drain `reader` to end-of-stream, recording every line and passing it to
/// `on_line`.
///
/// The trailing fragment, if any, is recorded without a newline and also
/// handed to `on_line`. A read error ends the loop and is returned after the
/// fragment has been flushed.
pub fn read_lines<R, F>(
    mut reader: R,
    direction: Direction,
    transcript: &Transcript,
    mut on_line: F,
) -> io::Result<()>
where
    R: Read,
    F: FnMut(&str),
{
    let mut splitter = LineSplitter::new();
    let mut buf = [0u8; READ_CHUNK];
    let result = loop {
        match reader.read(&mut buf) {
            Ok(0) => break Ok(()),
            Ok(n) => {
                for line in splitter.push(&buf[..n]) {
                    log_sink_error(transcript.record(direction, &line), direction);
                    on_line(&line);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => break Err(e),
        }
    };

    if let Some(fragment) = splitter.finish() {
        log_sink_error(transcript.record_fragment(direction, &fragment), direction);
        on_line(&fragment);
    }
    if let Err(e) = &result {
        log::debug!("{} reader stopped: {e}", direction.label());
    }
    result
}

/// Run [`read_lines`] on a dedicated named thread.
pub fn spawn_reader<R, F>(
    reader: R,
    direction: Direction,
    transcript: Transcript,
    on_line: F,
) -> io::Result<JoinHandle<io::Result<()>>>
where
    R: Read + Send + 'static,
    F: FnMut(&str) + Send + 'static,
{
    thread::Builder::new()
        .name(format!("uci-{}", direction.label()))
        .spawn(move || read_lines(reader, direction, &transcript, on_line))
}

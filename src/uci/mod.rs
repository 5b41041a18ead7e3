//! Universal Chess Interface (UCI) protocol parsing.
//!
//! Decodes engine-to-client lines into [`Command`] values. Only the engine
//! side of the conversation is parsed; composing client commands is left to
//! the caller.

pub mod command;
pub mod info;
pub mod response;

pub use command::{parse_command, Command};
pub use info::{CurrLine, Info, Score};
pub use response::{parse_best_move, parse_id, parse_option, BestMove, Id, OptionKind, OptionSpec};

/// Split a line on whitespace runs, keeping each token's byte offset.
///
/// Offsets let verbatim fields (`info string`, option names) be sliced out of
/// the original text with their inner spacing intact.
pub(crate) fn tokenize(line: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push((s, &line[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push((s, &line[s..]));
    }
    tokens
}

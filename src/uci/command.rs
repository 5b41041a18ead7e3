//! Classification of engine output lines.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::info::Info;

/// A single engine-to-client UCI message.
///
/// Variants other than `Info` carry the raw line; use the helpers in
/// [`super::response`] to pull typed fields out of them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Command {
    Id(String),
    UciOk,
    ReadyOk,
    BestMove(String),
    CopyProtection(String),
    Registration(String),
    Info(Info),
    Option(String),
    /// A line whose leading token is not a known command, kept verbatim
    Unknown(String),
}

impl Command {
    /// The protocol keyword for this command, or `None` for `Unknown`.
    #[must_use]
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Command::Id(_) => Some("id"),
            Command::UciOk => Some("uciok"),
            Command::ReadyOk => Some("readyok"),
            Command::BestMove(_) => Some("bestmove"),
            Command::CopyProtection(_) => Some("copyprotection"),
            Command::Registration(_) => Some("registration"),
            Command::Info(_) => Some("info"),
            Command::Option(_) => Some("option"),
            Command::Unknown(_) => None,
        }
    }
}

/// Classify a raw line by its leading token (case-insensitive).
///
/// Lines that are empty or start with anything other than a known engine
/// command become [`Command::Unknown`] with the original text untouched.
#[must_use]
pub fn parse_command(line: &str) -> Command {
    let Some(head) = line.split_whitespace().next() else {
        return Command::Unknown(line.to_string());
    };
    let raw = || line.to_string();

    match head.to_ascii_lowercase().as_str() {
        "id" => Command::Id(raw()),
        "uciok" => Command::UciOk,
        "readyok" => Command::ReadyOk,
        "bestmove" => Command::BestMove(raw()),
        "copyprotection" => Command::CopyProtection(raw()),
        "registration" => Command::Registration(raw()),
        "info" => Command::Info(Info::parse(line)),
        "option" => Command::Option(raw()),
        _ => Command::Unknown(raw()),
    }
}

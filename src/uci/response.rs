//! Typed views over the raw-text commands.
//!
//! [`Command`](super::Command) keeps `id`, `bestmove` and `option` lines as
//! text. These helpers decode them on demand and return `None` when the line
//! does not follow the expected shape.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::tokenize;
use crate::notation::Move;

/// Decoded `bestmove` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BestMove {
    /// `None` when the engine reports `(none)` or the null move
    pub best: Option<Move>,
    pub ponder: Option<Move>,
}

/// Parse `bestmove <move> [ponder <move>]`.
#[must_use]
pub fn parse_best_move(line: &str) -> Option<BestMove> {
    let tokens = tokenize(line);
    let mut iter = tokens.iter().map(|&(_, t)| t);
    if !iter.next()?.eq_ignore_ascii_case("bestmove") {
        return None;
    }

    let best = match iter.next()? {
        "(none)" => None,
        token => Some(Move::decode(token)?).filter(|mv| !mv.is_null()),
    };
    let ponder = match iter.next() {
        Some(t) if t.eq_ignore_ascii_case("ponder") => iter.next().and_then(Move::decode),
        _ => None,
    };

    Some(BestMove { best, ponder })
}

/// Decoded `id` line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Id {
    Name(String),
    Author(String),
}

/// Parse `id name <text>` or `id author <text>`.
#[must_use]
pub fn parse_id(line: &str) -> Option<Id> {
    let tokens = tokenize(line);
    let (_, head) = tokens.first()?;
    if !head.eq_ignore_ascii_case("id") {
        return None;
    }
    let &(offset, field) = tokens.get(1)?;
    let value = line[offset + field.len()..].trim().to_string();
    match field.to_ascii_lowercase().as_str() {
        "name" => Some(Id::Name(value)),
        "author" => Some(Id::Author(value)),
        _ => None,
    }
}

/// Type of an engine option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OptionKind {
    Check,
    Spin,
    Combo,
    Button,
    String,
}

impl OptionKind {
    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "check" => Some(OptionKind::Check),
            "spin" => Some(OptionKind::Spin),
            "combo" => Some(OptionKind::Combo),
            "button" => Some(OptionKind::Button),
            "string" => Some(OptionKind::String),
            _ => None,
        }
    }
}

/// Decoded `option` line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptionSpec {
    pub name: String,
    pub kind: OptionKind,
    pub default: Option<String>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    /// Allowed values of a combo option, in declaration order
    pub vars: Vec<String>,
}

const OPTION_FIELDS: [&str; 6] = ["name", "type", "default", "min", "max", "var"];

/// Parse `option name <id> type <t> [default <x>] [min <x>] [max <x>] [var <x>]*`.
///
/// Names and values may contain spaces; each runs until the next field
/// keyword. Returns `None` without both a name and a known type.
#[must_use]
pub fn parse_option(line: &str) -> Option<OptionSpec> {
    let tokens = tokenize(line);
    let (_, head) = tokens.first()?;
    if !head.eq_ignore_ascii_case("option") {
        return None;
    }

    // Each field keyword owns the span of tokens up to the next keyword
    let mut fields: Vec<(&str, Option<(usize, usize)>)> = Vec::new();
    for &(offset, token) in &tokens[1..] {
        if OPTION_FIELDS.contains(&token) {
            fields.push((token, None));
        } else if let Some((_, span)) = fields.last_mut() {
            let end = offset + token.len();
            *span = Some(span.map_or((offset, end), |(start, _)| (start, end)));
        }
    }

    let mut name = None;
    let mut kind = None;
    let mut spec_default = None;
    let mut min = None;
    let mut max = None;
    let mut vars = Vec::new();
    for (field, span) in fields {
        let value = span.map_or("", |(start, end)| &line[start..end]);
        match field {
            "name" => name = Some(value.to_string()),
            "type" => kind = OptionKind::from_token(value),
            "default" => spec_default = Some(value.to_string()),
            "min" => min = value.parse().ok(),
            "max" => max = value.parse().ok(),
            _ => vars.push(value.to_string()),
        }
    }

    Some(OptionSpec {
        name: name.filter(|n| !n.is_empty())?,
        kind: kind?,
        default: spec_default,
        min,
        max,
        vars,
    })
}

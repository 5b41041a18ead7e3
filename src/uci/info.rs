//! The `info` sub-grammar.
//!
//! An info line is a flat sequence of keywords, each followed by the tokens
//! it owns. Every field is optional; a keyword that never appears leaves its
//! field `None`. Malformed values are skipped silently and never abort the
//! rest of the line.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::tokenize;
use crate::notation::Move;

/// Engine evaluation attached to an info line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Score {
    /// Evaluation in centipawns from the engine's point of view
    pub cp: Option<i32>,
    /// Mate distance in moves; negative when the engine is getting mated
    pub mate: Option<i32>,
    pub lowerbound: bool,
    pub upperbound: bool,
}

/// Line currently being searched by one CPU.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurrLine {
    pub cpu: Option<u32>,
    pub moves: Vec<Move>,
}

/// Search progress reported by an `info` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Info {
    pub depth: Option<u32>,
    pub seldepth: Option<u32>,
    /// Search time in milliseconds
    pub time: Option<u64>,
    pub nodes: Option<u64>,
    pub pv: Option<Vec<Move>>,
    pub multipv: Option<u32>,
    pub score: Option<Score>,
    pub currmove: Option<Move>,
    pub currmovenumber: Option<u32>,
    /// Hash table fill in permill
    pub hashfull: Option<u32>,
    pub nps: Option<u64>,
    pub tbhits: Option<u64>,
    pub sbhits: Option<u64>,
    /// CPU usage in permill
    pub cpuload: Option<u32>,
    pub string: Option<String>,
    pub refutation: Option<Vec<Move>>,
    pub currline: Option<CurrLine>,
}

#[derive(Clone, Copy)]
enum Keyword {
    Depth,
    Seldepth,
    Time,
    Nodes,
    Pv,
    MultiPv,
    Score,
    CurrMove,
    CurrMoveNumber,
    HashFull,
    Nps,
    TbHits,
    SbHits,
    CpuLoad,
    String,
    Refutation,
    CurrLine,
}

const KEYWORDS: [(&str, Keyword); 17] = [
    ("depth", Keyword::Depth),
    ("seldepth", Keyword::Seldepth),
    ("time", Keyword::Time),
    ("nodes", Keyword::Nodes),
    ("pv", Keyword::Pv),
    ("multipv", Keyword::MultiPv),
    ("score", Keyword::Score),
    ("currmove", Keyword::CurrMove),
    ("currmovenumber", Keyword::CurrMoveNumber),
    ("hashfull", Keyword::HashFull),
    ("nps", Keyword::Nps),
    ("tbhits", Keyword::TbHits),
    ("sbhits", Keyword::SbHits),
    ("cpuload", Keyword::CpuLoad),
    ("string", Keyword::String),
    ("refutation", Keyword::Refutation),
    ("currline", Keyword::CurrLine),
];

impl Keyword {
    fn from_token(token: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(name, _)| token.eq_ignore_ascii_case(name))
            .map(|&(_, keyword)| keyword)
    }
}

/// Cursor over the tokens that follow `info`.
struct Cursor<'a> {
    tokens: Vec<(usize, &'a str)>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(|&(_, t)| t)
    }

    fn peek_is(&self, word: &str) -> bool {
        self.peek().is_some_and(|t| t.eq_ignore_ascii_case(word))
    }

    /// Consume the next token only if it parses as `T`.
    ///
    /// A bad token stays put so the main loop looks at it again as a
    /// possible keyword.
    fn parse_next<T: std::str::FromStr>(&mut self) -> Option<T> {
        let value = self.peek()?.parse().ok()?;
        self.pos += 1;
        Some(value)
    }

    fn next_move(&mut self) -> Option<Move> {
        let mv = Move::decode(self.peek()?)?;
        self.pos += 1;
        Some(mv)
    }

    fn moves(&mut self) -> Vec<Move> {
        let mut moves = Vec::new();
        while let Some(mv) = self.next_move() {
            moves.push(mv);
        }
        moves
    }

    /// `cp <n>` or `mate <n>`; returns false without consuming on anything else.
    fn score_component(&mut self, score: &mut Score) -> bool {
        let is_cp = self.peek_is("cp");
        if !is_cp && !self.peek_is("mate") {
            return false;
        }
        let Some(value) = self
            .tokens
            .get(self.pos + 1)
            .and_then(|&(_, t)| t.parse::<i32>().ok())
        else {
            return false;
        };
        if is_cp {
            score.cp = Some(value);
        } else {
            score.mate = Some(value);
        }
        self.pos += 2;
        true
    }

    fn score(&mut self) -> Option<Score> {
        let mut score = Score::default();
        if !self.score_component(&mut score) {
            return None;
        }
        loop {
            if self.peek_is("lowerbound") {
                score.lowerbound = true;
                self.pos += 1;
            } else if self.peek_is("upperbound") {
                score.upperbound = true;
                self.pos += 1;
            } else if !self.score_component(&mut score) {
                break;
            }
        }
        Some(score)
    }

    fn currline(&mut self) -> CurrLine {
        let cpu = self.parse_next();
        CurrLine {
            cpu,
            moves: self.moves(),
        }
    }
}

/// Overwrite `slot` only when a value was actually parsed.
fn set<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

impl Info {
    /// Decode the fields of an info line.
    ///
    /// Text before the `info` token is ignored. A line without an `info`
    /// token yields an empty record.
    #[must_use]
    pub fn parse(line: &str) -> Info {
        let mut info = Info::default();
        let tokens = tokenize(line);
        let Some(start) = tokens
            .iter()
            .position(|&(_, t)| t.eq_ignore_ascii_case("info"))
        else {
            return info;
        };

        let mut cur = Cursor {
            tokens,
            pos: start + 1,
        };

        while let Some(&(offset, token)) = cur.tokens.get(cur.pos) {
            cur.pos += 1;
            let Some(keyword) = Keyword::from_token(token) else {
                continue;
            };
            match keyword {
                Keyword::Depth => set(&mut info.depth, cur.parse_next()),
                Keyword::Seldepth => set(&mut info.seldepth, cur.parse_next()),
                Keyword::Time => set(&mut info.time, cur.parse_next()),
                Keyword::Nodes => set(&mut info.nodes, cur.parse_next()),
                Keyword::MultiPv => set(&mut info.multipv, cur.parse_next()),
                Keyword::CurrMoveNumber => set(&mut info.currmovenumber, cur.parse_next()),
                Keyword::HashFull => set(&mut info.hashfull, cur.parse_next()),
                Keyword::Nps => set(&mut info.nps, cur.parse_next()),
                Keyword::TbHits => set(&mut info.tbhits, cur.parse_next()),
                Keyword::SbHits => set(&mut info.sbhits, cur.parse_next()),
                Keyword::CpuLoad => set(&mut info.cpuload, cur.parse_next()),
                Keyword::Pv => info.pv = Some(cur.moves()),
                Keyword::Refutation => info.refutation = Some(cur.moves()),
                Keyword::Score => set(&mut info.score, cur.score()),
                Keyword::CurrMove => set(&mut info.currmove, cur.next_move()),
                Keyword::CurrLine => info.currline = Some(cur.currline()),
                Keyword::String => {
                    let rest = &line[offset + token.len()..];
                    info.string = Some(rest.trim().to_string());
                    break;
                }
            }
        }

        info
    }

    /// True if no field was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Info::default()
    }
}

fn write_moves(f: &mut fmt::Formatter<'_>, moves: &[Move]) -> fmt::Result {
    for mv in moves {
        write!(f, " {mv}")?;
    }
    Ok(())
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        if let Some(cp) = self.cp {
            write!(f, "cp {cp}")?;
            sep = " ";
        }
        if let Some(mate) = self.mate {
            write!(f, "{sep}mate {mate}")?;
            sep = " ";
        }
        if self.lowerbound {
            write!(f, "{sep}lowerbound")?;
            sep = " ";
        }
        if self.upperbound {
            write!(f, "{sep}upperbound")?;
        }
        Ok(())
    }
}

impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("info")?;
        let scalars = [
            ("depth", self.depth.map(u64::from)),
            ("seldepth", self.seldepth.map(u64::from)),
            ("multipv", self.multipv.map(u64::from)),
        ];
        for (name, value) in scalars {
            if let Some(v) = value {
                write!(f, " {name} {v}")?;
            }
        }
        if let Some(score) = &self.score {
            write!(f, " score {score}")?;
        }
        let counters = [
            ("time", self.time),
            ("nodes", self.nodes),
            ("nps", self.nps),
            ("hashfull", self.hashfull.map(u64::from)),
            ("tbhits", self.tbhits),
            ("sbhits", self.sbhits),
            ("cpuload", self.cpuload.map(u64::from)),
        ];
        for (name, value) in counters {
            if let Some(v) = value {
                write!(f, " {name} {v}")?;
            }
        }
        if let Some(mv) = self.currmove {
            write!(f, " currmove {mv}")?;
        }
        if let Some(n) = self.currmovenumber {
            write!(f, " currmovenumber {n}")?;
        }
        if let Some(pv) = &self.pv {
            f.write_str(" pv")?;
            write_moves(f, pv)?;
        }
        if let Some(refutation) = &self.refutation {
            f.write_str(" refutation")?;
            write_moves(f, refutation)?;
        }
        if let Some(line) = &self.currline {
            f.write_str(" currline")?;
            if let Some(cpu) = line.cpu {
                write!(f, " {cpu}")?;
            }
            write_moves(f, &line.moves)?;
        }
        if let Some(text) = &self.string {
            write!(f, " string {text}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(s: &str) -> Move {
        s.parse().unwrap()
    }

    #[test]
    fn test_typical_search_line() {
        let info = Info::parse("info depth 12 seldepth 14 score cp 34 nodes 1000 nps 50000 pv e2e4 e7e5");
        let expected = Info {
            depth: Some(12),
            seldepth: Some(14),
            nodes: Some(1000),
            nps: Some(50000),
            score: Some(Score {
                cp: Some(34),
                ..Score::default()
            }),
            pv: Some(vec![mv("e2e4"), mv("e7e5")]),
            ..Info::default()
        };
        assert_eq!(info, expected);
    }

    #[test]
    fn test_string_is_terminal() {
        let info = Info::parse("info string mate soon depth 5");
        assert_eq!(info.string.as_deref(), Some("mate soon depth 5"));
        assert_eq!(info.depth, None);
        assert_eq!(
            info,
            Info {
                string: Some("mate soon depth 5".to_string()),
                ..Info::default()
            }
        );
    }

    #[test]
    fn test_string_keeps_inner_spacing_and_trims_ends() {
        let info = Info::parse("info depth 3 STRING   NNUE  evaluation enabled  \r");
        assert_eq!(info.depth, Some(3));
        assert_eq!(info.string.as_deref(), Some("NNUE  evaluation enabled"));
    }

    #[test]
    fn test_empty_string_field() {
        let info = Info::parse("info string");
        assert_eq!(info.string.as_deref(), Some(""));
    }

    #[test]
    fn test_mate_with_upperbound() {
        let info = Info::parse("info score mate -3 upperbound");
        assert_eq!(
            info,
            Info {
                score: Some(Score {
                    mate: Some(-3),
                    upperbound: true,
                    ..Score::default()
                }),
                ..Info::default()
            }
        );
    }

    #[test]
    fn test_score_repeats_last_value_wins() {
        let info = Info::parse("info score cp 10 lowerbound cp 25 mate 4 depth 9");
        let score = info.score.unwrap();
        assert_eq!(score.cp, Some(25));
        assert_eq!(score.mate, Some(4));
        assert!(score.lowerbound);
        assert!(!score.upperbound);
        assert_eq!(info.depth, Some(9));
    }

    #[test]
    fn test_score_needs_leading_component() {
        let info = Info::parse("info score lowerbound cp 5 depth 2");
        assert_eq!(info.score, None);
        assert_eq!(info.depth, Some(2));

        let info = Info::parse("info score cp x depth 2");
        assert_eq!(info.score, None);
        assert_eq!(info.depth, Some(2));
    }

    #[test]
    fn test_score_accepts_signs() {
        let info = Info::parse("info score cp -120");
        assert_eq!(info.score.unwrap().cp, Some(-120));
        let info = Info::parse("info score cp +15");
        assert_eq!(info.score.unwrap().cp, Some(15));
    }

    #[test]
    fn test_bad_scalar_does_not_skip_token() {
        // "nodes" fails to parse "depth", so "depth" is read as the next keyword
        let info = Info::parse("info nodes depth 7");
        assert_eq!(info.nodes, None);
        assert_eq!(info.depth, Some(7));
    }

    #[test]
    fn test_negative_unsigned_is_rejected() {
        let info = Info::parse("info depth -4 seldepth 6");
        assert_eq!(info.depth, None);
        assert_eq!(info.seldepth, Some(6));
    }

    #[test]
    fn test_bad_scalar_keeps_earlier_value() {
        let info = Info::parse("info depth 5 depth abc");
        assert_eq!(info.depth, Some(5));
    }

    #[test]
    fn test_scalar_last_occurrence_wins() {
        let info = Info::parse("info depth 5 nodes 10 depth 6 nodes 20");
        assert_eq!(info.depth, Some(6));
        assert_eq!(info.nodes, Some(20));
    }

    #[test]
    fn test_pv_stops_at_non_move() {
        let info = Info::parse("info pv e2e4 e7e5 g1f3 depth 4");
        assert_eq!(info.pv, Some(vec![mv("e2e4"), mv("e7e5"), mv("g1f3")]));
        assert_eq!(info.depth, Some(4));
    }

    #[test]
    fn test_corner_move_survives_display() {
        let info = Info::parse("info pv a1a1 e2e4 0000");
        assert_eq!(info.to_string(), "info pv a1a1 e2e4 0000");
    }

    #[test]
    fn test_pv_with_no_moves() {
        let info = Info::parse("info pv depth 4");
        assert_eq!(info.pv, Some(Vec::new()));
        assert_eq!(info.depth, Some(4));
    }

    #[test]
    fn test_refutation() {
        let info = Info::parse("info refutation d1h5 g6h5");
        assert_eq!(info.refutation, Some(vec![mv("d1h5"), mv("g6h5")]));
    }

    #[test]
    fn test_currmove() {
        let info = Info::parse("info currmove e7e8q currmovenumber 3");
        assert_eq!(info.currmove, Some(mv("e7e8q")));
        assert_eq!(info.currmovenumber, Some(3));

        let info = Info::parse("info currmove depth 2");
        assert_eq!(info.currmove, None);
        assert_eq!(info.depth, Some(2));
    }

    #[test]
    fn test_currline_with_and_without_cpu() {
        let info = Info::parse("info currline 2 e2e4 e7e5 nodes 5");
        assert_eq!(
            info.currline,
            Some(CurrLine {
                cpu: Some(2),
                moves: vec![mv("e2e4"), mv("e7e5")],
            })
        );
        assert_eq!(info.nodes, Some(5));

        let info = Info::parse("info currline d2d4");
        assert_eq!(
            info.currline,
            Some(CurrLine {
                cpu: None,
                moves: vec![mv("d2d4")],
            })
        );
    }

    #[test]
    fn test_remaining_scalars() {
        let info = Info::parse(
            "info time 1500 multipv 2 hashfull 345 tbhits 7 sbhits 8 cpuload 999",
        );
        assert_eq!(info.time, Some(1500));
        assert_eq!(info.multipv, Some(2));
        assert_eq!(info.hashfull, Some(345));
        assert_eq!(info.tbhits, Some(7));
        assert_eq!(info.sbhits, Some(8));
        assert_eq!(info.cpuload, Some(999));
    }

    #[test]
    fn test_leading_text_before_info() {
        let info = Info::parse("<engine-1> info depth 3");
        assert_eq!(info.depth, Some(3));
    }

    #[test]
    fn test_no_info_token() {
        assert!(Info::parse("depth 3 nodes 4").is_empty());
        assert!(Info::parse("info").is_empty());
    }

    #[test]
    fn test_unknown_tokens_are_skipped() {
        let info = Info::parse("info foo 1 depth 2 bar");
        assert_eq!(info.depth, Some(2));
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let info = Info::parse("INFO Depth 3 Score CP 12 LowerBound");
        assert_eq!(info.depth, Some(3));
        let score = info.score.unwrap();
        assert_eq!(score.cp, Some(12));
        assert!(score.lowerbound);
    }

    #[test]
    fn test_display_reparses_to_same_record() {
        let line = "info depth 20 seldepth 28 multipv 1 score cp -15 upperbound nodes 123456 nps 987654 hashfull 12 tbhits 0 time 125 pv d2d4 g8f6 c2c4 string hello world";
        let info = Info::parse(line);
        assert_eq!(Info::parse(&info.to_string()), info);
    }

    #[test]
    fn test_display_empty_info() {
        assert_eq!(Info::default().to_string(), "info");
    }
}

//! UCI long algebraic move notation.
//!
//! Moves are opaque to the rest of the crate: the protocol parser only asks
//! whether a token decodes. No legality checks are made here.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MoveParseError;

/// A square on the chess board, represented as (rank, file).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Square(u8, u8);

impl Square {
    /// Create a new square with bounds checking
    #[must_use]
    pub fn new(rank: u8, file: u8) -> Option<Self> {
        if rank < 8 && file < 8 {
            Some(Square(rank, file))
        } else {
            None
        }
    }

    /// Get the rank (0-7, where 0 = rank 1)
    #[inline]
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.0
    }

    /// Get the file (0-7, where 0 = file a)
    #[inline]
    #[must_use]
    pub const fn file(self) -> u8 {
        self.1
    }

    fn from_bytes(file: u8, rank: u8) -> Option<Self> {
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return None;
        }
        Some(Square(rank - b'1', file - b'a'))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (self.1 + b'a') as char, self.0 + 1)
    }
}

/// Piece a pawn promotes to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl Promotion {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'q' => Some(Promotion::Queen),
            'r' => Some(Promotion::Rook),
            'b' => Some(Promotion::Bishop),
            'n' => Some(Promotion::Knight),
            _ => None,
        }
    }

    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Promotion::Queen => 'q',
            Promotion::Rook => 'r',
            Promotion::Bishop => 'b',
            Promotion::Knight => 'n',
        }
    }
}

/// A move in UCI long algebraic notation (`e2e4`, `e7e8q`, `0000`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move {
    from: Square,
    to: Square,
    promotion: Option<Promotion>,
    null: bool,
}

impl Move {
    /// The null move, written `0000` on the wire. Its squares are a1.
    pub const NULL: Move = Move {
        from: Square(0, 0),
        to: Square(0, 0),
        promotion: None,
        null: true,
    };

    #[must_use]
    pub const fn new(from: Square, to: Square, promotion: Option<Promotion>) -> Self {
        Move {
            from,
            to,
            promotion,
            null: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn from(self) -> Square {
        self.from
    }

    #[inline]
    #[must_use]
    pub const fn to(self) -> Square {
        self.to
    }

    #[inline]
    #[must_use]
    pub const fn promotion(self) -> Option<Promotion> {
        self.promotion
    }

    #[must_use]
    pub const fn is_null(self) -> bool {
        self.null
    }

    /// Decode a token, returning `None` if it is not a well-formed move.
    #[must_use]
    pub fn decode(token: &str) -> Option<Self> {
        token.parse().ok()
    }
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "0000" {
            return Ok(Move::NULL);
        }
        let bytes = s.as_bytes();
        if bytes.len() != 4 && bytes.len() != 5 {
            return Err(MoveParseError::InvalidLength { len: bytes.len() });
        }

        let square = |file: u8, rank: u8| {
            Square::from_bytes(file, rank).ok_or_else(|| MoveParseError::InvalidSquare {
                notation: s.to_string(),
            })
        };
        let from = square(bytes[0], bytes[1])?;
        let to = square(bytes[2], bytes[3])?;

        let promotion = match bytes.get(4) {
            None => None,
            Some(&b) => {
                let c = b as char;
                Some(Promotion::from_char(c).ok_or(MoveParseError::InvalidPromotion { char: c })?)
            }
        };

        Ok(Move::new(from, to, promotion))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("0000");
        }
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promo) = self.promotion {
            write!(f, "{}", promo.to_char())?;
        }
        Ok(())
    }
}

//! Moves and the effects of applying them.

use std::fmt;
use std::str::FromStr;

use crate::{Color, CoordinateError, Piece, Square};

/// Which wing a castling move goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    /// Where the king lands.
    pub const fn king_to(self, color: Color) -> Square {
        Square::at(
            match self {
                CastleSide::King => 6,
                CastleSide::Queen => 2,
            },
            color.home_rank(),
        )
    }

    /// Where the rook starts.
    pub const fn rook_from(self, color: Color) -> Square {
        Square::at(
            match self {
                CastleSide::King => 7,
                CastleSide::Queen => 0,
            },
            color.home_rank(),
        )
    }

    /// Where the rook lands.
    pub const fn rook_to(self, color: Color) -> Square {
        Square::at(
            match self {
                CastleSide::King => 5,
                CastleSide::Queen => 3,
            },
            color.home_rank(),
        )
    }
}

/// A move as generated for a position.
///
/// Carries the moving piece kind and the capture and castling flags so that
/// history consumers do not need the position the move was played in.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub promotion: Option<Piece>,
    pub capture: bool,
    pub castle: Option<CastleSide>,
}

impl Move {
    /// Placeholder used to fill fixed-size move buffers.
    pub const NULL: Move = Move::new(Square::A1, Square::A1, Piece::Pawn);

    /// A non-capturing move.
    #[inline]
    pub const fn new(from: Square, to: Square, piece: Piece) -> Self {
        Move {
            from,
            to,
            piece,
            promotion: None,
            capture: false,
            castle: None,
        }
    }

    /// The same move, flagged as a capture.
    #[inline]
    pub const fn capturing(mut self) -> Self {
        self.capture = true;
        self
    }

    /// The same pawn move, promoting to `piece`.
    #[inline]
    pub const fn promoting(mut self, piece: Piece) -> Self {
        self.promotion = Some(piece);
        self
    }

    /// The king move of a castling.
    pub const fn castling(color: Color, side: CastleSide) -> Self {
        Move {
            from: Square::at(4, color.home_rank()),
            to: side.king_to(color),
            piece: Piece::King,
            promotion: None,
            capture: false,
            castle: Some(side),
        }
    }

    /// True if this move undoes `other`: it goes from `other`'s destination back to its origin.
    #[inline]
    pub fn reverses(&self, other: &Move) -> bool {
        self.from == other.to && self.to == other.from
    }

    /// Source, destination and promotion, without the generation flags.
    #[inline]
    pub const fn key(&self) -> MoveKey {
        MoveKey {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }

    /// Coordinate notation such as `e2e4` or `e7e8q`.
    pub fn to_coordinate(&self) -> String {
        self.key().to_string()
    }
}

/// Renders as `e2-e4`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({} {}", self.piece, self)?;
        if let Some(p) = self.promotion {
            write!(f, "={}", p.to_char())?;
        }
        if self.capture {
            f.write_str(" x")?;
        }
        if let Some(side) = self.castle {
            write!(f, " {side:?}-side castle")?;
        }
        f.write_str(")")
    }
}

/// The squares (and promotion) that identify a move in user input and opening books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveKey {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl MoveKey {
    /// True if `mv` travels between the same squares with the same promotion.
    #[inline]
    pub fn matches(&self, mv: &Move) -> bool {
        self.from == mv.from && self.to == mv.to && self.promotion == mv.promotion
    }
}

impl FromStr for MoveKey {
    type Err = CoordinateError;

    /// Parses `e2e4` or `e7e8q`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CoordinateError::Notation(s.to_string());
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(bad());
        }
        let from: Square = s[0..2].parse().map_err(|_| bad())?;
        let to: Square = s[2..4].parse().map_err(|_| bad())?;
        if from == to {
            return Err(CoordinateError::SameSquare(from));
        }
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match Piece::from_char(c) {
                Some(p) if Piece::PROMOTIONS.contains(&p) => Some(p),
                _ => return Err(bad()),
            },
        };
        Ok(MoveKey {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for MoveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion {
            write!(f, "{}", p.to_char())?;
        }
        Ok(())
    }
}

/// What applying a move did besides moving one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveEffect {
    /// Side that made the move.
    pub moved_by: Color,
    /// Square the captured piece stood on. Differs from the destination for en passant.
    pub captured_at: Option<Square>,
    /// The rook's from and to squares when the move castled.
    pub rook_move: Option<(Square, Square)>,
}

impl MoveEffect {
    pub const fn quiet(moved_by: Color) -> Self {
        MoveEffect {
            moved_by,
            captured_at: None,
            rook_move: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_dash() {
        let mv = Move::new(Square::E2, Square::E4, Piece::Pawn);
        assert_eq!(mv.to_string(), "e2-e4");
        assert_eq!(mv.to_coordinate(), "e2e4");
    }

    #[test]
    fn parse_coordinate_keys() {
        let key: MoveKey = "e7e8q".parse().unwrap();
        assert_eq!(key.from, Square::E7);
        assert_eq!(key.to, Square::E8);
        assert_eq!(key.promotion, Some(Piece::Queen));
        assert_eq!(key.to_string(), "e7e8q");

        assert!("e2e9".parse::<MoveKey>().is_err());
        assert!("e7e8k".parse::<MoveKey>().is_err());
        assert!("e2".parse::<MoveKey>().is_err());
        assert_eq!(
            "e2e2".parse::<MoveKey>(),
            Err(CoordinateError::SameSquare(Square::E2))
        );
    }

    #[test]
    fn castling_squares() {
        let mv = Move::castling(Color::White, CastleSide::King);
        assert_eq!((mv.from, mv.to), (Square::E1, Square::G1));
        assert_eq!(CastleSide::King.rook_from(Color::White), Square::H1);
        assert_eq!(CastleSide::King.rook_to(Color::White), Square::F1);
        assert_eq!(CastleSide::Queen.king_to(Color::Black), Square::C8);
        assert_eq!(CastleSide::Queen.rook_from(Color::Black), Square::A8);
        assert_eq!(CastleSide::Queen.rook_to(Color::Black), Square::D8);
    }

    #[test]
    fn reversal() {
        let out = Move::new(Square::G1, Square::F3, Piece::Knight);
        let back = Move::new(Square::F3, Square::G1, Piece::Knight);
        assert!(back.reverses(&out));
        assert!(!out.reverses(&out));
    }

    #[test]
    fn key_matching_includes_promotion() {
        let base = Move::new(Square::B7, Square::B8, Piece::Pawn);
        let queen = base.promoting(Piece::Queen);
        let knight = base.promoting(Piece::Knight);
        assert!(queen.key().matches(&queen));
        assert!(!queen.key().matches(&knight));
    }
}

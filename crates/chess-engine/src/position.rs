//! Board snapshots.

use chess_core::{CastleSide, Color, Piece, Square};
use thiserror::Error;

use crate::Bitboard;

/// Reasons a set of pieces does not form a position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("{0} has no king")]
    MissingKing(Color),

    #[error("{0} has more than one king")]
    ExtraKing(Color),

    #[error("{0} is occupied twice")]
    SquareTaken(Square),

    #[error("{0} pawn on its back or promotion rank at {1}")]
    PawnOnEdgeRank(Color, Square),
}

/// One color's pieces and castling rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Side {
    occupied: Bitboard,
    pieces: [Bitboard; 6],
    kingside: bool,
    queenside: bool,
}

impl Side {
    const EMPTY: Side = Side {
        occupied: Bitboard::EMPTY,
        pieces: [Bitboard::EMPTY; 6],
        kingside: false,
        queenside: false,
    };

    /// Every square this side occupies.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    /// Squares holding this side's pieces of one kind.
    #[inline]
    pub fn pieces(&self, piece: Piece) -> Bitboard {
        self.pieces[piece.index()]
    }

    /// The kind of piece on `sq`, if it is one of ours.
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        if !self.occupied.contains(sq) {
            return None;
        }
        Piece::ALL
            .into_iter()
            .find(|p| self.pieces[p.index()].contains(sq))
    }

    /// Whether castling to `side` is still allowed.
    #[inline]
    pub fn can_castle(&self, side: CastleSide) -> bool {
        match side {
            CastleSide::King => self.kingside,
            CastleSide::Queen => self.queenside,
        }
    }

    /// Non-king material in pawns.
    pub fn material(&self) -> i32 {
        Piece::ALL
            .into_iter()
            .map(|p| p.material() * self.pieces(p).count() as i32)
            .sum()
    }

    fn put(&mut self, piece: Piece, sq: Square) {
        self.occupied = self.occupied.with(sq);
        self.pieces[piece.index()] = self.pieces[piece.index()].with(sq);
    }

    fn remove(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.piece_at(sq)?;
        self.occupied = self.occupied.without(sq);
        self.pieces[piece.index()] = self.pieces[piece.index()].without(sq);
        Some(piece)
    }
}

/// An immutable board snapshot: both sides' pieces, castling rights, the
/// en-passant target and the fifty-move counter.
///
/// Never constructed without exactly one king per color. The side to move is
/// not part of the snapshot; callers pass it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    sides: [Side; 2],
    en_passant: Bitboard,
    halfmove_clock: u32,
}

const BACK_RANK: [Piece; 8] = [
    Piece::Rook,
    Piece::Knight,
    Piece::Bishop,
    Piece::Queen,
    Piece::King,
    Piece::Bishop,
    Piece::Knight,
    Piece::Rook,
];

impl Default for Position {
    fn default() -> Self {
        Self::new_game()
    }
}

impl Position {
    /// The standard starting layout. White moves first.
    pub fn new_game() -> Self {
        let mut position = Position {
            sides: [Side::EMPTY; 2],
            en_passant: Bitboard::EMPTY,
            halfmove_clock: 0,
        };
        for color in Color::BOTH {
            let side = &mut position.sides[color.index()];
            for (file, piece) in BACK_RANK.into_iter().enumerate() {
                side.put(piece, Square::at(file as u8, color.home_rank()));
                side.put(Piece::Pawn, Square::at(file as u8, color.relative_rank(1)));
            }
            side.kingside = true;
            side.queenside = true;
        }
        position
    }

    /// Builds a position from a piece list, with no castling rights and no
    /// en-passant target.
    pub fn from_pieces(pieces: &[(Color, Piece, Square)]) -> Result<Self, PositionError> {
        let mut position = Position {
            sides: [Side::EMPTY; 2],
            en_passant: Bitboard::EMPTY,
            halfmove_clock: 0,
        };
        for &(color, piece, sq) in pieces {
            if position.occupied().contains(sq) {
                return Err(PositionError::SquareTaken(sq));
            }
            position.put(color, piece, sq);
        }
        position.validate()?;
        Ok(position)
    }

    /// Checks the king and pawn placement rules.
    pub(crate) fn validate(&self) -> Result<(), PositionError> {
        for color in Color::BOTH {
            let side = self.side(color);
            match side.pieces(Piece::King).count() {
                0 => return Err(PositionError::MissingKing(color)),
                1 => {}
                _ => return Err(PositionError::ExtraKing(color)),
            }
            let edges = Bitboard::rank(0) | Bitboard::rank(7);
            if let Some(sq) = (side.pieces(Piece::Pawn) & edges).lsb() {
                return Err(PositionError::PawnOnEdgeRank(color, sq));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn side(&self, color: Color) -> &Side {
        &self.sides[color.index()]
    }

    /// Every occupied square.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.sides[0].occupied | self.sides[1].occupied
    }

    /// Squares holding pieces of one color and kind.
    #[inline]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.side(color).pieces(piece)
    }

    /// The piece on `sq` and its color.
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        Color::BOTH
            .into_iter()
            .find_map(|c| self.side(c).piece_at(sq).map(|p| (c, p)))
    }

    /// Where `color`'s king stands.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color, Piece::King).lsb()
    }

    /// The square a pawn skipped over on the previous ply, if it advanced two.
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant.lsb()
    }

    /// En-passant target as a mask with at most one bit set.
    #[inline]
    pub fn en_passant_mask(&self) -> Bitboard {
        self.en_passant
    }

    /// Half-moves since the last pawn move or capture.
    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn can_castle(&self, color: Color, side: CastleSide) -> bool {
        self.side(color).can_castle(side)
    }

    pub(crate) fn put(&mut self, color: Color, piece: Piece, sq: Square) {
        self.sides[color.index()].put(piece, sq);
    }

    pub(crate) fn remove(&mut self, color: Color, sq: Square) -> Option<Piece> {
        self.sides[color.index()].remove(sq)
    }

    pub(crate) fn revoke_castling(&mut self, color: Color, side: CastleSide) {
        let s = &mut self.sides[color.index()];
        match side {
            CastleSide::King => s.kingside = false,
            CastleSide::Queen => s.queenside = false,
        }
    }

    pub(crate) fn grant_castling(&mut self, color: Color, side: CastleSide) {
        let s = &mut self.sides[color.index()];
        match side {
            CastleSide::King => s.kingside = true,
            CastleSide::Queen => s.queenside = true,
        }
    }

    pub(crate) fn set_en_passant(&mut self, target: Option<Square>) {
        self.en_passant = target.map_or(Bitboard::EMPTY, Bitboard::from_square);
    }

    pub(crate) fn set_halfmove_clock(&mut self, clock: u32) {
        self.halfmove_clock = clock;
    }
}

//! FEN import and export.

use chess_core::{CastleSide, Color, Piece, Square};
use thiserror::Error;

use crate::{Position, PositionError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("expected 4 to 6 fields, got {0}")]
    FieldCount(usize),

    #[error("invalid piece placement: {0}")]
    Placement(String),

    #[error("invalid side to move: {0:?}")]
    SideToMove(String),

    #[error("invalid castling field: {0:?}")]
    Castling(String),

    #[error("invalid en-passant field: {0:?}")]
    EnPassant(String),

    #[error("invalid halfmove clock: {0:?}")]
    HalfmoveClock(String),

    #[error(transparent)]
    Position(#[from] PositionError),
}

/// FEN of the standard starting layout.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    /// Parses a FEN record into a position and the side to move.
    ///
    /// The halfmove and fullmove fields may be omitted. Castling rights whose
    /// king or rook is not on its original square are rejected.
    pub fn from_fen(fen: &str) -> Result<(Position, Color), FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FenError::FieldCount(fields.len()));
        }

        let placement = parse_placement(fields[0])?;
        let mut position = Position::from_pieces(&placement)?;

        let to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };

        if fields[2] != "-" {
            for c in fields[2].chars() {
                let (color, side) = match c {
                    'K' => (Color::White, CastleSide::King),
                    'Q' => (Color::White, CastleSide::Queen),
                    'k' => (Color::Black, CastleSide::King),
                    'q' => (Color::Black, CastleSide::Queen),
                    _ => return Err(FenError::Castling(fields[2].to_string())),
                };
                let king_home = Square::at(4, color.home_rank());
                let in_place = position.piece_at(king_home) == Some((color, Piece::King))
                    && position.piece_at(side.rook_from(color)) == Some((color, Piece::Rook));
                if !in_place {
                    return Err(FenError::Castling(fields[2].to_string()));
                }
                position.grant_castling(color, side);
            }
        }

        if fields[3] != "-" {
            let target: Square = fields[3]
                .parse()
                .map_err(|_| FenError::EnPassant(fields[3].to_string()))?;
            // The skipped square sits behind a pawn of the side that just moved.
            let expected_rank = to_move.opponent().relative_rank(2);
            if target.rank() != expected_rank {
                return Err(FenError::EnPassant(fields[3].to_string()));
            }
            position.set_en_passant(Some(target));
        }

        if let Some(clock) = fields.get(4) {
            let clock = clock
                .parse()
                .map_err(|_| FenError::HalfmoveClock(clock.to_string()))?;
            position.set_halfmove_clock(clock);
        }

        Ok((position, to_move))
    }

    /// Renders the position as FEN with the given side to move and move number.
    pub fn to_fen(&self, to_move: Color, fullmove_number: u32) -> String {
        let mut rows = Vec::with_capacity(8);
        for rank in (0..8u8).rev() {
            let mut row = String::new();
            let mut gap = 0;
            for file in 0..8u8 {
                match self.piece_at(Square::at(file, rank)) {
                    None => gap += 1,
                    Some((color, piece)) => {
                        if gap > 0 {
                            row.push_str(&gap.to_string());
                            gap = 0;
                        }
                        let c = piece.to_char();
                        row.push(match color {
                            Color::White => c.to_ascii_uppercase(),
                            Color::Black => c,
                        });
                    }
                }
            }
            if gap > 0 {
                row.push_str(&gap.to_string());
            }
            rows.push(row);
        }

        let mut castling = String::new();
        for (color, side, c) in [
            (Color::White, CastleSide::King, 'K'),
            (Color::White, CastleSide::Queen, 'Q'),
            (Color::Black, CastleSide::King, 'k'),
            (Color::Black, CastleSide::Queen, 'q'),
        ] {
            if self.can_castle(color, side) {
                castling.push(c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant = self
            .en_passant()
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());
        let side = match to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };

        format!(
            "{} {side} {castling} {en_passant} {} {fullmove_number}",
            rows.join("/"),
            self.halfmove_clock()
        )
    }
}

fn parse_placement(field: &str) -> Result<Vec<(Color, Piece, Square)>, FenError> {
    let bad = || FenError::Placement(field.to_string());
    let rows: Vec<&str> = field.split('/').collect();
    if rows.len() != 8 {
        return Err(bad());
    }

    let mut pieces = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let rank = 7 - i as u8;
        let mut file = 0u8;
        for c in row.chars() {
            if let Some(skip) = c.to_digit(10) {
                if !(1..=8).contains(&skip) {
                    return Err(bad());
                }
                file += skip as u8;
            } else {
                let piece = Piece::from_char(c).ok_or_else(bad)?;
                if file >= 8 {
                    return Err(bad());
                }
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                pieces.push((color, piece, Square::at(file, rank)));
                file += 1;
            }
            if file > 8 {
                return Err(bad());
            }
        }
        if file != 8 {
            return Err(bad());
        }
    }
    Ok(pieces)
}

//! Check detection and game-end classification.

use std::fmt;

use chess_core::{Color, Move, Piece};

use crate::{legal_moves, square_attacked_by, Bitboard, Position};

/// Where a game stands after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    Active,
    Checkmate,
    Stalemate,
    DrawByRepetition,
    DrawByMaterial,
    DrawByFiftyMoves,
}

impl GameState {
    /// True for every state that ends the game.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, GameState::Active)
    }

    #[inline]
    pub const fn is_draw(self) -> bool {
        matches!(
            self,
            GameState::Stalemate
                | GameState::DrawByRepetition
                | GameState::DrawByMaterial
                | GameState::DrawByFiftyMoves
        )
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameState::Active => "active",
            GameState::Checkmate => "checkmate",
            GameState::Stalemate => "stalemate",
            GameState::DrawByRepetition => "draw by repetition",
            GameState::DrawByMaterial => "draw by insufficient material",
            GameState::DrawByFiftyMoves => "draw by the fifty-move rule",
        })
    }
}

/// Plies without a pawn move or capture after which the game is drawn.
pub const FIFTY_MOVE_PLIES: u32 = 100;

/// Plies inspected for a repetition: two identical four-ply cycles.
pub const REPETITION_WINDOW: usize = 8;

/// True if `color`'s king is attacked by the other side.
pub fn is_in_check(position: &Position, color: Color) -> bool {
    position
        .king_square(color)
        .is_some_and(|king| square_attacked_by(position, Bitboard::from_square(king), color.opponent()))
}

/// Classifies the position with `to_move` about to play, given the moves
/// played so far (oldest first).
pub fn classify(position: &Position, to_move: Color, history: &[Move]) -> GameState {
    if legal_moves(position, to_move).is_empty() {
        return if is_in_check(position, to_move) {
            GameState::Checkmate
        } else {
            GameState::Stalemate
        };
    }
    if is_repetition(history) {
        return GameState::DrawByRepetition;
    }
    if position.halfmove_clock() >= FIFTY_MOVE_PLIES {
        return GameState::DrawByFiftyMoves;
    }
    if is_insufficient_material(position) {
        return GameState::DrawByMaterial;
    }
    GameState::Active
}

/// True if the last eight plies are the same four-ply cycle played twice
/// with no capture anywhere in them.
pub fn is_repetition(history: &[Move]) -> bool {
    if history.len() < REPETITION_WINDOW {
        return false;
    }
    let window = &history[history.len() - REPETITION_WINDOW..];
    let (first, second) = window.split_at(REPETITION_WINDOW / 2);
    window.iter().all(|m| !m.capture)
        && first
            .iter()
            .zip(second)
            .all(|(a, b)| a.from == b.from && a.to == b.to)
}

/// Bare kings, a lone minor piece against a bare king, or bishops that all
/// stand on one square color.
pub fn is_insufficient_material(position: &Position) -> bool {
    let heavy = [Piece::Pawn, Piece::Rook, Piece::Queen];
    if Color::BOTH
        .into_iter()
        .any(|c| heavy.into_iter().any(|p| position.pieces(c, p).is_not_empty()))
    {
        return false;
    }

    let minors = |c: Color| {
        (position.pieces(c, Piece::Knight) | position.pieces(c, Piece::Bishop)).count()
    };
    let (white, black) = (minors(Color::White), minors(Color::Black));
    if white + black <= 1 {
        return true;
    }

    let knights = position.pieces(Color::White, Piece::Knight) | position.pieces(Color::Black, Piece::Knight);
    if knights.is_not_empty() {
        return false;
    }
    let bishops = position.pieces(Color::White, Piece::Bishop) | position.pieces(Color::Black, Piece::Bishop);
    let light = (bishops & Bitboard::LIGHT_SQUARES).is_not_empty();
    let dark = (bishops & !Bitboard::LIGHT_SQUARES).is_not_empty();
    !(light && dark)
}

//! Bitboard chess rules engine.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit square sets
//! - [`Position`] - immutable board snapshots with both sides' pieces and flags
//! - [`attack_tables`] - per-square step masks and sliding rays
//! - [`legal_moves`], [`legal_moves_from`] and [`square_attacked_by`]
//! - [`apply_move`] - the pure position transition
//! - [`classify`] and [`is_in_check`] - check, mate and draw detection
//! - [`Game`] - the authoritative game record with history and undo
//!
//! # Example
//!
//! ```
//! use chess_core::{Color, Square};
//! use chess_engine::{legal_moves, Game, Position};
//!
//! let position = Position::new_game();
//! assert_eq!(legal_moves(&position, Color::White).len(), 20);
//!
//! let mut game = Game::new();
//! assert_eq!(game.make_move(Square::E2, Square::E4, None, false), Ok(true));
//! assert_eq!(game.turn(), Some(Color::Black));
//! ```

mod apply;
pub mod attacks;
mod bitboard;
mod fen;
mod game;
pub mod movegen;
mod position;
mod terminal;

pub use apply::apply_move;
pub use attacks::{attack_tables, AttackTables, Direction};
pub use bitboard::Bitboard;
pub use fen::{FenError, STARTING_FEN};
pub use game::{Game, GameError, HistoryEntry};
pub use movegen::perft::{perft, perft_divide};
pub use movegen::{legal_moves, legal_moves_from, square_attacked_by, MoveList};
pub use position::{Position, PositionError, Side};
pub use terminal::{
    classify, is_in_check, is_insufficient_material, is_repetition, GameState, FIFTY_MOVE_PLIES,
    REPETITION_WINDOW,
};

//! Core value types for chess.
//!
//! This crate provides the plain data shared by the engine, the opening book
//! and the search:
//! - [`Color`] and [`Piece`] for sides and piece kinds
//! - [`Square`] for board coordinates
//! - [`Move`], [`MoveKey`] and [`MoveEffect`] for moves and what they did
//! - [`CoordinateError`] for rejected coordinates

mod color;
mod error;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use error::CoordinateError;
pub use mov::{CastleSide, Move, MoveEffect, MoveKey};
pub use piece::Piece;
pub use square::Square;
